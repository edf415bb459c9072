//! High-level circuit builder API.

use std::fmt;

use crate::dag::{CircuitDag, NodeIndex};
use crate::error::IrResult;
use crate::gate::StandardGate;
use crate::instruction::Instruction;
use crate::parameter::ParameterExpression;
use crate::qubit::QubitId;

/// A fixed-width quantum circuit.
///
/// Builder methods append to the end of the circuit and return
/// `&mut Self` so calls can be chained with `?`.
#[derive(Debug, Clone)]
pub struct Circuit {
    /// Name of the circuit.
    name: String,
    /// The underlying DAG representation.
    dag: CircuitDag,
}

impl Circuit {
    /// Create a circuit with `num_qubits` empty wires.
    pub fn with_size(name: impl Into<String>, num_qubits: u32) -> Self {
        Self {
            name: name.into(),
            dag: CircuitDag::with_qubits(num_qubits),
        }
    }

    /// Build a circuit by appending `instructions` in order.
    pub fn from_instructions(
        name: impl Into<String>,
        num_qubits: u32,
        instructions: impl IntoIterator<Item = Instruction>,
    ) -> IrResult<Self> {
        let mut circuit = Self::with_size(name, num_qubits);
        for inst in instructions {
            circuit.append(inst)?;
        }
        Ok(circuit)
    }

    /// Append an instruction.
    pub fn append(&mut self, instruction: Instruction) -> IrResult<&mut Self> {
        self.dag.apply(instruction)?;
        Ok(self)
    }

    /// Apply an arbitrary gate to the given qubits.
    pub fn gate(
        &mut self,
        gate: StandardGate,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.append(Instruction::gate(gate, qubits))
    }

    // =========================================================================
    // Single-qubit gates
    // =========================================================================

    /// Apply Hadamard gate.
    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::single_qubit_gate(StandardGate::H, qubit))
    }

    /// Apply Pauli-X gate.
    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::single_qubit_gate(StandardGate::X, qubit))
    }

    /// Apply Pauli-Z gate.
    pub fn z(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::single_qubit_gate(StandardGate::Z, qubit))
    }

    /// Apply S gate.
    pub fn s(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::single_qubit_gate(StandardGate::S, qubit))
    }

    /// Apply T gate.
    pub fn t(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::single_qubit_gate(StandardGate::T, qubit))
    }

    /// Apply sqrt(X) gate.
    pub fn sx(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::single_qubit_gate(StandardGate::SX, qubit))
    }

    /// Apply Rx rotation gate.
    pub fn rx(
        &mut self,
        theta: impl Into<ParameterExpression>,
        qubit: QubitId,
    ) -> IrResult<&mut Self> {
        self.append(Instruction::single_qubit_gate(
            StandardGate::Rx(theta.into()),
            qubit,
        ))
    }

    /// Apply Ry rotation gate.
    pub fn ry(
        &mut self,
        theta: impl Into<ParameterExpression>,
        qubit: QubitId,
    ) -> IrResult<&mut Self> {
        self.append(Instruction::single_qubit_gate(
            StandardGate::Ry(theta.into()),
            qubit,
        ))
    }

    /// Apply Rz rotation gate.
    pub fn rz(
        &mut self,
        theta: impl Into<ParameterExpression>,
        qubit: QubitId,
    ) -> IrResult<&mut Self> {
        self.append(Instruction::single_qubit_gate(
            StandardGate::Rz(theta.into()),
            qubit,
        ))
    }

    // =========================================================================
    // Two-qubit gates
    // =========================================================================

    /// Apply CNOT (CX) gate.
    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::two_qubit_gate(StandardGate::CX, control, target))
    }

    /// Apply CZ gate.
    pub fn cz(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::two_qubit_gate(StandardGate::CZ, control, target))
    }

    /// Apply SWAP gate.
    pub fn swap(&mut self, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::two_qubit_gate(StandardGate::Swap, q1, q2))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.dag.num_qubits()
    }

    /// Get the number of operations.
    pub fn num_ops(&self) -> usize {
        self.dag.num_ops()
    }

    /// Get the circuit depth.
    pub fn depth(&self) -> usize {
        self.dag.depth()
    }

    /// Operation nodes grouped into ASAP layers.
    pub fn layers(&self) -> Vec<Vec<NodeIndex>> {
        self.dag.layers()
    }

    /// Get the underlying DAG.
    pub fn dag(&self) -> &CircuitDag {
        &self.dag
    }

    /// Instructions in topological order.
    pub fn instructions(&self) -> Vec<Instruction> {
        self.dag
            .topological_ops()
            .map(|(_, inst)| inst.clone())
            .collect()
    }

    // =========================================================================
    // Standard circuits
    // =========================================================================

    /// Create a Bell state circuit.
    pub fn bell() -> IrResult<Self> {
        let mut circuit = Self::with_size("bell", 2);
        circuit.h(QubitId(0))?.cx(QubitId(0), QubitId(1))?;
        Ok(circuit)
    }

    /// Create an n-qubit GHZ state circuit.
    pub fn ghz(n: u32) -> IrResult<Self> {
        let mut circuit = Self::with_size(format!("ghz_{n}"), n);
        if n > 0 {
            circuit.h(QubitId(0))?;
        }
        for i in 1..n {
            circuit.cx(QubitId(i - 1), QubitId(i))?;
        }
        Ok(circuit)
    }
}

/// Circuits are equal when they have the same width and the same
/// instruction sequence. The name is ignored.
impl PartialEq for Circuit {
    fn eq(&self, other: &Self) -> bool {
        self.num_qubits() == other.num_qubits() && self.instructions() == other.instructions()
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "circuit {} ({} qubits, depth {})",
            self.name,
            self.num_qubits(),
            self.depth()
        )?;
        for inst in self.instructions() {
            writeln!(f, "  {inst}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bell_circuit() {
        let circuit = Circuit::bell().unwrap();
        assert_eq!(circuit.num_qubits(), 2);
        assert_eq!(circuit.num_ops(), 2);
        assert_eq!(circuit.depth(), 2);
    }

    #[test]
    fn test_ghz_circuit() {
        let circuit = Circuit::ghz(5).unwrap();
        assert_eq!(circuit.num_qubits(), 5);
        assert_eq!(circuit.depth(), 5);
    }

    #[test]
    fn test_from_instructions_preserves_order() {
        let insts = vec![
            Instruction::single_qubit_gate(StandardGate::H, QubitId(1)),
            Instruction::two_qubit_gate(StandardGate::CX, QubitId(1), QubitId(0)),
            Instruction::single_qubit_gate(StandardGate::Rz(0.25.into()), QubitId(0)),
        ];
        let circuit = Circuit::from_instructions("c", 2, insts.clone()).unwrap();
        assert_eq!(circuit.instructions(), insts);
    }

    #[test]
    fn test_equality_ignores_name() {
        let mut a = Circuit::with_size("a", 2);
        a.h(QubitId(0)).unwrap();
        let mut b = Circuit::with_size("b", 2);
        b.h(QubitId(0)).unwrap();
        assert_eq!(a, b);

        b.x(QubitId(1)).unwrap();
        assert_ne!(a, b);
        assert_ne!(Circuit::with_size("a", 2), Circuit::with_size("a", 3));
    }

    #[test]
    fn test_out_of_range_qubit() {
        let mut circuit = Circuit::with_size("c", 2);
        assert!(circuit.h(QubitId(2)).is_err());
        assert_eq!(circuit.num_ops(), 0);
    }

    #[test]
    fn test_display_lists_instructions() {
        let circuit = Circuit::bell().unwrap();
        let text = circuit.to_string();
        assert!(text.contains("h q0"));
        assert!(text.contains("cx q0, q1"));
    }
}
