//! Circuit instructions combining gates with operands.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::gate::StandardGate;
use crate::qubit::QubitId;

/// A gate applied to an ordered tuple of qubits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    /// The gate.
    pub gate: StandardGate,
    /// Qubits this instruction operates on, in gate operand order.
    pub qubits: Vec<QubitId>,
}

impl Instruction {
    /// Create a gate instruction.
    pub fn gate(gate: StandardGate, qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self {
            gate,
            qubits: qubits.into_iter().collect(),
        }
    }

    /// Create a single-qubit gate instruction.
    pub fn single_qubit_gate(gate: StandardGate, qubit: QubitId) -> Self {
        Self::gate(gate, [qubit])
    }

    /// Create a two-qubit gate instruction.
    pub fn two_qubit_gate(gate: StandardGate, q1: QubitId, q2: QubitId) -> Self {
        Self::gate(gate, [q1, q2])
    }

    /// The qubit an instruction is keyed by: its first operand.
    ///
    /// # Panics
    ///
    /// Panics if the instruction has no operands; `CircuitDag::apply`
    /// never admits such an instruction.
    pub fn anchor(&self) -> QubitId {
        self.qubits[0]
    }

    /// Position of `qubit` in the operand list, if the instruction touches it.
    pub fn position_of(&self, qubit: QubitId) -> Option<usize> {
        self.qubits.iter().position(|&q| q == qubit)
    }

    /// Check whether the instruction touches `qubit`.
    pub fn acts_on(&self, qubit: QubitId) -> bool {
        self.qubits.contains(&qubit)
    }

    /// Get the name of the instruction.
    pub fn name(&self) -> &str {
        self.gate.name()
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.gate.name())?;
        let params = self.gate.parameters();
        if !params.is_empty() {
            let rendered: Vec<String> = params.iter().map(ToString::to_string).collect();
            write!(f, "({})", rendered.join(", "))?;
        }
        let qubits: Vec<String> = self.qubits.iter().map(ToString::to_string).collect();
        write!(f, " {}", qubits.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_instruction() {
        let inst = Instruction::single_qubit_gate(StandardGate::H, QubitId(0));
        assert_eq!(inst.qubits.len(), 1);
        assert_eq!(inst.name(), "h");
        assert_eq!(inst.anchor(), QubitId(0));
    }

    #[test]
    fn test_operand_positions() {
        let inst = Instruction::two_qubit_gate(StandardGate::CX, QubitId(2), QubitId(0));
        assert_eq!(inst.anchor(), QubitId(2));
        assert_eq!(inst.position_of(QubitId(0)), Some(1));
        assert_eq!(inst.position_of(QubitId(1)), None);
        assert!(inst.acts_on(QubitId(2)));
    }

    #[test]
    fn test_display() {
        let inst = Instruction::two_qubit_gate(StandardGate::CX, QubitId(0), QubitId(1));
        assert_eq!(inst.to_string(), "cx q0, q1");
        let rz = Instruction::single_qubit_gate(StandardGate::Rz(0.5.into()), QubitId(3));
        assert_eq!(rz.to_string(), "rz(0.5000) q3");
    }
}
