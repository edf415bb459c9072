//! Layered circuit encoder.
//!
//! Turns a circuit into a binary occupancy tensor of shape
//! `(max_depth, num_qubits, num_gate_classes)`: cell `(l, q, c)` is 1 iff
//! gate class `c` sits on qubit `q` in layer `l`. Two-qubit gates are
//! recorded once, under their first operand.

use ndarray::Array3;
use qforge_ir::Circuit;

use crate::error::{DimensionKind, EnvError, EnvResult};
use crate::gate_class::GateSet;
use crate::layered::LayeredCircuit;

/// Observation tensor type.
pub type Observation = Array3<i8>;

/// Fixed-shape encoder for one environment configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayeredEncoder {
    max_depth: usize,
    num_qubits: usize,
}

impl LayeredEncoder {
    /// Create an encoder for the given grid.
    pub fn new(max_depth: usize, num_qubits: usize) -> Self {
        Self {
            max_depth,
            num_qubits,
        }
    }

    /// Observation shape for `num_classes` gate classes.
    pub fn shape(&self, num_classes: usize) -> (usize, usize, usize) {
        (self.max_depth, self.num_qubits, num_classes)
    }

    /// Fail if `circuit` does not fit the grid.
    pub fn check_dimensions(&self, circuit: &Circuit) -> EnvResult<()> {
        if circuit.num_qubits() > self.num_qubits {
            return Err(EnvError::Dimension {
                kind: DimensionKind::Qubits,
                got: circuit.num_qubits(),
                limit: self.num_qubits,
            });
        }
        let depth = circuit.depth();
        if depth > self.max_depth {
            return Err(EnvError::Dimension {
                kind: DimensionKind::Depth,
                got: depth,
                limit: self.max_depth,
            });
        }
        Ok(())
    }

    /// Encode a circuit.
    pub fn encode(&self, circuit: &Circuit, gate_set: &GateSet) -> EnvResult<Observation> {
        self.check_dimensions(circuit)?;
        self.encode_layered(circuit, &LayeredCircuit::new(circuit), gate_set)
    }

    /// Encode a circuit whose layering is already known.
    pub fn encode_layered(
        &self,
        circuit: &Circuit,
        layered: &LayeredCircuit,
        gate_set: &GateSet,
    ) -> EnvResult<Observation> {
        self.check_dimensions(circuit)?;

        let mut obs = Array3::<i8>::zeros(self.shape(gate_set.len()));
        let dag = circuit.dag();
        for (l, layer) in layered.layers().iter().enumerate() {
            for &node in layer {
                let Some(inst) = dag.get_instruction(node) else {
                    continue;
                };
                let class = gate_set.classify(&inst.gate, &inst.qubits).map_err(|source| {
                    EnvError::IncompatibleGate {
                        circuit: circuit.name().to_string(),
                        source,
                    }
                })?;
                obs[[l, inst.anchor().index(), class]] = 1;
            }
        }

        Ok(obs)
    }
}
