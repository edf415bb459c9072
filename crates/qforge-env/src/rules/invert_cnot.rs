//! Reverse the direction of a CNOT.

use qforge_ir::{Circuit, Instruction, QubitId, StandardGate};
use tracing::debug;

use super::rebuild;
use crate::basis::hadamard;
use crate::error::{EnvError, EnvResult};
use crate::rule::TransformationRule;
use crate::state::EnvState;

/// Replaces `cx(c, t)` with `H⊗H · cx(t, c) · H⊗H`, each Hadamard spelled
/// as `rz(π/2) · sx · rz(π/2)`.
///
/// Addressed by the control qubit. Needs the reversed CX and `rz`/`sx` to
/// be native classes.
#[derive(Debug, Clone, Copy, Default)]
pub struct InvertCnot;

impl InvertCnot {
    fn replacement(control: QubitId, target: QubitId) -> Vec<Instruction> {
        let mut seq = Vec::with_capacity(13);
        seq.extend(hadamard(control));
        seq.extend(hadamard(target));
        seq.push(Instruction::two_qubit_gate(StandardGate::CX, target, control));
        seq.extend(hadamard(control));
        seq.extend(hadamard(target));
        seq
    }

    fn rewrite(state: &EnvState, layer: usize, qubit: QubitId) -> Option<Circuit> {
        let (node, inst) = state.op_at(layer, qubit)?;
        if inst.gate != StandardGate::CX || inst.anchor() != qubit {
            return None;
        }
        let replacement = Self::replacement(inst.qubits[0], inst.qubits[1]);

        let order = state
            .current()
            .dag()
            .topological_ops()
            .flat_map(|(n, op)| {
                if n == node {
                    replacement.clone()
                } else {
                    vec![op.clone()]
                }
            });

        rebuild(state, order)
    }
}

impl TransformationRule for InvertCnot {
    fn name(&self) -> &str {
        "InvertCnot"
    }

    fn is_valid(&self, state: &EnvState, layer: usize, qubit: QubitId) -> bool {
        Self::rewrite(state, layer, qubit).is_some()
    }

    fn apply(&self, state: &EnvState, layer: usize, qubit: QubitId) -> EnvResult<Circuit> {
        let circuit = Self::rewrite(state, layer, qubit).ok_or_else(|| {
            EnvError::RuleNotApplicable {
                rule: self.name().to_string(),
                layer,
                qubit: qubit.index(),
            }
        })?;
        debug!(layer, %qubit, depth = circuit.depth(), "Inverted CNOT");
        Ok(circuit)
    }
}
