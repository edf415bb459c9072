//! Merge consecutive rotations about the same axis.

use qforge_ir::{Circuit, Instruction, ParameterExpression, QubitId, StandardGate, normalize_angle};
use tracing::debug;

use super::{EPSILON, rebuild};
use crate::error::{EnvError, EnvResult};
use crate::rule::TransformationRule;
use crate::state::EnvState;

/// Merge two same-axis rotations.
///
/// Returns `None` if the gates cannot be merged, `Some(None)` if they
/// cancel to the identity.
fn merge_rotations(gate1: &StandardGate, gate2: &StandardGate) -> Option<Option<StandardGate>> {
    let make: fn(ParameterExpression) -> StandardGate = match (gate1, gate2) {
        (StandardGate::Rz(_), StandardGate::Rz(_)) => StandardGate::Rz,
        (StandardGate::Rx(_), StandardGate::Rx(_)) => StandardGate::Rx,
        (StandardGate::Ry(_), StandardGate::Ry(_)) => StandardGate::Ry,
        _ => return None,
    };
    let sum = normalize_angle(gate1.angle()? + gate2.angle()?);
    Some((sum.abs() >= EPSILON).then(|| make(ParameterExpression::constant(sum))))
}

/// Folds the rotation at `(layer, qubit)` and the next rotation about the
/// same axis on that wire into one gate; both disappear if the angles
/// cancel.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeRotations;

impl MergeRotations {
    fn rewrite(state: &EnvState, layer: usize, qubit: QubitId) -> Option<Circuit> {
        let (a, inst_a) = state.op_at(layer, qubit)?;
        let dag = state.current().dag();
        let b = dag.wire_successor(a, qubit)?;
        let merged = merge_rotations(&inst_a.gate, &dag.get_instruction(b)?.gate)?;

        let order = dag.topological_ops().filter_map(|(n, op)| {
            if n == b {
                None
            } else if n == a {
                merged
                    .clone()
                    .map(|gate| Instruction::single_qubit_gate(gate, qubit))
            } else {
                Some(op.clone())
            }
        });

        rebuild(state, order)
    }
}

impl TransformationRule for MergeRotations {
    fn name(&self) -> &str {
        "MergeRotations"
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
        debug!(layer, %qubit, ops = circuit.num_ops(), "Merged rotations");
        Ok(circuit)
    }
}
