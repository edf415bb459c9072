//! Task strategies plugged into the episode loop.

use qforge_ir::Circuit;
use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::encoder::Observation;
use crate::error::{EnvError, EnvResult};
use crate::state::EnvState;

/// What an episode optimizes and what the agent observes.
///
/// The environment calls `build_next_circuit` for every legal action, then
/// `reward` against the candidate before committing it, then `observation`
/// on the committed state.
pub trait Task: Send {
    /// Observation handed to the agent.
    type Observation;

    /// Reward for moving from `state` to `next`.
    fn reward(&self, state: &EnvState, next: &Circuit) -> f64;

    /// Observation of the current state.
    fn observation(&self, state: &EnvState) -> EnvResult<Self::Observation>;

    /// Produce the circuit an action leads to.
    fn build_next_circuit(&self, state: &EnvState, action: Action) -> EnvResult<Circuit> {
        let rule = state
            .spec()
            .rule(action.rule)
            .ok_or_else(|| EnvError::RuleNotApplicable {
                rule: format!("#{}", action.rule),
                layer: action.layer,
                qubit: action.qubit,
            })?;
        rule.apply(state, action.layer, action.qubit_id())
    }
}

/// Rewards depth and gate-count reductions.
///
/// `reward = depth_weight · Δdepth + gate_weight · Δops`, where the deltas
/// are current minus next, so shrinking the circuit is positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CircuitOptimizationTask {
    /// Weight on depth reduction.
    pub depth_weight: f64,
    /// Weight on operation-count reduction.
    pub gate_weight: f64,
}

impl Default for CircuitOptimizationTask {
    fn default() -> Self {
        Self {
            depth_weight: 1.0,
            gate_weight: 0.1,
        }
    }
}

impl CircuitOptimizationTask {
    /// Create a task with explicit weights.
    pub fn new(depth_weight: f64, gate_weight: f64) -> Self {
        Self {
            depth_weight,
            gate_weight,
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn delta(before: usize, after: usize) -> f64 {
    before as f64 - after as f64
}

impl Task for CircuitOptimizationTask {
    type Observation = Observation;

    fn reward(&self, state: &EnvState, next: &Circuit) -> f64 {
        let current = state.current();
        self.depth_weight * delta(current.depth(), next.depth())
            + self.gate_weight * delta(current.num_ops(), next.num_ops())
    }

    fn observation(&self, state: &EnvState) -> EnvResult<Observation> {
        let spec = state.spec();
        spec.encoder()
            .encode_layered(state.current(), state.layered(), spec.gate_set())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate_class::GateSet;
    use crate::rules::MergeRotations;
    use crate::state::EnvSpec;
    use qforge_ir::QubitId;

    fn state() -> EnvState {
        let gate_set = GateSet::from_coupling_map(&["rz", "sx"], "cx", &[(0, 1)]).unwrap();
        let spec = EnvSpec::new(3, 2, gate_set, vec![Box::new(MergeRotations)])
            .unwrap()
            .shared();
        let mut circuit = Circuit::with_size("c", 2);
        circuit.rz(0.3, QubitId(0)).unwrap();
        circuit.rz(0.4, QubitId(0)).unwrap();
        circuit.sx(QubitId(1)).unwrap();
        EnvState::new(spec, circuit.clone(), circuit).unwrap()
    }

    #[test]
    fn test_merge_reward() {
        let state = state();
        let task = CircuitOptimizationTask::default();
        let action = Action {
            layer: 0,
            qubit: 0,
            rule: 0,
        };
        let next = task.build_next_circuit(&state, action).unwrap();

        // One layer and one gate fewer.
        let reward = task.reward(&state, &next);
        assert!((reward - 1.1).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_rule_index() {
        let action = Action {
            layer: 0,
            qubit: 0,
            rule: 5,
        };
        assert!(matches!(
            CircuitOptimizationTask::default().build_next_circuit(&state(), action),
            Err(EnvError::RuleNotApplicable { .. })
        ));
    }

    #[test]
    fn test_observation_shape() {
        let obs = CircuitOptimizationTask::default()
            .observation(&state())
            .unwrap();
        assert_eq!(obs.shape(), &[3, 2, 3]);
        assert_eq!(obs.iter().filter(|&&v| v == 1).count(), 3);
    }
}
