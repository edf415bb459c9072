//! Starting-circuit curriculum.
//!
//! In training mode the curriculum samples circuits from a generator until
//! one has at least one legal action; that circuit becomes both the current
//! and the target circuit. In evaluation mode it replays a fixed target.

use std::sync::Arc;

use qforge_ir::Circuit;
use rand::rngs::StdRng;
use tracing::{debug, instrument, warn};

use crate::error::{EnvError, EnvResult};
use crate::generator::{CircuitGenerator, RandomCircuitGenerator};
use crate::mask::ActionMask;
use crate::state::{EnvSpec, EnvState};

/// Default cap on generator calls per reset.
pub const DEFAULT_MAX_GENERATION_ATTEMPTS: usize = 1000;

/// Produces the state an episode starts from.
#[derive(Debug)]
pub struct Curriculum {
    generator: Box<dyn CircuitGenerator>,
    max_attempts: usize,
}

impl Default for Curriculum {
    fn default() -> Self {
        Self::new(Box::new(RandomCircuitGenerator))
    }
}

impl Curriculum {
    /// Create a curriculum around a generator.
    pub fn new(generator: Box<dyn CircuitGenerator>) -> Self {
        Self {
            generator,
            max_attempts: DEFAULT_MAX_GENERATION_ATTEMPTS,
        }
    }

    /// Set the cap on generator calls per reset.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Cap on generator calls per reset.
    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Sample a training start with a non-empty mask.
    ///
    /// Candidates that overflow the grid, use non-native gates or admit no
    /// legal action are discarded.
    #[instrument(skip_all, fields(max_attempts = self.max_attempts))]
    pub fn sample(
        &self,
        spec: &Arc<EnvSpec>,
        rng: &mut StdRng,
    ) -> EnvResult<(EnvState, ActionMask)> {
        for attempt in 1..=self.max_attempts {
            let candidate = self.generator.generate(spec, rng)?;
            if !spec.is_encodable(&candidate) {
                debug!(attempt, "Discarding circuit outside the observation grid");
                continue;
            }
            let state = EnvState::new(Arc::clone(spec), candidate.clone(), candidate)?;
            let mask = ActionMask::compute(&state);
            if mask.any() {
                debug!(attempt, legal = mask.count(), "Accepted training circuit");
                return Ok((state, mask));
            }
            debug!(attempt, "Discarding circuit with no legal action");
        }

        warn!(attempts = self.max_attempts, "Curriculum exhausted");
        Err(EnvError::Generation {
            attempts: self.max_attempts,
        })
    }

    /// Start from a fixed target circuit. The mask may be empty.
    pub fn replay(spec: &Arc<EnvSpec>, target: &Circuit) -> EnvResult<(EnvState, ActionMask)> {
        let state = EnvState::new(Arc::clone(spec), target.clone(), target.clone())?;
        let mask = ActionMask::compute(&state);
        Ok((state, mask))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate_class::GateSet;
    use crate::generator::DatasetCircuitGenerator;
    use crate::rules::MergeRotations;
    use qforge_ir::QubitId;
    use rand::SeedableRng;

    fn spec() -> Arc<EnvSpec> {
        let gate_set = GateSet::from_coupling_map(&["rz", "sx"], "cx", &[(0, 1)]).unwrap();
        EnvSpec::new(3, 2, gate_set, vec![Box::new(MergeRotations)])
            .unwrap()
            .shared()
    }

    fn mergeable() -> Circuit {
        let mut circuit = Circuit::with_size("mergeable", 2);
        circuit.rz(0.1, QubitId(0)).unwrap();
        circuit.rz(0.2, QubitId(0)).unwrap();
        circuit
    }

    fn stuck() -> Circuit {
        let mut circuit = Circuit::with_size("stuck", 2);
        circuit.sx(QubitId(0)).unwrap();
        circuit
    }

    #[test]
    fn test_sample_skips_dead_circuits() {
        let dataset = DatasetCircuitGenerator::new(vec![stuck(), mergeable()]).unwrap();
        let curriculum = Curriculum::new(Box::new(dataset));
        let mut rng = StdRng::seed_from_u64(1);

        for _ in 0..10 {
            let (state, mask) = curriculum.sample(&spec(), &mut rng).unwrap();
            assert!(mask.any());
            assert_eq!(state.current(), &mergeable());
            assert_eq!(state.target(), state.current());
        }
    }

    #[test]
    fn test_sample_gives_up() {
        let dataset = DatasetCircuitGenerator::new(vec![stuck()]).unwrap();
        let curriculum = Curriculum::new(Box::new(dataset)).with_max_attempts(5);
        let mut rng = StdRng::seed_from_u64(1);

        assert!(matches!(
            curriculum.sample(&spec(), &mut rng),
            Err(EnvError::Generation { attempts: 5 })
        ));
    }

    #[test]
    fn test_replay_allows_empty_mask() {
        let (state, mask) = Curriculum::replay(&spec(), &stuck()).unwrap();
        assert!(!mask.any());
        assert_eq!(mask.len(), 6);
        assert_eq!(state.current(), &stuck());
    }
}
