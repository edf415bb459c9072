//! Episode state machine.
//!
//! A [`TransformationEnv`] moves through `Uninitialized → Ready → Stepping →
//! Terminated`. `reset` starts an episode from the curriculum (training) or
//! from the target circuit (evaluation); `step` applies one legal rewrite.
//! The target starts as an empty circuit and a training reset replaces it
//! with the sampled start circuit. A rejected step leaves the environment exactly as it was.

use std::sync::Arc;

use qforge_ir::Circuit;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::{Map, Value, json};
use tracing::{debug, info, instrument};

use crate::action::Action;
use crate::curriculum::Curriculum;
use crate::error::{EnvError, EnvResult};
use crate::mask::ActionMask;
use crate::state::{EnvSpec, EnvState};
use crate::task::Task;

/// Default episode length.
pub const DEFAULT_MAX_TIME_STEPS: usize = 32;

/// Auxiliary data returned by `reset` and `step`.
pub type Info = Map<String, Value>;

/// Lifecycle of an environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvPhase {
    /// No episode has been started.
    Uninitialized,
    /// Reset, no step taken yet.
    Ready,
    /// At least one step taken, episode still running.
    Stepping,
    /// Episode over; only `reset` is accepted.
    Terminated,
}

/// Result of a successful step.
#[derive(Debug, Clone)]
pub struct StepOutcome<O> {
    /// Observation of the new state.
    pub observation: O,
    /// Reward for the transition.
    pub reward: f64,
    /// The episode has ended.
    pub terminated: bool,
    /// Always `false`; episodes end by termination only.
    pub truncated: bool,
    /// Auxiliary data.
    pub info: Info,
}

/// A circuit-rewriting environment driven by a [`Task`].
#[derive(Debug)]
pub struct TransformationEnv<T: Task> {
    spec: Arc<EnvSpec>,
    task: T,
    curriculum: Curriculum,
    rng: StdRng,
    training: bool,
    max_time_steps: usize,
    target: Circuit,
    state: Option<EnvState>,
    mask: ActionMask,
    time_step: usize,
    phase: EnvPhase,
}

impl<T: Task> TransformationEnv<T> {
    /// Create an environment in training mode with the default curriculum.
    pub fn new(spec: Arc<EnvSpec>, task: T) -> Self {
        let target = spec.empty_circuit("target");
        Self {
            spec,
            task,
            curriculum: Curriculum::default(),
            rng: StdRng::from_entropy(),
            training: true,
            max_time_steps: DEFAULT_MAX_TIME_STEPS,
            target,
            state: None,
            mask: ActionMask::default(),
            time_step: 0,
            phase: EnvPhase::Uninitialized,
        }
    }

    /// Replace the curriculum.
    #[must_use]
    pub fn with_curriculum(mut self, curriculum: Curriculum) -> Self {
        self.curriculum = curriculum;
        self
    }

    /// Seed the environment's RNG.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Choose training or evaluation mode.
    #[must_use]
    pub fn with_training(mut self, training: bool) -> Self {
        self.training = training;
        self
    }

    /// Set the episode length. Zero is rejected.
    pub fn with_max_time_steps(mut self, max_time_steps: usize) -> EnvResult<Self> {
        if max_time_steps == 0 {
            return Err(EnvError::InvalidConfig(
                "max_time_steps must be at least 1".into(),
            ));
        }
        self.max_time_steps = max_time_steps;
        Ok(self)
    }

    /// Start a new episode.
    ///
    /// In training mode the start circuit comes from the curriculum and has
    /// at least one legal action and becomes the new target. In evaluation
    /// mode the target is replayed and the mask may be empty.
    #[instrument(skip(self), fields(training = self.training))]
    pub fn reset(&mut self, seed: Option<u64>) -> EnvResult<(T::Observation, Info)> {
        if let Some(seed) = seed {
            self.rng = StdRng::seed_from_u64(seed);
        }

        let (state, mask) = if self.training {
            self.curriculum.sample(&self.spec, &mut self.rng)?
        } else {
            Curriculum::replay(&self.spec, &self.target)?
        };
        let observation = self.task.observation(&state)?;
        let info = make_info(&state, &mask, 0);

        info!(
            depth = state.current().depth(),
            ops = state.current().num_ops(),
            legal = mask.count(),
            "Episode reset"
        );
        if self.training {
            self.target = state.target().clone();
        }
        self.state = Some(state);
        self.mask = mask;
        self.time_step = 0;
        self.phase = EnvPhase::Ready;
        Ok((observation, info))
    }

    /// Apply one action.
    ///
    /// Out-of-range and masked actions fail with
    /// [`EnvError::InvalidAction`]. Every fallible computation happens
    /// before the new state is committed.
    #[instrument(skip(self))]
    pub fn step(&mut self, action: usize) -> EnvResult<StepOutcome<T::Observation>> {
        let state = match self.phase {
            EnvPhase::Uninitialized => return Err(EnvError::NotReset),
            EnvPhase::Terminated => return Err(EnvError::EpisodeTerminated),
            EnvPhase::Ready | EnvPhase::Stepping => {
                self.state.as_ref().ok_or(EnvError::NotReset)?
            }
        };

        let codec = self.spec.codec();
        if !codec.contains(action) {
            return Err(EnvError::InvalidAction {
                action,
                description: format!("outside action space of size {}", codec.size()),
            });
        }
        if !self.mask.is_legal(action) {
            return Err(EnvError::InvalidAction {
                action,
                description: format!("{} is not legal here", self.format_action(action)),
            });
        }

        let decoded = codec.decode(action);
        let next = self.task.build_next_circuit(state, decoded)?;
        let reward = self.task.reward(state, &next);
        let next_state = state.with_current(next)?;
        let mask = ActionMask::compute(&next_state);
        let observation = self.task.observation(&next_state)?;

        let time_step = self.time_step + 1;
        let terminated = time_step >= self.max_time_steps || !mask.any();
        let info = make_info(&next_state, &mask, time_step);

        debug!(
            action = %self.format_action(action),
            reward,
            time_step,
            terminated,
            "Step accepted"
        );
        self.state = Some(next_state);
        self.mask = mask;
        self.time_step = time_step;
        self.phase = if terminated {
            EnvPhase::Terminated
        } else {
            EnvPhase::Stepping
        };

        Ok(StepOutcome {
            observation,
            reward,
            terminated,
            truncated: false,
            info,
        })
    }

    /// Legal actions in the current state. Empty before the first reset.
    pub fn action_mask(&self) -> &ActionMask {
        &self.mask
    }

    /// Decode a flat action, or `None` if it is out of range.
    pub fn decode_action(&self, action: usize) -> Option<Action> {
        let codec = self.spec.codec();
        codec.contains(action).then(|| codec.decode(action))
    }

    /// Human-readable action, e.g. `CommuteGates (layer 3, qubit 1)`.
    pub fn format_action(&self, action: usize) -> String {
        match self.decode_action(action) {
            Some(a) => {
                let name = self.spec.rule(a.rule).map_or("?", |rule| rule.name());
                format!("{name} (layer {}, qubit {})", a.layer, a.qubit)
            }
            None => format!("action {action} (out of range)"),
        }
    }

    /// Circuit being rewritten in the running episode.
    pub fn current_circuit(&self) -> Option<&Circuit> {
        self.state.as_ref().map(EnvState::current)
    }

    /// Circuit the next evaluation `reset` replays.
    pub fn target_circuit(&self) -> &Circuit {
        &self.target
    }

    /// Set the circuit evaluation episodes start from.
    ///
    /// Takes effect at the next `reset`.
    pub fn set_target_circuit(&mut self, circuit: Circuit) -> EnvResult<()> {
        self.spec.encoder().check_dimensions(&circuit)?;
        self.target = circuit;
        Ok(())
    }

    /// Switch between training and evaluation mode for the next `reset`.
    pub fn set_training(&mut self, training: bool) {
        self.training = training;
    }

    /// Whether the next `reset` samples from the curriculum.
    pub fn is_training(&self) -> bool {
        self.training
    }

    /// Steps taken in the running episode.
    pub fn time_step(&self) -> usize {
        self.time_step
    }

    /// Episode length.
    pub fn max_time_steps(&self) -> usize {
        self.max_time_steps
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> EnvPhase {
        self.phase
    }

    /// State of the running episode.
    pub fn state(&self) -> Option<&EnvState> {
        self.state.as_ref()
    }

    /// Shared configuration.
    pub fn spec(&self) -> &Arc<EnvSpec> {
        &self.spec
    }

    /// The task strategy.
    pub fn task(&self) -> &T {
        &self.task
    }
}

fn make_info(state: &EnvState, mask: &ActionMask, time_step: usize) -> Info {
    let mut info = Info::new();
    info.insert("time_step".into(), json!(time_step));
    info.insert("depth".into(), json!(state.current().depth()));
    info.insert("num_ops".into(), json!(state.current().num_ops()));
    info.insert("legal_actions".into(), json!(mask.count()));
    info
}
