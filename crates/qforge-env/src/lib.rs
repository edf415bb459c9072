//! QForge Transformation Environment
//!
//! A decision engine that exposes circuit rewriting as a sequential
//! decision problem. An agent observes a layered occupancy tensor of the
//! current circuit, picks a `(layer, qubit, rule)` action from a masked
//! action space, and receives the rewritten circuit and a reward.
//!
//! # Core Components
//!
//! - **Encoding**: [`LayeredEncoder`] turns a circuit into an
//!   `(max_depth, num_qubits, num_gate_classes)` tensor
//! - **Actions**: [`ActionCodec`] maps flat indices to [`Action`] triples
//! - **Masking**: [`ActionMask`] marks where each rule applies
//! - **Rules**: [`TransformationRule`] implementations in [`rules`]
//! - **Episodes**: [`TransformationEnv`] runs the reset/step loop for a
//!   [`Task`]
//! - **Curriculum**: [`Curriculum`] supplies start circuits
//!
//! # Example
//!
//! ```rust
//! use qforge_env::EnvConfig;
//!
//! let config = EnvConfig {
//!     seed: Some(7),
//!     ..EnvConfig::default()
//! };
//! let mut env = config.build_env().unwrap();
//!
//! let (_obs, info) = env.reset(None).unwrap();
//! assert_eq!(info["time_step"], 0);
//!
//! let action = env.action_mask().legal_actions()[0];
//! let outcome = env.step(action).unwrap();
//! assert_eq!(env.time_step(), 1);
//! assert!(!outcome.truncated);
//! ```

pub mod action;
pub mod basis;
pub mod config;
pub mod curriculum;
pub mod encoder;
pub mod env;
pub mod error;
pub mod gate_class;
pub mod generator;
pub mod layered;
pub mod mask;
pub mod rule;
pub mod rules;
pub mod state;
pub mod task;
pub mod telemetry;

pub use action::{Action, ActionCodec};
pub use basis::BasisTranslator;
pub use config::{ConfigError, EnvConfig, GateSetConfig, LogFormat, LoggingConfig, RewardConfig};
pub use curriculum::Curriculum;
pub use encoder::{LayeredEncoder, Observation};
pub use env::{EnvPhase, Info, StepOutcome, TransformationEnv};
pub use error::{DimensionKind, EnvError, EnvResult};
pub use gate_class::{ClassifyError, GateClass, GateSet, QubitRole};
pub use generator::{CircuitGenerator, DatasetCircuitGenerator, RandomCircuitGenerator};
pub use layered::LayeredCircuit;
pub use mask::ActionMask;
pub use rule::{RuleKind, TransformationRule};
pub use rules::{CommuteGates, InvertCnot, MergeRotations};
pub use state::{EnvSpec, EnvState};
pub use task::{CircuitOptimizationTask, Task};
pub use telemetry::init_tracing;
