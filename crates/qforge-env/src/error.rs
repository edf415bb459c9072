//! Error types for the environment crate.

use thiserror::Error;

use crate::config::ConfigError;
use crate::gate_class::ClassifyError;

/// Which dimension of the observation grid a circuit overflowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionKind {
    /// Circuit depth against `max_depth`.
    Depth,
    /// Circuit width against `num_qubits`.
    Qubits,
}

impl std::fmt::Display for DimensionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DimensionKind::Depth => write!(f, "depth"),
            DimensionKind::Qubits => write!(f, "qubit count"),
        }
    }
}

/// Errors produced by the transformation environment.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EnvError {
    /// The environment was assembled from inconsistent parts.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A circuit does not fit the observation grid.
    #[error("Circuit {kind} {got} exceeds the limit of {limit}")]
    Dimension {
        /// Which dimension overflowed.
        kind: DimensionKind,
        /// The circuit's value.
        got: usize,
        /// The configured limit.
        limit: usize,
    },

    /// A gate in the circuit belongs to no native gate class.
    #[error("Circuit '{circuit}' contains a gate outside the native gate set")]
    IncompatibleGate {
        /// Name of the offending circuit.
        circuit: String,
        /// The failed lookup.
        #[source]
        source: ClassifyError,
    },

    /// The action is out of range or masked out.
    #[error("Invalid action {action}: {description}")]
    InvalidAction {
        /// The flat action index.
        action: usize,
        /// Human-readable description of the action or the reason.
        description: String,
    },

    /// The curriculum could not find a circuit with a legal action.
    #[error("No circuit with a legal action found after {attempts} attempts")]
    Generation {
        /// Number of circuits sampled.
        attempts: usize,
    },

    /// `step` was called before the first `reset`.
    #[error("Environment has not been reset")]
    NotReset,

    /// `step` was called after the episode ended.
    #[error("Episode has terminated; call reset to start a new one")]
    EpisodeTerminated,

    /// A rule was applied at a site where it does not hold.
    #[error("Rule '{rule}' is not applicable at layer {layer}, qubit {qubit}")]
    RuleNotApplicable {
        /// Rule name.
        rule: String,
        /// Layer index.
        layer: usize,
        /// Qubit index.
        qubit: usize,
    },

    /// A gate has no decomposition into the target basis.
    #[error("Gate '{0}' cannot be expressed in the target basis")]
    GateNotInBasis(String),

    /// Circuit construction failed.
    #[error("Circuit IR error: {0}")]
    Ir(#[from] qforge_ir::IrError),

    /// Loading or validating configuration failed.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for environment operations.
pub type EnvResult<T> = Result<T, EnvError>;
