//! Environment configuration.
//!
//! Sources, lowest precedence first:
//! 1. Default values
//! 2. Configuration file (YAML, or JSON for `.json` files)
//! 3. Environment variables with the `QFORGE_` prefix

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::curriculum::{Curriculum, DEFAULT_MAX_GENERATION_ATTEMPTS};
use crate::env::{DEFAULT_MAX_TIME_STEPS, TransformationEnv};
use crate::error::{EnvError, EnvResult};
use crate::gate_class::GateSet;
use crate::rule::RuleKind;
use crate::state::EnvSpec;
use crate::task::CircuitOptimizationTask;

/// Complete environment configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvConfig {
    /// Number of layers in the observation grid.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Number of qubits in the observation grid.
    #[serde(default = "default_num_qubits")]
    pub num_qubits: usize,

    /// Steps per episode.
    #[serde(default = "default_max_time_steps")]
    pub max_time_steps: usize,

    /// Sample start circuits from the curriculum.
    #[serde(default = "default_true")]
    pub training: bool,

    /// RNG seed; entropy-seeded when absent.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Cap on generator calls per reset.
    #[serde(default = "default_max_generation_attempts")]
    pub max_generation_attempts: usize,

    /// Native gate set.
    #[serde(default)]
    pub gate_set: GateSetConfig,

    /// Transformation rules, in action-index order.
    #[serde(default = "default_rules")]
    pub rules: Vec<RuleKind>,

    /// Reward weights.
    #[serde(default)]
    pub reward: RewardConfig,

    /// Log output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Native gate set description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateSetConfig {
    /// Single-qubit gate names, e.g. `rz`.
    #[serde(default = "default_single_qubit_gates")]
    pub single_qubit_gates: Vec<String>,

    /// Two-qubit gate name.
    #[serde(default = "default_two_qubit_gate")]
    pub two_qubit_gate: String,

    /// Directed coupling edges; a bidirectional chain when absent.
    #[serde(default)]
    pub coupling_map: Option<Vec<(u32, u32)>>,
}

/// Weights of [`CircuitOptimizationTask`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardConfig {
    /// Weight on depth reduction.
    #[serde(default = "default_depth_weight")]
    pub depth_weight: f64,

    /// Weight on operation-count reduction.
    #[serde(default = "default_gate_weight")]
    pub gate_weight: f64,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output.
    #[default]
    Console,
    /// One JSON object per event.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

fn default_max_depth() -> usize {
    8
}

fn default_num_qubits() -> usize {
    3
}

fn default_max_time_steps() -> usize {
    DEFAULT_MAX_TIME_STEPS
}

fn default_true() -> bool {
    true
}

fn default_max_generation_attempts() -> usize {
    DEFAULT_MAX_GENERATION_ATTEMPTS
}

fn default_rules() -> Vec<RuleKind> {
    RuleKind::ALL.to_vec()
}

fn default_single_qubit_gates() -> Vec<String> {
    vec!["rz".to_string(), "sx".to_string(), "x".to_string()]
}

fn default_two_qubit_gate() -> String {
    "cx".to_string()
}

fn default_depth_weight() -> f64 {
    1.0
}

fn default_gate_weight() -> f64 {
    0.1
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            num_qubits: default_num_qubits(),
            max_time_steps: default_max_time_steps(),
            training: true,
            seed: None,
            max_generation_attempts: default_max_generation_attempts(),
            gate_set: GateSetConfig::default(),
            rules: default_rules(),
            reward: RewardConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for GateSetConfig {
    fn default() -> Self {
        Self {
            single_qubit_gates: default_single_qubit_gates(),
            two_qubit_gate: default_two_qubit_gate(),
            coupling_map: None,
        }
    }
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            depth_weight: default_depth_weight(),
            gate_weight: default_gate_weight(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Console,
        }
    }
}

impl EnvConfig {
    /// Load from a file. `.json` files are parsed as JSON, anything else
    /// as YAML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let config = if is_json {
            Self::from_json_str(&contents)?
        } else {
            Self::from_yaml_str(&contents)?
        };

        config.validate()?;
        Ok(config)
    }

    /// Parse YAML.
    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        serde_yaml_ng::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Parse JSON.
    pub fn from_json_str(contents: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load the file if given (defaults otherwise), apply environment
    /// overrides, then validate.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = config.merge_env();
        config.validate()?;
        Ok(config)
    }

    /// Apply `QFORGE_*` variables from the process environment.
    #[must_use]
    pub fn merge_env(self) -> Self {
        self.merge_env_from(|key| std::env::var(key).ok())
    }

    /// Apply `QFORGE_*` overrides read through `lookup`.
    ///
    /// Variables that are absent leave the corresponding fields unchanged;
    /// values that do not parse are ignored with a warning.
    #[must_use]
    pub fn merge_env_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parsed<T: std::str::FromStr>(key: &str, value: Option<String>) -> Option<T> {
            let value = value?;
            let parsed = value.parse().ok();
            if parsed.is_none() {
                warn!(key, value = %value, "Ignoring unparsable override");
            }
            parsed
        }

        if let Some(v) = parsed(ENV_MAX_DEPTH, lookup(ENV_MAX_DEPTH)) {
            self.max_depth = v;
        }
        if let Some(v) = parsed(ENV_NUM_QUBITS, lookup(ENV_NUM_QUBITS)) {
            self.num_qubits = v;
        }
        if let Some(v) = parsed(ENV_MAX_TIME_STEPS, lookup(ENV_MAX_TIME_STEPS)) {
            self.max_time_steps = v;
        }
        if let Some(v) = parsed(ENV_TRAINING, lookup(ENV_TRAINING)) {
            self.training = v;
        }
        if let Some(v) = parsed(ENV_SEED, lookup(ENV_SEED)) {
            self.seed = Some(v);
        }
        if let Some(v) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = v;
        }
        match lookup(ENV_LOG_FORMAT).as_deref() {
            Some("json") => self.logging.format = LogFormat::Json,
            Some("console") => self.logging.format = LogFormat::Console,
            Some(other) => warn!(value = other, "Ignoring unknown log format"),
            None => {}
        }

        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::Validation(
                "max_depth must be greater than 0".to_string(),
            ));
        }
        if self.num_qubits == 0 || u32::try_from(self.num_qubits).is_err() {
            return Err(ConfigError::Validation(format!(
                "Invalid num_qubits: {}",
                self.num_qubits
            )));
        }
        if self.max_time_steps == 0 {
            return Err(ConfigError::Validation(
                "max_time_steps must be greater than 0".to_string(),
            ));
        }
        if self.max_generation_attempts == 0 {
            return Err(ConfigError::Validation(
                "max_generation_attempts must be greater than 0".to_string(),
            ));
        }
        if self.rules.is_empty() {
            return Err(ConfigError::Validation(
                "at least one rule must be enabled".to_string(),
            ));
        }

        if let Some(edges) = &self.gate_set.coupling_map {
            for &(a, b) in edges {
                let in_range = |q: u32| (q as usize) < self.num_qubits;
                if a == b || !in_range(a) || !in_range(b) {
                    return Err(ConfigError::Validation(format!(
                        "Invalid coupling edge ({a}, {b}) for {} qubits",
                        self.num_qubits
                    )));
                }
            }
        }

        if !self.reward.depth_weight.is_finite() || !self.reward.gate_weight.is_finite() {
            return Err(ConfigError::Validation(
                "reward weights must be finite".to_string(),
            ));
        }

        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(ConfigError::Validation(format!(
                    "Invalid log level: {other}"
                )));
            }
        }

        Ok(())
    }

    /// Build the native gate set.
    pub fn build_gate_set(&self) -> EnvResult<GateSet> {
        let width = u32::try_from(self.num_qubits)
            .map_err(|_| EnvError::InvalidConfig("num_qubits exceeds u32".into()))?;
        let names: Vec<&str> = self
            .gate_set
            .single_qubit_gates
            .iter()
            .map(String::as_str)
            .collect();
        let edges = self
            .gate_set
            .coupling_map
            .clone()
            .unwrap_or_else(|| GateSet::linear_coupling(width));
        GateSet::from_coupling_map(&names, &self.gate_set.two_qubit_gate, &edges)
    }

    /// Validate and build the shared [`EnvSpec`].
    pub fn build_spec(&self) -> EnvResult<Arc<EnvSpec>> {
        self.validate()?;
        let rules = self.rules.iter().map(|kind| kind.build()).collect();
        Ok(EnvSpec::new(self.max_depth, self.num_qubits, self.build_gate_set()?, rules)?.shared())
    }

    /// Build a circuit-optimization environment.
    pub fn build_env(&self) -> EnvResult<TransformationEnv<CircuitOptimizationTask>> {
        let task = CircuitOptimizationTask::new(self.reward.depth_weight, self.reward.gate_weight);
        let curriculum = Curriculum::default().with_max_attempts(self.max_generation_attempts);
        let env = TransformationEnv::new(self.build_spec()?, task)
            .with_curriculum(curriculum)
            .with_training(self.training)
            .with_max_time_steps(self.max_time_steps)?;
        Ok(match self.seed {
            Some(seed) => env.with_seed(seed),
            None => env,
        })
    }
}

const ENV_MAX_DEPTH: &str = "QFORGE_MAX_DEPTH";
const ENV_NUM_QUBITS: &str = "QFORGE_NUM_QUBITS";
const ENV_MAX_TIME_STEPS: &str = "QFORGE_MAX_TIME_STEPS";
const ENV_TRAINING: &str = "QFORGE_TRAINING";
const ENV_SEED: &str = "QFORGE_SEED";
const ENV_LOG_LEVEL: &str = "QFORGE_LOG_LEVEL";
const ENV_LOG_FORMAT: &str = "QFORGE_LOG_FORMAT";

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The file could not be read.
    #[error("IO error: {0}")]
    Io(String),

    /// The file is not valid YAML or JSON for this schema.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A value is out of range.
    #[error("Validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashMap;

    #[test]
    fn test_default_config() {
        let config = EnvConfig::default();
        assert_eq!(config.max_depth, 8);
        assert_eq!(config.num_qubits, 3);
        assert_eq!(config.max_time_steps, 32);
        assert_eq!(config.rules.len(), 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml() {
        let config = EnvConfig::from_yaml_str(
            "max_depth: 4\n\
             gate_set:\n  coupling_map: [[0, 1]]\n\
             rules: [merge_rotations]\n\
             logging:\n  format: json\n",
        )
        .unwrap();
        assert_eq!(config.max_depth, 4);
        assert_eq!(config.num_qubits, 3);
        assert_eq!(config.gate_set.two_qubit_gate, "cx");
        assert_eq!(config.gate_set.coupling_map, Some(vec![(0, 1)]));
        assert_eq!(config.rules, vec![RuleKind::MergeRotations]);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.build_gate_set().unwrap().len(), 4);
    }

    #[test]
    fn test_json() {
        let config = EnvConfig::from_json_str(r#"{"num_qubits": 2, "seed": 5}"#).unwrap();
        assert_eq!(config.num_qubits, 2);
        assert_eq!(config.seed, Some(5));
        assert!(EnvConfig::from_json_str("{").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let vars: FxHashMap<&str, &str> = [
            ("QFORGE_MAX_DEPTH", "12"),
            ("QFORGE_TRAINING", "false"),
            ("QFORGE_SEED", "99"),
            ("QFORGE_NUM_QUBITS", "many"),
        ]
        .into_iter()
        .collect();
        let config =
            EnvConfig::default().merge_env_from(|key| vars.get(key).map(ToString::to_string));

        assert_eq!(config.max_depth, 12);
        assert!(!config.training);
        assert_eq!(config.seed, Some(99));
        assert_eq!(config.num_qubits, 3);
    }

    #[test]
    fn test_validation() {
        let mut config = EnvConfig::default();
        config.max_time_steps = 0;
        assert!(config.validate().is_err());

        let mut config = EnvConfig::default();
        config.rules.clear();
        assert!(config.validate().is_err());

        let mut config = EnvConfig::default();
        config.gate_set.coupling_map = Some(vec![(0, 3)]);
        assert!(config.validate().is_err());

        let mut config = EnvConfig::default();
        config.logging.level = "loud".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_build_env() {
        let config = EnvConfig {
            seed: Some(3),
            ..EnvConfig::default()
        };
        let mut env = config.build_env().unwrap();
        env.reset(None).unwrap();
        assert!(env.action_mask().any());
        assert_eq!(env.action_mask().len(), 8 * 3 * 3);
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join("qforge-env-config-test.yaml");
        std::fs::write(&path, "max_depth: 6\nnum_qubits: 2\n").unwrap();
        let config = EnvConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.max_depth, 6);
        assert_eq!(config.num_qubits, 2);

        assert!(matches!(
            EnvConfig::from_file("/nonexistent/qforge.yaml"),
            Err(ConfigError::Io(_))
        ));
    }
}
