//! Transformation rule interface.

use qforge_ir::{Circuit, QubitId};
use serde::{Deserialize, Serialize};

use crate::error::EnvResult;
use crate::rules::{CommuteGates, InvertCnot, MergeRotations};
use crate::state::EnvState;

/// A local circuit rewrite addressed by `(layer, qubit)`.
///
/// `is_valid` must return `true` only where `apply` succeeds and yields a
/// circuit that still fits the observation grid and the native gate set.
pub trait TransformationRule: Send + Sync + std::fmt::Debug {
    /// Rule name, used in action descriptions and logs.
    fn name(&self) -> &str;

    /// Check whether the rule applies at `(layer, qubit)`.
    fn is_valid(&self, state: &EnvState, layer: usize, qubit: QubitId) -> bool;

    /// Produce the rewritten circuit. The input state is left untouched.
    fn apply(&self, state: &EnvState, layer: usize, qubit: QubitId) -> EnvResult<Circuit>;
}

/// Built-in rules, as named in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// [`CommuteGates`]
    CommuteGates,
    /// [`InvertCnot`]
    InvertCnot,
    /// [`MergeRotations`]
    MergeRotations,
}

impl RuleKind {
    /// All built-in rules in index order.
    pub const ALL: [RuleKind; 3] = [
        RuleKind::CommuteGates,
        RuleKind::InvertCnot,
        RuleKind::MergeRotations,
    ];

    /// Instantiate the rule.
    pub fn build(self) -> Box<dyn TransformationRule> {
        match self {
            RuleKind::CommuteGates => Box::new(CommuteGates),
            RuleKind::InvertCnot => Box::new(InvertCnot),
            RuleKind::MergeRotations => Box::new(MergeRotations),
        }
    }
}
