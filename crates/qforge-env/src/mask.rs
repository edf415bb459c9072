//! Legal-action mask.

use tracing::debug;

use crate::state::EnvState;

/// One {0, 1} entry per flat action index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionMask(Vec<i8>);

impl ActionMask {
    /// Evaluate every rule at every `(layer, qubit)` cell.
    pub fn compute(state: &EnvState) -> Self {
        let spec = state.spec();
        let codec = spec.codec();
        let mut mask = vec![0i8; codec.size()];

        for (action, entry) in mask.iter_mut().enumerate() {
            let a = codec.decode(action);
            let valid = spec
                .rule(a.rule)
                .is_some_and(|rule| rule.is_valid(state, a.layer, a.qubit_id()));
            *entry = i8::from(valid);
        }

        let mask = Self(mask);
        debug!(legal = mask.count(), size = mask.len(), "Computed action mask");
        mask
    }

    /// Wrap raw entries.
    pub fn from_entries(entries: Vec<i8>) -> Self {
        Self(entries)
    }

    /// Check whether any action is legal.
    pub fn any(&self) -> bool {
        self.0.iter().any(|&v| v != 0)
    }

    /// Number of legal actions.
    pub fn count(&self) -> usize {
        self.0.iter().filter(|&&v| v != 0).count()
    }

    /// Check a single action; out-of-range indices are illegal.
    pub fn is_legal(&self, action: usize) -> bool {
        self.0.get(action).is_some_and(|&v| v != 0)
    }

    /// Indices of legal actions, ascending.
    pub fn legal_actions(&self) -> Vec<usize> {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(i, &v)| (v != 0).then_some(i))
            .collect()
    }

    /// Length of the mask; equal to the action-space size.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the mask is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Raw entries.
    pub fn as_slice(&self) -> &[i8] {
        &self.0
    }
}
