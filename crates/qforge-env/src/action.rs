//! Flat action codec.
//!
//! Actions are flat indices over the grid `max_depth × num_qubits ×
//! num_rules`, unraveled row-major: layer first, then qubit, then rule.

use qforge_ir::QubitId;

/// A decoded action: apply rule `rule` at `(layer, qubit)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Action {
    /// Layer index.
    pub layer: usize,
    /// Qubit index.
    pub qubit: usize,
    /// Rule index.
    pub rule: usize,
}

impl Action {
    /// The qubit as a wire id.
    pub fn qubit_id(&self) -> QubitId {
        QubitId::from(self.qubit)
    }
}

/// Bijection between flat action indices and [`Action`] triples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionCodec {
    max_depth: usize,
    num_qubits: usize,
    num_rules: usize,
}

impl ActionCodec {
    /// Create a codec for the given grid.
    pub fn new(max_depth: usize, num_qubits: usize, num_rules: usize) -> Self {
        Self {
            max_depth,
            num_qubits,
            num_rules,
        }
    }

    /// Number of actions.
    pub fn size(&self) -> usize {
        self.max_depth * self.num_qubits * self.num_rules
    }

    /// Flatten a triple.
    ///
    /// # Panics
    ///
    /// Panics if any coordinate is out of range.
    pub fn encode(&self, layer: usize, qubit: usize, rule: usize) -> usize {
        assert!(
            layer < self.max_depth && qubit < self.num_qubits && rule < self.num_rules,
            "action ({layer}, {qubit}, {rule}) outside grid ({}, {}, {})",
            self.max_depth,
            self.num_qubits,
            self.num_rules
        );
        (layer * self.num_qubits + qubit) * self.num_rules + rule
    }

    /// Unravel a flat index.
    ///
    /// # Panics
    ///
    /// Panics if `action >= self.size()`.
    pub fn decode(&self, action: usize) -> Action {
        assert!(
            action < self.size(),
            "action {action} outside action space of size {}",
            self.size()
        );
        let rule = action % self.num_rules;
        let rest = action / self.num_rules;
        Action {
            layer: rest / self.num_qubits,
            qubit: rest % self.num_qubits,
            rule,
        }
    }

    /// Check whether a flat index is inside the grid.
    pub fn contains(&self, action: usize) -> bool {
        action < self.size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_major_order() {
        let codec = ActionCodec::new(2, 3, 4);
        assert_eq!(codec.size(), 24);
        assert_eq!(codec.encode(0, 0, 1), 1);
        assert_eq!(codec.encode(0, 1, 0), 4);
        assert_eq!(codec.encode(1, 0, 0), 12);
        assert_eq!(
            codec.decode(23),
            Action {
                layer: 1,
                qubit: 2,
                rule: 3
            }
        );
    }

    #[test]
    #[should_panic(expected = "outside action space")]
    fn test_decode_out_of_range_panics() {
        ActionCodec::new(2, 2, 1).decode(4);
    }

    #[test]
    #[should_panic(expected = "outside grid")]
    fn test_encode_out_of_range_panics() {
        ActionCodec::new(2, 2, 1).encode(0, 2, 0);
    }
}
