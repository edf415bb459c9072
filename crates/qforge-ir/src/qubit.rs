//! Qubit identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a qubit wire within a fixed-width circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QubitId(pub u32);

impl QubitId {
    /// The wire index as a `usize`, for addressing tensors and slot tables.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

impl From<u32> for QubitId {
    fn from(id: u32) -> Self {
        QubitId(id)
    }
}

impl From<usize> for QubitId {
    fn from(id: usize) -> Self {
        QubitId(u32::try_from(id).expect("QubitId overflow: exceeds u32::MAX"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qubit_display() {
        assert_eq!(format!("{}", QubitId(0)), "q0");
        assert_eq!(format!("{}", QubitId(12)), "q12");
    }

    #[test]
    fn test_qubit_index_conversions() {
        let q: QubitId = 3usize.into();
        assert_eq!(q, QubitId(3));
        assert_eq!(q.index(), 3);
        assert!(QubitId(1) < QubitId(2));
    }
}
