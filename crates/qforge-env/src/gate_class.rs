//! Native gate classes.
//!
//! A gate class is a gate type together with the qubits it may act on.
//! Single-qubit classes act on any wire; two-qubit classes are tied to one
//! ordered pair, usually an edge of the device coupling map. The position
//! of a class in its [`GateSet`] is the channel index used by the
//! observation tensor.

use qforge_ir::{QubitId, StandardGate};
use thiserror::Error;

use crate::error::{EnvError, EnvResult};

/// Where a gate class may be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QubitRole {
    /// A single-qubit gate on any wire.
    Any,
    /// A two-qubit gate on exactly this ordered pair.
    Pair(QubitId, QubitId),
}

/// A gate template bound to a qubit role.
#[derive(Debug, Clone, PartialEq)]
pub struct GateClass {
    /// Gate template; parameterized gates carry free symbols.
    pub gate: StandardGate,
    /// Qubit role.
    pub role: QubitRole,
}

impl GateClass {
    /// A single-qubit class.
    pub fn single(gate: StandardGate) -> Self {
        Self {
            gate,
            role: QubitRole::Any,
        }
    }

    /// A two-qubit class on the ordered pair `(a, b)`.
    pub fn pair(gate: StandardGate, a: QubitId, b: QubitId) -> Self {
        Self {
            gate,
            role: QubitRole::Pair(a, b),
        }
    }

    /// Gate name of the class.
    pub fn name(&self) -> &'static str {
        self.gate.name()
    }

    /// Operands for placing this class at qubit `q`, or `None` when the
    /// class cannot start there.
    pub fn qubits(&self, q: QubitId) -> Option<Vec<QubitId>> {
        match self.role {
            QubitRole::Any => Some(vec![q]),
            QubitRole::Pair(a, b) if a == q => Some(vec![a, b]),
            QubitRole::Pair(..) => None,
        }
    }

    /// Check whether a concrete gate application belongs to this class.
    pub fn matches(&self, gate: &StandardGate, qubits: &[QubitId]) -> bool {
        if gate.name() != self.gate.name() {
            return false;
        }
        match self.role {
            QubitRole::Any => qubits.len() == 1,
            QubitRole::Pair(a, b) => qubits == [a, b],
        }
    }

    /// Check whether the class can be placed somewhere in a circuit of
    /// `num_qubits` wires.
    pub fn fits(&self, num_qubits: usize) -> bool {
        match self.role {
            QubitRole::Any => self.gate.num_qubits() == 1 && num_qubits > 0,
            QubitRole::Pair(a, b) => {
                self.gate.num_qubits() == 2
                    && a != b
                    && a.index() < num_qubits
                    && b.index() < num_qubits
            }
        }
    }
}

impl std::fmt::Display for GateClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.role {
            QubitRole::Any => write!(f, "{}", self.name()),
            QubitRole::Pair(a, b) => write!(f, "{}({a}, {b})", self.name()),
        }
    }
}

/// Failed gate-class lookup.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ClassifyError {
    /// No class matches the gate and operands.
    #[error("No gate class matches '{gate}' on {qubits:?}")]
    NoMatch {
        /// Gate name.
        gate: String,
        /// Operands of the gate application.
        qubits: Vec<QubitId>,
    },
}

/// Ordered collection of gate classes.
#[derive(Debug, Clone, Default)]
pub struct GateSet {
    classes: Vec<GateClass>,
}

impl GateSet {
    /// Create a gate set from an explicit class list.
    pub fn new(classes: Vec<GateClass>) -> Self {
        Self { classes }
    }

    /// Build the usual native set: one `Any` class per single-qubit gate
    /// name, then one two-qubit class per coupling-map edge.
    pub fn from_coupling_map(
        single_qubit_gates: &[&str],
        two_qubit_gate: &str,
        edges: &[(u32, u32)],
    ) -> EnvResult<Self> {
        let mut classes = Vec::with_capacity(single_qubit_gates.len() + edges.len());
        for name in single_qubit_gates {
            let gate = StandardGate::from_name(name)?;
            if gate.num_qubits() != 1 {
                return Err(EnvError::InvalidConfig(format!(
                    "'{name}' is not a single-qubit gate"
                )));
            }
            classes.push(GateClass::single(gate));
        }

        let gate = StandardGate::from_name(two_qubit_gate)?;
        if gate.num_qubits() != 2 {
            return Err(EnvError::InvalidConfig(format!(
                "'{two_qubit_gate}' is not a two-qubit gate"
            )));
        }
        for &(a, b) in edges {
            classes.push(GateClass::pair(gate.clone(), QubitId(a), QubitId(b)));
        }

        Ok(Self::new(classes))
    }

    /// Edges of a bidirectional linear chain over `num_qubits` wires.
    pub fn linear_coupling(num_qubits: u32) -> Vec<(u32, u32)> {
        (1..num_qubits)
            .flat_map(|i| [(i - 1, i), (i, i - 1)])
            .collect()
    }

    /// Look up the class index of a gate application.
    pub fn classify(
        &self,
        gate: &StandardGate,
        qubits: &[QubitId],
    ) -> Result<usize, ClassifyError> {
        self.classes
            .iter()
            .position(|class| class.matches(gate, qubits))
            .ok_or_else(|| ClassifyError::NoMatch {
                gate: gate.name().to_string(),
                qubits: qubits.to_vec(),
            })
    }

    /// Check that every class can be placed within `num_qubits` wires.
    pub fn validate_width(&self, num_qubits: usize) -> EnvResult<()> {
        if self.classes.is_empty() {
            return Err(EnvError::InvalidConfig("gate set is empty".into()));
        }
        match self.classes.iter().find(|class| !class.fits(num_qubits)) {
            Some(class) => Err(EnvError::InvalidConfig(format!(
                "gate class {class} cannot be placed on {num_qubits} qubits"
            ))),
            None => Ok(()),
        }
    }

    /// Distinct gate names, in class order.
    pub fn basis_gates(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = Vec::new();
        for class in &self.classes {
            if !names.contains(&class.name()) {
                names.push(class.name());
            }
        }
        names
    }

    /// Get a class by index.
    pub fn get(&self, index: usize) -> Option<&GateClass> {
        self.classes.get(index)
    }

    /// Iterate over classes in index order.
    pub fn iter(&self) -> impl Iterator<Item = &GateClass> {
        self.classes.iter()
    }

    /// Number of classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn native_set() -> GateSet {
        GateSet::from_coupling_map(&["rz", "sx"], "cx", &GateSet::linear_coupling(3)).unwrap()
    }

    #[test]
    fn test_from_coupling_map_layout() {
        let set = native_set();
        // rz, sx, then cx on (0,1), (1,0), (1,2), (2,1)
        assert_eq!(set.len(), 6);
        assert_eq!(set.basis_gates(), vec!["rz", "sx", "cx"]);
        assert_eq!(
            set.get(3).unwrap().role,
            QubitRole::Pair(QubitId(1), QubitId(0))
        );
    }

    #[test]
    fn test_classify_ignores_angles() {
        let set = native_set();
        let rz = StandardGate::Rz(1.25.into());
        assert_eq!(set.classify(&rz, &[QubitId(2)]).unwrap(), 0);
        assert_eq!(set.classify(&StandardGate::SX, &[QubitId(0)]).unwrap(), 1);
    }

    #[test]
    fn test_classify_pair_is_directional() {
        let set = native_set();
        assert_eq!(
            set.classify(&StandardGate::CX, &[QubitId(0), QubitId(1)])
                .unwrap(),
            2
        );
        assert_eq!(
            set.classify(&StandardGate::CX, &[QubitId(1), QubitId(0)])
                .unwrap(),
            3
        );
        assert!(
            set.classify(&StandardGate::CX, &[QubitId(0), QubitId(2)])
                .is_err()
        );
        assert!(set.classify(&StandardGate::H, &[QubitId(0)]).is_err());
    }

    #[test]
    fn test_class_placement() {
        let any = GateClass::single(StandardGate::SX);
        assert_eq!(any.qubits(QubitId(4)), Some(vec![QubitId(4)]));

        let pair = GateClass::pair(StandardGate::CX, QubitId(1), QubitId(2));
        assert_eq!(pair.qubits(QubitId(1)), Some(vec![QubitId(1), QubitId(2)]));
        assert_eq!(pair.qubits(QubitId(2)), None);
    }

    #[test]
    fn test_validate_width() {
        assert!(native_set().validate_width(3).is_ok());
        assert!(matches!(
            native_set().validate_width(2),
            Err(EnvError::InvalidConfig(_))
        ));
        assert!(GateSet::default().validate_width(2).is_err());
    }

    #[test]
    fn test_rejects_wrong_arity_names() {
        assert!(GateSet::from_coupling_map(&["cx"], "cx", &[]).is_err());
        assert!(GateSet::from_coupling_map(&["rz"], "sx", &[]).is_err());
        assert!(GateSet::from_coupling_map(&["foo"], "cx", &[]).is_err());
    }
}
