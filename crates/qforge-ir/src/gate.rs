//! Quantum gate types.

use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::parameter::ParameterExpression;

/// Standard gates with known semantics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    // Single-qubit Pauli gates
    /// Pauli-X gate.
    X,
    /// Pauli-Y gate.
    Y,
    /// Pauli-Z gate.
    Z,

    // Single-qubit Clifford gates
    /// Hadamard gate.
    H,
    /// S gate (sqrt(Z)).
    S,
    /// S-dagger gate.
    Sdg,
    /// T gate (fourth root of Z).
    T,
    /// T-dagger gate.
    Tdg,
    /// sqrt(X) gate.
    SX,
    /// sqrt(X)-dagger gate.
    SXdg,

    // Single-qubit rotation gates
    /// Rotation around X axis.
    Rx(ParameterExpression),
    /// Rotation around Y axis.
    Ry(ParameterExpression),
    /// Rotation around Z axis.
    Rz(ParameterExpression),
    /// Phase gate.
    P(ParameterExpression),

    // Two-qubit gates
    /// Controlled-X (CNOT) gate.
    CX,
    /// Controlled-Z gate.
    CZ,
    /// SWAP gate.
    Swap,
}

impl StandardGate {
    /// Build a gate template from its lowercase name.
    ///
    /// Parameterized gates get a free `theta` symbol that is bound later
    /// with [`StandardGate::bind_free_parameters`].
    pub fn from_name(name: &str) -> IrResult<Self> {
        let theta = || ParameterExpression::symbol("theta");
        Ok(match name {
            "x" => StandardGate::X,
            "y" => StandardGate::Y,
            "z" => StandardGate::Z,
            "h" => StandardGate::H,
            "s" => StandardGate::S,
            "sdg" => StandardGate::Sdg,
            "t" => StandardGate::T,
            "tdg" => StandardGate::Tdg,
            "sx" => StandardGate::SX,
            "sxdg" => StandardGate::SXdg,
            "rx" => StandardGate::Rx(theta()),
            "ry" => StandardGate::Ry(theta()),
            "rz" => StandardGate::Rz(theta()),
            "p" => StandardGate::P(theta()),
            "cx" => StandardGate::CX,
            "cz" => StandardGate::CZ,
            "swap" => StandardGate::Swap,
            other => return Err(IrError::UnknownGate(other.to_string())),
        })
    }

    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::X => "x",
            StandardGate::Y => "y",
            StandardGate::Z => "z",
            StandardGate::H => "h",
            StandardGate::S => "s",
            StandardGate::Sdg => "sdg",
            StandardGate::T => "t",
            StandardGate::Tdg => "tdg",
            StandardGate::SX => "sx",
            StandardGate::SXdg => "sxdg",
            StandardGate::Rx(_) => "rx",
            StandardGate::Ry(_) => "ry",
            StandardGate::Rz(_) => "rz",
            StandardGate::P(_) => "p",
            StandardGate::CX => "cx",
            StandardGate::CZ => "cz",
            StandardGate::Swap => "swap",
        }
    }

    /// Get the number of qubits this gate operates on.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            StandardGate::CX | StandardGate::CZ | StandardGate::Swap => 2,
            _ => 1,
        }
    }

    /// Get parameters of this gate.
    pub fn parameters(&self) -> Vec<&ParameterExpression> {
        match self {
            StandardGate::Rx(p)
            | StandardGate::Ry(p)
            | StandardGate::Rz(p)
            | StandardGate::P(p) => vec![p],
            _ => vec![],
        }
    }

    /// Get the concrete angle of a single-parameter gate, if it is bound.
    pub fn angle(&self) -> Option<f64> {
        match self.parameters().as_slice() {
            [p] => p.as_f64(),
            _ => None,
        }
    }

    /// Check if this gate has unbound parameters.
    pub fn is_parameterized(&self) -> bool {
        self.parameters().iter().any(|p| p.is_symbolic())
    }

    /// Number of parameters still carrying a free symbol.
    pub fn free_parameter_count(&self) -> usize {
        self.parameters().iter().filter(|p| p.is_symbolic()).count()
    }

    /// Bind free parameters, in order, to the given values.
    pub fn bind_free_parameters(&self, values: &[f64]) -> IrResult<Self> {
        let expected = self.free_parameter_count();
        if values.len() != expected {
            return Err(IrError::ParameterCountMismatch {
                gate_name: self.name().to_string(),
                expected,
                got: values.len(),
            });
        }
        let bind = |p: &ParameterExpression| match values.first() {
            Some(&v) if p.is_symbolic() => p.bind_all(v).simplify(),
            _ => p.clone(),
        };
        Ok(match self {
            StandardGate::Rx(p) => StandardGate::Rx(bind(p)),
            StandardGate::Ry(p) => StandardGate::Ry(bind(p)),
            StandardGate::Rz(p) => StandardGate::Rz(bind(p)),
            StandardGate::P(p) => StandardGate::P(bind(p)),
            other => other.clone(),
        })
    }

    /// Check whether two gates are the same kind, ignoring parameter values.
    pub fn same_kind(&self, other: &StandardGate) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}
