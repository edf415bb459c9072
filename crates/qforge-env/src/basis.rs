//! Native-basis recompilation.
//!
//! Rewrites circuits into the `{rz, sx, cx}` basis. Each decomposition is
//! listed in application order and is exact up to global phase.

use std::f64::consts::{FRAC_PI_2, PI};

use qforge_ir::{Circuit, Instruction, ParameterExpression, QubitId, StandardGate, normalize_angle};
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::error::{EnvError, EnvResult};

fn rz(angle: impl Into<ParameterExpression>, q: QubitId) -> Instruction {
    Instruction::single_qubit_gate(StandardGate::Rz(angle.into()), q)
}

fn sx(q: QubitId) -> Instruction {
    Instruction::single_qubit_gate(StandardGate::SX, q)
}

fn cx(control: QubitId, target: QubitId) -> Instruction {
    Instruction::two_qubit_gate(StandardGate::CX, control, target)
}

/// Hadamard as `rz(π/2) · sx · rz(π/2)`.
pub(crate) fn hadamard(q: QubitId) -> [Instruction; 3] {
    [rz(FRAC_PI_2, q), sx(q), rz(FRAC_PI_2, q)]
}

/// `p + shift`, folded to a normalized constant when `p` is bound.
fn shifted(p: &ParameterExpression, shift: f64) -> ParameterExpression {
    match p.as_f64() {
        Some(v) => ParameterExpression::constant(normalize_angle(v + shift)),
        None => p.clone() + ParameterExpression::constant(shift),
    }
}

/// Translates circuits into a fixed set of native gate names.
#[derive(Debug, Clone)]
pub struct BasisTranslator {
    basis: FxHashSet<String>,
}

impl BasisTranslator {
    /// Create a translator targeting the given gate names.
    pub fn new<I, S>(basis: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            basis: basis.into_iter().map(Into::into).collect(),
        }
    }

    /// Check whether a gate name is native.
    pub fn is_native(&self, name: &str) -> bool {
        self.basis.contains(name)
    }

    /// Rebuild `circuit` with every gate expressed in the basis.
    pub fn translate(&self, circuit: &Circuit) -> EnvResult<Circuit> {
        let width = u32::try_from(circuit.num_qubits())
            .map_err(|_| EnvError::InvalidConfig("circuit too wide".into()))?;
        let mut out = Circuit::with_size(circuit.name(), width);
        let mut rewritten = 0usize;

        for inst in circuit.instructions() {
            if self.is_native(inst.name()) {
                out.append(inst)?;
                continue;
            }
            for gate in Self::decompose(&inst) {
                if !self.is_native(gate.name()) {
                    return Err(EnvError::GateNotInBasis(inst.name().to_string()));
                }
                out.append(gate)?;
            }
            rewritten += 1;
        }

        debug!(circuit = circuit.name(), rewritten, "Translated to native basis");
        Ok(out)
    }

    /// Decompose one instruction into `{rz, sx, cx}`.
    fn decompose(inst: &Instruction) -> Vec<Instruction> {
        let q = inst.anchor();
        match &inst.gate {
            StandardGate::H => hadamard(q).to_vec(),
            StandardGate::X => vec![sx(q), sx(q)],
            StandardGate::Y => vec![sx(q), sx(q), rz(PI, q)],
            StandardGate::Z => vec![rz(PI, q)],
            StandardGate::S => vec![rz(FRAC_PI_2, q)],
            StandardGate::Sdg => vec![rz(-FRAC_PI_2, q)],
            StandardGate::T => vec![rz(PI / 4.0, q)],
            StandardGate::Tdg => vec![rz(-PI / 4.0, q)],
            StandardGate::P(lambda) => vec![rz(lambda.clone(), q)],
            StandardGate::SX => vec![sx(q)],
            StandardGate::SXdg => vec![rz(PI, q), sx(q), rz(PI, q)],
            StandardGate::Rz(theta) => vec![rz(theta.clone(), q)],
            StandardGate::Rx(theta) => vec![
                rz(FRAC_PI_2, q),
                sx(q),
                rz(shifted(theta, PI), q),
                sx(q),
                rz(FRAC_PI_2, q),
            ],
            StandardGate::Ry(theta) => vec![sx(q), rz(shifted(theta, PI), q), sx(q), rz(PI, q)],
            StandardGate::CX => vec![inst.clone()],
            StandardGate::CZ => {
                let (c, t) = (inst.qubits[0], inst.qubits[1]);
                let mut seq = hadamard(t).to_vec();
                seq.push(cx(c, t));
                seq.extend(hadamard(t));
                seq
            }
            StandardGate::Swap => {
                let (a, b) = (inst.qubits[0], inst.qubits[1]);
                vec![cx(a, b), cx(b, a), cx(a, b)]
            }
        }
    }
}
