//! Built-in transformation rules.
//!
//! Rules never edit a circuit in place. They compute a new instruction
//! order (or replacement) and replay it into a fresh circuit, which is then
//! checked against the observation grid.

mod commute;
mod invert_cnot;
mod merge;

pub use commute::CommuteGates;
pub use invert_cnot::InvertCnot;
pub use merge::MergeRotations;

use qforge_ir::{Circuit, Instruction};

use crate::state::EnvState;

/// Tolerance for treating an angle as zero.
pub(crate) const EPSILON: f64 = 1e-10;

/// Replay `instructions` into a circuit shaped like the current one, and
/// keep it only if it still fits the grid and the native gate set.
pub(crate) fn rebuild(
    state: &EnvState,
    instructions: impl IntoIterator<Item = Instruction>,
) -> Option<Circuit> {
    let current = state.current();
    let width = u32::try_from(current.num_qubits()).ok()?;
    let circuit = Circuit::from_instructions(current.name(), width, instructions).ok()?;
    state.spec().is_encodable(&circuit).then_some(circuit)
}
