//! Swap a gate with its commuting successor.

use petgraph::visit::{Dfs, Reversed};
use qforge_ir::{Circuit, CircuitDag, Instruction, NodeIndex, QubitId, StandardGate};
use rustc_hash::FxHashSet;
use tracing::debug;

use super::rebuild;
use crate::error::{EnvError, EnvResult};
use crate::rule::TransformationRule;
use crate::state::EnvState;

/// The Pauli axis a gate is diagonal in on one of its wires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WireAxis {
    Z,
    X,
}

fn wire_axis(inst: &Instruction, wire: QubitId) -> Option<WireAxis> {
    let position = inst.position_of(wire)?;
    match (&inst.gate, position) {
        (
            StandardGate::Z
            | StandardGate::S
            | StandardGate::Sdg
            | StandardGate::T
            | StandardGate::Tdg
            | StandardGate::Rz(_)
            | StandardGate::P(_)
            | StandardGate::CZ,
            _,
        )
        | (StandardGate::CX, 0) => Some(WireAxis::Z),
        (StandardGate::X | StandardGate::SX | StandardGate::SXdg | StandardGate::Rx(_), _)
        | (StandardGate::CX, _) => Some(WireAxis::X),
        _ => None,
    }
}

/// Two gates commute if on every wire they share both are diagonal in the
/// same axis.
fn gates_commute(a: &Instruction, b: &Instruction) -> bool {
    a.qubits
        .iter()
        .filter(|&&q| b.acts_on(q))
        .all(|&q| match (wire_axis(a, q), wire_axis(b, q)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        })
}

/// Operation nodes `b` depends on, excluding `skip`.
fn ancestors(dag: &CircuitDag, b: NodeIndex, skip: NodeIndex) -> FxHashSet<NodeIndex> {
    let graph = Reversed(dag.graph());
    let mut dfs = Dfs::new(graph, b);
    let mut found = FxHashSet::default();
    while let Some(node) = dfs.next(graph) {
        if node != b && node != skip && dag.get_instruction(node).is_some() {
            found.insert(node);
        }
    }
    found
}

/// Moves the gate at `(layer, qubit)` past the next gate on wire `qubit`
/// when the two commute.
///
/// The successor must follow directly on every shared wire and must not
/// depend on the moved gate through any other path. Identical neighbours
/// are left alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommuteGates;

impl CommuteGates {
    fn rewrite(state: &EnvState, layer: usize, qubit: QubitId) -> Option<Circuit> {
        let (a, inst_a) = state.op_at(layer, qubit)?;
        let dag = state.current().dag();
        let b = dag.wire_successor(a, qubit)?;
        let inst_b = dag.get_instruction(b)?;

        if inst_a == inst_b || !gates_commute(inst_a, inst_b) {
            return None;
        }
        let adjacent = inst_a
            .qubits
            .iter()
            .filter(|&&w| inst_b.acts_on(w))
            .all(|&w| dag.wire_successor(a, w) == Some(b));
        if !adjacent {
            return None;
        }
        if dag
            .op_predecessors(b)
            .into_iter()
            .any(|p| p != a && dag.has_path(a, p))
        {
            return None;
        }

        // Everything `b` needs, then `b`, then the rest in original order.
        let before = ancestors(dag, b, a);
        let ops: Vec<_> = dag.topological_ops().collect();
        let order = ops
            .iter()
            .filter(|(n, _)| before.contains(n))
            .chain(ops.iter().filter(|(n, _)| *n == b))
            .chain(
                ops.iter()
                    .filter(|(n, _)| *n != b && !before.contains(n)),
            )
            .map(|(_, inst)| (*inst).clone());

        rebuild(state, order)
    }
}

impl TransformationRule for CommuteGates {
    fn name(&self) -> &str {
        "CommuteGates"
    }

    fn is_valid(&self, state: &EnvState, layer: usize, qubit: QubitId) -> bool {
        Self::rewrite(state, layer, qubit).is_some()
    }

    fn apply(&self, state: &EnvState, layer: usize, qubit: QubitId) -> EnvResult<Circuit> {
        let circuit = Self::rewrite(state, layer, qubit).ok_or_else(|| {
            EnvError::RuleNotApplicable {
                rule: self.name().to_string(),
                layer,
                qubit: qubit.index(),
            }
        })?;
        debug!(layer, %qubit, depth = circuit.depth(), "Commuted gates");
        Ok(circuit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate_class::GateSet;
    use crate::state::EnvSpec;

    fn state(max_depth: usize, circuit: Circuit) -> EnvState {
        let edges = [(0, 1), (1, 0), (1, 2), (2, 1), (0, 2), (2, 0)];
        let gate_set = GateSet::from_coupling_map(&["rz", "sx", "x"], "cx", &edges).unwrap();
        let spec = EnvSpec::new(max_depth, 3, gate_set, vec![Box::new(CommuteGates)])
            .unwrap()
            .shared();
        EnvState::new(spec, circuit.clone(), circuit).unwrap()
    }

    #[test]
    fn test_rz_commutes_past_cx_control() {
        let mut circuit = Circuit::with_size("c", 3);
        circuit.rz(0.5, QubitId(0)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();

        let state = state(2, circuit);
        assert!(CommuteGates.is_valid(&state, 0, QubitId(0)));

        let out = CommuteGates.apply(&state, 0, QubitId(0)).unwrap();
        let names: Vec<_> = out.instructions().iter().map(|i| i.name().to_string()).collect();
        assert_eq!(names, ["cx", "rz"]);
        assert_eq!(out.depth(), 2);
    }

    #[test]
    fn test_x_commutes_past_cx_target() {
        let mut circuit = Circuit::with_size("c", 3);
        circuit.x(QubitId(1)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();

        assert!(CommuteGates.is_valid(&state(2, circuit), 0, QubitId(1)));
    }

    #[test]
    fn test_axis_mismatch_is_rejected() {
        let mut on_target = Circuit::with_size("c", 3);
        on_target.rz(0.5, QubitId(1)).unwrap();
        on_target.cx(QubitId(0), QubitId(1)).unwrap();
        assert!(!CommuteGates.is_valid(&state(2, on_target), 0, QubitId(1)));

        let mut on_control = Circuit::with_size("c", 3);
        on_control.sx(QubitId(0)).unwrap();
        on_control.cx(QubitId(0), QubitId(1)).unwrap();
        let state = state(2, on_control);
        assert!(!CommuteGates.is_valid(&state, 0, QubitId(0)));
        assert!(matches!(
            CommuteGates.apply(&state, 0, QubitId(0)),
            Err(EnvError::RuleNotApplicable { .. })
        ));
    }

    #[test]
    fn test_identical_neighbours_are_skipped() {
        let mut circuit = Circuit::with_size("c", 3);
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        assert!(!CommuteGates.is_valid(&state(2, circuit), 0, QubitId(0)));
    }

    #[test]
    fn test_other_ancestors_move_first() {
        let mut circuit = Circuit::with_size("c", 3);
        circuit.rz(0.5, QubitId(0)).unwrap();
        circuit.sx(QubitId(1)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();

        let out = CommuteGates
            .apply(&state(3, circuit.clone()), 0, QubitId(0))
            .unwrap();
        let names: Vec<_> = out.instructions().iter().map(|i| i.name().to_string()).collect();
        assert_eq!(names, ["sx", "cx", "rz"]);
        assert_eq!(out.depth(), 3);

        // The same swap overflows a depth-2 grid.
        assert!(!CommuteGates.is_valid(&state(2, circuit), 0, QubitId(0)));
    }

    #[test]
    fn test_indirect_dependency_blocks_swap() {
        // cx(0, 2) follows cx(0, 1) on wire 0 but also depends on it
        // through rz(q1) and cx(1, 2).
        let mut circuit = Circuit::with_size("c", 3);
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        circuit.rz(0.5, QubitId(1)).unwrap();
        circuit.cx(QubitId(1), QubitId(2)).unwrap();
        circuit.cx(QubitId(0), QubitId(2)).unwrap();
        assert!(!CommuteGates.is_valid(&state(4, circuit), 0, QubitId(0)));
    }

    #[test]
    fn test_no_successor() {
        let mut circuit = Circuit::with_size("c", 3);
        circuit.rz(0.5, QubitId(0)).unwrap();
        let state = state(2, circuit);
        assert!(!CommuteGates.is_valid(&state, 0, QubitId(0)));
        assert!(!CommuteGates.is_valid(&state, 1, QubitId(0)));
    }
}
