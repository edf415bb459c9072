//! DAG-based circuit representation.

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex as PetNodeIndex};
use petgraph::visit::EdgeRef;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::instruction::Instruction;
use crate::qubit::QubitId;

/// Node index type for the circuit DAG.
pub type NodeIndex = PetNodeIndex<u32>;

/// A node in the circuit DAG.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DagNode {
    /// Input node for a qubit wire.
    In(QubitId),
    /// Output node for a qubit wire.
    Out(QubitId),
    /// Operation node containing an instruction.
    Op(Instruction),
}

impl DagNode {
    /// Check if this is an operation node.
    #[inline]
    pub fn is_op(&self) -> bool {
        matches!(self, DagNode::Op(_))
    }

    /// Get the instruction if this is an operation node.
    #[inline]
    pub fn instruction(&self) -> Option<&Instruction> {
        match self {
            DagNode::Op(inst) => Some(inst),
            _ => None,
        }
    }
}

/// An edge in the circuit DAG, carrying the qubit wire it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DagEdge {
    /// The wire this edge represents.
    pub wire: QubitId,
}

/// DAG-based circuit representation.
///
/// Every qubit wire runs from an `In` node through the operations that
/// touch it to an `Out` node. Nodes are never removed: rewrites build a
/// fresh DAG. Node index order is therefore the order instructions were
/// applied, which is always a topological order.
#[derive(Debug, Clone, Default)]
pub struct CircuitDag {
    /// The underlying graph.
    graph: DiGraph<DagNode, DagEdge, u32>,
    /// Input node per qubit, indexed by wire.
    inputs: Vec<NodeIndex>,
    /// Output node per qubit, indexed by wire.
    outputs: Vec<NodeIndex>,
    /// Node just before the output node on each wire.
    wire_front: Vec<NodeIndex>,
}

impl CircuitDag {
    /// Create a new empty circuit DAG.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a DAG with `num_qubits` empty wires.
    pub fn with_qubits(num_qubits: u32) -> Self {
        let mut dag = Self::new();
        for _ in 0..num_qubits {
            dag.add_qubit();
        }
        dag
    }

    /// Append a new qubit wire and return its id.
    pub fn add_qubit(&mut self) -> QubitId {
        let qubit = QubitId::from(self.inputs.len());
        let in_node = self.graph.add_node(DagNode::In(qubit));
        let out_node = self.graph.add_node(DagNode::Out(qubit));
        self.graph.add_edge(in_node, out_node, DagEdge { wire: qubit });
        self.inputs.push(in_node);
        self.outputs.push(out_node);
        self.wire_front.push(in_node);
        qubit
    }

    /// Apply an instruction to the end of the circuit.
    #[allow(clippy::cast_possible_truncation)]
    pub fn apply(&mut self, instruction: Instruction) -> IrResult<NodeIndex> {
        let gate_name = Some(instruction.name().to_string());

        let expected = instruction.gate.num_qubits() as usize;
        let got = instruction.qubits.len();
        if expected != got {
            return Err(IrError::QubitCountMismatch {
                gate_name: instruction.name().to_string(),
                expected: expected as u32,
                got: got as u32,
            });
        }

        let mut seen = FxHashSet::default();
        for &qubit in &instruction.qubits {
            if qubit.index() >= self.inputs.len() {
                return Err(IrError::QubitNotFound {
                    qubit,
                    gate_name: gate_name.clone(),
                });
            }
            if !seen.insert(qubit) {
                return Err(IrError::DuplicateQubit {
                    qubit,
                    gate_name: gate_name.clone(),
                });
            }
        }

        let qubits = instruction.qubits.clone();
        let op_node = self.graph.add_node(DagNode::Op(instruction));

        for qubit in qubits {
            let out_node = self.outputs[qubit.index()];
            let prev_node = self.wire_front[qubit.index()];

            let eid = self
                .graph
                .edges_directed(prev_node, Direction::Outgoing)
                .find(|e| e.weight().wire == qubit && e.target() == out_node)
                .map(|e| e.id())
                .ok_or_else(|| {
                    IrError::InvalidDag(format!(
                        "Missing edge from predecessor to output for wire {qubit}"
                    ))
                })?;
            self.graph.remove_edge(eid);
            self.graph.add_edge(prev_node, op_node, DagEdge { wire: qubit });
            self.graph.add_edge(op_node, out_node, DagEdge { wire: qubit });
            self.wire_front[qubit.index()] = op_node;
        }

        Ok(op_node)
    }

    /// Iterate over operations in topological order.
    pub fn topological_ops(&self) -> impl Iterator<Item = (NodeIndex, &Instruction)> {
        self.graph
            .node_indices()
            .filter_map(|idx| self.graph[idx].instruction().map(|inst| (idx, inst)))
    }

    /// Get an instruction by node index.
    #[inline]
    pub fn get_instruction(&self, node: NodeIndex) -> Option<&Instruction> {
        self.graph.node_weight(node).and_then(DagNode::instruction)
    }

    /// The operation following `node` on `wire`, if any.
    pub fn wire_successor(&self, node: NodeIndex, wire: QubitId) -> Option<NodeIndex> {
        self.graph
            .edges_directed(node, Direction::Outgoing)
            .find(|e| e.weight().wire == wire)
            .map(|e| e.target())
            .filter(|&t| self.graph[t].is_op())
    }

    /// The operation preceding `node` on `wire`, if any.
    pub fn wire_predecessor(&self, node: NodeIndex, wire: QubitId) -> Option<NodeIndex> {
        self.graph
            .edges_directed(node, Direction::Incoming)
            .find(|e| e.weight().wire == wire)
            .map(|e| e.source())
            .filter(|&s| self.graph[s].is_op())
    }

    /// Distinct operation nodes with an edge into `node`.
    pub fn op_predecessors(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut preds: Vec<NodeIndex> = self
            .graph
            .edges_directed(node, Direction::Incoming)
            .map(|e| e.source())
            .filter(|&s| self.graph[s].is_op())
            .collect();
        preds.sort_unstable();
        preds.dedup();
        preds
    }

    /// Check whether `to` is reachable from `from` along wire edges.
    pub fn has_path(&self, from: NodeIndex, to: NodeIndex) -> bool {
        petgraph::algo::has_path_connecting(&self.graph, from, to, None)
    }

    /// Group operations into ASAP layers.
    ///
    /// An operation with no operation predecessors sits in layer 0; any
    /// other sits one past its deepest predecessor. Within a layer, nodes
    /// keep topological order.
    pub fn layers(&self) -> Vec<Vec<NodeIndex>> {
        let mut layer_of: FxHashMap<NodeIndex, usize> = FxHashMap::default();
        let mut layers: Vec<Vec<NodeIndex>> = Vec::new();

        for (node, _) in self.topological_ops() {
            let layer = self
                .op_predecessors(node)
                .iter()
                .filter_map(|p| layer_of.get(p))
                .map(|&l| l + 1)
                .max()
                .unwrap_or(0);
            layer_of.insert(node, layer);
            if layers.len() <= layer {
                layers.resize_with(layer + 1, Vec::new);
            }
            layers[layer].push(node);
        }

        layers
    }

    /// Get the number of qubits.
    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.inputs.len()
    }

    /// Get the number of operations.
    #[inline]
    pub fn num_ops(&self) -> usize {
        self.graph.node_count().saturating_sub(2 * self.inputs.len())
    }

    /// Calculate the circuit depth: the length of the longest chain of
    /// operations sharing wires.
    pub fn depth(&self) -> usize {
        let mut depths: FxHashMap<NodeIndex, usize> =
            FxHashMap::with_capacity_and_hasher(self.graph.node_count(), Default::default());
        let mut max_depth = 0usize;

        for (node, _) in self.topological_ops() {
            let d = 1 + self
                .op_predecessors(node)
                .iter()
                .filter_map(|p| depths.get(p).copied())
                .max()
                .unwrap_or(0);
            max_depth = max_depth.max(d);
            depths.insert(node, d);
        }

        max_depth
    }

    /// Get a reference to the underlying graph.
    pub fn graph(&self) -> &DiGraph<DagNode, DagEdge, u32> {
        &self.graph
    }

    /// Verify the structural integrity of the DAG.
    ///
    /// Checks that the graph is acyclic and that every wire forms an
    /// unbroken path from its `In` node to its `Out` node.
    pub fn verify_integrity(&self) -> IrResult<()> {
        if petgraph::algo::is_cyclic_directed(&self.graph) {
            return Err(IrError::InvalidDag("Graph contains a cycle".into()));
        }

        let max_steps = self.graph.node_count();
        for (index, (&in_node, &out_node)) in self.inputs.iter().zip(&self.outputs).enumerate() {
            let wire = QubitId::from(index);
            let mut current = in_node;
            let mut steps = 0;

            while current != out_node {
                current = self
                    .graph
                    .edges_directed(current, Direction::Outgoing)
                    .find(|e| e.weight().wire == wire)
                    .map(|e| e.target())
                    .ok_or_else(|| {
                        IrError::InvalidDag(format!(
                            "Wire {wire} is broken: no outgoing edge from node {current:?}"
                        ))
                    })?;

                steps += 1;
                if steps > max_steps {
                    return Err(IrError::InvalidDag(format!(
                        "Wire {wire} has too many steps (possible cycle)"
                    )));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::StandardGate;

    fn h(q: u32) -> Instruction {
        Instruction::single_qubit_gate(StandardGate::H, QubitId(q))
    }

    fn cx(c: u32, t: u32) -> Instruction {
        Instruction::two_qubit_gate(StandardGate::CX, QubitId(c), QubitId(t))
    }

    #[test]
    fn test_empty_dag() {
        let dag = CircuitDag::new();
        assert_eq!(dag.num_qubits(), 0);
        assert_eq!(dag.num_ops(), 0);
        assert_eq!(dag.depth(), 0);
        assert!(dag.layers().is_empty());
    }

    #[test]
    fn test_bell_state_depth() {
        let mut dag = CircuitDag::with_qubits(2);
        dag.apply(h(0)).unwrap();
        dag.apply(cx(0, 1)).unwrap();

        assert_eq!(dag.num_ops(), 2);
        assert_eq!(dag.depth(), 2);
    }

    #[test]
    fn test_parallel_gates_share_layer() {
        let mut dag = CircuitDag::with_qubits(2);
        let a = dag.apply(h(0)).unwrap();
        let b = dag.apply(h(1)).unwrap();

        assert_eq!(dag.depth(), 1);
        assert_eq!(dag.layers(), vec![vec![a, b]]);
    }

    #[test]
    fn test_layers_match_depth() {
        let mut dag = CircuitDag::with_qubits(3);
        let a = dag.apply(h(0)).unwrap();
        let b = dag.apply(cx(0, 1)).unwrap();
        let c = dag.apply(h(2)).unwrap();
        let d = dag.apply(cx(1, 2)).unwrap();

        let layers = dag.layers();
        assert_eq!(layers.len(), dag.depth());
        assert_eq!(layers, vec![vec![a, c], vec![b], vec![d]]);
    }

    #[test]
    fn test_wire_neighbours() {
        let mut dag = CircuitDag::with_qubits(2);
        let a = dag.apply(h(0)).unwrap();
        let b = dag.apply(cx(0, 1)).unwrap();
        let c = dag.apply(h(1)).unwrap();

        assert_eq!(dag.wire_successor(a, QubitId(0)), Some(b));
        assert_eq!(dag.wire_successor(b, QubitId(1)), Some(c));
        assert_eq!(dag.wire_successor(b, QubitId(0)), None);
        assert_eq!(dag.wire_predecessor(b, QubitId(0)), Some(a));
        assert_eq!(dag.wire_predecessor(b, QubitId(1)), None);
        assert_eq!(dag.op_predecessors(c), vec![b]);
        assert!(dag.has_path(a, c));
        assert!(!dag.has_path(c, a));
    }

    #[test]
    fn test_gate_arity_mismatch() {
        let mut dag = CircuitDag::with_qubits(2);
        let result = dag.apply(Instruction::gate(StandardGate::CX, [QubitId(0)]));

        match result {
            Err(IrError::QubitCountMismatch {
                gate_name,
                expected,
                got,
            }) => {
                assert_eq!(gate_name, "cx");
                assert_eq!(expected, 2);
                assert_eq!(got, 1);
            }
            other => panic!("Expected QubitCountMismatch error, got {other:?}"),
        }
    }

    #[test]
    fn test_qubit_not_found_with_context() {
        let mut dag = CircuitDag::with_qubits(1);
        match dag.apply(cx(0, 99)) {
            Err(IrError::QubitNotFound { qubit, gate_name }) => {
                assert_eq!(qubit, QubitId(99));
                assert_eq!(gate_name, Some("cx".to_string()));
            }
            other => panic!("Expected QubitNotFound error, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_qubit_rejected() {
        let mut dag = CircuitDag::with_qubits(2);
        assert!(matches!(
            dag.apply(cx(1, 1)),
            Err(IrError::DuplicateQubit { .. })
        ));
        assert_eq!(dag.num_ops(), 0);
    }

    #[test]
    fn test_verify_integrity() {
        CircuitDag::new().verify_integrity().unwrap();

        let mut dag = CircuitDag::with_qubits(3);
        dag.apply(h(0)).unwrap();
        dag.apply(cx(0, 1)).unwrap();
        dag.apply(cx(1, 2)).unwrap();
        dag.verify_integrity().unwrap();
    }
}
