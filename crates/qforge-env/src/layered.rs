//! Topological layering of a circuit.

use qforge_ir::{Circuit, Instruction, NodeIndex, QubitId};
use rustc_hash::FxHashMap;

/// A circuit's operations grouped into ASAP layers, with a slot map from
/// `(layer, qubit)` to the operation occupying that wire in that layer.
///
/// A two-qubit operation occupies one slot per operand. The layering is
/// derived data: it is rebuilt whenever the circuit changes.
#[derive(Debug, Clone, Default)]
pub struct LayeredCircuit {
    layers: Vec<Vec<NodeIndex>>,
    slots: FxHashMap<(usize, QubitId), NodeIndex>,
    layer_of: FxHashMap<NodeIndex, usize>,
}

impl LayeredCircuit {
    /// Layer `circuit`.
    pub fn new(circuit: &Circuit) -> Self {
        let dag = circuit.dag();
        let layers = circuit.layers();
        let mut slots = FxHashMap::default();
        let mut layer_of = FxHashMap::default();

        for (l, layer) in layers.iter().enumerate() {
            for &node in layer {
                layer_of.insert(node, l);
                if let Some(inst) = dag.get_instruction(node) {
                    for &q in &inst.qubits {
                        slots.insert((l, q), node);
                    }
                }
            }
        }

        Self {
            layers,
            slots,
            layer_of,
        }
    }

    /// Number of layers; equal to the circuit depth.
    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    /// Nodes of layer `l` in topological order. Empty past the last layer.
    pub fn layer(&self, l: usize) -> &[NodeIndex] {
        self.layers.get(l).map_or(&[], Vec::as_slice)
    }

    /// All layers.
    pub fn layers(&self) -> &[Vec<NodeIndex>] {
        &self.layers
    }

    /// The operation touching `qubit` in layer `l`, if any.
    pub fn node_at(&self, l: usize, qubit: QubitId) -> Option<NodeIndex> {
        self.slots.get(&(l, qubit)).copied()
    }

    /// The layer a node was placed in.
    pub fn layer_of(&self, node: NodeIndex) -> Option<usize> {
        self.layer_of.get(&node).copied()
    }

    /// Resolve a site to its node and instruction.
    pub fn op_at<'c>(
        &self,
        circuit: &'c Circuit,
        l: usize,
        qubit: QubitId,
    ) -> Option<(NodeIndex, &'c Instruction)> {
        let node = self.node_at(l, qubit)?;
        circuit.dag().get_instruction(node).map(|inst| (node, inst))
    }
}
