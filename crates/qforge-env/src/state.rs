//! Shared environment configuration and per-step state.

use std::sync::Arc;

use qforge_ir::{Circuit, Instruction, NodeIndex, QubitId};

use crate::action::ActionCodec;
use crate::encoder::LayeredEncoder;
use crate::error::{EnvError, EnvResult};
use crate::gate_class::GateSet;
use crate::layered::LayeredCircuit;
use crate::rule::TransformationRule;

/// Immutable environment configuration, shared read-only through an `Arc`
/// by any number of environments.
#[derive(Debug)]
pub struct EnvSpec {
    max_depth: usize,
    width: u32,
    gate_set: GateSet,
    rules: Vec<Box<dyn TransformationRule>>,
}

impl EnvSpec {
    /// Validate and assemble the environment description.
    pub fn new(
        max_depth: usize,
        num_qubits: usize,
        gate_set: GateSet,
        rules: Vec<Box<dyn TransformationRule>>,
    ) -> EnvResult<Self> {
        if max_depth == 0 {
            return Err(EnvError::InvalidConfig("max_depth must be at least 1".into()));
        }
        let width = u32::try_from(num_qubits)
            .ok()
            .filter(|&w| w > 0)
            .ok_or_else(|| {
                EnvError::InvalidConfig(format!(
                    "num_qubits must be between 1 and {}",
                    u32::MAX
                ))
            })?;
        if rules.is_empty() {
            return Err(EnvError::InvalidConfig(
                "at least one transformation rule is required".into(),
            ));
        }
        let action_space = max_depth
            .checked_mul(num_qubits)
            .and_then(|cells| cells.checked_mul(rules.len()));
        if action_space.is_none() {
            return Err(EnvError::InvalidConfig(format!(
                "action space {max_depth} x {num_qubits} x {} overflows usize",
                rules.len()
            )));
        }
        gate_set.validate_width(num_qubits)?;

        Ok(Self {
            max_depth,
            width,
            gate_set,
            rules,
        })
    }

    /// Wrap in an `Arc` for sharing.
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Maximum number of layers.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Circuit width.
    pub fn num_qubits(&self) -> usize {
        self.width as usize
    }

    /// An empty circuit spanning the full grid width.
    pub fn empty_circuit(&self, name: &str) -> Circuit {
        Circuit::with_size(name, self.width)
    }

    /// Native gate classes.
    pub fn gate_set(&self) -> &GateSet {
        &self.gate_set
    }

    /// Rules in index order.
    pub fn rules(&self) -> &[Box<dyn TransformationRule>] {
        &self.rules
    }

    /// Get a rule by index.
    pub fn rule(&self, index: usize) -> Option<&dyn TransformationRule> {
        self.rules.get(index).map(|rule| &**rule)
    }

    /// Action codec for this grid.
    pub fn codec(&self) -> ActionCodec {
        ActionCodec::new(self.max_depth, self.num_qubits(), self.rules.len())
    }

    /// Observation encoder for this grid.
    pub fn encoder(&self) -> LayeredEncoder {
        LayeredEncoder::new(self.max_depth, self.num_qubits())
    }

    /// Check that a circuit fits the grid and uses only native gate classes.
    pub fn is_encodable(&self, circuit: &Circuit) -> bool {
        circuit.num_qubits() <= self.num_qubits()
            && circuit.depth() <= self.max_depth
            && circuit
                .dag()
                .topological_ops()
                .all(|(_, inst)| self.gate_set.classify(&inst.gate, &inst.qubits).is_ok())
    }
}

/// The view of an episode that rules, masks and tasks read.
#[derive(Debug, Clone)]
pub struct EnvState {
    spec: Arc<EnvSpec>,
    current: Circuit,
    layered: LayeredCircuit,
    target: Circuit,
}

impl EnvState {
    /// Build the state for a current/target pair. The current circuit
    /// must fit the grid.
    pub fn new(spec: Arc<EnvSpec>, current: Circuit, target: Circuit) -> EnvResult<Self> {
        spec.encoder().check_dimensions(&current)?;
        let layered = LayeredCircuit::new(&current);
        Ok(Self {
            spec,
            current,
            layered,
            target,
        })
    }

    /// Shared configuration.
    pub fn spec(&self) -> &EnvSpec {
        &self.spec
    }

    /// The circuit being rewritten.
    pub fn current(&self) -> &Circuit {
        &self.current
    }

    /// Layering of the current circuit.
    pub fn layered(&self) -> &LayeredCircuit {
        &self.layered
    }

    /// The episode's reference circuit.
    pub fn target(&self) -> &Circuit {
        &self.target
    }

    /// The operation on `qubit` in layer `layer` of the current circuit.
    pub fn op_at(&self, layer: usize, qubit: QubitId) -> Option<(NodeIndex, &Instruction)> {
        self.layered.op_at(&self.current, layer, qubit)
    }

    /// Replace the current circuit, keeping the target.
    pub fn with_current(&self, current: Circuit) -> EnvResult<Self> {
        Self::new(Arc::clone(&self.spec), current, self.target.clone())
    }
}
