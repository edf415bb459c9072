//! Circuit generators feeding the training curriculum.

use std::f64::consts::PI;

use qforge_ir::{Circuit, Instruction, QubitId};
use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::basis::BasisTranslator;
use crate::error::{EnvError, EnvResult};
use crate::state::EnvSpec;

/// Source of candidate starting circuits.
pub trait CircuitGenerator: Send + Sync + std::fmt::Debug {
    /// Produce one circuit for `spec`, drawing randomness from `rng`.
    fn generate(&self, spec: &EnvSpec, rng: &mut StdRng) -> EnvResult<Circuit>;
}

/// Random circuits built from the native gate classes.
///
/// Each step draws a class uniformly, binds every free parameter to a
/// uniform angle in `[-π, π]` and places it at a uniformly drawn qubit;
/// placements the class rejects are redrawn. Gates are appended until the
/// circuit reaches `max_depth`, then the result is translated into the
/// gate set's basis.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomCircuitGenerator;

impl CircuitGenerator for RandomCircuitGenerator {
    fn generate(&self, spec: &EnvSpec, rng: &mut StdRng) -> EnvResult<Circuit> {
        let gate_set = spec.gate_set();
        if gate_set.is_empty() {
            return Err(EnvError::InvalidConfig("gate set is empty".into()));
        }
        let width = u32::try_from(spec.num_qubits())
            .map_err(|_| EnvError::InvalidConfig("num_qubits exceeds u32".into()))?;
        let mut circuit = Circuit::with_size("random", width);

        while circuit.depth() < spec.max_depth() {
            let Some(class) = gate_set.get(rng.gen_range(0..gate_set.len())) else {
                continue;
            };
            let values: Vec<f64> = (0..class.gate.free_parameter_count())
                .map(|_| rng.gen_range(-PI..=PI))
                .collect();
            let gate = class.gate.bind_free_parameters(&values)?;
            let qubit = QubitId(rng.gen_range(0..width));
            let Some(qubits) = class.qubits(qubit) else {
                continue;
            };
            circuit.append(Instruction::gate(gate, qubits))?;
        }

        let translated = BasisTranslator::new(gate_set.basis_gates()).translate(&circuit)?;
        debug!(
            depth = translated.depth(),
            ops = translated.num_ops(),
            "Generated random circuit"
        );
        Ok(translated)
    }
}

/// Uniform choice from a fixed list of circuits.
#[derive(Debug, Clone)]
pub struct DatasetCircuitGenerator {
    circuits: Vec<Circuit>,
}

impl DatasetCircuitGenerator {
    /// Create a generator over a non-empty list.
    pub fn new(circuits: Vec<Circuit>) -> EnvResult<Self> {
        if circuits.is_empty() {
            return Err(EnvError::InvalidConfig(
                "dataset generator needs at least one circuit".into(),
            ));
        }
        Ok(Self { circuits })
    }

    /// Number of circuits in the dataset.
    pub fn len(&self) -> usize {
        self.circuits.len()
    }

    /// Always `false`; construction rejects empty lists.
    pub fn is_empty(&self) -> bool {
        self.circuits.is_empty()
    }
}

impl CircuitGenerator for DatasetCircuitGenerator {
    fn generate(&self, _spec: &EnvSpec, rng: &mut StdRng) -> EnvResult<Circuit> {
        self.circuits
            .choose(rng)
            .cloned()
            .ok_or_else(|| EnvError::InvalidConfig("dataset is empty".into()))
    }
}
