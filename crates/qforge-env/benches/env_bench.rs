//! Benchmarks for observation encoding and mask computation
//!
//! Run with: cargo bench -p qforge-env

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use qforge_env::{ActionMask, EnvSpec, EnvState, GateSet, RuleKind};
use qforge_ir::{Circuit, QubitId};

fn spec(max_depth: usize, num_qubits: u32) -> Arc<EnvSpec> {
    let gate_set = GateSet::from_coupling_map(
        &["rz", "sx", "x"],
        "cx",
        &GateSet::linear_coupling(num_qubits),
    )
    .unwrap();
    let rules = RuleKind::ALL.iter().map(|kind| kind.build()).collect();
    EnvSpec::new(max_depth, num_qubits as usize, gate_set, rules)
        .unwrap()
        .shared()
}

/// Alternating rows of rotations and nearest-neighbour CX gates.
fn brick_circuit(num_qubits: u32, rows: usize) -> Circuit {
    let mut circuit = Circuit::with_size("bench", num_qubits);
    for row in 0..rows {
        for i in 0..num_qubits {
            circuit.rz(0.1 * (i + 1) as f64, QubitId(i)).unwrap();
        }
        for i in ((row % 2) as u32..num_qubits.saturating_sub(1)).step_by(2) {
            circuit.cx(QubitId(i), QubitId(i + 1)).unwrap();
        }
    }
    circuit
}

/// Benchmark encoding the occupancy tensor
fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");

    for num_qubits in &[3u32, 5, 8] {
        let spec = spec(32, *num_qubits);
        let circuit = brick_circuit(*num_qubits, 8);
        group.bench_with_input(
            BenchmarkId::new("layered", num_qubits),
            &circuit,
            |b, circuit| {
                b.iter(|| {
                    spec.encoder()
                        .encode(black_box(circuit), spec.gate_set())
                        .unwrap()
                });
            },
        );
    }

    group.finish();
}

/// Benchmark evaluating every rule at every grid cell
fn bench_mask(c: &mut Criterion) {
    let mut group = c.benchmark_group("mask");

    for num_qubits in &[3u32, 5, 8] {
        let spec = spec(32, *num_qubits);
        let circuit = brick_circuit(*num_qubits, 8);
        let state = EnvState::new(spec, circuit.clone(), circuit).unwrap();
        group.bench_with_input(
            BenchmarkId::new("compute", num_qubits),
            &state,
            |b, state| {
                b.iter(|| ActionMask::compute(black_box(state)));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_encode, bench_mask);

criterion_main!(benches);
