//! Property-based tests for the action space and the mask.
//!
//! Every flat index maps to a unique grid cell, and every action the mask
//! marks legal must apply cleanly and keep the circuit encodable.

use proptest::prelude::*;
use qforge_env::{ActionCodec, CircuitOptimizationTask, EnvConfig, TransformationEnv};

fn small_env(seed: u64) -> TransformationEnv<CircuitOptimizationTask> {
    let config = EnvConfig {
        max_depth: 5,
        num_qubits: 3,
        max_time_steps: 6,
        seed: Some(seed),
        ..EnvConfig::default()
    };
    config.build_env().unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn codec_decode_inverts_encode(
        dims in (1usize..8, 1usize..8, 1usize..5),
        cell in (0usize..64, 0usize..64, 0usize..64),
    ) {
        let (depth, qubits, rules) = dims;
        let codec = ActionCodec::new(depth, qubits, rules);
        let (layer, qubit, rule) = (cell.0 % depth, cell.1 % qubits, cell.2 % rules);

        let flat = codec.encode(layer, qubit, rule);
        prop_assert!(flat < codec.size());
        let decoded = codec.decode(flat);
        prop_assert_eq!((decoded.layer, decoded.qubit, decoded.rule), (layer, qubit, rule));
    }

    #[test]
    fn legal_actions_apply_cleanly(seed in any::<u64>()) {
        let mut env = small_env(seed);
        env.reset(None).unwrap();
        prop_assert!(env.action_mask().any());

        let state = env.state().unwrap().clone();
        let spec = state.spec();
        let codec = spec.codec();
        for action in env.action_mask().legal_actions() {
            let a = codec.decode(action);
            let rule = spec.rule(a.rule).unwrap();
            let next = rule.apply(&state, a.layer, a.qubit_id()).unwrap();
            prop_assert!(spec.is_encodable(&next));
            prop_assert!(spec.encoder().encode(&next, spec.gate_set()).is_ok());
        }
    }

    #[test]
    fn mask_length_is_stable(seed in any::<u64>(), picks in prop::collection::vec(any::<prop::sample::Index>(), 6)) {
        let mut env = small_env(seed);
        env.reset(None).unwrap();
        let size = env.spec().codec().size();

        for pick in picks {
            prop_assert_eq!(env.action_mask().len(), size);
            let legal = env.action_mask().legal_actions();
            if legal.is_empty() {
                break;
            }
            let outcome = env.step(legal[pick.index(legal.len())]).unwrap();
            prop_assert_eq!(env.action_mask().len(), size);
            if outcome.terminated {
                break;
            }
        }
    }
}
