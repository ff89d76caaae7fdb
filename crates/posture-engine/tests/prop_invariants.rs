//! Property tests for the [0, 1] clamping invariant

use posture_engine::{PostureEngine, SimulationConfig, SolutionKind};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Solution(SolutionKind),
    Automation(f64),
    Drift(f64),
    Tick,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        prop_oneof![
            Just(SolutionKind::Automation),
            Just(SolutionKind::Training),
            Just(SolutionKind::PolicyUpdate),
            Just(SolutionKind::Technology),
            Just(SolutionKind::Process),
        ]
        .prop_map(Op::Solution),
        (-2.0f64..2.0).prop_map(Op::Automation),
        (-2.0f64..2.0).prop_map(Op::Drift),
        Just(Op::Tick),
    ]
}

proptest! {
    #[test]
    fn levels_hold_unit_range_for_any_operation_sequence(
        ops in prop::collection::vec(op_strategy(), 1..40),
        seed in 0u64..1000,
    ) {
        let engine = PostureEngine::new(SimulationConfig::deterministic(seed));
        let ids = ["A.5.1.1", "PCI.2.1", "PCI.3.4"];

        for (i, op) in ops.iter().enumerate() {
            let id = ids[i % ids.len()];
            match op {
                Op::Solution(kind) => {
                    engine.apply_solution(id, *kind).unwrap();
                }
                Op::Automation(delta) => {
                    engine.adjust_automation(id, *delta).unwrap();
                }
                Op::Drift(delta) => {
                    engine.adjust_drift(id, *delta).unwrap();
                }
                Op::Tick => {
                    engine.tick().unwrap();
                }
            }

            for control in engine.list_controls() {
                prop_assert!((0.0..=1.0).contains(&control.automation_level));
                prop_assert!((0.0..=1.0).contains(&control.drift_factor));
            }
        }
    }
}
