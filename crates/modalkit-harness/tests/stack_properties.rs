#![forbid(unsafe_code)]

//! Property tests: random operation sequences keep every stack invariant.

use modalkit_harness::ops::{Driver, Op, op_strategy};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn random_sequences_hold_invariants(ops in prop::collection::vec(op_strategy(), 0..80)) {
        let mut driver = Driver::new();
        for op in &ops {
            driver.apply(op);
        }
        driver.finish();
    }

    #[test]
    fn length_is_opens_minus_removals(
        opens in 1usize..12,
        closes in prop::collection::vec(any::<usize>(), 0..12),
    ) {
        let mut driver = Driver::new();
        for _ in 0..opens {
            driver.apply(&Op::Open { backdrop: modalkit::Backdrop::Dismiss, keyboard: false });
        }
        for index in &closes {
            driver.apply(&Op::Close(*index));
        }
        // Still within the grace period: nothing removed yet.
        prop_assert_eq!(driver.rig.stack.len(), opens);

        driver.apply(&Op::Advance(200));
        let closed: std::collections::BTreeSet<usize> =
            closes.iter().map(|i| i % opens).collect();
        prop_assert_eq!(driver.rig.stack.len(), opens - closed.len());
        driver.finish();
    }

    #[test]
    fn static_backdrop_never_shrinks_stack(clicks in 1usize..20, gaps in prop::collection::vec(0u64..400, 1..20)) {
        let mut driver = Driver::new();
        driver.apply(&Op::Open { backdrop: modalkit::Backdrop::Static, keyboard: false });
        for (n, gap) in gaps.iter().cycle().take(clicks).enumerate() {
            driver.apply(&Op::ClickBackdrop(n));
            prop_assert_eq!(driver.rig.stack.len(), 1);
            driver.apply(&Op::Advance(*gap));
        }
        // Any pulse still running clears within one shake duration.
        driver.apply(&Op::Advance(300));
        let id = driver.rig.stack.top_id().unwrap();
        prop_assert!(!driver.rig.stack.instance(id).unwrap().is_shaking());
        prop_assert!(!driver.rig.stack.is_closing(id));
        driver.finish();
    }
}

#[test]
fn scripted_sequence() {
    let mut driver = Driver::new();
    let script = [
        Op::Open { backdrop: modalkit::Backdrop::Dismiss, keyboard: true },
        Op::Open { backdrop: modalkit::Backdrop::Static, keyboard: true },
        Op::Open { backdrop: modalkit::Backdrop::Disabled, keyboard: false },
        Op::Escape,
        Op::ClickBackdrop(1),
        Op::Change(0, 7),
        Op::ViewClose(0),
        Op::Advance(10),
        Op::Close(2),
        Op::Escape,
        Op::Advance(199),
        Op::ViewChange(1, 3),
        Op::Advance(1),
        Op::DismissAll,
        Op::Advance(500),
    ];
    for op in &script {
        driver.apply(op);
    }
    assert_eq!(driver.opened(), 3);
    assert!(driver.rig.stack.is_empty());
    driver.finish();
}
