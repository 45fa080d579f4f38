//! Fuzz target for modal stack operation sequences.
//!
//! Decodes arbitrary bytes into a sequence of stack operations and drives
//! them through the harness driver, which asserts the stack invariants after
//! every step (unique ids, one listener per entry, scroll lock held iff
//! non-empty, every result delivered exactly once).
//!
//! # Running
//! ```bash
//! cargo +nightly fuzz run fuzz_stack_ops
//! ```

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use modalkit::Backdrop;
use modalkit_harness::ops::{Driver, Op};

/// Upper bound on ops per input to keep iterations fast.
const MAX_OPS: usize = 256;

#[derive(Debug, Arbitrary)]
enum FuzzBackdrop {
    Dismiss,
    Static,
    Disabled,
}

#[derive(Debug, Arbitrary)]
enum FuzzOp {
    Open { backdrop: FuzzBackdrop, keyboard: bool },
    Close(u8),
    Change(u8, u32),
    ViewClose(u8),
    ViewChange(u8, u32),
    Escape,
    ClickBackdrop(u8),
    Advance(u16),
    DismissAll,
}

impl From<FuzzOp> for Op {
    fn from(op: FuzzOp) -> Self {
        match op {
            FuzzOp::Open { backdrop, keyboard } => Op::Open {
                backdrop: match backdrop {
                    FuzzBackdrop::Dismiss => Backdrop::Dismiss,
                    FuzzBackdrop::Static => Backdrop::Static,
                    FuzzBackdrop::Disabled => Backdrop::Disabled,
                },
                keyboard,
            },
            FuzzOp::Close(i) => Op::Close(usize::from(i)),
            FuzzOp::Change(i, v) => Op::Change(usize::from(i), v),
            FuzzOp::ViewClose(i) => Op::ViewClose(usize::from(i)),
            FuzzOp::ViewChange(i, v) => Op::ViewChange(usize::from(i), v),
            FuzzOp::Escape => Op::Escape,
            FuzzOp::ClickBackdrop(i) => Op::ClickBackdrop(usize::from(i)),
            FuzzOp::Advance(ms) => Op::Advance(u64::from(ms % 1000)),
            FuzzOp::DismissAll => Op::DismissAll,
        }
    }
}

fuzz_target!(|ops: Vec<FuzzOp>| {
    let mut driver = Driver::new();
    for op in ops.into_iter().take(MAX_OPS) {
        driver.apply(&op.into());
    }
    driver.finish();
});
