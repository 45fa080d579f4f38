#![forbid(unsafe_code)]

//! Random operation sequences against a [`Rig`].
//!
//! [`Driver`] applies [`Op`]s to a rig and, after every step, checks the
//! invariants that must hold for any interleaving:
//!
//! - ids in the stack are pairwise unique and z-order is strictly increasing;
//! - one key-listener subscription per entry, no timers once empty;
//! - Escape closes exactly the open entries that were opened with `keyboard`;
//! - the scroll lock is held exactly while the stack is non-empty;
//! - a result is observed iff its entry is closing or gone, exactly once,
//!   and with the value of the first terminal trigger.
//!
//! Index-carrying ops pick from every modal ever opened (modulo), so stale
//! ids are exercised as often as live ones.

use modalkit::{Backdrop, BackdropOutcome, Deferred, ModalId, ModalOptions, ModalView};
use proptest::prelude::*;

use crate::Rig;

/// One step of a generated scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Open { backdrop: Backdrop, keyboard: bool },
    Close(usize),
    Change(usize, u32),
    /// Close requested through a `ModalHandle`.
    ViewClose(usize),
    /// Result delivered through a `ModalHandle`.
    ViewChange(usize, u32),
    Escape,
    ClickBackdrop(usize),
    /// Advance the clock by this many milliseconds and tick.
    Advance(u64),
    DismissAll,
}

pub fn backdrop_strategy() -> impl Strategy<Value = Backdrop> {
    prop_oneof![
        Just(Backdrop::Dismiss),
        Just(Backdrop::Static),
        Just(Backdrop::Disabled),
    ]
}

pub fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (backdrop_strategy(), any::<bool>())
            .prop_map(|(backdrop, keyboard)| Op::Open { backdrop, keyboard }),
        2 => any::<usize>().prop_map(Op::Close),
        2 => (any::<usize>(), any::<u32>()).prop_map(|(i, v)| Op::Change(i, v)),
        1 => any::<usize>().prop_map(Op::ViewClose),
        1 => (any::<usize>(), any::<u32>()).prop_map(|(i, v)| Op::ViewChange(i, v)),
        2 => Just(Op::Escape),
        2 => any::<usize>().prop_map(Op::ClickBackdrop),
        3 => (0u64..400).prop_map(Op::Advance),
        1 => Just(Op::DismissAll),
    ]
}

struct Tracked {
    id: ModalId,
    backdrop: Backdrop,
    keyboard: bool,
    result: Deferred<u32>,
    /// First terminal trigger, once known.
    expected: Option<Option<u32>>,
    /// Value observed from the deferred.
    observed: Option<Option<u32>>,
}

/// Applies ops to a [`Rig`] and checks invariants after each one.
pub struct Driver {
    pub rig: Rig<u32, u32>,
    opened: Vec<Tracked>,
}

impl Default for Driver {
    fn default() -> Self {
        Self::new()
    }
}

impl Driver {
    pub fn new() -> Self {
        Self {
            rig: Rig::new(),
            opened: Vec::new(),
        }
    }

    /// Number of modals opened so far.
    pub fn opened(&self) -> usize {
        self.opened.len()
    }

    fn pick(&self, index: usize) -> Option<ModalId> {
        if self.opened.is_empty() {
            return None;
        }
        Some(self.opened[index % self.opened.len()].id)
    }

    fn is_open(&self, id: ModalId) -> bool {
        self.rig.stack.contains(id) && !self.rig.stack.is_closing(id)
    }

    fn record_settlement(&mut self, id: ModalId, value: Option<u32>) {
        if let Some(tracked) = self.opened.iter_mut().find(|t| t.id == id) {
            assert!(
                tracked.expected.is_none(),
                "{id} settled by a second terminal trigger"
            );
            tracked.expected = Some(value);
        }
    }

    /// Apply one op, then check every invariant.
    pub fn apply(&mut self, op: &Op) {
        match *op {
            Op::Open { backdrop, keyboard } => {
                let n = self.opened.len() as u32;
                let result = self.rig.stack.open(
                    ModalView::Static(format!("modal {n}")),
                    n,
                    ModalOptions::new().backdrop(backdrop).keyboard(keyboard),
                );
                self.opened.push(Tracked {
                    id: result.id(),
                    backdrop,
                    keyboard,
                    result,
                    expected: None,
                    observed: None,
                });
            }
            Op::Close(i) => {
                if let Some(id) = self.pick(i) {
                    let was_open = self.is_open(id);
                    assert_eq!(self.rig.stack.close(id), was_open);
                    if was_open {
                        self.record_settlement(id, None);
                    }
                }
            }
            Op::Change(i, value) => {
                if let Some(id) = self.pick(i) {
                    let was_open = self.is_open(id);
                    assert_eq!(self.rig.stack.handle_change(id, value), was_open);
                    if was_open {
                        self.record_settlement(id, Some(value));
                    }
                }
            }
            Op::ViewClose(i) => {
                if let Some(handle) = self.pick(i).and_then(|id| self.rig.stack.handle(id)) {
                    let was_open = !self.rig.stack.is_closing(handle.id());
                    assert!(handle.close());
                    assert_eq!(self.rig.stack.process_intents(), usize::from(was_open));
                    if was_open {
                        self.record_settlement(handle.id(), None);
                    }
                }
            }
            Op::ViewChange(i, value) => {
                if let Some(handle) = self.pick(i).and_then(|id| self.rig.stack.handle(id)) {
                    let was_open = !self.rig.stack.is_closing(handle.id());
                    assert!(handle.change(value));
                    assert_eq!(self.rig.stack.process_intents(), usize::from(was_open));
                    if was_open {
                        self.record_settlement(handle.id(), Some(value));
                    }
                }
            }
            Op::Escape => {
                let targets: Vec<ModalId> = self
                    .opened
                    .iter()
                    .filter(|t| t.keyboard && self.is_open(t.id))
                    .map(|t| t.id)
                    .collect();
                let closed = self.rig.stack.handle_key(&modalkit::KeyEvent::escape());
                assert_eq!(closed, targets.len());
                for id in targets {
                    // Every open keyboard modal reacts, whatever sits above it.
                    assert!(self.rig.stack.is_closing(id));
                    self.record_settlement(id, None);
                }
            }
            Op::ClickBackdrop(i) => {
                if let Some(id) = self.pick(i) {
                    let len = self.rig.stack.len();
                    let was_open = self.is_open(id);
                    let outcome = self.rig.stack.click_backdrop(id);
                    let backdrop = self.opened[i % self.opened.len()].backdrop;
                    let want = match (was_open, backdrop) {
                        (false, _) | (true, Backdrop::Disabled) => BackdropOutcome::Ignored,
                        (true, Backdrop::Static) => BackdropOutcome::Shook,
                        (true, Backdrop::Dismiss) => BackdropOutcome::Closed,
                    };
                    assert_eq!(outcome, want);
                    assert_eq!(
                        self.rig.stack.len(),
                        len,
                        "backdrop clicks never remove synchronously"
                    );
                    if outcome == BackdropOutcome::Closed {
                        self.record_settlement(id, None);
                    }
                }
            }
            Op::Advance(ms) => {
                self.rig.advance(ms);
            }
            Op::DismissAll => {
                let open: Vec<ModalId> = self
                    .rig
                    .stack
                    .ids()
                    .into_iter()
                    .filter(|id| !self.rig.stack.is_closing(*id))
                    .collect();
                let len = self.rig.stack.len();
                assert_eq!(self.rig.stack.dismiss_all(), len);
                for id in open {
                    self.record_settlement(id, None);
                }
            }
        }
        self.check();
    }

    /// Check invariants against the current state.
    pub fn check(&mut self) {
        let stack = &self.rig.stack;
        let ids = stack.ids();

        let mut sorted = ids.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), ids.len(), "duplicate ids in stack");

        let z: Vec<u32> = stack.entries().map(|e| e.z_index()).collect();
        assert!(z.windows(2).all(|w| w[0] < w[1]), "z-order not increasing");

        assert_eq!(stack.listener_count(), stack.len());
        assert!(stack.pending_timers() <= 2 * stack.len());
        assert_eq!(stack.holds_scroll_lock(), !stack.is_empty());
        assert_eq!(self.rig.probe.is_locked(), !stack.is_empty());

        for tracked in &mut self.opened {
            if tracked.observed.is_none() {
                tracked.observed = tracked.result.try_settled();
            } else {
                assert!(
                    tracked.result.try_settled().is_none(),
                    "{} resolved twice",
                    tracked.id
                );
            }
            let terminal = !stack.contains(tracked.id) || stack.is_closing(tracked.id);
            assert_eq!(
                tracked.observed.is_some(),
                terminal,
                "{} resolution does not match its state",
                tracked.id
            );
            if let Some(observed) = tracked.observed {
                assert_eq!(Some(observed), tracked.expected, "{} resolved wrong", tracked.id);
            }
        }
    }

    /// Dismiss everything and check that every result was delivered once.
    pub fn finish(mut self) {
        let len = self.rig.stack.len();
        assert_eq!(self.rig.stack.dismiss_all(), len);
        for tracked in &mut self.opened {
            if tracked.expected.is_none() {
                tracked.expected = Some(None);
            }
        }
        self.check();
        assert!(self.opened.iter().all(|t| t.observed.is_some()));
        assert_eq!(self.rig.stack.pending_timers(), 0);
        assert!(!self.rig.lock.is_locked());
    }
}
