#![forbid(unsafe_code)]

//! Deterministic test rig for modalkit.
//!
//! [`Rig`] wires a [`ModalStack`] to a [`ManualClock`] and a
//! [`RecordingSurface`], so lifecycle tests advance time explicitly and can
//! assert on every scroll-lock transition the stack caused.
//!
//! Frames are compared as JSON through [`frames_json`]: the shape is stable
//! across runs (ids are replaced by stack position) which keeps expected
//! values readable inline.
//!
//! # Example
//!
//! ```
//! use modalkit::{ModalOptions, ModalView};
//! use modalkit_harness::Rig;
//!
//! let mut rig: Rig<(), ()> = Rig::new();
//! let _result = rig
//!     .stack
//!     .open(ModalView::Static("hi".into()), (), ModalOptions::default());
//! rig.advance(10);
//! assert_eq!(rig.snapshot()[0]["shown"], true);
//! ```

pub mod ops;

use std::cell::RefCell;
use std::rc::Rc;

use modalkit::{
    Deferred, InstancePhase, ModalFrame, ModalOptions, ModalStack, ModalTimings, ModalView,
};
use modalkit_core::{Duration, KeyEvent, ManualClock, ScrollLock, ScrollSurface};
use serde_json::{Value, json};

#[derive(Debug, Default)]
struct ProbeState {
    locked: bool,
    /// Every `set_locked` call, in order.
    writes: Vec<bool>,
}

/// Test-side view of a [`RecordingSurface`].
#[derive(Debug, Clone, Default)]
pub struct SurfaceProbe {
    state: Rc<RefCell<ProbeState>>,
}

impl SurfaceProbe {
    /// A probe whose surface starts unlocked.
    pub fn new() -> Self {
        Self::default()
    }

    /// A probe whose surface is already locked by someone else.
    pub fn pre_locked() -> Self {
        let probe = Self::default();
        probe.state.borrow_mut().locked = true;
        probe
    }

    /// The surface half, to hand to a [`ScrollLock`].
    pub fn surface(&self) -> RecordingSurface {
        RecordingSurface {
            state: Rc::clone(&self.state),
        }
    }

    pub fn is_locked(&self) -> bool {
        self.state.borrow().locked
    }

    /// Every lock/unlock written to the surface.
    pub fn writes(&self) -> Vec<bool> {
        self.state.borrow().writes.clone()
    }
}

/// Scroll surface that records every write.
#[derive(Debug)]
pub struct RecordingSurface {
    state: Rc<RefCell<ProbeState>>,
}

impl ScrollSurface for RecordingSurface {
    fn is_locked(&self) -> bool {
        self.state.borrow().locked
    }

    fn set_locked(&mut self, locked: bool) {
        let mut state = self.state.borrow_mut();
        state.locked = locked;
        state.writes.push(locked);
    }
}

/// A stack over string content with a manual clock and a recorded surface.
pub struct Rig<M, R> {
    pub stack: ModalStack<M, R, String>,
    pub clock: ManualClock,
    pub probe: SurfaceProbe,
    pub lock: ScrollLock,
}

impl<M, R> Default for Rig<M, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M, R> Rig<M, R> {
    /// Rig with the default timings (10 ms reveal, 300 ms shake, 200 ms grace).
    pub fn new() -> Self {
        Self::with_probe(SurfaceProbe::new(), ModalTimings::default())
    }

    pub fn with_timings(timings: ModalTimings) -> Self {
        Self::with_probe(SurfaceProbe::new(), timings)
    }

    pub fn with_probe(probe: SurfaceProbe, timings: ModalTimings) -> Self {
        let clock = ManualClock::new();
        let lock = ScrollLock::new(probe.surface());
        let stack = ModalStack::new()
            .with_clock(clock.clone())
            .with_scroll_lock(lock.clone())
            .with_timings(timings);
        Self {
            stack,
            clock,
            probe,
            lock,
        }
    }

    /// Open a modal whose options come from a JSON literal.
    ///
    /// # Panics
    ///
    /// Panics if `options` is not a valid `ModalOptions` document.
    pub fn open_json(&mut self, view: ModalView<M, R, String>, model: M, options: Value) -> Deferred<R> {
        let options: ModalOptions = match serde_json::from_value(options) {
            Ok(options) => options,
            Err(err) => panic!("invalid modal options fixture: {err}"),
        };
        self.stack.open(view, model, options)
    }

    /// Advance the clock and tick. Returns the number of timers fired.
    pub fn advance(&mut self, ms: u64) -> usize {
        self.clock.advance(Duration::from_millis(ms));
        let fired = self.stack.tick();
        tracing::trace!(ms, fired, depth = self.stack.len(), "rig advanced");
        fired
    }

    /// Press Escape. Returns the number of modals that started closing.
    pub fn escape(&mut self) -> usize {
        self.stack.handle_key(&KeyEvent::escape())
    }

    pub fn frames(&self) -> Vec<ModalFrame<String>> {
        self.stack.render()
    }

    /// Current frames as JSON, see [`frames_json`].
    pub fn snapshot(&self) -> Value {
        frames_json(&self.frames())
    }
}

/// Stable JSON shape for a list of frames.
///
/// `id` is omitted (process-global counter); `pos` is the stack position.
pub fn frames_json(frames: &[ModalFrame<String>]) -> Value {
    Value::Array(
        frames
            .iter()
            .enumerate()
            .map(|(pos, frame)| {
                json!({
                    "pos": pos,
                    "z": frame.z_index,
                    "phase": phase_name(frame.phase),
                    "shown": frame.shown,
                    "shaking": frame.shaking,
                    "backdrop": frame.backdrop.map(|b| json!({
                        "shown": b.shown,
                        "static": b.is_static,
                    })),
                    "classes": frame.dialog_classes,
                    "autofocus": frame.autofocus,
                    "content": frame.content,
                })
            })
            .collect(),
    )
}

fn phase_name(phase: InstancePhase) -> &'static str {
    match phase {
        InstancePhase::Entering => "entering",
        InstancePhase::Shown => "shown",
        InstancePhase::Closing => "closing",
    }
}
