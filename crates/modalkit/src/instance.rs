#![forbid(unsafe_code)]

//! Per-modal lifecycle controller.
//!
//! A [`ModalInstance`] owns the transient visual state of one open modal and
//! reconciles its close triggers (Escape, backdrop click, view close, view
//! change) into a single terminal transition.
//!
//! # State Machine
//!
//! ```text
//!   mount ──► Entering ──(reveal timer)──► Shown
//!                │                           │
//!                └──────(first trigger)──────┴──► Closing ──► unmount
//! ```
//!
//! - `Entering`: mounted hidden; a reveal timer flips it to `Shown` so the
//!   entry transition actually runs.
//! - `Closing`: hidden; every further trigger is a no-op.
//!
//! # Invariants
//!
//! - At most one transition into `Closing` per instance.
//! - A pending reveal is cancelled on close, so a closing modal never
//!   re-shows.
//! - Unmount releases every timer and the key-listener subscription the
//!   instance acquired.
//! - With [`Backdrop::Disabled`] no backdrop click ever reaches the close path.

use modalkit_core::{Instant, KeyListeners, ListenerId, ModalId, TimerId, TimerQueue};

use crate::options::{Backdrop, ModalOptions};

/// Timer payloads scheduled by the stack and its instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ModalTimer {
    pub(crate) modal: ModalId,
    pub(crate) kind: TimerKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TimerKind {
    /// Flip from hidden to shown after mount.
    Reveal,
    /// End of a static-backdrop shake pulse.
    ShakeClear,
    /// End of the close grace period.
    Remove,
}

/// Visual phase of a modal instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstancePhase {
    Entering,
    Shown,
    Closing,
}

/// What a backdrop click did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackdropOutcome {
    /// The modal started closing.
    Closed,
    /// The backdrop is static; a shake pulse started.
    Shook,
    /// Nothing happened (no backdrop, already closing, or unknown modal).
    Ignored,
}

/// The trigger that closed a modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloseTrigger {
    Escape,
    Backdrop,
    /// The view called `close()`.
    View,
    /// The view called `change(result)`.
    Change,
    /// The host called `ModalStack::close`.
    Programmatic,
}

/// Controller for one open modal.
#[derive(Debug)]
pub struct ModalInstance {
    id: ModalId,
    backdrop: Backdrop,
    keyboard: bool,
    phase: InstancePhase,
    shaking: bool,
    reveal_timer: Option<TimerId>,
    shake_timer: Option<TimerId>,
    listener: Option<ListenerId>,
}

impl ModalInstance {
    /// Mount hidden, schedule the reveal and subscribe to key input.
    pub(crate) fn mount(
        id: ModalId,
        options: &ModalOptions,
        reveal_at: Instant,
        timers: &mut TimerQueue<ModalTimer>,
        listeners: &mut KeyListeners<ModalId>,
    ) -> Self {
        let reveal_timer = timers.schedule(
            reveal_at,
            ModalTimer {
                modal: id,
                kind: TimerKind::Reveal,
            },
        );
        let listener = listeners.subscribe(id);
        Self {
            id,
            backdrop: options.backdrop,
            keyboard: options.keyboard,
            phase: InstancePhase::Entering,
            shaking: false,
            reveal_timer: Some(reveal_timer),
            shake_timer: None,
            listener: Some(listener),
        }
    }

    pub fn id(&self) -> ModalId {
        self.id
    }

    pub fn phase(&self) -> InstancePhase {
        self.phase
    }

    /// Whether the instance is in its shown visual state.
    pub fn is_shown(&self) -> bool {
        self.phase == InstancePhase::Shown
    }

    pub fn is_shaking(&self) -> bool {
        self.shaking
    }

    pub fn is_closing(&self) -> bool {
        self.phase == InstancePhase::Closing
    }

    /// Whether Escape should close this instance.
    pub fn closes_on_escape(&self) -> bool {
        self.keyboard && !self.is_closing()
    }

    /// Whether the instance still holds its key-listener subscription.
    pub fn is_listening(&self) -> bool {
        self.listener.is_some()
    }

    /// Reveal timer fired.
    pub(crate) fn reveal(&mut self, timer: TimerId) {
        if self.reveal_timer != Some(timer) {
            return;
        }
        self.reveal_timer = None;
        if self.phase == InstancePhase::Entering {
            self.phase = InstancePhase::Shown;
            tracing::trace!(modal = %self.id, "modal shown");
        }
    }

    /// Shake-clear timer fired.
    pub(crate) fn clear_shake(&mut self, timer: TimerId) {
        if self.shake_timer != Some(timer) {
            return;
        }
        self.shake_timer = None;
        self.shaking = false;
    }

    /// React to a click on this instance's backdrop.
    ///
    /// `Closed` means the caller must run the close path; the instance has
    /// not changed phase yet.
    pub(crate) fn backdrop_click(
        &mut self,
        shake_until: Instant,
        timers: &mut TimerQueue<ModalTimer>,
    ) -> BackdropOutcome {
        if self.is_closing() {
            return BackdropOutcome::Ignored;
        }
        match self.backdrop {
            Backdrop::Disabled => BackdropOutcome::Ignored,
            Backdrop::Dismiss => BackdropOutcome::Closed,
            Backdrop::Static => {
                // A click mid-pulse restarts the pulse rather than letting the
                // older timer cut the new one short.
                if let Some(previous) = self.shake_timer.take() {
                    timers.cancel(previous);
                }
                self.shaking = true;
                self.shake_timer = Some(timers.schedule(
                    shake_until,
                    ModalTimer {
                        modal: self.id,
                        kind: TimerKind::ShakeClear,
                    },
                ));
                tracing::trace!(modal = %self.id, "static backdrop shake");
                BackdropOutcome::Shook
            }
        }
    }

    /// Enter `Closing`. Returns `false` if already closing.
    pub(crate) fn begin_close(&mut self, timers: &mut TimerQueue<ModalTimer>) -> bool {
        if self.is_closing() {
            return false;
        }
        if let Some(reveal) = self.reveal_timer.take() {
            timers.cancel(reveal);
        }
        self.phase = InstancePhase::Closing;
        true
    }

    /// Release every timer and the key-listener subscription.
    pub(crate) fn unmount(
        &mut self,
        timers: &mut TimerQueue<ModalTimer>,
        listeners: &mut KeyListeners<ModalId>,
    ) {
        if let Some(reveal) = self.reveal_timer.take() {
            timers.cancel(reveal);
        }
        if let Some(shake) = self.shake_timer.take() {
            timers.cancel(shake);
        }
        self.shaking = false;
        if let Some(listener) = self.listener.take()
            && listeners.unsubscribe(listener).is_none()
        {
            tracing::warn!(modal = %self.id, "key listener was already released");
        }
    }
}
