#![forbid(unsafe_code)]

//! Core primitives for modalkit.
//!
//! Everything here is independent of how a modal is drawn:
//!
//! - [`ModalId`]: process-unique modal identifiers.
//! - [`KeyEvent`]: the minimal key model the stack routes (Escape handling).
//! - [`Clock`]: injectable time source ([`SystemClock`], and `ManualClock`
//!   behind the `test-helpers` feature).
//! - [`TimerQueue`]: deadline-ordered timers with cancellation.
//! - [`Deferred`] / [`Settle`]: the one-shot result channel handed to callers.
//! - [`KeyListeners`]: explicit subscribe/unsubscribe registry for key input.
//! - [`ScrollLock`]: reference-counted scroll lock over a [`ScrollSurface`].
//! - [`ModalTimings`]: presentation timing policy.

pub mod clock;
pub mod deferred;
pub mod event;
pub mod id;
pub mod listener;
pub mod scroll_lock;
pub mod timer;
pub mod timing;

#[cfg(any(test, feature = "test-helpers"))]
pub use clock::ManualClock;
pub use clock::{Clock, SystemClock};
pub use deferred::{Deferred, Settle, deferred};
pub use event::{KeyCode, KeyEvent, KeyEventKind, Modifiers};
pub use id::ModalId;
pub use listener::{KeyListeners, ListenerId};
pub use scroll_lock::{FlagSurface, ScrollLock, ScrollLockGuard, ScrollSurface};
pub use timer::{TimerId, TimerQueue};
#[cfg(feature = "policy-config")]
pub use timing::ConfigError;
pub use timing::ModalTimings;

pub use web_time::{Duration, Instant};
