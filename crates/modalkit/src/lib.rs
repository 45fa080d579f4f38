#![forbid(unsafe_code)]

//! Modal dialog orchestration.
//!
//! [`ModalStack`] keeps the ordered set of open modals and hands every caller
//! a [`Deferred`] result. Each open modal is driven by a [`ModalInstance`]
//! that owns its presentation lifecycle: a short reveal after mount, the
//! shake pulse on static backdrops, Escape handling, and the grace period
//! that lets the exit transition play before the entry is dropped.
//!
//! The stack never sleeps. Hosts call [`ModalStack::tick`] from their event
//! loop (using [`ModalStack::next_deadline`] to know when), route keys through
//! [`ModalStack::handle_key`] and backdrop clicks through
//! [`ModalStack::click_backdrop`], and draw whatever [`ModalStack::render`]
//! returns.
//!
//! # Example
//!
//! ```
//! use futures::FutureExt;
//! use modalkit::{Backdrop, ModalOptions, ModalStack, ModalView, ViewProps};
//! use modalkit_core::ModalTimings;
//!
//! let mut stack: ModalStack<String, bool, String> =
//!     ModalStack::new().with_timings(ModalTimings::instant());
//!
//! let mut answer = stack.open(
//!     ModalView::dynamic(|props: ViewProps<'_, String, bool>| {
//!         format!("Discard {}?", props.model)
//!     }),
//!     "draft.txt".to_owned(),
//!     ModalOptions::new().backdrop(Backdrop::Static),
//! );
//!
//! let frames = stack.render();
//! assert_eq!(frames[0].content, "Discard draft.txt?");
//!
//! stack.handle_change(answer.id(), true);
//! assert_eq!((&mut answer).now_or_never(), Some(Some(true)));
//! ```

pub mod frame;
pub mod instance;
pub mod options;
pub mod stack;
pub mod view;

pub use frame::{BackdropFrame, ModalFrame};
pub use instance::{BackdropOutcome, CloseTrigger, InstancePhase, ModalInstance};
pub use options::{Backdrop, ModalOptions, ModalSize};
pub use stack::{EntryState, ModalEntry, ModalStack};
pub use view::{ModalHandle, ModalView, RenderFn, ViewProps};

pub use modalkit_core::{
    Clock, Deferred, Duration, Instant, KeyCode, KeyEvent, KeyEventKind, ModalId, ModalTimings,
    Modifiers, ScrollLock, ScrollSurface, SystemClock,
};
