#![forbid(unsafe_code)]

//! Reference-counted scroll lock.
//!
//! While any modal is open the host's scrollable surface (the document body,
//! a terminal viewport, ...) must not scroll. The surface itself is a
//! collaborator behind [`ScrollSurface`]; this module owns the policy.
//!
//! # Lifecycle Guarantees
//!
//! 1. **Prior state is restored** - The first [`ScrollLockGuard`] records the
//!    surface's lock state before locking it; dropping the last guard writes
//!    that state back rather than blindly unlocking.
//!
//! 2. **Any release order** - Guards are counted, so several stacks sharing
//!    one [`ScrollLock`] may release in any order.
//!
//! 3. **Drop releases** - Guards release in [`Drop`], so a stack that is torn
//!    down while modals are open still unlocks the surface.
//!
//! # Example
//!
//! ```
//! use modalkit_core::ScrollLock;
//!
//! let lock = ScrollLock::headless();
//! assert!(!lock.is_locked());
//! let guard = lock.acquire();
//! assert!(lock.is_locked());
//! drop(guard);
//! assert!(!lock.is_locked());
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A surface whose scrolling can be locked.
pub trait ScrollSurface {
    /// Whether scrolling is currently locked.
    fn is_locked(&self) -> bool;

    /// Lock or unlock scrolling.
    fn set_locked(&mut self, locked: bool);
}

/// In-memory surface for headless hosts and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlagSurface {
    locked: bool,
}

impl FlagSurface {
    /// A surface starting in the given state.
    pub const fn new(locked: bool) -> Self {
        Self { locked }
    }
}

impl ScrollSurface for FlagSurface {
    fn is_locked(&self) -> bool {
        self.locked
    }

    fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }
}

struct LockState {
    surface: Box<dyn ScrollSurface>,
    holders: usize,
    /// Surface state captured by the first holder.
    prior: bool,
}

/// Shared handle to a scroll surface. Clones refer to the same lock.
#[derive(Clone)]
pub struct ScrollLock {
    state: Rc<RefCell<LockState>>,
}

impl ScrollLock {
    /// Wrap a surface.
    pub fn new(surface: impl ScrollSurface + 'static) -> Self {
        Self {
            state: Rc::new(RefCell::new(LockState {
                surface: Box::new(surface),
                holders: 0,
                prior: false,
            })),
        }
    }

    /// A lock over an in-memory [`FlagSurface`].
    pub fn headless() -> Self {
        Self::new(FlagSurface::default())
    }

    /// Acquire the lock. Dropping the guard releases it.
    #[must_use = "dropping this guard releases the scroll lock"]
    pub fn acquire(&self) -> ScrollLockGuard {
        let mut state = self.state.borrow_mut();
        if state.holders == 0 {
            state.prior = state.surface.is_locked();
            state.surface.set_locked(true);
            tracing::debug!(prior = state.prior, "scroll lock acquired");
        }
        state.holders += 1;
        ScrollLockGuard {
            state: Rc::clone(&self.state),
        }
    }

    /// Whether the underlying surface is locked.
    pub fn is_locked(&self) -> bool {
        self.state.borrow().surface.is_locked()
    }

    /// Number of outstanding guards.
    pub fn holders(&self) -> usize {
        self.state.borrow().holders
    }
}

impl Default for ScrollLock {
    fn default() -> Self {
        Self::headless()
    }
}

impl fmt::Debug for ScrollLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("ScrollLock")
            .field("holders", &state.holders)
            .field("locked", &state.surface.is_locked())
            .finish()
    }
}

/// RAII guard for one holder of a [`ScrollLock`].
#[must_use = "dropping this guard releases the scroll lock"]
pub struct ScrollLockGuard {
    state: Rc<RefCell<LockState>>,
}

impl fmt::Debug for ScrollLockGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollLockGuard").finish_non_exhaustive()
    }
}

impl Drop for ScrollLockGuard {
    fn drop(&mut self) {
        let mut state = self.state.borrow_mut();
        state.holders = state.holders.saturating_sub(1);
        if state.holders == 0 {
            let prior = state.prior;
            state.surface.set_locked(prior);
            tracing::debug!(restored = prior, "scroll lock released");
        }
    }
}
