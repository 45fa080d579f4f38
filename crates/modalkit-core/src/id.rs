#![forbid(unsafe_code)]

//! Process-unique modal identifiers.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter for unique modal IDs.
static MODAL_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for an open modal.
///
/// IDs come from a process-wide counter: two stacks never hand out the same
/// value and a removed modal's ID is never issued again. The view layer can
/// use the ID as a reconciliation key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModalId(u64);

impl ModalId {
    /// Allocate the next unique modal ID.
    pub fn next() -> Self {
        Self(MODAL_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }

    /// Rebuild an ID from a raw value reported back by the view layer.
    ///
    /// This does not allocate; a raw value that was never issued simply
    /// matches no open modal.
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ModalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "modal-{}", self.0)
    }
}
