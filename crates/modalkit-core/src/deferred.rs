#![forbid(unsafe_code)]

//! One-shot result channel between a modal and the caller that opened it.
//!
//! [`deferred`] creates a linked pair: the stack keeps the [`Settle`] half
//! inside the modal entry and the caller receives the [`Deferred`] half.
//!
//! # Invariants
//!
//! 1. A `Settle` delivers at most one value. The first call to
//!    [`Settle::settle`] wins; later calls are silent no-ops that return
//!    `false`. Racing close paths (backdrop click vs. submit) rely on this.
//! 2. A `Deferred` always completes: with the settled value, or with `None`
//!    when the `Settle` half is dropped unsettled (e.g. the stack was torn
//!    down).
//!
//! # Failure Modes
//!
//! - Caller dropped the `Deferred` before settlement: the value is discarded
//!   and the settlement still counts as the one allowed delivery.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::oneshot;
use futures::future::FusedFuture;

use crate::id::ModalId;

/// Create a linked settle/deferred pair for modal `id`.
pub fn deferred<R>(id: ModalId) -> (Settle<R>, Deferred<R>) {
    let (tx, rx) = oneshot::channel();
    (
        Settle { id, tx: Some(tx) },
        Deferred {
            id,
            rx,
            finished: false,
        },
    )
}

/// The resolving half of a modal's result channel.
pub struct Settle<R> {
    id: ModalId,
    tx: Option<oneshot::Sender<Option<R>>>,
}

impl<R> Settle<R> {
    /// Deliver the modal's result.
    ///
    /// `None` is the dismissal value. Returns `true` if this call performed
    /// the settlement, `false` if the channel was already settled.
    pub fn settle(&mut self, value: Option<R>) -> bool {
        let Some(tx) = self.tx.take() else {
            tracing::trace!(modal = %self.id, "settle ignored: already settled");
            return false;
        };
        let dismissed = value.is_none();
        if tx.send(value).is_err() {
            tracing::trace!(modal = %self.id, "result discarded: caller dropped its handle");
        } else {
            tracing::trace!(modal = %self.id, dismissed, "result settled");
        }
        true
    }

    /// Whether the result has been delivered.
    pub fn is_settled(&self) -> bool {
        self.tx.is_none()
    }

    /// The modal this channel belongs to.
    pub fn id(&self) -> ModalId {
        self.id
    }
}

impl<R> fmt::Debug for Settle<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settle")
            .field("id", &self.id)
            .field("settled", &self.is_settled())
            .finish()
    }
}

/// The caller-facing half of a modal's result channel.
///
/// Resolves to `Some(result)` when the modal reports a value and to `None`
/// when it is dismissed. Works with any executor; single-threaded hosts can
/// poll it without one through [`Deferred::try_settled`].
#[must_use = "the modal result is delivered through this handle"]
pub struct Deferred<R> {
    id: ModalId,
    rx: oneshot::Receiver<Option<R>>,
    finished: bool,
}

impl<R> Deferred<R> {
    /// The modal this result belongs to.
    pub fn id(&self) -> ModalId {
        self.id
    }

    /// Non-blocking check for the result.
    ///
    /// Returns `None` while the modal is unresolved and `Some(value)` once it
    /// has settled. The value is handed out once; after that this returns
    /// `None` again.
    pub fn try_settled(&mut self) -> Option<Option<R>> {
        if self.finished {
            return None;
        }
        let out = match self.rx.try_recv() {
            Ok(Some(value)) => Some(value),
            Ok(None) => None,
            Err(oneshot::Canceled) => Some(None),
        };
        self.finished = out.is_some();
        out
    }
}

impl<R> Future for Deferred<R> {
    type Output = Option<R>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        if this.finished {
            return Poll::Pending;
        }
        match Pin::new(&mut this.rx).poll(cx) {
            Poll::Ready(Ok(value)) => {
                this.finished = true;
                Poll::Ready(value)
            }
            Poll::Ready(Err(oneshot::Canceled)) => {
                this.finished = true;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<R> FusedFuture for Deferred<R> {
    fn is_terminated(&self) -> bool {
        self.finished
    }
}

impl<R> fmt::Debug for Deferred<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("id", &self.id)
            .field("finished", &self.finished)
            .finish()
    }
}
