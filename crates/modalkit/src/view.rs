#![forbid(unsafe_code)]

//! Modal content and the hooks it uses to talk back to the stack.
//!
//! A modal's content is either a pre-built value ([`ModalView::Static`]) or a
//! render function ([`ModalView::Dynamic`]) that receives [`ViewProps`]: the
//! model plus a [`ModalHandle`]. The handle is how rendered content reports
//! "close" or "change(result)"; requests are queued and applied by the stack
//! on its next [`process_intents`](crate::ModalStack::process_intents) or
//! [`tick`](crate::ModalStack::tick).

use std::fmt;

use futures::channel::mpsc::UnboundedSender;
use modalkit_core::ModalId;

/// Render function signature for dynamic views.
pub type RenderFn<M, R, V> = dyn Fn(ViewProps<'_, M, R>) -> V;

/// Modal content.
pub enum ModalView<M, R, V> {
    /// Pre-built content, cloned into every frame.
    Static(V),
    /// Content produced from the model on every render.
    Dynamic(Box<RenderFn<M, R, V>>),
}

impl<M, R, V> ModalView<M, R, V> {
    /// Wrap a render function.
    pub fn dynamic(render: impl Fn(ViewProps<'_, M, R>) -> V + 'static) -> Self {
        Self::Dynamic(Box::new(render))
    }

    /// Whether this view is a render function.
    pub fn is_dynamic(&self) -> bool {
        matches!(self, Self::Dynamic(_))
    }
}

impl<M, R, V: fmt::Debug> fmt::Debug for ModalView<M, R, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(content) => f.debug_tuple("Static").field(content).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// Arguments passed to a dynamic view on each render.
pub struct ViewProps<'a, M, R> {
    pub model: &'a M,
    pub handle: ModalHandle<R>,
}

/// What a [`ModalHandle`] asked the stack to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum IntentKind<R> {
    Close,
    Change(R),
}

/// A queued request from a modal's content.
#[derive(Debug)]
pub(crate) struct Intent<R> {
    pub(crate) modal: ModalId,
    pub(crate) kind: IntentKind<R>,
}

/// Cloneable hook given to modal content.
///
/// Calls made after the modal has started closing, or after the stack is
/// gone, are ignored.
pub struct ModalHandle<R> {
    modal: ModalId,
    tx: UnboundedSender<Intent<R>>,
}

impl<R> Clone for ModalHandle<R> {
    fn clone(&self) -> Self {
        Self {
            modal: self.modal,
            tx: self.tx.clone(),
        }
    }
}

impl<R> fmt::Debug for ModalHandle<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalHandle")
            .field("modal", &self.modal)
            .finish()
    }
}

impl<R> ModalHandle<R> {
    pub(crate) fn new(modal: ModalId, tx: UnboundedSender<Intent<R>>) -> Self {
        Self { modal, tx }
    }

    /// The modal this handle controls.
    pub fn id(&self) -> ModalId {
        self.modal
    }

    /// Ask the stack to close the modal without a result.
    ///
    /// Returns `false` if the stack no longer exists.
    pub fn close(&self) -> bool {
        self.send(IntentKind::Close)
    }

    /// Ask the stack to close the modal with `result`.
    ///
    /// Returns `false` if the stack no longer exists.
    pub fn change(&self, result: R) -> bool {
        self.send(IntentKind::Change(result))
    }

    fn send(&self, kind: IntentKind<R>) -> bool {
        let queued = self
            .tx
            .unbounded_send(Intent {
                modal: self.modal,
                kind,
            })
            .is_ok();
        if !queued {
            tracing::trace!(modal = %self.modal, "intent dropped: modal stack is gone");
        }
        queued
    }
}
