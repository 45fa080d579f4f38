#![forbid(unsafe_code)]

//! Scoped key-listener registry.
//!
//! Each mounted modal acquires exactly one subscription on mount and releases
//! it on unmount. Subscriptions are explicit ([`KeyListeners::subscribe`] /
//! [`KeyListeners::unsubscribe`]) so the owner of the registry can verify that
//! nothing leaks across instances.
//!
//! # Invariants
//!
//! - Subscriptions are kept in subscription order; [`KeyListeners::top_down`]
//!   yields the most recent first.
//! - A [`ListenerId`] is never reused by the same registry.

/// Handle to a key-listener subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Ordered set of key-listener subscriptions, each tagged with its owner.
#[derive(Debug)]
pub struct KeyListeners<T> {
    listeners: Vec<(ListenerId, T)>,
    next_id: u64,
}

impl<T> Default for KeyListeners<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> KeyListeners<T> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
            next_id: 1,
        }
    }

    /// Register a listener for `owner`.
    pub fn subscribe(&mut self, owner: T) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, owner));
        id
    }

    /// Remove a listener, returning its owner.
    ///
    /// Returns `None` if the subscription was already released.
    pub fn unsubscribe(&mut self, id: ListenerId) -> Option<T> {
        let idx = self.listeners.iter().position(|(lid, _)| *lid == id)?;
        Some(self.listeners.remove(idx).1)
    }

    /// Whether the subscription is active.
    pub fn contains(&self, id: ListenerId) -> bool {
        self.listeners.iter().any(|(lid, _)| *lid == id)
    }

    /// Number of active subscriptions.
    #[inline]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Whether no subscriptions are active.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Owners from most recently subscribed to oldest.
    pub fn top_down(&self) -> impl Iterator<Item = &T> {
        self.listeners.iter().rev().map(|(_, owner)| owner)
    }
}
