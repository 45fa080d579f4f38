#![forbid(unsafe_code)]

//! Modal stack manager.
//!
//! [`ModalStack`] owns every open modal: it allocates entries on
//! [`open`](ModalStack::open), hands the caller a [`Deferred`] result, mounts
//! one [`ModalInstance`] per entry, delivers Escape to every mounted modal,
//! routes backdrop clicks, pumps timers, and removes entries once their exit
//! transition has had time to play.
//!
//! # Entry Lifecycle
//!
//! ```text
//!   open ──► Open ──(close / change / Escape / backdrop)──► Closing ──(grace)──► Removed
//!              │                                                                   ▲
//!              └────────────────────────── dismiss_all ────────────────────────────┘
//! ```
//!
//! # Invariants
//!
//! - Stack order is open order and doubles as z-order; entries are never
//!   reordered. Z-index allocation restarts at the base once the stack
//!   empties.
//! - Every entry's result is settled exactly once: `Some(result)` through
//!   [`handle_change`](ModalStack::handle_change), `None` through every other
//!   path. Later attempts are no-ops.
//! - A closing entry stays in the stack (and keeps rendering) until its grace
//!   timer fires; it never returns to `Open`.
//! - The scroll lock is held exactly while the stack is non-empty, and is
//!   released when the stack is dropped.
//! - A removed entry owns no timers and no key-listener subscription.
//!
//! # Failure Modes
//!
//! - `close` / `handle_change` for an unknown or closing modal return `false`.
//! - `click_backdrop` for an unknown modal returns
//!   [`BackdropOutcome::Ignored`].
//! - `dismiss_all` on an empty stack returns `0`.
//! - Handle intents for modals that are gone are dropped during
//!   [`process_intents`](ModalStack::process_intents).
//!
//! # Example
//!
//! ```
//! use futures::FutureExt;
//! use modalkit::{ModalOptions, ModalStack, ModalView};
//! use modalkit_core::{KeyEvent, ModalTimings};
//!
//! let mut stack: ModalStack<(), bool, &str> =
//!     ModalStack::new().with_timings(ModalTimings::instant());
//!
//! let mut result = stack.open(
//!     ModalView::Static("Delete file?"),
//!     (),
//!     ModalOptions::new().keyboard(true),
//! );
//! assert_eq!(stack.len(), 1);
//!
//! stack.handle_key(&KeyEvent::escape());
//! assert_eq!((&mut result).now_or_never(), Some(None));
//!
//! stack.tick();
//! assert!(stack.is_empty());
//! ```

use std::mem;

use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures::{FutureExt, StreamExt};
use modalkit_core::{
    Clock, Deferred, Instant, KeyEvent, KeyListeners, ModalId, ModalTimings, ScrollLock,
    ScrollLockGuard, Settle, SystemClock, TimerId, TimerQueue, deferred,
};

use crate::frame::{BackdropFrame, ModalFrame};
use crate::instance::{BackdropOutcome, CloseTrigger, ModalInstance, ModalTimer, TimerKind};
use crate::options::{Backdrop, ModalOptions};
use crate::view::{Intent, IntentKind, ModalHandle, ModalView, ViewProps};

/// Base z-index for modal layer.
const BASE_MODAL_Z: u32 = 1000;

/// Z-index increment between modals (leaves room for internal layers).
const Z_INCREMENT: u32 = 10;

/// Stack-side state of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryState {
    Open,
    /// Result settled; waiting for the grace period to end.
    Closing,
}

/// The durable record of one open modal.
pub struct ModalEntry<M, R, V> {
    id: ModalId,
    view: ModalView<M, R, V>,
    model: M,
    options: ModalOptions,
    settle: Settle<R>,
    state: EntryState,
    z_index: u32,
}

impl<M, R, V> ModalEntry<M, R, V> {
    pub fn id(&self) -> ModalId {
        self.id
    }

    pub fn view(&self) -> &ModalView<M, R, V> {
        &self.view
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Options captured at open time.
    pub fn options(&self) -> &ModalOptions {
        &self.options
    }

    pub fn state(&self) -> EntryState {
        self.state
    }

    pub fn z_index(&self) -> u32 {
        self.z_index
    }

    /// Whether the caller's result has been delivered.
    pub fn is_settled(&self) -> bool {
        self.settle.is_settled()
    }
}

/// An entry together with its controller.
struct ActiveModal<M, R, V> {
    entry: ModalEntry<M, R, V>,
    instance: ModalInstance,
    /// Grace-period timer, set once closing.
    removal: Option<TimerId>,
}

/// Stack of open modals.
///
/// Generic over the model `M` handed to views, the result `R` delivered to
/// callers, and the rendered content `V` produced by views.
pub struct ModalStack<M, R, V> {
    /// Open modals in z-order (bottom to top).
    modals: Vec<ActiveModal<M, R, V>>,
    timers: TimerQueue<ModalTimer>,
    listeners: KeyListeners<ModalId>,
    intent_tx: UnboundedSender<Intent<R>>,
    intent_rx: UnboundedReceiver<Intent<R>>,
    scroll_lock: ScrollLock,
    scroll_guard: Option<ScrollLockGuard>,
    timings: ModalTimings,
    clock: Box<dyn Clock>,
    /// Next z offset to assign.
    next_z: u32,
}

impl<M, R, V> Default for ModalStack<M, R, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M, R, V> ModalStack<M, R, V> {
    /// Create an empty stack with default timings, the system clock and a
    /// headless scroll lock.
    pub fn new() -> Self {
        let (intent_tx, intent_rx) = mpsc::unbounded();
        Self {
            modals: Vec::new(),
            timers: TimerQueue::new(),
            listeners: KeyListeners::new(),
            intent_tx,
            intent_rx,
            scroll_lock: ScrollLock::headless(),
            scroll_guard: None,
            timings: ModalTimings::default(),
            clock: Box::new(SystemClock),
            next_z: 0,
        }
    }

    /// Use a different time source.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Use a shared scroll lock (e.g. over the real document surface).
    #[must_use]
    pub fn with_scroll_lock(mut self, lock: ScrollLock) -> Self {
        self.scroll_guard = None;
        self.scroll_lock = lock;
        self.sync_scroll_lock();
        self
    }

    /// Use different transition timings for modals opened from now on.
    #[must_use]
    pub fn with_timings(mut self, timings: ModalTimings) -> Self {
        self.timings = timings;
        self
    }

    pub fn timings(&self) -> &ModalTimings {
        &self.timings
    }

    // --- Stack Operations ---

    /// Open a modal and return its deferred result.
    ///
    /// The entry is appended on top of the stack and mounted hidden; it
    /// becomes shown once the reveal delay has elapsed and [`tick`](Self::tick)
    /// runs.
    pub fn open(
        &mut self,
        view: ModalView<M, R, V>,
        model: M,
        options: ModalOptions,
    ) -> Deferred<R> {
        let id = ModalId::next();
        let (settle, result) = deferred(id);
        let z_index = BASE_MODAL_Z.saturating_add(self.next_z);
        self.next_z = self.next_z.saturating_add(Z_INCREMENT);

        let reveal_at = self.clock.now() + self.timings.reveal_delay;
        let instance = ModalInstance::mount(
            id,
            &options,
            reveal_at,
            &mut self.timers,
            &mut self.listeners,
        );

        tracing::debug!(
            modal = %id,
            depth = self.modals.len() + 1,
            backdrop = ?options.backdrop,
            keyboard = options.keyboard,
            "modal opened"
        );

        self.modals.push(ActiveModal {
            entry: ModalEntry {
                id,
                view,
                model,
                options,
                settle,
                state: EntryState::Open,
                z_index,
            },
            instance,
            removal: None,
        });
        self.sync_scroll_lock();
        result
    }

    /// Open a modal with a default model and default options.
    pub fn open_view(&mut self, view: ModalView<M, R, V>) -> Deferred<R>
    where
        M: Default,
    {
        self.open(view, M::default(), ModalOptions::default())
    }

    /// Close a modal without a result.
    ///
    /// The caller's result resolves to `None` (unless it was already settled)
    /// and the entry is removed after the grace period. Returns `false` if the
    /// modal is unknown or already closing.
    pub fn close(&mut self, id: ModalId) -> bool {
        self.finish(id, None, CloseTrigger::Programmatic)
    }

    /// Deliver `result` to the caller and close the modal.
    ///
    /// Returns `false` (dropping `result`) if the modal is unknown or already
    /// closing.
    pub fn handle_change(&mut self, id: ModalId, result: R) -> bool {
        self.finish(id, Some(result), CloseTrigger::Change)
    }

    /// Resolve every open modal with `None` and clear the stack immediately.
    ///
    /// No grace period. Returns the number of modals removed.
    pub fn dismiss_all(&mut self) -> usize {
        if self.modals.is_empty() {
            return 0;
        }
        let dismissed = mem::take(&mut self.modals);
        let count = dismissed.len();
        for mut active in dismissed {
            active.entry.settle.settle(None);
            active
                .instance
                .unmount(&mut self.timers, &mut self.listeners);
            if let Some(removal) = active.removal.take() {
                self.timers.cancel(removal);
            }
        }
        self.next_z = 0;
        self.sync_scroll_lock();
        tracing::debug!(count, "dismissed all modals");
        count
    }

    // --- Input ---

    /// Route a key event.
    ///
    /// Every mounted modal holds its own key-listener subscription, so an
    /// Escape press reaches all of them: each one with the `keyboard` option
    /// that is not already closing starts closing. Modals without `keyboard`
    /// ignore it and never shield the modals below. Returns the number of
    /// modals that started closing.
    pub fn handle_key(&mut self, event: &KeyEvent) -> usize {
        if !event.is_escape_press() {
            return 0;
        }
        let targets: Vec<ModalId> = self
            .listeners
            .top_down()
            .copied()
            .filter(|id| {
                self.instance(*id)
                    .is_some_and(ModalInstance::closes_on_escape)
            })
            .collect();
        if targets.is_empty() {
            tracing::trace!(
                listeners = self.listeners.len(),
                "escape ignored: no modal closes on escape"
            );
            return 0;
        }
        targets
            .into_iter()
            .filter(|id| self.finish(*id, None, CloseTrigger::Escape))
            .count()
    }

    /// Handle a click on a modal's backdrop.
    pub fn click_backdrop(&mut self, id: ModalId) -> BackdropOutcome {
        let shake_until = self.clock.now() + self.timings.shake_duration;
        let Some(active) = self.modals.iter_mut().find(|m| m.entry.id == id) else {
            tracing::trace!(modal = %id, "backdrop click ignored: modal not open");
            return BackdropOutcome::Ignored;
        };
        let outcome = active
            .instance
            .backdrop_click(shake_until, &mut self.timers);
        if outcome == BackdropOutcome::Closed {
            self.finish(id, None, CloseTrigger::Backdrop);
        }
        outcome
    }

    /// A handle for driving a modal from outside its view.
    pub fn handle(&self, id: ModalId) -> Option<ModalHandle<R>> {
        self.contains(id)
            .then(|| ModalHandle::new(id, self.intent_tx.clone()))
    }

    /// Apply close/change requests queued through [`ModalHandle`]s.
    ///
    /// Returns the number of requests that started a close.
    pub fn process_intents(&mut self) -> usize {
        let mut applied = 0;
        while let Some(Some(Intent { modal, kind })) = self.intent_rx.next().now_or_never() {
            let started = match kind {
                IntentKind::Close => self.finish(modal, None, CloseTrigger::View),
                IntentKind::Change(result) => {
                    self.finish(modal, Some(result), CloseTrigger::Change)
                }
            };
            if started {
                applied += 1;
            }
        }
        applied
    }

    // --- Time ---

    /// Apply queued intents, then fire every timer due at the clock's now.
    ///
    /// Returns the number of timers fired.
    pub fn tick(&mut self) -> usize {
        self.process_intents();
        let now = self.clock.now();
        let mut fired = 0;
        while let Some((timer, ModalTimer { modal, kind })) = self.timers.pop_expired(now) {
            fired += 1;
            tracing::trace!(modal = %modal, ?kind, "timer fired");
            match kind {
                TimerKind::Reveal => {
                    if let Some(active) = self.active_mut(modal) {
                        active.instance.reveal(timer);
                    }
                }
                TimerKind::ShakeClear => {
                    if let Some(active) = self.active_mut(modal) {
                        active.instance.clear_shake(timer);
                    }
                }
                TimerKind::Remove => self.remove(modal, timer),
            }
        }
        fired
    }

    /// Earliest pending timer deadline, for scheduling the next [`tick`](Self::tick).
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    // --- Rendering ---

    /// Produce one frame per modal, bottom to top.
    pub fn render(&self) -> Vec<ModalFrame<V>>
    where
        V: Clone,
    {
        self.modals
            .iter()
            .map(|active| {
                let entry = &active.entry;
                let instance = &active.instance;
                let content = match &entry.view {
                    ModalView::Static(content) => content.clone(),
                    ModalView::Dynamic(render) => render(ViewProps {
                        model: &entry.model,
                        handle: ModalHandle::new(entry.id, self.intent_tx.clone()),
                    }),
                };
                let shown = instance.is_shown();
                let backdrop = entry.options.backdrop;
                ModalFrame {
                    id: entry.id,
                    z_index: entry.z_index,
                    phase: instance.phase(),
                    shown,
                    shaking: instance.is_shaking(),
                    backdrop: backdrop.is_rendered().then_some(BackdropFrame {
                        shown,
                        is_static: backdrop == Backdrop::Static,
                    }),
                    dialog_classes: entry.options.dialog_classes(),
                    autofocus: entry.options.focus,
                    content,
                }
            })
            .collect()
    }

    // --- State Queries ---

    /// Number of entries, including closing ones.
    #[inline]
    pub fn len(&self) -> usize {
        self.modals.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.modals.is_empty()
    }

    /// Number of entries that are not closing.
    pub fn open_count(&self) -> usize {
        self.modals
            .iter()
            .filter(|m| m.entry.state == EntryState::Open)
            .count()
    }

    pub fn contains(&self, id: ModalId) -> bool {
        self.modals.iter().any(|m| m.entry.id == id)
    }

    /// IDs in z-order (bottom to top).
    pub fn ids(&self) -> Vec<ModalId> {
        self.modals.iter().map(|m| m.entry.id).collect()
    }

    pub fn top_id(&self) -> Option<ModalId> {
        self.modals.last().map(|m| m.entry.id)
    }

    pub fn entry(&self, id: ModalId) -> Option<&ModalEntry<M, R, V>> {
        self.modals
            .iter()
            .find(|m| m.entry.id == id)
            .map(|m| &m.entry)
    }

    /// Entries in z-order (bottom to top).
    pub fn entries(&self) -> impl Iterator<Item = &ModalEntry<M, R, V>> {
        self.modals.iter().map(|m| &m.entry)
    }

    pub fn instance(&self, id: ModalId) -> Option<&ModalInstance> {
        self.modals
            .iter()
            .find(|m| m.entry.id == id)
            .map(|m| &m.instance)
    }

    pub fn is_closing(&self, id: ModalId) -> bool {
        self.entry(id)
            .is_some_and(|e| e.state == EntryState::Closing)
    }

    /// Whether this stack currently holds the scroll lock.
    pub fn holds_scroll_lock(&self) -> bool {
        self.scroll_guard.is_some()
    }

    /// Whether the shared scroll surface is locked (by this or another stack).
    pub fn is_scroll_locked(&self) -> bool {
        self.scroll_lock.is_locked()
    }

    /// Number of pending timers (reveal, shake and grace timers).
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Number of active key-listener subscriptions.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    // --- Internals ---

    fn active_mut(&mut self, id: ModalId) -> Option<&mut ActiveModal<M, R, V>> {
        self.modals.iter_mut().find(|m| m.entry.id == id)
    }

    /// Shared terminal transition for every close path.
    fn finish(&mut self, id: ModalId, result: Option<R>, trigger: CloseTrigger) -> bool {
        let remove_at = self.clock.now() + self.timings.close_grace;
        let Some(active) = self.modals.iter_mut().find(|m| m.entry.id == id) else {
            tracing::trace!(modal = %id, ?trigger, "close ignored: modal not open");
            return false;
        };
        if !active.instance.begin_close(&mut self.timers) {
            tracing::trace!(modal = %id, ?trigger, "close ignored: already closing");
            return false;
        }
        active.entry.state = EntryState::Closing;
        let delivered = result.is_some();
        active.entry.settle.settle(result);
        active.removal = Some(self.timers.schedule(
            remove_at,
            ModalTimer {
                modal: id,
                kind: TimerKind::Remove,
            },
        ));
        tracing::debug!(modal = %id, ?trigger, delivered, "modal closing");
        true
    }

    /// Grace timer fired: unmount and drop the entry.
    fn remove(&mut self, id: ModalId, timer: TimerId) {
        let Some(idx) = self
            .modals
            .iter()
            .position(|m| m.entry.id == id && m.removal == Some(timer))
        else {
            tracing::trace!(modal = %id, "stale removal timer");
            return;
        };
        let mut active = self.modals.remove(idx);
        active
            .instance
            .unmount(&mut self.timers, &mut self.listeners);
        active.entry.settle.settle(None);
        if self.modals.is_empty() {
            self.next_z = 0;
        }
        self.sync_scroll_lock();
        tracing::debug!(modal = %id, depth = self.modals.len(), "modal removed");
    }

    /// Hold the scroll lock exactly while the stack is non-empty.
    fn sync_scroll_lock(&mut self) {
        match (self.modals.is_empty(), self.scroll_guard.is_some()) {
            (false, false) => self.scroll_guard = Some(self.scroll_lock.acquire()),
            (true, true) => self.scroll_guard = None,
            _ => {}
        }
    }
}

impl<M, R, V> Drop for ModalStack<M, R, V> {
    fn drop(&mut self) {
        self.dismiss_all();
        self.scroll_guard = None;
    }
}
