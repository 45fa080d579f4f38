//! Lifecycle transitions are visible as structured tracing events.

use std::sync::{Arc, Mutex};

use modalkit::{ModalOptions, ModalStack, ModalView};
use modalkit_core::{KeyEvent, ManualClock, ModalTimings};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::prelude::*;

#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: Vec<String>,
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.fields.push(format!("{}={value:?}", field.name()));
        }
    }
}

struct EventRecorder {
    events: Arc<Mutex<Vec<(String, Vec<String>)>>>,
}

impl<S: Subscriber> Layer<S> for EventRecorder {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.events
            .lock()
            .unwrap()
            .push((visitor.message, visitor.fields));
    }
}

fn recorded<F: FnOnce()>(f: F) -> Vec<(String, Vec<String>)> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(EventRecorder {
        events: Arc::clone(&events),
    });
    tracing::subscriber::with_default(subscriber, f);
    let out = events.lock().unwrap().clone();
    out
}

fn has(events: &[(String, Vec<String>)], message: &str) -> bool {
    events.iter().any(|(m, _)| m == message)
}

#[test]
fn open_close_remove_are_logged() {
    let events = recorded(|| {
        let clock = ManualClock::new();
        let mut stack: ModalStack<(), (), &str> = ModalStack::new()
            .with_clock(clock.clone())
            .with_timings(ModalTimings::instant());
        let d = stack.open(ModalView::Static("x"), (), ModalOptions::default());
        stack.close(d.id());
        stack.tick();
    });

    assert!(has(&events, "modal opened"));
    assert!(has(&events, "modal closing"));
    assert!(has(&events, "modal removed"));

    let closing = events
        .iter()
        .find(|(m, _)| m == "modal closing")
        .map(|(_, fields)| fields.clone())
        .unwrap();
    assert!(closing.iter().any(|f| f == "trigger=Programmatic"));
    assert!(closing.iter().any(|f| f == "delivered=false"));
}

#[test]
fn dismiss_all_reports_count() {
    let events = recorded(|| {
        let mut stack: ModalStack<(), (), &str> = ModalStack::new();
        for _ in 0..3 {
            let _ = stack.open(ModalView::Static("x"), (), ModalOptions::default());
        }
        stack.dismiss_all();
    });

    let dismissed = events
        .iter()
        .find(|(m, _)| m == "dismissed all modals")
        .map(|(_, fields)| fields.clone())
        .unwrap();
    assert!(dismissed.iter().any(|f| f == "count=3"));
}

#[test]
fn ignored_escape_is_traced() {
    let events = recorded(|| {
        let mut stack: ModalStack<(), (), &str> = ModalStack::new();
        let _d = stack.open(ModalView::Static("x"), (), ModalOptions::default());
        assert_eq!(stack.handle_key(&KeyEvent::escape()), 0);
    });

    assert!(has(&events, "escape ignored: no modal closes on escape"));
    assert!(!has(&events, "modal closing"));
}
