#![forbid(unsafe_code)]

//! Integration tests: end-to-end modal lifecycles on a deterministic rig.

use futures::FutureExt;
use futures::executor::block_on;
use modalkit::{BackdropOutcome, ModalOptions, ModalStack, ModalView, ViewProps};
use modalkit_core::{ModalTimings, ScrollLock};
use modalkit_harness::{Rig, SurfaceProbe};
use serde_json::{Value, json};

fn view_a() -> ModalView<Value, Value, String> {
    ModalView::dynamic(|props: ViewProps<'_, Value, Value>| format!("A x={}", props.model["x"]))
}

/// A form that submits as soon as it is rendered.
fn view_b() -> ModalView<Value, Value, String> {
    ModalView::dynamic(|props: ViewProps<'_, Value, Value>| {
        props.handle.change(json!({ "ok": true }));
        "B".to_owned()
    })
}

// ============================================================================
// Resolution
// ============================================================================

#[test]
fn escape_resolves_null_then_removes_after_grace() {
    let mut rig: Rig<Value, Value> = Rig::new();
    let mut result = rig.open_json(view_a(), json!({ "x": 1 }), json!({ "keyboard": true }));
    assert_eq!(rig.stack.len(), 1);

    assert_eq!(rig.escape(), 1);
    assert_eq!((&mut result).now_or_never(), Some(None));
    assert_eq!(rig.stack.len(), 1, "exit transition still rendering");

    rig.advance(199);
    assert_eq!(rig.stack.len(), 1);
    rig.advance(1);
    assert_eq!(rig.stack.len(), 0);
}

#[test]
fn view_change_resolves_value_and_empties_stack() {
    let mut rig: Rig<Value, Value> = Rig::new();
    let result = rig.open_json(view_b(), Value::Null, json!({}));

    let frames = rig.frames();
    assert_eq!(frames[0].content, "B");

    rig.advance(0);
    assert!(rig.stack.is_closing(result.id()));
    assert_eq!(block_on(result), Some(json!({ "ok": true })));

    rig.advance(200);
    assert!(rig.stack.is_empty());
}

#[test]
fn change_then_close_resolves_once() {
    let mut rig: Rig<Value, Value> = Rig::new();
    let mut result = rig.open_json(view_a(), json!({ "x": 2 }), json!({}));
    let id = result.id();

    assert!(rig.stack.handle_change(id, json!(42)));
    assert!(!rig.stack.close(id));
    assert!(!rig.stack.handle_change(id, json!(43)));

    assert_eq!(result.try_settled(), Some(Some(json!(42))));
    assert_eq!(result.try_settled(), None);
}

#[test]
fn close_then_change_resolves_null() {
    let mut rig: Rig<Value, Value> = Rig::new();
    let result = rig.open_json(view_a(), json!({ "x": 3 }), json!({}));
    let id = result.id();

    assert!(rig.stack.close(id));
    assert!(!rig.stack.handle_change(id, json!("late")));
    assert_eq!(block_on(result), None);
}

#[test]
fn dismiss_all_resolves_every_entry_synchronously() {
    let mut rig: Rig<Value, Value> = Rig::new();
    let results: Vec<_> = (0..5)
        .map(|x| rig.open_json(view_a(), json!({ "x": x }), json!({})))
        .collect();

    assert_eq!(rig.stack.dismiss_all(), 5);
    assert!(rig.stack.is_empty());
    assert_eq!(rig.stack.pending_timers(), 0);
    for result in results {
        assert_eq!(result.now_or_never(), Some(None));
    }
}

// ============================================================================
// Instance lifecycle
// ============================================================================

#[test]
fn entry_animation_reveals_after_ten_ms() {
    let mut rig: Rig<Value, Value> = Rig::new();
    let _result = rig.open_json(view_a(), json!({ "x": 1 }), json!({}));

    assert_eq!(rig.snapshot()[0]["phase"], "entering");
    assert_eq!(rig.snapshot()[0]["backdrop"]["shown"], false);

    rig.advance(9);
    assert_eq!(rig.snapshot()[0]["shown"], false);
    rig.advance(1);
    assert_eq!(rig.snapshot()[0]["phase"], "shown");
    assert_eq!(rig.snapshot()[0]["backdrop"]["shown"], true);
}

#[test]
fn close_before_reveal_never_shows() {
    let mut rig: Rig<Value, Value> = Rig::new();
    let result = rig.open_json(view_a(), json!({ "x": 1 }), json!({}));
    rig.stack.close(result.id());

    rig.advance(10);
    assert_eq!(rig.snapshot()[0]["phase"], "closing");
    assert_eq!(rig.snapshot()[0]["shown"], false);
}

#[test]
fn static_backdrop_shakes_and_clears() {
    let mut rig: Rig<Value, Value> = Rig::new();
    let result = rig.open_json(view_a(), json!({ "x": 1 }), json!({ "backdrop": "static" }));
    rig.advance(10);

    assert_eq!(rig.stack.click_backdrop(result.id()), BackdropOutcome::Shook);
    assert_eq!(rig.snapshot()[0]["shaking"], true);
    rig.advance(299);
    assert_eq!(rig.snapshot()[0]["shaking"], true);
    rig.advance(1);
    assert_eq!(rig.snapshot()[0]["shaking"], false);
    assert_eq!(rig.stack.len(), 1);
    assert!(!rig.stack.is_closing(result.id()));
}

#[test]
fn repeated_static_click_restarts_pulse() {
    let mut rig: Rig<Value, Value> = Rig::new();
    let result = rig.open_json(view_a(), json!({ "x": 1 }), json!({ "backdrop": "static" }));

    rig.stack.click_backdrop(result.id());
    rig.advance(200);
    rig.stack.click_backdrop(result.id());
    rig.advance(200);
    assert_eq!(rig.snapshot()[0]["shaking"], true, "second click extends the pulse");
    rig.advance(100);
    assert_eq!(rig.snapshot()[0]["shaking"], false);
}

#[test]
fn disabled_backdrop_only_closes_by_escape() {
    let mut rig: Rig<Value, Value> = Rig::new();
    let result = rig.open_json(
        view_a(),
        json!({ "x": 1 }),
        json!({ "backdrop": false, "keyboard": true }),
    );

    assert_eq!(rig.snapshot()[0]["backdrop"], Value::Null);
    assert_eq!(rig.stack.click_backdrop(result.id()), BackdropOutcome::Ignored);
    assert!(!rig.stack.is_closing(result.id()));

    assert_eq!(rig.escape(), 1);
    assert_eq!(block_on(result), None);
}

#[test]
fn escape_without_keyboard_option_is_ignored() {
    let mut rig: Rig<Value, Value> = Rig::new();
    let result = rig.open_json(view_a(), json!({ "x": 1 }), json!({}));
    assert_eq!(rig.escape(), 0);
    assert!(!rig.stack.is_closing(result.id()));
}

#[test]
fn escape_closes_every_keyboard_modal_in_one_press() {
    let mut rig: Rig<Value, Value> = Rig::new();
    let lower = rig.open_json(view_a(), json!({ "x": 1 }), json!({ "keyboard": true }));
    let upper = rig.open_json(view_a(), json!({ "x": 2 }), json!({ "keyboard": true }));

    assert_eq!(rig.escape(), 2);
    assert!(rig.stack.is_closing(upper.id()));
    assert!(rig.stack.is_closing(lower.id()));
    assert_eq!(rig.escape(), 0);

    assert_eq!(block_on(lower), None);
    assert_eq!(block_on(upper), None);
    rig.advance(200);
    assert!(rig.stack.is_empty());
}

#[test]
fn escape_passes_non_keyboard_top_to_keyboard_modal_below() {
    let mut rig: Rig<Value, Value> = Rig::new();
    let lower = rig.open_json(view_a(), json!({ "x": 1 }), json!({ "keyboard": true }));
    let mut upper = rig.open_json(view_a(), json!({ "x": 2 }), json!({ "backdrop": "static" }));
    rig.advance(10);

    assert_eq!(rig.escape(), 1);
    assert!(rig.stack.is_closing(lower.id()));
    assert!(!rig.stack.is_closing(upper.id()));
    assert_eq!(block_on(lower), None);

    rig.advance(200);
    assert_eq!(rig.stack.len(), 1);
    assert_eq!(rig.snapshot()[0]["content"], "A x=2");
    assert_eq!(rig.snapshot()[0]["z"], 1010);
    assert_eq!((&mut upper).now_or_never(), None);
}

#[test]
fn unmount_releases_timers_and_listeners() {
    let mut rig: Rig<Value, Value> = Rig::new();
    let result = rig.open_json(view_a(), json!({ "x": 1 }), json!({ "backdrop": "static" }));
    rig.stack.click_backdrop(result.id());
    assert_eq!(rig.stack.listener_count(), 1);

    rig.stack.close(result.id());
    rig.advance(200);
    assert!(rig.stack.is_empty());
    assert_eq!(rig.stack.listener_count(), 0);
    assert_eq!(rig.stack.pending_timers(), 0);
    assert!(rig.stack.next_deadline().is_none());
}

// ============================================================================
// Rendering
// ============================================================================

#[test]
fn frames_follow_stack_order() {
    let mut rig: Rig<Value, Value> = Rig::new();
    let _a = rig.open_json(view_a(), json!({ "x": 1 }), json!({ "size": "sm" }));
    let _b = rig.open_json(
        view_a(),
        json!({ "x": 2 }),
        json!({ "centered": true, "scrollable": true, "modalClassName": "wide", "focus": false }),
    );

    assert_eq!(
        rig.snapshot(),
        json!([
            {
                "pos": 0, "z": 1000, "phase": "entering", "shown": false, "shaking": false,
                "backdrop": { "shown": false, "static": false },
                "classes": "modal-sm", "autofocus": true, "content": "A x=1",
            },
            {
                "pos": 1, "z": 1010, "phase": "entering", "shown": false, "shaking": false,
                "backdrop": { "shown": false, "static": false },
                "classes": "wide modal-dialog-centered modal-dialog-scrollable",
                "autofocus": false, "content": "A x=2",
            },
        ])
    );
}

// ============================================================================
// Scroll lock
// ============================================================================

#[test]
fn scroll_lock_held_while_non_empty() {
    let mut rig: Rig<Value, Value> = Rig::new();
    assert!(!rig.probe.is_locked());

    let a = rig.open_json(view_a(), json!({ "x": 1 }), json!({}));
    let b = rig.open_json(view_a(), json!({ "x": 2 }), json!({}));
    assert!(rig.probe.is_locked());

    rig.stack.close(a.id());
    rig.advance(200);
    assert!(rig.probe.is_locked());

    rig.stack.close(b.id());
    rig.advance(200);
    assert!(!rig.probe.is_locked());
    assert_eq!(rig.probe.writes(), vec![true, false]);
}

#[test]
fn scroll_lock_restores_prior_state() {
    let probe = SurfaceProbe::pre_locked();
    let mut rig: Rig<Value, Value> = Rig::with_probe(probe.clone(), ModalTimings::default());
    let _result = rig.open_json(view_a(), json!({ "x": 1 }), json!({}));
    rig.stack.dismiss_all();
    assert!(probe.is_locked(), "surface was locked before any modal opened");
}

#[test]
fn shared_lock_composes_across_stacks() {
    let probe = SurfaceProbe::new();
    let lock = ScrollLock::new(probe.surface());
    let mut outer: ModalStack<(), (), &str> = ModalStack::new().with_scroll_lock(lock.clone());
    let mut inner: ModalStack<(), (), &str> = ModalStack::new().with_scroll_lock(lock.clone());

    let _a = outer.open(ModalView::Static("outer"), (), ModalOptions::default());
    let _b = inner.open(ModalView::Static("inner"), (), ModalOptions::default());
    assert_eq!(lock.holders(), 2);

    outer.dismiss_all();
    assert!(probe.is_locked());
    drop(inner);
    assert!(!probe.is_locked());
}

#[test]
fn dropping_rig_releases_lock() {
    let probe = SurfaceProbe::new();
    {
        let mut rig: Rig<Value, Value> = Rig::with_probe(probe.clone(), ModalTimings::instant());
        let _result = rig.open_json(view_a(), json!({ "x": 1 }), json!({}));
        assert!(probe.is_locked());
    }
    assert!(!probe.is_locked());
}
