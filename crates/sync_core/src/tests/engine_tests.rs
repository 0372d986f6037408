use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::json;
use shared::{
    domain::{Bounds, ControlValue},
    protocol::{Channel, FeedEvent, FeedPayload, Snapshot},
};

use super::*;
use crate::{
    highlight::ACTIVE_BACKGROUND,
    memory::MemoryControl,
    widget::{ControlHandle, ControlPanel, ControlWidget},
};

fn handles(controls: &[Arc<MemoryControl>]) -> Vec<ControlHandle> {
    controls
        .iter()
        .map(|control| control.clone() as ControlHandle)
        .collect()
}

fn abc() -> Vec<Arc<MemoryControl>> {
    ["a", "b", "c"]
        .into_iter()
        .map(|key| Arc::new(MemoryControl::boolean(key, false)))
        .collect()
}

fn value(key: &str, value: serde_json::Value) -> FeedPayload {
    FeedPayload::from(Snapshot::new(key, value))
}

fn highlighted(controls: &[Arc<MemoryControl>]) -> Vec<&str> {
    controls
        .iter()
        .filter(|control| control.is_highlighted())
        .map(|control| control.property())
        .collect()
}

/// Widget that logs every background write to a log shared by the roster.
struct RecordingControl {
    property: String,
    log: Arc<Mutex<Vec<String>>>,
}

impl ControlWidget for RecordingControl {
    fn property(&self) -> &str {
        &self.property
    }

    fn value(&self) -> ControlValue {
        ControlValue::Boolean(false)
    }

    fn set_value(&self, _value: ControlValue) {}

    fn bounds(&self) -> Bounds {
        Bounds::default()
    }

    fn option_count(&self) -> usize {
        0
    }

    fn set_selected_index(&self, _index: i64) {}

    fn is_color_widget(&self) -> bool {
        false
    }

    fn set_background(&self, color: &str) {
        let action = if color.is_empty() { "clear" } else { "set" };
        self.log.lock().push(format!("{action} {}", self.property));
    }
}

fn recording_roster(keys: &[&str]) -> (Vec<ControlHandle>, Arc<Mutex<Vec<String>>>) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let controls = keys
        .iter()
        .map(|key| {
            Arc::new(RecordingControl {
                property: key.to_string(),
                log: log.clone(),
            }) as ControlHandle
        })
        .collect();
    (controls, log)
}

#[test]
fn previous_highlight_is_cleared_before_next_is_set() {
    let (controls, log) = recording_roster(&["a", "b"]);
    let mut engine = SyncEngine::init_with_controls(controls, ParamOverrides::default());

    engine.handle_next(&true.into());
    engine.handle_next(&true.into());
    engine.handle_prev(&true.into());

    assert_eq!(
        *log.lock(),
        ["set a", "clear a", "set b", "clear b", "set a"]
    );
}

#[test]
fn single_control_stays_highlighted_while_stepping() {
    let (controls, log) = recording_roster(&["only"]);
    let mut engine = SyncEngine::init_with_controls(controls, ParamOverrides::default());

    engine.handle_next(&true.into());
    engine.handle_prev(&true.into());
    assert_eq!(*log.lock(), ["set only", "clear only", "set only"]);

    let only = Arc::new(MemoryControl::boolean("only", false));
    let mut engine =
        SyncEngine::init_with_controls(handles(&[only.clone()]), ParamOverrides::default());
    engine.handle_next(&true.into());
    engine.handle_prev(&true.into());
    engine.handle_next(&true.into());
    assert!(only.is_highlighted());
    assert_eq!(engine.active_index(), 0);
}

#[test]
fn stepping_moves_highlight_with_selection() {
    let controls = abc();
    let mut engine = SyncEngine::init_with_controls(handles(&controls), ParamOverrides::default());
    assert_eq!(engine.active_index(), -1);

    let active = engine.handle_next(&true.into()).expect("active");
    assert_eq!(active.property(), "a");
    assert_eq!(highlighted(&controls), ["a"]);

    engine.handle_next(&true.into());
    assert_eq!(engine.active_control().map(|c| c.property()), Some("b"));
    assert_eq!(controls[0].background(), "");
    assert_eq!(controls[1].background(), ACTIVE_BACKGROUND);

    engine.handle_prev(&true.into());
    engine.handle_prev(&true.into());
    assert_eq!(engine.active_control().map(|c| c.property()), Some("c"));
    assert_eq!(highlighted(&controls), ["c"]);
}

#[test]
fn backward_from_second_returns_to_first() {
    let controls = abc();
    let mut engine = SyncEngine::init_with_controls(handles(&controls), ParamOverrides::default());
    engine.handle_next(&true.into());
    engine.handle_next(&true.into());

    engine.handle_prev(&true.into());
    assert_eq!(engine.active_index(), 0);
    assert_eq!(highlighted(&controls), ["a"]);
}

#[test]
fn falsy_navigation_payloads_are_ignored() {
    let controls = abc();
    let mut engine = SyncEngine::init_with_controls(handles(&controls), ParamOverrides::default());

    for payload in [json!(false), json!(0), json!(""), serde_json::Value::Null] {
        assert!(engine.handle_next(&payload.clone().into()).is_none());
        assert!(engine.handle_prev(&payload.into()).is_none());
    }
    assert_eq!(engine.active_index(), -1);
    assert!(highlighted(&controls).is_empty());

    engine.handle_next(&FeedPayload::from(Snapshot::new("next", json!("go"))));
    assert_eq!(engine.active_index(), 0);
}

#[test]
fn empty_roster_navigation_is_a_no_op() {
    let mut engine = SyncEngine::init_composite(&ControlPanel::default(), ParamOverrides::default());
    assert!(engine.handle_next(&true.into()).is_none());
    assert!(engine.handle_prev(&true.into()).is_none());
    assert_eq!(engine.active_index(), -1);
    assert!(engine.active_control().is_none());
}

#[test]
fn composite_init_selects_first_control_and_listens_on_shared_channels() {
    let top = vec![Arc::new(MemoryControl::number("speed", 1.0, 0.0, 10.0))];
    let folder = vec![
        Arc::new(MemoryControl::boolean("visible", true)),
        Arc::new(MemoryControl::color("tint", 0)),
    ];
    let panel = ControlPanel::new(handles(&top))
        .with_folder("empty", Vec::new())
        .with_folder("look", handles(&folder));

    let engine = SyncEngine::init_composite(&panel, ParamOverrides::default());

    let keys: Vec<&str> = engine
        .cursor()
        .roster()
        .iter()
        .map(|entry| entry.key.as_str())
        .collect();
    assert_eq!(keys, ["speed", "visible", "tint"]);
    assert_eq!(engine.active_index(), 0);
    assert!(top[0].is_highlighted());
    assert_eq!(
        engine.subscriptions(),
        [
            Subscription::new("things/prev".into(), Channel::Previous),
            Subscription::new("things/next".into(), Channel::Next),
            Subscription::new("things/dial".into(), Channel::Value),
        ]
    );
}

#[test]
fn individual_init_subscribes_per_control_with_overrides() {
    let controls = abc();
    let engine = SyncEngine::init_with_controls(
        handles(&controls),
        ParamOverrides::default().with_base_path("studio/"),
    );
    let paths: Vec<&str> = engine
        .subscriptions()
        .iter()
        .map(|subscription| subscription.path.as_str())
        .collect();
    assert_eq!(paths, ["studio/a", "studio/b", "studio/c"]);
    assert!(engine
        .subscriptions()
        .iter()
        .all(|subscription| subscription.channel == Channel::Value));
    assert_eq!(engine.active_index(), -1);
}

#[test]
fn value_events_map_by_domain() {
    let speed = Arc::new(MemoryControl::number("speed", 12.0, 10.0, 20.0));
    let visible = Arc::new(MemoryControl::boolean("visible", true));
    let tint = Arc::new(MemoryControl::color("tint", 0));
    let shape = Arc::new(MemoryControl::options("shape", ["a", "b", "c", "d"], 0));
    let all = vec![speed.clone(), visible.clone(), tint.clone(), shape.clone()];
    let mut engine = SyncEngine::init_with_controls(handles(&all), ParamOverrides::default());

    engine.handle_value(&value("speed", json!(0.5)));
    engine.handle_value(&value("visible", json!(0.5)));
    engine.handle_value(&value("tint", json!(1.0)));
    engine.handle_value(&value("shape", json!(0.99)));

    assert_eq!(speed.value(), ControlValue::Number(5.0));
    assert_eq!(visible.value(), ControlValue::Boolean(false));
    assert_eq!(tint.value(), ControlValue::Color(0xFF_FFFF));
    assert_eq!(shape.selected_index(), Some(3));
    assert_eq!(shape.value(), ControlValue::Text("d".into()));

    let overflow = engine.handle_value(&value("shape", json!(1.0)));
    assert_eq!(overflow, Some(ControlWrite::SelectedIndex(4)));
}

#[test]
fn value_events_leave_selection_alone() {
    let controls = abc();
    let mut engine = SyncEngine::init_with_controls(handles(&controls), ParamOverrides::default());
    engine.handle_next(&true.into());

    engine.handle_value(&value("c", json!(0.9)));
    assert_eq!(engine.active_index(), 0);
    assert_eq!(controls[2].value(), ControlValue::Boolean(true));

    engine.handle_next(&true.into());
    assert_eq!(highlighted(&controls), ["b"]);
}

#[test]
fn unknown_key_changes_nothing() {
    let x = Arc::new(MemoryControl::number("x", 3.0, 0.0, 10.0));
    let mut engine =
        SyncEngine::init_with_controls(handles(&[x.clone()]), ParamOverrides::default());

    assert!(engine.handle_value(&value("y", json!(0.5))).is_none());
    assert_eq!(x.value(), ControlValue::Number(3.0));
    assert!(!x.is_highlighted());
}

#[test]
fn keyless_values_are_dropped() {
    let x = Arc::new(MemoryControl::number("x", 3.0, 0.0, 10.0));
    let mut engine =
        SyncEngine::init_with_controls(handles(&[x.clone()]), ParamOverrides::default());

    assert!(engine.handle_value(&FeedPayload::from(json!(0.5))).is_none());
    assert_eq!(x.value(), ControlValue::Number(3.0));
}

#[test]
fn null_values_coerce_to_zero() {
    let x = Arc::new(MemoryControl::number("x", 3.0, 0.0, 10.0));
    let flag = Arc::new(MemoryControl::boolean("flag", true));
    let shape = Arc::new(MemoryControl::options("shape", ["a", "b", "c"], 2));
    let mut engine = SyncEngine::init_with_controls(
        handles(&[x.clone(), flag.clone(), shape.clone()]),
        ParamOverrides::default(),
    );

    let write = engine.handle_value(&value("x", serde_json::Value::Null));
    assert_eq!(write, Some(ControlWrite::Value(ControlValue::Number(0.0))));
    assert_eq!(x.value(), ControlValue::Number(0.0));

    engine.handle_value(&value("flag", serde_json::Value::Null));
    assert_eq!(flag.value(), ControlValue::Boolean(false));

    engine.handle_value(&value("shape", serde_json::Value::Null));
    assert_eq!(shape.selected_index(), Some(0));
    assert_eq!(shape.value(), ControlValue::Text("a".into()));
}

#[test]
fn non_numeric_values_are_coerced() {
    let x = Arc::new(MemoryControl::number("x", 3.0, 0.0, 10.0));
    let flag = Arc::new(MemoryControl::boolean("flag", false));
    let mut engine = SyncEngine::init_with_controls(
        handles(&[x.clone(), flag.clone()]),
        ParamOverrides::default(),
    );

    engine.handle_value(&value("x", json!("0.25")));
    assert_eq!(x.value(), ControlValue::Number(2.5));

    engine.handle_value(&value("flag", json!(true)));
    assert_eq!(flag.value(), ControlValue::Boolean(true));

    engine.handle_value(&value("flag", json!("loud")));
    assert_eq!(flag.value(), ControlValue::Boolean(false));
}

#[test]
fn duplicate_keys_resolve_to_first_registered() {
    let first = Arc::new(MemoryControl::number("dup", 0.0, 0.0, 10.0));
    let second = Arc::new(MemoryControl::number("dup", 0.0, 0.0, 10.0));
    let mut engine = SyncEngine::init_with_controls(
        handles(&[first.clone(), second.clone()]),
        ParamOverrides::default(),
    );

    engine.handle_value(&value("dup", json!(0.5)));
    assert_eq!(first.value(), ControlValue::Number(5.0));
    assert_eq!(second.value(), ControlValue::Number(0.0));
}

#[test]
fn handle_event_routes_by_channel() {
    let controls = abc();
    let mut engine = SyncEngine::init_with_controls(handles(&controls), ParamOverrides::default());

    engine.handle_event(FeedEvent::new(Channel::Next, true));
    engine.handle_event(FeedEvent::new(Channel::Next, true));
    engine.handle_event(FeedEvent::new(Channel::Previous, json!(1)));
    engine.handle_event(FeedEvent::new(Channel::Value, Snapshot::new("b", json!(0.6))));

    assert_eq!(engine.active_index(), 0);
    assert_eq!(controls[1].value(), ControlValue::Boolean(true));
}

#[test]
fn classification_is_rederived_per_event() {
    let mode = Arc::new(MemoryControl::number("mode", 0.0, 0.0, 4.0));
    let mut engine =
        SyncEngine::init_with_controls(handles(&[mode.clone()]), ParamOverrides::default());

    engine.handle_value(&value("mode", json!(0.5)));
    assert_eq!(mode.value(), ControlValue::Number(2.0));

    mode.set_value(ControlValue::Boolean(false));
    engine.handle_value(&value("mode", json!(0.75)));
    assert_eq!(mode.value(), ControlValue::Boolean(true));
}
