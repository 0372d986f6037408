use shared::protocol::{coerce_number, is_truthy, Channel, FeedEvent, FeedPayload};
use tracing::{debug, info};

use crate::{
    classifier::classify,
    config::{merge_defaults, ParamOverrides, SyncParams},
    cursor::{Direction, SelectionCursor},
    highlight,
    mapper::{self, ControlWrite},
    widget::{ControlHandle, ControlPanel},
};

/// A feed path the engine wants to hear about, and how to route it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub path: String,
    pub channel: Channel,
}

impl Subscription {
    fn new(path: String, channel: Channel) -> Self {
        Self { path, channel }
    }
}

/// Keeps a roster of controls in step with a realtime feed.
///
/// Navigation events move the active-control cursor and its highlight; value
/// events are matched to a control by key and written through the mapper.
/// Every handler runs to completion and never fails: unknown keys, empty
/// rosters and odd payloads are dropped or coerced.
pub struct SyncEngine {
    params: SyncParams,
    cursor: SelectionCursor,
    subscriptions: Vec<Subscription>,
}

impl SyncEngine {
    pub fn new(params: SyncParams) -> Self {
        Self {
            params,
            cursor: SelectionCursor::new(),
            subscriptions: Vec::new(),
        }
    }

    /// Builds the roster from a panel's top-level controls and folders, listens
    /// on the shared prev/next/value channels and selects the first control.
    pub fn init_composite(panel: &ControlPanel, overrides: ParamOverrides) -> Self {
        let mut engine = Self::new(merge_defaults(SyncParams::default(), overrides));
        for group in panel.groups() {
            if !group.is_empty() {
                engine.add_controls(group.iter().cloned());
            }
        }

        engine.subscriptions = vec![
            Subscription::new(engine.params.prev_path(), Channel::Previous),
            Subscription::new(engine.params.next_path(), Channel::Next),
            Subscription::new(engine.params.value_path(), Channel::Value),
        ];
        info!(
            controls = engine.cursor.len(),
            base_path = %engine.params.base_path,
            "composite roster built"
        );

        engine.handle_next(&FeedPayload::from(true));
        engine
    }

    /// Builds the roster from an explicit list; each control listens on its own
    /// `base_path + property` path and there is no navigation.
    pub fn init_with_controls(
        controls: impl IntoIterator<Item = ControlHandle>,
        overrides: ParamOverrides,
    ) -> Self {
        let mut engine = Self::new(merge_defaults(SyncParams::default(), overrides));
        engine.add_controls(controls);
        engine.subscriptions = engine
            .cursor
            .roster()
            .iter()
            .map(|entry| Subscription::new(engine.params.control_path(&entry.key), Channel::Value))
            .collect();
        info!(
            controls = engine.cursor.len(),
            base_path = %engine.params.base_path,
            "individual roster built"
        );
        engine
    }

    pub fn add_controls(&mut self, controls: impl IntoIterator<Item = ControlHandle>) {
        self.cursor.extend(controls);
    }

    pub fn params(&self) -> &SyncParams {
        &self.params
    }

    pub fn subscriptions(&self) -> &[Subscription] {
        &self.subscriptions
    }

    pub fn cursor(&self) -> &SelectionCursor {
        &self.cursor
    }

    pub fn active_control(&self) -> Option<&ControlHandle> {
        self.cursor.active()
    }

    pub fn active_index(&self) -> i64 {
        self.cursor.index()
    }

    pub fn handle_event(&mut self, event: FeedEvent) {
        match event.channel {
            Channel::Previous => {
                self.handle_prev(&event.payload);
            }
            Channel::Next => {
                self.handle_next(&event.payload);
            }
            Channel::Value => {
                self.handle_value(&event.payload);
            }
        }
    }

    /// Steps back when the payload is truthy. Returns the newly active control.
    pub fn handle_prev(&mut self, payload: &FeedPayload) -> Option<ControlHandle> {
        if !is_truthy(payload.value()) {
            return None;
        }
        self.navigate(Direction::Backward)
    }

    /// Steps forward when the payload is truthy. Returns the newly active control.
    pub fn handle_next(&mut self, payload: &FeedPayload) -> Option<ControlHandle> {
        if !is_truthy(payload.value()) {
            return None;
        }
        self.navigate(Direction::Forward)
    }

    /// Applies a keyed value to the first control registered under that key.
    /// Returns the write that was made, if any.
    pub fn handle_value(&mut self, payload: &FeedPayload) -> Option<ControlWrite> {
        let Some(key) = payload.key() else {
            debug!("value payload without key dropped");
            return None;
        };
        let Some(control) = self.cursor.find(key) else {
            debug!(%key, "no control for key; value dropped");
            return None;
        };

        let normalized = coerce_number(payload.value());
        let domain = classify(control.as_ref());
        let write = mapper::apply(control.as_ref(), domain, normalized);
        debug!(%key, ?domain, normalized, ?write, "value applied");
        Some(write)
    }

    fn navigate(&mut self, direction: Direction) -> Option<ControlHandle> {
        if self.cursor.is_empty() {
            debug!(?direction, "navigation on empty roster ignored");
            return None;
        }

        if let Some(previous) = self.cursor.active() {
            highlight::clear(previous.as_ref());
        }
        let current = self.cursor.step(direction).cloned()?;
        highlight::set(current.as_ref());

        info!(
            ?direction,
            index = self.cursor.index(),
            property = current.property(),
            "active control changed"
        );
        Some(current)
    }
}

#[cfg(test)]
#[path = "tests/engine_tests.rs"]
mod tests;
