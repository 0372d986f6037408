//! In-process widgets for headless runs and tests.

use std::sync::Arc;

use parking_lot::Mutex;
use shared::domain::{
    Bounds, ControlKind, ControlReport, ControlSpec, ControlValue, PanelSpec,
};

use crate::{
    highlight::ACTIVE_BACKGROUND,
    widget::{ControlHandle, ControlPanel, ControlWidget},
};

struct MemoryControlState {
    value: ControlValue,
    selected_index: Option<i64>,
    background: String,
}

pub struct MemoryControl {
    property: String,
    bounds: Bounds,
    options: Vec<String>,
    color_tagged: bool,
    state: Mutex<MemoryControlState>,
}

impl MemoryControl {
    fn with_value(property: impl Into<String>, value: ControlValue) -> Self {
        Self {
            property: property.into(),
            bounds: Bounds::default(),
            options: Vec::new(),
            color_tagged: false,
            state: Mutex::new(MemoryControlState {
                value,
                selected_index: None,
                background: String::new(),
            }),
        }
    }

    pub fn number(property: impl Into<String>, value: f64, min: f64, max: f64) -> Self {
        let mut control = Self::with_value(property, ControlValue::Number(value));
        control.bounds = Bounds::new(min, max);
        control
    }

    pub fn boolean(property: impl Into<String>, value: bool) -> Self {
        Self::with_value(property, ControlValue::Boolean(value))
    }

    pub fn color(property: impl Into<String>, packed: u32) -> Self {
        Self::with_value(property, ControlValue::Color(packed)).tagged_color()
    }

    pub fn options<I, S>(property: impl Into<String>, options: I, selected: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let options: Vec<String> = options.into_iter().map(Into::into).collect();
        let value = ControlValue::Text(options.get(selected).cloned().unwrap_or_default());
        let mut control = Self::with_value(property, value);
        control.options = options;
        control.state.get_mut().selected_index = Some(selected as i64);
        control
    }

    /// Marks the container as a color picker, whatever the value type.
    pub fn tagged_color(mut self) -> Self {
        self.color_tagged = true;
        self
    }

    pub fn from_spec(spec: &ControlSpec) -> Self {
        match spec.kind {
            ControlKind::Number => {
                let min = spec.min.unwrap_or(0.0);
                let max = spec.max.unwrap_or(1.0);
                let value = spec.value.as_ref().and_then(ControlValue::as_f64).unwrap_or(min);
                Self::number(&spec.property, value, min, max)
            }
            ControlKind::Boolean => {
                let value = matches!(spec.value, Some(ControlValue::Boolean(true)));
                Self::boolean(&spec.property, value)
            }
            ControlKind::Color => {
                let packed = match &spec.value {
                    Some(ControlValue::Text(hex)) => parse_hex_color(hex).unwrap_or(0),
                    Some(other) => other.as_f64().map(|v| v as u32).unwrap_or(0),
                    None => 0,
                };
                Self::color(&spec.property, packed)
            }
            ControlKind::Option => {
                let selected = match &spec.value {
                    Some(ControlValue::Text(label)) => spec
                        .options
                        .iter()
                        .position(|option| option == label)
                        .unwrap_or(0),
                    _ => 0,
                };
                Self::options(&spec.property, spec.options.iter().cloned(), selected)
            }
        }
    }

    pub fn background(&self) -> String {
        self.state.lock().background.clone()
    }

    pub fn is_highlighted(&self) -> bool {
        self.state.lock().background == ACTIVE_BACKGROUND
    }

    pub fn selected_index(&self) -> Option<i64> {
        self.state.lock().selected_index
    }

    pub fn report(&self) -> ControlReport {
        let state = self.state.lock();
        ControlReport {
            property: self.property.clone(),
            value: state.value.clone(),
            selected_index: state.selected_index,
            highlighted: state.background == ACTIVE_BACKGROUND,
        }
    }
}

impl ControlWidget for MemoryControl {
    fn property(&self) -> &str {
        &self.property
    }

    fn value(&self) -> ControlValue {
        self.state.lock().value.clone()
    }

    fn set_value(&self, value: ControlValue) {
        self.state.lock().value = value;
    }

    fn bounds(&self) -> Bounds {
        self.bounds
    }

    fn option_count(&self) -> usize {
        self.options.len()
    }

    fn set_selected_index(&self, index: i64) {
        let mut state = self.state.lock();
        state.selected_index = Some(index);
        let label = usize::try_from(index)
            .ok()
            .and_then(|position| self.options.get(position));
        if let Some(label) = label {
            state.value = ControlValue::Text(label.clone());
        }
    }

    fn is_color_widget(&self) -> bool {
        self.color_tagged
    }

    fn set_background(&self, color: &str) {
        self.state.lock().background = color.to_string();
    }
}

fn parse_hex_color(raw: &str) -> Option<u32> {
    let digits = raw.trim().trim_start_matches('#');
    u32::from_str_radix(digits, 16).ok()
}

pub struct MemoryFolder {
    pub name: String,
    pub controls: Vec<Arc<MemoryControl>>,
}

/// A panel of [`MemoryControl`]s, kept typed so callers can inspect them.
#[derive(Default)]
pub struct MemoryPanel {
    pub controls: Vec<Arc<MemoryControl>>,
    pub folders: Vec<MemoryFolder>,
}

impl MemoryPanel {
    pub fn from_spec(spec: &PanelSpec) -> Self {
        let build = |controls: &[ControlSpec]| {
            controls
                .iter()
                .map(|control| Arc::new(MemoryControl::from_spec(control)))
                .collect::<Vec<_>>()
        };
        Self {
            controls: build(&spec.controls),
            folders: spec
                .folders
                .iter()
                .map(|folder| MemoryFolder {
                    name: folder.name.clone(),
                    controls: build(&folder.controls),
                })
                .collect(),
        }
    }

    pub fn control_panel(&self) -> ControlPanel {
        let handles = |controls: &[Arc<MemoryControl>]| {
            controls
                .iter()
                .map(|control| control.clone() as ControlHandle)
                .collect::<Vec<_>>()
        };
        let mut panel = ControlPanel::new(handles(&self.controls));
        for folder in &self.folders {
            panel = panel.with_folder(folder.name.clone(), handles(&folder.controls));
        }
        panel
    }

    /// Every control, top level first, then folders in order.
    pub fn all(&self) -> impl Iterator<Item = &Arc<MemoryControl>> {
        self.controls
            .iter()
            .chain(self.folders.iter().flat_map(|folder| folder.controls.iter()))
    }

    pub fn handles(&self) -> Vec<ControlHandle> {
        self.all()
            .map(|control| control.clone() as ControlHandle)
            .collect()
    }

    pub fn report(&self) -> Vec<ControlReport> {
        self.all().map(|control| control.report()).collect()
    }
}
