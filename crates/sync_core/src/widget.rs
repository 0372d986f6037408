//! Capability surface of the widget library that owns the controls.

use std::sync::Arc;

use shared::domain::{Bounds, ControlValue};

/// One parameter widget. The widget library owns it; the engine only keeps
/// shared handles, so every mutator takes `&self`.
pub trait ControlWidget: Send + Sync {
    /// Identity key used to correlate feed events with this control.
    fn property(&self) -> &str;
    fn value(&self) -> ControlValue;
    fn set_value(&self, value: ControlValue);
    /// Numeric bounds; only meaningful for number controls.
    fn bounds(&self) -> Bounds;
    /// Number of entries in the option list; only meaningful for option controls.
    fn option_count(&self) -> usize;
    /// Selects an option by position. Positions outside the list are passed
    /// through untouched and left to the widget.
    fn set_selected_index(&self, index: i64);
    /// Whether the widget's container is tagged as a color picker.
    fn is_color_widget(&self) -> bool;
    /// Background of the row that contains the widget. Empty restores the default.
    fn set_background(&self, color: &str);
}

pub type ControlHandle = Arc<dyn ControlWidget>;

#[derive(Clone)]
pub struct ControlFolder {
    pub name: String,
    pub controls: Vec<ControlHandle>,
}

/// A composite container: top-level controls plus named folders of controls.
#[derive(Clone, Default)]
pub struct ControlPanel {
    pub controls: Vec<ControlHandle>,
    pub folders: Vec<ControlFolder>,
}

impl ControlPanel {
    pub fn new(controls: Vec<ControlHandle>) -> Self {
        Self {
            controls,
            folders: Vec::new(),
        }
    }

    pub fn with_folder(mut self, name: impl Into<String>, controls: Vec<ControlHandle>) -> Self {
        self.folders.push(ControlFolder {
            name: name.into(),
            controls,
        });
        self
    }

    /// Top-level controls first, then each folder in order.
    pub fn groups(&self) -> impl Iterator<Item = &[ControlHandle]> {
        std::iter::once(self.controls.as_slice())
            .chain(self.folders.iter().map(|folder| folder.controls.as_slice()))
    }
}
