//! Conversion of a normalized `[0, 1]` feed scalar into a control's native value.
//!
//! Inputs are not clamped. The number range is scaled by the bounds' span
//! without adding `min`, and the option index at exactly `1.0` lands one past
//! the last entry; both are passed to the widget as computed.

use shared::domain::{ControlValue, ValueDomain};

use crate::widget::ControlWidget;

const COLOR_RANGE: f64 = 0xFF_FFFF as f64;
const BOOLEAN_THRESHOLD: f64 = 0.5;

/// The single write a mapping produces.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlWrite {
    Value(ControlValue),
    SelectedIndex(i64),
}

pub fn number_value(normalized: f64, span: f64) -> f64 {
    normalized * span
}

pub fn boolean_value(normalized: f64) -> bool {
    normalized > BOOLEAN_THRESHOLD
}

/// Packed `0xRRGGBB`; the float-to-int cast truncates and saturates.
pub fn color_value(normalized: f64) -> u32 {
    (normalized * COLOR_RANGE) as u32
}

pub fn option_index(normalized: f64, option_count: usize) -> i64 {
    (normalized * option_count as f64).floor() as i64
}

pub fn map_value(domain: ValueDomain, control: &dyn ControlWidget, normalized: f64) -> ControlWrite {
    match domain {
        ValueDomain::Number => ControlWrite::Value(ControlValue::Number(number_value(
            normalized,
            control.bounds().span(),
        ))),
        ValueDomain::Boolean => ControlWrite::Value(ControlValue::Boolean(boolean_value(normalized))),
        ValueDomain::Color => ControlWrite::Value(ControlValue::Color(color_value(normalized))),
        ValueDomain::Option => {
            ControlWrite::SelectedIndex(option_index(normalized, control.option_count()))
        }
    }
}

/// Maps `normalized` for `domain` and writes the result to `control`.
pub fn apply(control: &dyn ControlWidget, domain: ValueDomain, normalized: f64) -> ControlWrite {
    let write = map_value(domain, control, normalized);
    match &write {
        ControlWrite::Value(value) => control.set_value(value.clone()),
        ControlWrite::SelectedIndex(index) => control.set_selected_index(*index),
    }
    write
}
