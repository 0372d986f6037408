use shared::domain::{ControlValue, ValueDomain};

use crate::widget::ControlWidget;

/// Derives the value domain from the control's present configuration.
/// The color tag wins over the value type; anything that is neither a number
/// nor a flag is treated as an option list.
pub fn classify(control: &dyn ControlWidget) -> ValueDomain {
    if control.is_color_widget() {
        return ValueDomain::Color;
    }

    match control.value() {
        ControlValue::Number(_) => ValueDomain::Number,
        ControlValue::Boolean(_) => ValueDomain::Boolean,
        ControlValue::Color(_) | ControlValue::Text(_) => ValueDomain::Option,
    }
}
