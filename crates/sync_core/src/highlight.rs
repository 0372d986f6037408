use crate::widget::ControlWidget;

pub const ACTIVE_BACKGROUND: &str = "#555555";

pub fn set(control: &dyn ControlWidget) {
    control.set_background(ACTIVE_BACKGROUND);
}

pub fn clear(control: &dyn ControlWidget) {
    control.set_background("");
}
