use crate::widget::ControlHandle;

#[derive(Clone)]
pub struct RosterEntry {
    pub key: String,
    pub control: ControlHandle,
}

impl RosterEntry {
    pub fn new(control: ControlHandle) -> Self {
        Self {
            key: control.property().to_string(),
            control,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Ordered roster plus the position of the active entry.
///
/// Starts with nothing selected. Stepping wraps in both directions; on an
/// empty roster stepping does nothing.
#[derive(Clone, Default)]
pub struct SelectionCursor {
    roster: Vec<RosterEntry>,
    position: Option<usize>,
}

impl SelectionCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends controls in order. Keys are not deduplicated.
    pub fn extend(&mut self, controls: impl IntoIterator<Item = ControlHandle>) {
        self.roster
            .extend(controls.into_iter().map(RosterEntry::new));
    }

    pub fn roster(&self) -> &[RosterEntry] {
        &self.roster
    }

    pub fn len(&self) -> usize {
        self.roster.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roster.is_empty()
    }

    pub fn position(&self) -> Option<usize> {
        self.position
    }

    /// Position of the active entry, `-1` before the first step.
    pub fn index(&self) -> i64 {
        self.position.map_or(-1, |position| position as i64)
    }

    pub fn active(&self) -> Option<&ControlHandle> {
        self.position
            .and_then(|position| self.roster.get(position))
            .map(|entry| &entry.control)
    }

    /// First control registered under `key`.
    pub fn find(&self, key: &str) -> Option<&ControlHandle> {
        self.roster
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| &entry.control)
    }

    pub fn step(&mut self, direction: Direction) -> Option<&ControlHandle> {
        match direction {
            Direction::Forward => self.step_forward(),
            Direction::Backward => self.step_backward(),
        }
    }

    pub fn step_forward(&mut self) -> Option<&ControlHandle> {
        let len = self.roster.len();
        if len == 0 {
            return None;
        }
        self.position = Some(match self.position {
            Some(position) => (position + 1) % len,
            None => 0,
        });
        self.active()
    }

    pub fn step_backward(&mut self) -> Option<&ControlHandle> {
        let len = self.roster.len();
        if len == 0 {
            return None;
        }
        self.position = Some(match self.position {
            Some(position) => (position + len - 1) % len,
            None => len - 1,
        });
        self.active()
    }
}
