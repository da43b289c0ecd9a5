use crate::event::Selection;

/// Host callbacks the engine asks to be invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostNotification {
    Change,
    Focus,
    Blur,
    KeyDown,
    KeyPress,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Replace the displayed text of the field.
    WriteValue(String),
    SetSelection(Selection),
    /// Set the selection again on the next animation frame. Some hosts reset
    /// the selection after a programmatic write.
    ReassertSelectionNextFrame(Selection),
    PreventDefault,
    Notify(HostNotification),
}

/// Ordered side effects produced by one handled event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    pub effects: Vec<Effect>,
}

impl Outcome {
    pub fn notify_only(notification: HostNotification) -> Self {
        Self {
            effects: vec![Effect::Notify(notification)],
        }
    }

    pub fn write_value(&mut self, value: impl Into<String>) {
        self.effects.push(Effect::WriteValue(value.into()));
    }

    pub fn set_caret(&mut self, pos: usize) {
        let selection = Selection::caret(pos);
        self.effects.push(Effect::SetSelection(selection));
        self.effects
            .push(Effect::ReassertSelectionNextFrame(selection));
    }

    pub fn prevent_default(&mut self) {
        if !self.is_default_prevented() {
            self.effects.push(Effect::PreventDefault);
        }
    }

    pub fn notify(&mut self, notification: HostNotification) {
        self.effects.push(Effect::Notify(notification));
    }

    pub fn is_default_prevented(&self) -> bool {
        self.effects
            .iter()
            .any(|effect| matches!(effect, Effect::PreventDefault))
    }

    /// Last text written to the field, if any.
    pub fn written_value(&self) -> Option<&str> {
        self.effects.iter().rev().find_map(|effect| match effect {
            Effect::WriteValue(value) => Some(value.as_str()),
            _ => None,
        })
    }

    pub fn caret(&self) -> Option<usize> {
        self.effects.iter().rev().find_map(|effect| match effect {
            Effect::SetSelection(selection) => Some(selection.start),
            _ => None,
        })
    }

    pub fn notifications(&self) -> impl Iterator<Item = HostNotification> + '_ {
        self.effects.iter().filter_map(|effect| match effect {
            Effect::Notify(notification) => Some(*notification),
            _ => None,
        })
    }

    pub fn has_notification(&self, notification: HostNotification) -> bool {
        self.notifications().any(|n| n == notification)
    }
}
