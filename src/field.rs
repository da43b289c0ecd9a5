use crate::effect::{Effect, HostNotification, Outcome};
use crate::error::MaskError;
use crate::event::{KeyCode, KeyInput, Selection};
use crate::mask::MaskEngine;
use crate::options::MaskOptions;

/// Text input the engine can be attached to.
pub trait TextField {
    fn text(&self) -> String;
    fn set_text(&mut self, text: &str);
    fn selection(&self) -> Selection;
    fn set_selection(&mut self, selection: Selection);
    /// Apply `selection` again on the next frame.
    fn schedule_selection(&mut self, selection: Selection);
}

/// In-memory field with browser-like default editing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryField {
    text: String,
    selection: Selection,
    scheduled: Vec<Selection>,
}

impl MemoryField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs one frame: scheduled selections are re-applied in order.
    pub fn tick(&mut self) {
        for selection in std::mem::take(&mut self.scheduled) {
            self.set_selection(selection);
        }
    }
}

impl TextField for MemoryField {
    fn text(&self) -> String {
        self.text.clone()
    }

    fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        let len = self.text.chars().count();
        self.selection = Selection::new(self.selection.start.min(len), self.selection.end.min(len));
    }

    fn selection(&self) -> Selection {
        self.selection
    }

    fn set_selection(&mut self, selection: Selection) {
        let len = self.text.chars().count();
        self.selection = Selection::new(selection.start.min(len), selection.end.min(len));
    }

    fn schedule_selection(&mut self, selection: Selection) {
        self.scheduled.push(selection);
    }
}

type Listener = Box<dyn FnMut(HostNotification, &str)>;

/// A [`MaskEngine`] bound to a field. Applies the engine's effects to the
/// field and forwards notifications to the host listener.
pub struct MaskedField<F: TextField = MemoryField> {
    engine: MaskEngine,
    field: F,
    listener: Option<Listener>,
}

impl<F: TextField> std::fmt::Debug for MaskedField<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaskedField")
            .field("engine", &self.engine)
            .field("text", &self.field.text())
            .field("selection", &self.field.selection())
            .finish_non_exhaustive()
    }
}

/// Attaches a mask to `field`, writing the initial value into it.
pub fn attach<F: TextField>(field: F, options: MaskOptions) -> Result<MaskedField<F>, MaskError> {
    let engine = MaskEngine::new(options)?;
    Ok(MaskedField::with_engine(field, engine))
}

impl<F: TextField> MaskedField<F> {
    pub fn with_engine(mut field: F, engine: MaskEngine) -> Self {
        field.set_text(engine.value());
        Self {
            engine,
            field,
            listener: None,
        }
    }

    pub fn on_notify(mut self, listener: impl FnMut(HostNotification, &str) + 'static) -> Self {
        self.listener = Some(Box::new(listener));
        self
    }

    pub fn engine(&self) -> &MaskEngine {
        &self.engine
    }

    pub fn field(&self) -> &F {
        &self.field
    }

    pub fn field_mut(&mut self) -> &mut F {
        &mut self.field
    }

    pub fn value(&self) -> &str {
        self.engine.value()
    }

    pub fn caret(&self) -> usize {
        self.field.selection().start
    }

    /// Applies effects in order. Returns whether the default action was
    /// prevented.
    pub fn apply(&mut self, outcome: Outcome) -> bool {
        let mut prevented = false;
        for effect in outcome.effects {
            match effect {
                Effect::WriteValue(value) => self.field.set_text(&value),
                Effect::SetSelection(selection) => self.field.set_selection(selection),
                Effect::ReassertSelectionNextFrame(selection) => {
                    self.field.schedule_selection(selection)
                }
                Effect::PreventDefault => prevented = true,
                Effect::Notify(notification) => {
                    if let Some(listener) = self.listener.as_mut() {
                        listener(notification, self.engine.value());
                    }
                }
            }
        }
        prevented
    }

    pub fn focus(&mut self) {
        let outcome = self.engine.handle_focus();
        self.apply(outcome);
    }

    pub fn blur(&mut self) {
        let outcome = self.engine.handle_blur();
        self.apply(outcome);
    }

    pub fn select(&mut self, start: usize, end: usize) {
        self.field.set_selection(Selection::new(start, end));
    }

    /// Full key cycle: keydown, keypress, then the native edit and its
    /// change event when nothing prevented them.
    pub fn press_key(&mut self, key: KeyInput)
    where
        F: NativeEditing,
    {
        let outcome = self.engine.handle_keydown(&key, self.field.selection());
        if self.apply(outcome) {
            return;
        }
        match key.code {
            KeyCode::Char(ch) => {
                let outcome = self.engine.handle_keypress(&key, self.field.selection());
                if self.apply(outcome) {
                    return;
                }
                self.field.insert_native(ch.encode_utf8(&mut [0u8; 4]));
            }
            KeyCode::Backspace => self.field.delete_native(false),
            KeyCode::Delete => self.field.delete_native(true),
            KeyCode::Enter => {
                let outcome = self.engine.handle_keypress(&key, self.field.selection());
                self.apply(outcome);
                return;
            }
        }
        self.fire_change();
    }

    pub fn type_text(&mut self, text: &str)
    where
        F: NativeEditing,
    {
        for ch in text.chars() {
            self.press_key(KeyInput::char(ch));
        }
    }

    /// Clipboard paste. A deferred paste is completed the way the platform
    /// does it: the text lands in the blanked field and a change follows.
    pub fn paste(&mut self, text: &str)
    where
        F: NativeEditing,
    {
        let outcome = self.engine.handle_paste(Some(text), self.field.selection());
        let prevented = self.apply(outcome);
        if self.engine.is_awaiting_paste() {
            self.field.set_text("");
            self.field.set_selection(Selection::caret(0));
            self.field.insert_native(text);
            self.fire_change();
        } else if !prevented {
            self.field.insert_native(text);
            self.fire_change();
        }
    }

    /// The field text was replaced natively with `text`, leaving `selection`.
    pub fn native_edit(&mut self, text: &str, selection: Selection) {
        self.field.set_text(text);
        self.field.set_selection(selection);
        self.fire_change();
    }

    /// Autofill or programmatic assignment: no selection is reported.
    pub fn autofill(&mut self, text: &str) {
        self.field.set_text(text);
        let outcome = self.engine.handle_change(text, None);
        self.apply(outcome);
    }

    fn fire_change(&mut self) {
        let text = self.field.text();
        let outcome = self
            .engine
            .handle_change(&text, Some(self.field.selection()));
        self.apply(outcome);
    }
}

impl MaskedField<MemoryField> {
    pub fn tick(&mut self) {
        self.field.tick();
    }
}

/// Fields that perform default editing themselves when an event is not
/// prevented.
pub trait NativeEditing: TextField {
    fn insert_native(&mut self, text: &str);
    fn delete_native(&mut self, forward: bool);
}

impl NativeEditing for MemoryField {
    /// Native insertion over the current selection.
    fn insert_native(&mut self, text: &str) {
        let Selection { start, end } = self.selection;
        let mut chars: Vec<char> = self.text.chars().collect();
        let end = end.min(chars.len());
        let start = start.min(end);
        chars.splice(start..end, text.chars());
        self.text = chars.into_iter().collect();
        self.selection = Selection::caret(start + text.chars().count());
    }

    /// Native Backspace (`forward == false`) or Delete.
    fn delete_native(&mut self, forward: bool) {
        let mut chars: Vec<char> = self.text.chars().collect();
        let Selection { start, end } = self.selection;
        let end = end.min(chars.len());
        let start = start.min(end);
        let range = if start != end {
            start..end
        } else if forward {
            start..(start + 1).min(chars.len())
        } else {
            start.saturating_sub(1)..start
        };
        let caret = range.start;
        chars.drain(range);
        self.text = chars.into_iter().collect();
        self.selection = Selection::caret(caret);
    }
}

#[cfg(test)]
mod tests {
    use super::{MemoryField, NativeEditing, TextField};
    use crate::event::Selection;

    #[test]
    fn native_insert_replaces_selection() {
        let mut field = MemoryField::new();
        field.set_text("hello");
        field.set_selection(Selection::new(1, 4));
        field.insert_native("EY");
        assert_eq!(field.text(), "hEYo");
        assert_eq!(field.selection(), Selection::caret(3));
    }

    #[test]
    fn native_delete() {
        let mut field = MemoryField::new();
        field.set_text("abc");
        field.set_selection(Selection::caret(2));
        field.delete_native(false);
        assert_eq!(field.text(), "ac");
        assert_eq!(field.selection(), Selection::caret(1));

        field.delete_native(true);
        assert_eq!(field.text(), "a");

        field.set_selection(Selection::caret(0));
        field.delete_native(false);
        assert_eq!(field.text(), "a");
    }

    #[test]
    fn scheduled_selection_applies_on_tick() {
        let mut field = MemoryField::new();
        field.set_text("abcdef");
        field.schedule_selection(Selection::caret(4));
        field.set_selection(Selection::caret(0));
        assert_eq!(field.selection(), Selection::caret(0));
        field.tick();
        assert_eq!(field.selection(), Selection::caret(4));
    }
}
