mod caret;
mod format;
mod model;
mod parser;
mod reconcile;

use crate::effect::{HostNotification, Outcome};
use crate::error::MaskError;
use crate::event::{FieldEvent, KeyCode, KeyInput, Selection};
use crate::filters::CharFilter;
use crate::options::{MaskOptions, PasteStrategy};
use format::Formatter;
use std::sync::Arc;

pub use model::{CharRule, CharRules, MaskSlot, MaskSpec};

impl MaskSpec {
    /// Compiles `mask` with the default placeholder table.
    pub fn parse(mask: Option<&str>) -> Self {
        parser::parse_mask(mask, CharRules::default())
    }

    pub fn parse_with_rules(mask: Option<&str>, rules: CharRules) -> Self {
        parser::parse_mask(mask, rules)
    }
}

/// Mutable per-field state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineState {
    /// Canonical field value.
    pub value: String,
    pub mask_char: Option<char>,
    /// Last caret the engine asked for. Advisory, every event reports its own.
    pub caret_pos: Option<usize>,
    /// Selection captured by a deferred paste, consumed by the next change.
    pub paste_selection: Option<Selection>,
}

/// Caret-aware masking of a single text field.
///
/// Each `handle_*` method takes the event as observed on the field, updates
/// the state and returns the effects the host has to apply, in order.
pub struct MaskEngine {
    spec: Arc<MaskSpec>,
    state: EngineState,
    always_show_mask: bool,
    paste_strategy: PasteStrategy,
    filter: Option<CharFilter>,
}

impl std::fmt::Debug for MaskEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaskEngine")
            .field("template", &self.spec.template())
            .field("state", &self.state)
            .field("always_show_mask", &self.always_show_mask)
            .field("paste_strategy", &self.paste_strategy)
            .finish_non_exhaustive()
    }
}

impl MaskEngine {
    pub fn new(options: MaskOptions) -> Result<Self, MaskError> {
        let rules = match &options.format_chars {
            Some(table) => CharRules::compile(table)?,
            None => CharRules::default(),
        };
        let spec = MaskSpec::parse_with_rules(options.mask.as_deref(), rules);
        Ok(Self::with_spec(Arc::new(spec), options))
    }

    /// Binds an already compiled spec. `mask` and `format_chars` of
    /// `options` are ignored.
    pub fn with_spec(spec: Arc<MaskSpec>, options: MaskOptions) -> Self {
        let mut engine = Self {
            spec,
            state: EngineState {
                value: String::new(),
                mask_char: options.mask_char,
                caret_pos: None,
                paste_selection: None,
            },
            always_show_mask: options.always_show_mask,
            paste_strategy: options.paste_strategy,
            filter: options.filter.clone(),
        };

        let initial = options.initial_value();
        engine.state.value = if engine.spec.is_enabled()
            && (engine.always_show_mask || !initial.is_empty())
        {
            engine.format(initial)
        } else {
            initial.to_string()
        };
        log::debug!(
            "Attached mask '{}' with initial value '{}'",
            engine.spec.template(),
            engine.state.value
        );
        engine
    }

    pub fn spec(&self) -> &MaskSpec {
        &self.spec
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn value(&self) -> &str {
        &self.state.value
    }

    pub fn is_enabled(&self) -> bool {
        self.spec.is_enabled()
    }

    /// A deferred paste is waiting for its change event.
    pub fn is_awaiting_paste(&self) -> bool {
        self.state.paste_selection.is_some()
    }

    fn formatter(&self) -> Formatter<'_> {
        Formatter {
            spec: &self.spec,
            mask_char: self.state.mask_char,
            filter: self.filter.as_ref(),
            current: &self.state.value,
        }
    }

    pub fn format(&self, raw: &str) -> String {
        collect(&self.formatter().format(&chars(raw)))
    }

    pub fn prefix(&self) -> String {
        self.spec.prefix()
    }

    pub fn filled_length(&self, value: &str) -> usize {
        self.formatter().filled_length(&chars(value))
    }

    pub fn right_editable_pos(&self, pos: usize) -> Option<usize> {
        self.spec.right_editable_pos(pos)
    }

    pub fn left_editable_pos(&self, pos: usize) -> Option<usize> {
        self.spec.left_editable_pos(pos)
    }

    pub fn is_empty_value(&self, value: &str) -> bool {
        self.formatter().is_empty(&chars(value))
    }

    pub fn is_filled(&self, value: &str) -> bool {
        self.formatter().is_filled(&chars(value))
    }

    pub fn clear_range(&self, value: &str, start: usize, len: usize) -> String {
        collect(&self.formatter().clear_range(&chars(value), start, len))
    }

    pub fn insert_raw_substr(&self, value: &str, substr: &str, pos: usize) -> String {
        collect(
            &self
                .formatter()
                .insert_raw_substr(&chars(value), &chars(substr), pos),
        )
    }

    pub fn raw_substr_length(&self, substr: &str, pos: usize) -> usize {
        self.formatter().raw_substr_length(&chars(substr), pos)
    }

    /// Current value to edit. An untouched placeholder field starts from the
    /// blank template so edits have positions to land on.
    fn working_value(&self) -> Vec<char> {
        if self.state.value.is_empty() && self.state.mask_char.is_some() {
            return self.formatter().format(&[]);
        }
        chars(&self.state.value)
    }

    fn store(&mut self, outcome: &mut Outcome, value: String) {
        outcome.write_value(value.clone());
        self.state.value = value;
    }

    fn set_caret(&mut self, outcome: &mut Outcome, pos: usize) {
        outcome.set_caret(pos);
        self.state.caret_pos = Some(pos);
    }

    fn set_caret_to_end(&mut self, outcome: &mut Outcome) {
        let filled = self.filled_length(&self.state.value);
        if let Some(pos) = self.spec.right_editable_pos(filled) {
            self.set_caret(outcome, pos);
        }
    }

    /// Routes `event` to its handler.
    pub fn handle(&mut self, event: &FieldEvent) -> Outcome {
        match event {
            FieldEvent::Focus => self.handle_focus(),
            FieldEvent::Blur => self.handle_blur(),
            FieldEvent::KeyDown { key, selection } => self.handle_keydown(key, *selection),
            FieldEvent::KeyPress { key, selection } => self.handle_keypress(key, *selection),
            FieldEvent::Paste { text, selection } => self.handle_paste(text.as_deref(), *selection),
            FieldEvent::Change { raw, selection } => self.handle_change(raw, *selection),
        }
    }

    pub fn handle_focus(&mut self) -> Outcome {
        if !self.is_enabled() {
            return Outcome::notify_only(HostNotification::Focus);
        }
        let mut outcome = Outcome::default();
        if self.state.value.is_empty() {
            let value = self.format(&self.spec.prefix());
            let changed = value != self.state.value;
            self.store(&mut outcome, value);
            self.set_caret_to_end(&mut outcome);
            if changed {
                outcome.notify(HostNotification::Change);
            }
        } else if self.filled_length(&self.state.value) < self.spec.len() {
            self.set_caret_to_end(&mut outcome);
        }
        outcome.notify(HostNotification::Focus);
        outcome
    }

    pub fn handle_blur(&mut self) -> Outcome {
        if !self.is_enabled() {
            return Outcome::notify_only(HostNotification::Blur);
        }
        let mut outcome = Outcome::default();
        if !self.always_show_mask
            && !self.state.value.is_empty()
            && self.is_empty_value(&self.state.value)
        {
            log::debug!("Blur on untouched mask, clearing '{}'", self.state.value);
            self.store(&mut outcome, String::new());
            outcome.notify(HostNotification::Change);
        }
        outcome.notify(HostNotification::Blur);
        outcome
    }

    /// Backspace and Delete clear positions in place instead of shifting
    /// the rest of the value.
    pub fn handle_keydown(&mut self, key: &KeyInput, selection: Selection) -> Outcome {
        if !self.is_enabled() || key.modifiers.is_chord() {
            return Outcome::notify_only(HostNotification::KeyDown);
        }
        let mut outcome = Outcome::default();
        let mut caret = selection.start;
        let mut prevent_default = false;
        let mut value = self.state.value.clone();

        if matches!(key.code, KeyCode::Backspace | KeyCode::Delete) {
            let from_right = key.code == KeyCode::Delete;
            let prefix_len = self.spec.prefix_len();
            if !selection.is_collapsed() {
                value = self.clear_range(&value, selection.start, selection.len());
            } else if caret < prefix_len || (!from_right && caret == prefix_len) {
                caret = prefix_len;
            } else {
                let editable = if from_right {
                    self.spec.right_editable_pos(caret)
                } else {
                    caret
                        .checked_sub(1)
                        .and_then(|pos| self.spec.left_editable_pos(pos))
                };
                if let Some(pos) = editable {
                    value = self.clear_range(&value, pos, 1);
                    caret = pos;
                }
            }
            prevent_default = true;
        }

        outcome.notify(HostNotification::KeyDown);
        if value != self.state.value {
            self.store(&mut outcome, value);
            prevent_default = true;
            outcome.notify(HostNotification::Change);
        }
        if prevent_default {
            outcome.prevent_default();
            self.set_caret(&mut outcome, caret);
        }
        outcome
    }

    /// Printable input. Accepted characters overwrite the next placeholder,
    /// rejected ones are swallowed.
    pub fn handle_keypress(&mut self, key: &KeyInput, selection: Selection) -> Outcome {
        let KeyCode::Char(ch) = key.code else {
            return Outcome::notify_only(HostNotification::KeyPress);
        };
        if !self.is_enabled() || key.modifiers.is_chord() {
            return Outcome::notify_only(HostNotification::KeyPress);
        }

        let mut outcome = Outcome::default();
        let mask_len = self.spec.len();
        let prefix_len = self.spec.prefix_len();
        let mut caret = selection.start;
        let mut next = None::<Vec<char>>;
        {
            let f = self.formatter();
            if self.spec.is_permanent(caret) && self.spec.char_at(caret) == Some(ch) {
                next = Some(f.insert_raw_substr(&self.working_value(), &[ch], caret));
                caret += 1;
            } else if let Some(pos) = self
                .spec
                .right_editable_pos(caret)
                .filter(|pos| f.is_allowed(Some(ch), *pos, false))
            {
                let cleared =
                    f.clear_range(&self.working_value(), selection.start, selection.len());
                next = Some(f.insert_raw_substr(&cleared, &[ch], pos));
                caret = pos + 1;
            } else {
                log::trace!("Rejected '{ch}' at {caret}");
            }
        }

        if let Some(next) = next.map(|value| collect(&value))
            && next != self.state.value
        {
            self.store(&mut outcome, next);
            outcome.notify(HostNotification::Change);
        }
        outcome.prevent_default();
        if caret < mask_len
            && caret > prefix_len
            && let Some(pos) = self.spec.right_editable_pos(caret)
        {
            caret = pos;
        }
        self.set_caret(&mut outcome, caret);
        outcome.notify(HostNotification::KeyPress);
        outcome
    }

    /// `text` is the clipboard content when the platform exposes it.
    pub fn handle_paste(&mut self, text: Option<&str>, selection: Selection) -> Outcome {
        if !self.is_enabled() {
            return Outcome::default();
        }
        let mut outcome = Outcome::default();
        match self.paste_strategy {
            PasteStrategy::DeferToChange => {
                log::debug!("Deferring paste at {selection:?} to the next change event");
                self.state.paste_selection = Some(selection);
                outcome.write_value(String::new());
            }
            PasteStrategy::Immediate => {
                if let Some(text) = text.filter(|text| !text.is_empty()) {
                    let displayed = self.state.value.clone();
                    self.paste_text(&mut outcome, text, selection, &displayed);
                }
            }
        }
        outcome.prevent_default();
        outcome
    }

    fn paste_text(&mut self, outcome: &mut Outcome, text: &str, selection: Selection, displayed: &str) {
        let text = chars(text);
        let mut caret = selection.start;
        let (value, consumed) = {
            let f = self.formatter();
            let mut value = self.working_value();
            if !selection.is_collapsed() {
                value = f.clear_range(&value, caret, selection.len());
            }
            let consumed = f.raw_substr_length(&text, caret);
            (f.insert_raw_substr(&value, &text, caret), consumed)
        };
        caret += consumed;
        caret = self.spec.right_editable_pos(caret).unwrap_or(caret);
        log::debug!("Pasted {} chars spanning {consumed} positions", text.len());

        let value = collect(&value);
        if value != displayed {
            self.store(outcome, value);
            outcome.notify(HostNotification::Change);
        }
        self.set_caret(outcome, caret);
    }

    /// The field text changed natively. `selection` is `None` when the host
    /// cannot report one (autofill, programmatic assignment).
    pub fn handle_change(&mut self, raw: &str, selection: Option<Selection>) -> Outcome {
        let mut outcome = Outcome::default();
        if !self.is_enabled() {
            self.state.value = raw.to_string();
            outcome.notify(HostNotification::Change);
            return outcome;
        }

        if let Some(pending) = self.state.paste_selection.take() {
            self.paste_text(&mut outcome, raw, pending, raw);
            return outcome;
        }

        // An empty placeholder field has no positions to diff against, so the
        // whole raw text is new input.
        let starts_blank = self.state.value.is_empty() && self.state.mask_char.is_some();
        let Some(selection) = selection.filter(|_| !starts_blank) else {
            let value = self.format(raw);
            let caret = self.filled_length(&value);
            log::debug!("Reformatted whole change to '{value}'");
            self.store(&mut outcome, value);
            self.set_caret(&mut outcome, caret);
            outcome.notify(HostNotification::Change);
            return outcome;
        };

        let reconciled = {
            let f = self.formatter();
            reconcile::reconcile(&f, &chars(&self.state.value), &chars(raw), selection.end)
        };
        self.store(&mut outcome, collect(&reconciled.value));
        self.set_caret(&mut outcome, reconciled.caret);
        outcome.notify(HostNotification::Change);
        outcome
    }
}

fn chars(value: &str) -> Vec<char> {
    value.chars().collect()
}

fn collect(value: &[char]) -> String {
    value.iter().collect()
}
