use crate::error::MaskError;
use std::str::FromStr;

/// Character range of a field selection. A collapsed selection is a caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub fn new(start: usize, end: usize) -> Self {
        if end < start {
            return Self {
                start: end,
                end: start,
            };
        }
        Self { start, end }
    }

    pub fn caret(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// Zero for a collapsed or reversed range.
    pub fn len(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_collapsed(self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Backspace,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KeyModifiers(u8);

impl KeyModifiers {
    pub const NONE: Self = Self(0);
    pub const SHIFT: Self = Self(1 << 0);
    pub const CONTROL: Self = Self(1 << 1);
    pub const ALT: Self = Self(1 << 2);
    pub const META: Self = Self(1 << 3);

    pub fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Ctrl and Meta chords are shortcuts, never text input.
    pub fn is_chord(self) -> bool {
        self.contains(Self::CONTROL) || self.contains(Self::META)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyInput {
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub fn char(ch: char) -> Self {
        Self::new(KeyCode::Char(ch))
    }

    pub fn with_modifiers(mut self, modifiers: KeyModifiers) -> Self {
        self.modifiers = self.modifiers.union(modifiers);
        self
    }
}

/// Event observed on a field, with the selection the field reported for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEvent {
    Focus,
    Blur,
    KeyDown { key: KeyInput, selection: Selection },
    KeyPress { key: KeyInput, selection: Selection },
    Paste { text: Option<String>, selection: Selection },
    /// `selection` is `None` for autofill and programmatic assignment.
    Change { raw: String, selection: Option<Selection> },
}

/// Parses key names such as `backspace`, `ctrl+v` or a single character.
impl FromStr for KeyInput {
    type Err = MaskError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut modifiers = KeyModifiers::NONE;
        let mut rest = input;
        while let Some((head, tail)) = rest.split_once('+') {
            if tail.is_empty() {
                break;
            }
            modifiers = modifiers.union(match head.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => KeyModifiers::CONTROL,
                "meta" | "cmd" => KeyModifiers::META,
                "alt" => KeyModifiers::ALT,
                "shift" => KeyModifiers::SHIFT,
                _ => return Err(MaskError::UnknownKey(input.to_string())),
            });
            rest = tail;
        }

        let mut chars = rest.chars();
        let code = match (chars.next(), chars.next()) {
            (Some(ch), None) => KeyCode::Char(ch),
            _ => match rest.to_ascii_lowercase().as_str() {
                "backspace" => KeyCode::Backspace,
                "delete" | "del" => KeyCode::Delete,
                "enter" | "return" => KeyCode::Enter,
                "space" => KeyCode::Char(' '),
                _ => return Err(MaskError::UnknownKey(input.to_string())),
            },
        };
        Ok(Self { code, modifiers })
    }
}

#[cfg(test)]
mod tests {
    use super::{KeyCode, KeyInput, KeyModifiers, Selection};

    #[test]
    fn selection_normalizes_reversed_range() {
        let selection = Selection::new(5, 2);
        assert_eq!(selection, Selection { start: 2, end: 5 });
        assert_eq!(selection.len(), 3);
        assert!(Selection::caret(4).is_collapsed());
        assert_eq!(Selection { start: 2, end: 1 }.len(), 0);
    }

    #[test]
    fn parses_named_and_chorded_keys() {
        let key: KeyInput = "Backspace".parse().expect("key");
        assert_eq!(key.code, KeyCode::Backspace);

        let key: KeyInput = "ctrl+v".parse().expect("key");
        assert_eq!(key.code, KeyCode::Char('v'));
        assert!(key.modifiers.is_chord());

        let key: KeyInput = "+".parse().expect("key");
        assert_eq!(key.code, KeyCode::Char('+'));
        assert_eq!(key.modifiers, KeyModifiers::NONE);

        assert!("hyper+x".parse::<KeyInput>().is_err());
        assert!("pageup".parse::<KeyInput>().is_err());
    }
}
