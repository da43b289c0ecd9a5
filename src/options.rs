use crate::error::MaskError;
use crate::filters::CharFilter;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::Path;

pub const DEFAULT_MASK_CHAR: char = '_';

/// How clipboard text reaches the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PasteStrategy {
    /// The paste event carries the clipboard text.
    #[default]
    Immediate,
    /// The paste event only snapshots the selection and blanks the field; the
    /// text arrives with the following change event.
    DeferToChange,
}

/// Options accepted when a mask is attached to a field.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskOptions {
    pub mask: Option<String>,
    /// Fill character for unfilled positions. `None` selects prefix mode.
    #[serde(deserialize_with = "deserialize_mask_char")]
    pub mask_char: Option<char>,
    pub always_show_mask: bool,
    pub value: Option<String>,
    pub default_value: Option<String>,
    /// Replaces the built-in placeholder table (`9`, `a`, `*`).
    pub format_chars: Option<IndexMap<char, String>>,
    pub paste_strategy: PasteStrategy,
    #[serde(skip)]
    pub filter: Option<CharFilter>,
}

impl Default for MaskOptions {
    fn default() -> Self {
        Self {
            mask: None,
            mask_char: Some(DEFAULT_MASK_CHAR),
            always_show_mask: false,
            value: None,
            default_value: None,
            format_chars: None,
            paste_strategy: PasteStrategy::default(),
            filter: None,
        }
    }
}

impl fmt::Debug for MaskOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MaskOptions")
            .field("mask", &self.mask)
            .field("mask_char", &self.mask_char)
            .field("always_show_mask", &self.always_show_mask)
            .field("value", &self.value)
            .field("default_value", &self.default_value)
            .field("format_chars", &self.format_chars)
            .field("paste_strategy", &self.paste_strategy)
            .field("filter", &self.filter.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl MaskOptions {
    pub fn new(mask: impl Into<String>) -> Self {
        Self {
            mask: Some(mask.into()),
            ..Self::default()
        }
    }

    pub fn with_mask_char(mut self, mask_char: Option<char>) -> Self {
        self.mask_char = mask_char;
        self
    }

    pub fn with_always_show_mask(mut self, always_show_mask: bool) -> Self {
        self.always_show_mask = always_show_mask;
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn with_format_chars(mut self, format_chars: IndexMap<char, String>) -> Self {
        self.format_chars = Some(format_chars);
        self
    }

    pub fn with_paste_strategy(mut self, strategy: PasteStrategy) -> Self {
        self.paste_strategy = strategy;
        self
    }

    pub fn with_filter(mut self, filter: CharFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// `value` wins over `default_value`; neither yields an empty field.
    pub fn initial_value(&self) -> &str {
        self.value
            .as_deref()
            .or(self.default_value.as_deref())
            .unwrap_or("")
    }

    pub fn from_yaml_str(source: &str) -> Result<Self, MaskError> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn from_json_str(source: &str) -> Result<Self, MaskError> {
        Ok(serde_json::from_str(source)?)
    }

    /// Loads options from a `.json` file, anything else is read as YAML.
    pub fn load(path: &Path) -> Result<Self, MaskError> {
        let source = std::fs::read_to_string(path)?;
        log::debug!("Loading mask options from {}", path.display());
        if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json_str(&source)
        } else {
            Self::from_yaml_str(&source)
        }
    }
}

/// `null` and `""` disable the fill character, otherwise its first char is used.
fn deserialize_mask_char<'de, D>(deserializer: D) -> Result<Option<char>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| value.chars().next()))
}

#[cfg(test)]
mod tests {
    use super::{MaskOptions, PasteStrategy};
    use pretty_assertions::assert_eq;

    #[test]
    fn yaml_defaults() {
        let options = MaskOptions::from_yaml_str("mask: \"999-999\"\n").expect("yaml");
        assert_eq!(options.mask.as_deref(), Some("999-999"));
        assert_eq!(options.mask_char, Some('_'));
        assert!(!options.always_show_mask);
        assert_eq!(options.paste_strategy, PasteStrategy::Immediate);
    }

    #[test]
    fn null_or_empty_mask_char_selects_prefix_mode() {
        let options = MaskOptions::from_yaml_str("mask: \"ABC-999\"\nmask_char: null\n").expect("yaml");
        assert_eq!(options.mask_char, None);

        let options = MaskOptions::from_json_str(r#"{"mask":"99","mask_char":""}"#).expect("json");
        assert_eq!(options.mask_char, None);

        let options = MaskOptions::from_json_str(r##"{"mask":"99","mask_char":"#"}"##).expect("json");
        assert_eq!(options.mask_char, Some('#'));
    }

    #[test]
    fn format_chars_and_strategy() {
        let source = "mask: \"hh:hh\"\nformat_chars:\n  h: \"[0-9a-f]\"\npaste_strategy: defer_to_change\n";
        let options = MaskOptions::from_yaml_str(source).expect("yaml");
        let table = options.format_chars.expect("table");
        assert_eq!(table.get(&'h').map(String::as_str), Some("[0-9a-f]"));
        assert_eq!(options.paste_strategy, PasteStrategy::DeferToChange);
    }

    #[test]
    fn value_takes_precedence_over_default() {
        let options = MaskOptions::new("99").with_default_value("12");
        assert_eq!(options.initial_value(), "12");
        let options = options.with_value("34");
        assert_eq!(options.initial_value(), "34");
        assert_eq!(MaskOptions::default().initial_value(), "");
    }
}
