use crate::error::MaskError;
use indexmap::IndexMap;
use regex::Regex;

/// Acceptance rule of a placeholder symbol.
#[derive(Debug, Clone)]
pub enum CharRule {
    Digit,
    Letter,
    Alnum,
    Pattern(Regex),
}

impl CharRule {
    pub fn accepts(&self, ch: char) -> bool {
        match self {
            Self::Digit => ch.is_ascii_digit(),
            Self::Letter => ch.is_ascii_alphabetic(),
            Self::Alnum => ch.is_ascii_alphanumeric(),
            Self::Pattern(pattern) => {
                let mut buf = [0u8; 4];
                pattern.is_match(ch.encode_utf8(&mut buf))
            }
        }
    }
}

/// Placeholder symbols recognised by the parser, in declaration order.
#[derive(Debug, Clone)]
pub struct CharRules {
    rules: IndexMap<char, CharRule>,
}

impl CharRules {
    /// Compiles a user supplied table of `symbol -> regex` rules. The table
    /// replaces the defaults entirely.
    pub fn compile(table: &IndexMap<char, String>) -> Result<Self, MaskError> {
        let mut rules = IndexMap::with_capacity(table.len());
        for (symbol, pattern) in table {
            let regex =
                Regex::new(pattern).map_err(|err| MaskError::InvalidRule(*symbol, err))?;
            rules.insert(*symbol, CharRule::Pattern(regex));
        }
        log::debug!("Compiled {} custom placeholder rules.", rules.len());
        Ok(Self { rules })
    }

    pub fn get(&self, symbol: char) -> Option<&CharRule> {
        self.rules.get(&symbol)
    }

    pub fn is_placeholder(&self, symbol: char) -> bool {
        self.rules.contains_key(&symbol)
    }
}

impl Default for CharRules {
    fn default() -> Self {
        let mut rules = IndexMap::new();
        rules.insert('9', CharRule::Digit);
        rules.insert('a', CharRule::Letter);
        rules.insert('*', CharRule::Alnum);
        Self { rules }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskSlot {
    /// Fixed character the user cannot edit.
    Literal(char),
    /// Editable position constrained by the rule registered for `symbol`.
    Placeholder(char),
}

/// Compiled mask: the canonical template with escape markers removed and the
/// set of permanent positions.
#[derive(Debug, Clone)]
pub struct MaskSpec {
    pub(super) template: Vec<char>,
    pub(super) permanent: Vec<bool>,
    pub(super) rules: CharRules,
}

impl MaskSpec {
    pub fn empty() -> Self {
        Self {
            template: Vec::new(),
            permanent: Vec::new(),
            rules: CharRules::default(),
        }
    }

    /// An empty template means masking is disabled.
    pub fn is_enabled(&self) -> bool {
        !self.template.is_empty()
    }

    pub fn len(&self) -> usize {
        self.template.len()
    }

    pub fn is_empty(&self) -> bool {
        self.template.is_empty()
    }

    pub fn template(&self) -> String {
        self.template.iter().collect()
    }

    pub fn char_at(&self, pos: usize) -> Option<char> {
        self.template.get(pos).copied()
    }

    pub fn slot(&self, pos: usize) -> Option<MaskSlot> {
        let ch = self.char_at(pos)?;
        if self.is_permanent(pos) {
            Some(MaskSlot::Literal(ch))
        } else {
            Some(MaskSlot::Placeholder(ch))
        }
    }

    pub fn is_permanent(&self, pos: usize) -> bool {
        self.permanent.get(pos).copied().unwrap_or(false)
    }

    pub fn permanent_positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.permanent
            .iter()
            .enumerate()
            .filter_map(|(pos, permanent)| permanent.then_some(pos))
    }

    pub(super) fn rule_at(&self, pos: usize) -> Option<&CharRule> {
        match self.slot(pos)? {
            MaskSlot::Placeholder(symbol) => self.rules.get(symbol),
            MaskSlot::Literal(_) => None,
        }
    }

    /// Length of the leading run of permanent characters.
    pub fn prefix_len(&self) -> usize {
        self.permanent.iter().take_while(|permanent| **permanent).count()
    }

    pub fn prefix(&self) -> String {
        self.template[..self.prefix_len()].iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{CharRule, CharRules, MaskSlot};
    use crate::mask::parser::parse_mask;
    use indexmap::IndexMap;

    #[test]
    fn default_rules_cover_digit_letter_alnum() {
        let rules = CharRules::default();
        assert!(rules.get('9').is_some_and(|rule| rule.accepts('7')));
        assert!(rules.get('a').is_some_and(|rule| rule.accepts('Q')));
        assert!(rules.get('*').is_some_and(|rule| rule.accepts('z')));
        assert!(!rules.is_placeholder('#'));
    }

    #[test]
    fn custom_rules_replace_defaults() {
        let mut table = IndexMap::new();
        table.insert('h', "[0-9a-f]".to_string());
        let rules = CharRules::compile(&table).expect("rules");
        assert!(rules.get('h').is_some_and(|rule| rule.accepts('c')));
        assert!(rules.get('h').is_some_and(|rule| !rule.accepts('g')));
        assert!(!rules.is_placeholder('9'));
    }

    #[test]
    fn invalid_custom_rule_is_reported() {
        let mut table = IndexMap::new();
        table.insert('x', "[".to_string());
        assert!(CharRules::compile(&table).is_err());
    }

    #[test]
    fn slots_and_prefix() {
        let spec = parse_mask(Some("+7 (999)"), CharRules::default());
        assert_eq!(spec.prefix(), "+7 (");
        assert_eq!(spec.slot(0), Some(MaskSlot::Literal('+')));
        assert_eq!(spec.slot(4), Some(MaskSlot::Placeholder('9')));
        assert_eq!(spec.slot(8), None);
        assert!(matches!(spec.rule_at(5), Some(CharRule::Digit)));
        assert_eq!(spec.permanent_positions().collect::<Vec<_>>(), vec![0, 1, 2, 3, 7]);
    }
}
