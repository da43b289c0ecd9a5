use super::model::MaskSpec;
use crate::filters::CharFilter;

/// Positional operations of a mask over character vectors.
///
/// Every position is a character index into the template. `current` is the
/// field value handed to the filter hook.
pub(crate) struct Formatter<'a> {
    pub spec: &'a MaskSpec,
    pub mask_char: Option<char>,
    pub filter: Option<&'a CharFilter>,
    pub current: &'a str,
}

impl Formatter<'_> {
    /// Whether `ch` may stand at `pos`. Permanent positions only accept their
    /// own literal. With `allow_mask_char` the fill character counts as valid
    /// for placeholders.
    pub fn is_allowed(&self, ch: Option<char>, pos: usize, allow_mask_char: bool) -> bool {
        if self.spec.is_permanent(pos) {
            return self.spec.char_at(pos) == ch;
        }
        let (Some(ch), Some(rule)) = (ch, self.spec.rule_at(pos)) else {
            return false;
        };
        if allow_mask_char && self.mask_char == Some(ch) {
            return true;
        }
        if !rule.accepts(ch) {
            return false;
        }
        match self.filter {
            Some(filter) if !ch.is_whitespace() => filter(ch, pos, self.current),
            _ => true,
        }
    }

    /// True when no placeholder holds a typed character.
    pub fn is_empty(&self, value: &[char]) -> bool {
        !value
            .iter()
            .enumerate()
            .any(|(pos, ch)| !self.spec.is_permanent(pos) && self.is_allowed(Some(*ch), pos, false))
    }

    pub fn is_filled(&self, value: &[char]) -> bool {
        self.filled_length(value) == self.spec.len()
    }

    /// Projects arbitrary raw text onto the template.
    pub fn format(&self, value: &[char]) -> Vec<char> {
        let Some(mask_char) = self.mask_char else {
            let prefix_len = self.spec.prefix_len();
            let mut out = self.insert_raw_substr(&[], value, 0);
            while out.len() > prefix_len && self.spec.is_permanent(out.len() - 1) {
                out.pop();
            }
            if out.len() < prefix_len {
                return self.spec.template[..prefix_len].to_vec();
            }
            return out;
        };

        let blank: Vec<char> = self
            .spec
            .template
            .iter()
            .enumerate()
            .map(|(pos, ch)| if self.spec.is_permanent(pos) { *ch } else { mask_char })
            .collect();
        if value.is_empty() {
            return blank;
        }
        self.insert_raw_substr(&blank, value, 0)
    }

    /// Clears `len` positions starting at `start`. Placeholder mode refills
    /// them with literals and the fill character, prefix mode drops them and
    /// reformats what is left.
    pub fn clear_range(&self, value: &[char], start: usize, len: usize) -> Vec<char> {
        let end = start.saturating_add(len);
        let Some(mask_char) = self.mask_char else {
            let prefix_len = self.spec.prefix_len();
            let kept: Vec<char> = value
                .iter()
                .enumerate()
                .filter(|(pos, _)| *pos < prefix_len || *pos < start || *pos >= end)
                .map(|(_, ch)| *ch)
                .collect();
            return self.format(&kept);
        };

        value
            .iter()
            .enumerate()
            .map(|(pos, ch)| {
                if pos < start || pos >= end {
                    *ch
                } else if self.spec.is_permanent(pos) {
                    self.spec.template[pos]
                } else {
                    mask_char
                }
            })
            .collect()
    }

    /// Writes `substr` into `value` from `pos` on, skipping over literals and
    /// dropping characters the target position rejects.
    pub fn insert_raw_substr(&self, value: &[char], substr: &[char], pos: usize) -> Vec<char> {
        let mut value = value.to_vec();
        let mask_len = self.spec.len();
        let prefix_len = self.spec.prefix_len();
        let filled = self.is_filled(&value);
        let mut pending = substr.iter().copied().peekable();

        if self.mask_char.is_none() && pos > value.len() && value.len() < mask_len {
            let upto = pos.min(mask_len);
            value.extend_from_slice(&self.spec.template[value.len()..upto]);
        }

        let mut i = pos;
        while i < mask_len {
            let Some(&next) = pending.peek() else {
                break;
            };
            let permanent = self.spec.is_permanent(i);

            if !permanent || self.spec.template[i] == next {
                pending.next();
                if !self.is_allowed(Some(next), i, true) {
                    continue;
                }
                if i < value.len() {
                    if self.mask_char.is_some() || filled || i < prefix_len {
                        value[i] = next;
                    } else {
                        let mut shifted = value[..i].to_vec();
                        shifted.push(next);
                        shifted.extend_from_slice(&value[i..]);
                        value = self.format(&shifted);
                    }
                } else if self.mask_char.is_none() {
                    value.push(next);
                }
                i += 1;
            } else {
                if self.mask_char.is_none() && i >= value.len() {
                    value.push(self.spec.template[i]);
                } else if self.mask_char == Some(next) {
                    pending.next();
                }
                i += 1;
            }
        }
        value
    }

    /// Number of template positions `substr` spans when inserted at `pos`.
    pub fn raw_substr_length(&self, substr: &[char], pos: usize) -> usize {
        let mask_len = self.spec.len();
        let mut pending = substr.iter().copied().peekable();
        let mut i = pos;
        while i < mask_len {
            let Some(&next) = pending.peek() else {
                break;
            };
            if !self.spec.is_permanent(i) || self.spec.template[i] == next {
                pending.next();
                if self.is_allowed(Some(next), i, true) {
                    i += 1;
                }
            } else {
                i += 1;
            }
        }
        i.saturating_sub(pos)
    }
}
