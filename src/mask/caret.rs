use super::format::Formatter;
use super::model::MaskSpec;

impl MaskSpec {
    /// Nearest placeholder at or after `pos`.
    pub fn right_editable_pos(&self, pos: usize) -> Option<usize> {
        (pos..self.len()).find(|i| !self.is_permanent(*i))
    }

    /// Nearest placeholder at or before `pos`.
    pub fn left_editable_pos(&self, pos: usize) -> Option<usize> {
        let last = self.len().checked_sub(1)?;
        (0..=pos.min(last)).rev().find(|i| !self.is_permanent(*i))
    }
}

impl Formatter<'_> {
    /// Boundary between entered content and trailing unfilled positions.
    ///
    /// In prefix mode the whole value counts as entered. With a fill
    /// character, this is one past the last placeholder holding a valid
    /// character, or the literal prefix length when there is none.
    pub fn filled_length(&self, value: &[char]) -> usize {
        if self.mask_char.is_none() {
            return value.len();
        }
        (0..value.len())
            .rev()
            .find(|&pos| !self.spec.is_permanent(pos) && self.is_allowed(Some(value[pos]), pos, false))
            .map(|pos| pos + 1)
            .unwrap_or_else(|| self.spec.prefix_len())
    }
}

#[cfg(test)]
mod tests {
    use crate::mask::format::Formatter;
    use crate::mask::format::tests::{chars, spec};

    #[test]
    fn editable_neighbours() {
        let spec = spec("+7 (999) 99");
        assert_eq!(spec.right_editable_pos(0), Some(4));
        assert_eq!(spec.right_editable_pos(7), Some(9));
        assert_eq!(spec.right_editable_pos(11), None);
        assert_eq!(spec.left_editable_pos(8), Some(6));
        assert_eq!(spec.left_editable_pos(3), None);
        assert_eq!(spec.left_editable_pos(40), Some(10));
    }

    #[test]
    fn filled_length_scans_from_the_end() {
        let spec = spec("(999) 999");
        let f = Formatter {
            spec: &spec,
            mask_char: Some('_'),
            filter: None,
            current: "",
        };
        assert_eq!(f.filled_length(&chars("(___) ___")), 1);
        assert_eq!(f.filled_length(&chars("(12_) ___")), 3);
        assert_eq!(f.filled_length(&chars("(1__) _3_")), 8);
        assert_eq!(f.filled_length(&chars("(123) 456")), 9);

        let f = Formatter {
            mask_char: None,
            ..f
        };
        assert_eq!(f.filled_length(&chars("(12")), 3);
    }
}
