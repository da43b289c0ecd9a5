use std::sync::Arc;

/// Per-character acceptance hook: `(char, position, current value)`.
///
/// Consulted only for characters that already satisfy the placeholder class
/// at `position`; returning `false` makes the character disallowed there.
pub type CharFilter = Arc<dyn Fn(char, usize, &str) -> bool + Send + Sync>;

pub fn from_fn(filter: impl Fn(char, usize, &str) -> bool + Send + Sync + 'static) -> CharFilter {
    Arc::new(filter)
}

/// Rejects every character of `rejected`.
pub fn none_of(rejected: impl Into<String>) -> CharFilter {
    let rejected = rejected.into();
    Arc::new(move |ch: char, _pos: usize, _value: &str| !rejected.contains(ch))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DatePart {
    Day,
    Month,
    Year,
    Hour,
    Minute,
    Second,
}

impl DatePart {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "DD" => Some(Self::Day),
            "MM" => Some(Self::Month),
            "YYYY" | "YY" => Some(Self::Year),
            "HH" => Some(Self::Hour),
            "mm" => Some(Self::Minute),
            "ss" => Some(Self::Second),
            _ => None,
        }
    }

    /// Whether `digit` may appear at `offset` inside the part given the
    /// digit already typed before it.
    fn accepts(self, offset: usize, digit: u32, previous: Option<u32>) -> bool {
        match (self, offset) {
            (Self::Day, 0) => digit <= 3,
            (Self::Day, 1) => match previous {
                Some(3) => digit <= 1,
                Some(0) => digit >= 1,
                _ => true,
            },
            (Self::Month, 0) => digit <= 1,
            (Self::Month, 1) => match previous {
                Some(1) => digit <= 2,
                Some(0) => digit >= 1,
                _ => true,
            },
            (Self::Hour, 0) => digit <= 2,
            (Self::Hour, 1) => previous != Some(2) || digit <= 3,
            (Self::Minute | Self::Second, 0) => digit <= 5,
            _ => true,
        }
    }
}

/// Calendar digit ranges for a mask laid out like `layout`.
///
/// `layout` mirrors the mask position by position, e.g. `"DD.MM.YYYY"` for
/// the mask `"99.99.9999"`. The second digit of a group is checked against
/// the first one as found in the current value, so a partially pasted group
/// only gets the first-digit check.
pub fn date_digits(layout: &str) -> CharFilter {
    let chars: Vec<char> = layout.chars().collect();
    let mut parts = vec![None::<(DatePart, usize)>; chars.len()];

    let mut idx = 0usize;
    while idx < chars.len() {
        let start = idx;
        while idx < chars.len() && chars[idx].is_ascii_alphabetic() && chars[idx] == chars[start] {
            idx += 1;
        }
        if idx == start {
            idx += 1;
            continue;
        }
        let token: String = chars[start..idx].iter().collect();
        if let Some(part) = DatePart::from_token(token.as_str()) {
            for (offset, slot) in parts[start..idx].iter_mut().enumerate() {
                *slot = Some((part, offset));
            }
        }
    }

    Arc::new(move |ch: char, pos: usize, value: &str| {
        let (Some(Some((part, offset))), Some(digit)) = (parts.get(pos), ch.to_digit(10)) else {
            return true;
        };
        let previous = pos
            .checked_sub(1)
            .and_then(|prev| value.chars().nth(prev))
            .and_then(|prev| prev.to_digit(10));
        part.accepts(*offset, digit, previous)
    })
}

#[cfg(test)]
mod tests {
    use super::{date_digits, none_of};

    #[test]
    fn date_filter_limits_first_digits() {
        let filter = date_digits("DD.MM.YYYY");
        assert!(filter('3', 0, ""));
        assert!(!filter('4', 0, ""));
        assert!(filter('1', 3, "01.__.____"));
        assert!(!filter('2', 3, "01.__.____"));
        assert!(filter('9', 6, "01.01.____"));
    }

    #[test]
    fn date_filter_checks_second_digit_against_first() {
        let filter = date_digits("DD.MM.YYYY");
        assert!(filter('1', 1, "3_.__.____"));
        assert!(!filter('2', 1, "3_.__.____"));
        assert!(!filter('0', 1, "0_.__.____"));
        assert!(!filter('3', 4, "01.1_.____"));
        assert!(filter('2', 4, "01.1_.____"));
    }

    #[test]
    fn time_filter() {
        let filter = date_digits("HH:mm");
        assert!(!filter('3', 0, ""));
        assert!(!filter('4', 1, "2_:__"));
        assert!(filter('9', 1, "1_:__"));
        assert!(!filter('6', 3, "12:__"));
    }

    #[test]
    fn non_date_positions_pass() {
        let filter = date_digits("+7 DD");
        assert!(filter('9', 0, ""));
        assert!(filter('x', 3, ""));
    }

    #[test]
    fn none_of_rejects_listed_chars() {
        let filter = none_of("0");
        assert!(!filter('0', 0, ""));
        assert!(filter('1', 0, ""));
    }
}
