use super::model::{CharRules, MaskSpec};

const ESCAPE: char = '\\';

/// Compiles a mask string. Symbols registered in `rules` become placeholder
/// positions, everything else (and anything following a backslash) is a
/// permanent literal. A missing mask yields the empty, disabled spec.
pub(crate) fn parse_mask(mask: Option<&str>, rules: CharRules) -> MaskSpec {
    let Some(mask) = mask else {
        return MaskSpec {
            rules,
            ..MaskSpec::empty()
        };
    };

    let mut template = Vec::<char>::new();
    let mut permanent = Vec::<bool>::new();
    let mut escaped = false;

    for ch in mask.chars() {
        if !escaped && ch == ESCAPE {
            escaped = true;
            continue;
        }
        permanent.push(escaped || !rules.is_placeholder(ch));
        template.push(ch);
        escaped = false;
    }

    log::debug!(
        "Parsed mask '{}' into {} positions ({} permanent).",
        mask,
        template.len(),
        permanent.iter().filter(|p| **p).count()
    );

    MaskSpec {
        template,
        permanent,
        rules,
    }
}
