use super::format::Formatter;
use std::cmp::Ordering;

/// Result of reconciling a native edit against the mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Reconciled {
    pub value: Vec<char>,
    pub caret: usize,
}

/// Infers what the user did from the value before and after a native edit
/// and replays it positionally. `selection_end` is the caret reported by the
/// field after the edit.
pub(crate) fn reconcile(
    f: &Formatter<'_>,
    old: &[char],
    new: &[char],
    selection_end: usize,
) -> Reconciled {
    let (resolved, caret) = match new.len().cmp(&old.len()) {
        Ordering::Greater => grow(f, old, new, selection_end),
        Ordering::Less => shrink(f, old, new, selection_end),
        Ordering::Equal => {
            log::trace!("Change without length delta, reformatting");
            (new.to_vec(), selection_end)
        }
    };
    Reconciled {
        value: f.format(&resolved),
        caret,
    }
}

/// Characters were inserted ending at `selection_end`.
fn grow(f: &Formatter<'_>, old: &[char], new: &[char], selection_end: usize) -> (Vec<char>, usize) {
    let mask_len = f.spec.len();
    let prefix_len = f.spec.prefix_len();
    let inserted_len = new.len() - old.len();
    let start = selection_end.saturating_sub(inserted_len).min(old.len());
    let entered = &new[start..start + inserted_len];

    // Typing exactly the literal at its own position keeps the caret there,
    // anything else lands on the next placeholder.
    let typed_literal = inserted_len == 1
        && f.spec.is_permanent(start)
        && f.spec.char_at(start) == Some(entered[0]);
    let target = if start < mask_len && !typed_literal {
        f.spec.right_editable_pos(start)
    } else {
        Some(start)
    };
    let Some(target) = target else {
        log::debug!("No editable position after {start}, dropping {inserted_len} inserted chars");
        return (old.to_vec(), f.filled_length(old));
    };
    log::debug!("Inserted run of {inserted_len} at {start}, replaying at {target}");

    let mut remaining = new[..start].to_vec();
    remaining.extend_from_slice(&new[start + inserted_len..]);
    let cleared = f.clear_range(&remaining, start, mask_len.saturating_sub(start));
    let cleared = f.insert_raw_substr(&cleared, entered, target);
    let value = f.insert_raw_substr(old, entered, target);

    let caret = if inserted_len != 1 || (target >= prefix_len && target < mask_len) {
        f.filled_length(&cleared)
    } else if target < mask_len {
        target + 1
    } else {
        target
    };
    (value, caret)
}

/// Characters before `selection_end` survived, the rest of the run was removed.
fn shrink(f: &Formatter<'_>, old: &[char], new: &[char], selection_end: usize) -> (Vec<char>, usize) {
    let mask_len = f.spec.len();
    let prefix_len = f.spec.prefix_len();
    let removed_len = mask_len.saturating_sub(new.len());
    let end = selection_end.min(new.len());
    let kept = &new[..end];
    let clear_only = old[..end] == *kept;
    log::debug!("Removed run at {selection_end} (clear only: {clear_only})");

    let cleared = f.clear_range(old, selection_end, removed_len);
    let value = if f.mask_char.is_some() {
        f.insert_raw_substr(&cleared, kept, 0)
    } else {
        new.to_vec()
    };
    let cleared = f.clear_range(&cleared, selection_end, mask_len.saturating_sub(selection_end));
    let cleared = f.insert_raw_substr(&cleared, kept, 0);

    let caret = if !clear_only {
        f.filled_length(&cleared)
    } else {
        selection_end.max(prefix_len)
    };
    (value, caret)
}
