//! End-to-end editing sessions against an in-memory field.

use maskfield::{
    HostNotification, KeyCode, KeyInput, MaskEngine, MaskOptions, MaskedField, MemoryField, PasteStrategy,
    Selection, TextField, attach,
};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;

mod test_setup {
    use std::sync::Once;
    static INIT: Once = Once::new();

    /// Routes library logging to the test output, honouring `RUST_LOG`.
    pub fn setup_logger() {
        INIT.call_once(|| {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug"))
                .is_test(true)
                .try_init()
                .ok();
        });
    }
}

fn field(options: MaskOptions) -> MaskedField {
    test_setup::setup_logger();
    attach(MemoryField::new(), options).expect("attach")
}

fn focused(mask: &str) -> MaskedField {
    let mut field = field(MaskOptions::new(mask));
    field.focus();
    field
}

#[test]
fn typing_past_a_full_template_is_rejected() {
    let mut field = focused("999-999");
    field.type_text("1234567");
    assert_eq!(field.value(), "123-456");
    assert_eq!(field.caret(), 7);
}

#[test]
fn date_typing_leaves_caret_after_last_digit() {
    let mut field = focused("99.99.9999");
    field.type_text("0101202");
    assert_eq!(field.value(), "01.01.202_");
    assert_eq!(field.caret(), 9);
}

#[test]
fn paste_at_start_fills_across_literals() {
    let mut field = focused("(999) 999-9999");
    field.select(0, 0);
    field.paste("5551234");
    assert_eq!(field.value(), "(555) 123-4___");
    assert_eq!(field.caret(), 11);
}

#[test]
fn deferred_paste_matches_immediate_paste() {
    let mut field = field(MaskOptions::new("(999) 999-9999").with_paste_strategy(PasteStrategy::DeferToChange));
    field.focus();
    field.select(0, 0);
    field.paste("5551234");
    assert!(!field.engine().is_awaiting_paste());
    assert_eq!(field.value(), "(555) 123-4___");
    assert_eq!(field.caret(), 11);
}

#[test]
fn prefix_mode_focus_shows_literal_prefix() {
    let mut field = field(MaskOptions::new("ABC-999").with_mask_char(None));
    assert_eq!(field.value(), "");
    field.focus();
    assert_eq!(field.value(), "ABC-");
    field.type_text("12");
    assert_eq!(field.value(), "ABC-12");
}

#[test]
fn blur_without_input_resets_value() {
    let mut field = focused("+7 (999) 999-99-99");
    assert_eq!(field.value(), "+7 (___) ___-__-__");
    field.blur();
    assert_eq!(field.value(), "");
    assert_eq!(field.field().text(), "");
}

#[test]
fn formatting_is_idempotent() {
    for mask in ["999-999", "+7 (999) 999-99-99", "aa-**", "\\9 99"] {
        for mask_char in [Some('_'), None] {
            let engine = MaskEngine::new(MaskOptions::new(mask).with_mask_char(mask_char)).expect("engine");
            for raw in ["", "1", "123456789", "ab12", "+7 (1", "___-___", "9 12"] {
                let once = engine.format(raw);
                assert_eq!(engine.format(&once), once, "mask {mask:?} raw {raw:?}");
            }
        }
    }
}

#[test]
fn placeholder_mode_keeps_template_length() {
    let engine = MaskEngine::new(MaskOptions::new("+7 (999) 999-99-99")).expect("engine");
    for raw in ["", "9", "91234567890123", "letters", "+7 (___)"] {
        assert_eq!(engine.format(raw).chars().count(), engine.spec().len(), "raw {raw:?}");
    }
}

#[test]
fn prefix_mode_formats_empty_input_to_prefix() {
    for mask in ["+7 (999)", "ABC-999", "999", "\\a-99"] {
        let engine = MaskEngine::new(MaskOptions::new(mask).with_mask_char(None)).expect("engine");
        assert_eq!(engine.format(""), engine.prefix(), "mask {mask:?}");
    }
}

#[test]
fn valid_keystroke_moves_caret_one_right() {
    let mut field = focused("999999");
    for (typed, ch) in "123456".chars().enumerate() {
        assert_eq!(field.caret(), typed);
        field.press_key(KeyInput::char(ch));
        assert_eq!(field.caret(), typed + 1);
    }
}

#[test]
fn backspace_clears_exactly_one_slot() {
    let backspace = KeyInput::new(KeyCode::Backspace);
    for caret in 1..=7 {
        let mut field = field(MaskOptions::new("999-999").with_value("123456"));
        field.select(caret, caret);
        field.press_key(backspace);
        let value = field.value().to_string();
        assert_eq!(value.chars().filter(|ch| *ch == '_').count(), 1, "caret {caret}");
        assert_eq!(value.chars().nth(3), Some('-'), "caret {caret}");
        assert_eq!(value.chars().count(), 7);
    }
}

#[test]
fn native_edit_is_reconciled() {
    let mut field = field(MaskOptions::new("999-999").with_value("123"));
    field.native_edit("123-4___", Selection::caret(5));
    assert_eq!(field.value(), "123-4__");
    assert_eq!(field.caret(), 5);
}

#[test]
fn native_edit_on_unfocused_field_keeps_input() {
    let mut field = field(MaskOptions::new("999"));
    field.native_edit("12345678", Selection::caret(100));
    assert_eq!(field.value(), "123");
    assert_eq!(field.caret(), 3);
}

#[test]
fn autofill_reformats_without_selection() {
    let mut field = focused("(999) 999-9999");
    field.autofill("5551234");
    assert_eq!(field.value(), "(555) 123-4___");
    assert_eq!(field.caret(), 11);
}

#[test]
fn caret_is_reasserted_next_frame() {
    let mut field = focused("999");
    field.press_key(KeyInput::char('1'));
    field.select(0, 0);
    field.tick();
    assert_eq!(field.caret(), 1);
}

#[test]
fn host_receives_notifications_in_order() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let mut field = field(MaskOptions::new("999")).on_notify(move |notification, value| {
        sink.borrow_mut().push((notification, value.to_string()));
    });

    field.focus();
    field.press_key(KeyInput::char('1'));

    assert_eq!(
        *seen.borrow(),
        vec![
            (HostNotification::Change, "___".to_string()),
            (HostNotification::Focus, "___".to_string()),
            (HostNotification::KeyDown, "___".to_string()),
            (HostNotification::Change, "1__".to_string()),
            (HostNotification::KeyPress, "1__".to_string()),
        ]
    );
}

#[test]
fn unmasked_field_edits_natively() {
    let mut field = field(MaskOptions::default());
    field.type_text("free");
    field.press_key(KeyInput::new(KeyCode::Backspace));
    assert_eq!(field.value(), "fre");
    assert_eq!(field.field().text(), "fre");
}
