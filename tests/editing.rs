//! Cursor editing scenarios: movement, vertical jumps, selection, deletion,
//! and text runs, driven through the public `MathField` surface.

mod setup;

use mathfield::MathField;
use setup::{after, field, press, type_in};

#[test]
fn test_up_enters_exponent_from_the_right() {
    assert_eq!(after("x^{nm}", "End Up", 'z'), "x^{nmz}");
}

#[test]
fn test_up_enters_exponent_from_the_left() {
    assert_eq!(after("x^{nm}", "Home Right Up", 'z'), "x^{znm}");
}

#[test]
fn test_up_at_root_start_is_noop() {
    assert_eq!(after("x^{nm}", "Home Up", 'z'), "zx^{nm}");
}

#[test]
fn test_down_exits_exponent_at_right_end() {
    assert_eq!(after("x^{nm}", "End Left Down", 'z'), "x^{nm}z");
}

#[test]
fn test_down_exits_exponent_before_it_mid_block() {
    assert_eq!(after("x^{nm}", "End Left Left Down", 'z'), "xz^{nm}");
}

#[test]
fn test_up_exits_subscript() {
    assert_eq!(after("a_{12}", "End Left Up", 'z'), "a_{12}z");
    assert_eq!(after("a_{12}", "End Left Left Up", 'z'), "az_{12}");
}

#[test]
fn test_up_into_fraction_lands_in_numerator() {
    assert_eq!(after("\\frac{12}{34}", "Home Up", 'z'), "\\frac{z12}{34}");
    assert_eq!(after("\\frac{12}{34}", "End Up", 'z'), "\\frac{12z}{34}");
}

#[test]
fn test_down_into_fraction_lands_in_denominator() {
    assert_eq!(after("\\frac{12}{34}", "Home Down", 'z'), "\\frac{12}{z34}");
}

#[test]
fn test_down_within_fraction_keeps_the_near_end() {
    assert_eq!(
        after("\\frac{12}{34}", "Home Right Down", 'z'),
        "\\frac{12}{z34}"
    );
    assert_eq!(
        after("\\frac{12}{34}", "Home Right Right Right Down", 'z'),
        "\\frac{12}{34z}"
    );
}

#[test]
fn test_down_within_fraction_ties_go_left() {
    assert_eq!(
        after("\\frac{12}{34}", "Home Right Right Down", 'z'),
        "\\frac{12}{z34}"
    );
}

#[test]
fn test_up_from_numerator_is_noop() {
    assert_eq!(
        after("\\frac{12}{34}", "Home Right Up", 'z'),
        "\\frac{z12}{34}"
    );
}

#[test]
fn test_mixed_fraction_vertical_ladder() {
    assert_eq!(
        after("\\mfrac{12}{34}{56}", "Home Up", 'z'),
        "z12\\frac{34}{56}"
    );
    assert_eq!(
        after("\\mfrac{12}{34}{56}", "Home Down", 'z'),
        "12\\frac{34}{z56}"
    );
    // From the whole part down through the stack.
    assert_eq!(
        after("\\mfrac{12}{34}{56}", "Home Right Down", 'z'),
        "12\\frac{z34}{56}"
    );
    assert_eq!(
        after("\\mfrac{12}{34}{56}", "Home Right Down Down", 'z'),
        "12\\frac{34}{z56}"
    );
    assert_eq!(
        after("\\mfrac{12}{34}{56}", "Home Right Down Down Up", 'z'),
        "12\\frac{z34}{56}"
    );
}

#[test]
fn test_down_exits_nested_exponent_into_numerator() {
    assert_eq!(
        after("\\frac{x^{2}}{y}", "End Up Left Down", 'z'),
        "\\frac{x^{2}z}{y}"
    );
}

#[test]
fn test_up_inside_nested_exponent_is_noop() {
    assert_eq!(
        after("\\frac{x^{2}}{y}", "End Up Left Up", 'z'),
        "\\frac{x^{2z}}{y}"
    );
}

#[test]
fn test_up_from_start_of_subscript_enters_fraction() {
    assert_eq!(
        after("a_{\\frac{1}{2}}", "Home Right Right Up", 'z'),
        "a_{\\frac{z1}{2}}"
    );
}

#[test]
fn test_selection_spans_whole_composites() {
    let mut f = field("x\\frac{1}{2}y");
    press(&mut f, "Home Shift-Right Shift-Right");
    assert_eq!(f.selection_latex().as_deref(), Some("x\\frac{1}{2}"));
}

#[test]
fn test_selection_from_inside_block_covers_owner() {
    let mut f = field("\\frac{12}{34}x");
    press(&mut f, "Home Right Shift-Left");
    assert_eq!(f.selection_latex().as_deref(), Some("\\frac{12}{34}"));
    press(&mut f, "Shift-Left");
    assert_eq!(f.selection_latex().as_deref(), Some("\\frac{12}{34}"));
}

#[test]
fn test_selection_collapses_on_plain_move() {
    let mut f = field("abc");
    press(&mut f, "Home Shift-Right Shift-Right Right");
    assert!(!f.has_selection());
    f.write('z');
    assert_eq!(f.latex(), "abzc");
}

#[test]
fn test_selected_write_replaces() {
    let mut f = field("x+y");
    press(&mut f, "End Shift-Left Shift-Left");
    f.write('z');
    assert_eq!(f.latex(), "xz");
}

#[test]
fn test_select_character_by_character_through_text() {
    let mut f = field("\\text{abc}");
    press(&mut f, "Home Right Shift-Right");
    assert_eq!(f.selection_latex().as_deref(), Some("a"));
    press(&mut f, "Shift-Right");
    assert_eq!(f.selection_latex().as_deref(), Some("ab"));
    press(&mut f, "Backspace");
    assert_eq!(f.latex(), "\\text{c}");
    f.tree().validate(f.root());
}

#[test]
fn test_select_whole_text_run_from_outside() {
    let mut f = field("\\text{abc}x");
    press(&mut f, "Home Shift-Right");
    assert_eq!(f.selection_latex().as_deref(), Some("\\text{abc}"));
}

#[test]
fn test_backspace_descends_into_composites() {
    let mut f = field("x^{2}");
    press(&mut f, "Backspace Backspace");
    assert_eq!(f.latex(), "x^{}");
    press(&mut f, "Backspace");
    assert_eq!(f.latex(), "x");
    press(&mut f, "Backspace");
    assert_eq!(f.latex(), "");
}

#[test]
fn test_backspace_unwraps_from_empty_numerator() {
    let mut f = field("a\\frac{}{dx}b");
    press(&mut f, "End Left Left Up Backspace");
    assert_eq!(f.latex(), "adxb");
    f.write('z');
    assert_eq!(f.latex(), "azdxb");
    f.tree().validate(f.root());
}

#[test]
fn test_forward_delete_descends_and_deletes() {
    let mut f = field("\\frac{1}{2}x");
    press(&mut f, "Home Del");
    assert_eq!(f.latex(), "\\frac{1}{2}x");
    press(&mut f, "Del");
    assert_eq!(f.latex(), "\\frac{}{2}x");
}

#[test]
fn test_delete_in_text_shrinks_pieces() {
    let mut f = field("\\text{abc}");
    press(&mut f, "End Left Backspace");
    assert_eq!(f.latex(), "\\text{ab}");
    press(&mut f, "Backspace Backspace");
    assert_eq!(f.latex(), "\\text{}");
    press(&mut f, "Backspace");
    assert_eq!(f.latex(), "");
}

#[test]
fn test_typing_a_formula() {
    let mut f = MathField::new();
    type_in(&mut f, "x^2");
    press(&mut f, "Right");
    type_in(&mut f, "+y_n");
    assert_eq!(f.latex(), "x^{2}+y_{n}");
}

#[test]
fn test_text_escape_splits_run() {
    let mut f = MathField::new();
    type_in(&mut f, "$ab");
    press(&mut f, "Left");
    f.write('$');
    assert_eq!(f.latex(), "\\text{a}\\text{b}");
    f.write('+');
    assert_eq!(f.latex(), "\\text{a}+\\text{b}");
    f.tree().validate(f.root());
}

#[test]
fn test_moving_through_text_preserves_content() {
    let mut f = field("\\text{one two}");
    let before = f.latex();
    press(&mut f, "Left Left Left Left Right Right Left Right Right Right");
    f.consolidate();
    assert_eq!(f.latex(), before);
    f.tree().validate(f.root());
}

#[test]
fn test_render_latex_replaces_document() {
    let mut f = field("abc");
    f.render_latex("\\frac{1}{2}").unwrap();
    assert_eq!(f.latex(), "\\frac{1}{2}");
    assert!(f.render_latex("\\oops").is_err());
    assert_eq!(f.latex(), "\\frac{1}{2}");
}
