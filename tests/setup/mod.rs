//! Shared helpers for the integration tests.
#![allow(dead_code)]

use mathfield::MathField;

/// A field rendered from `latex`, cursor at the right end of the root.
pub fn field(latex: &str) -> MathField {
    let mut field = MathField::new();
    field
        .render_latex(latex)
        .unwrap_or_else(|err| panic!("failed to render {latex:?}: {err}"));
    field
}

/// Applies a whitespace-separated key script, e.g. `"Up Left Shift-Right"`.
pub fn press(field: &mut MathField, script: &str) {
    for key in script.split_whitespace() {
        match key {
            "Left" => field.move_left(),
            "Right" => field.move_right(),
            "Up" => field.move_up(),
            "Down" => field.move_down(),
            "Shift-Left" => field.select_left(),
            "Shift-Right" => field.select_right(),
            "Shift-Up" => field.select_up(),
            "Shift-Down" => field.select_down(),
            "Backspace" => field.backspace(),
            "Del" => field.delete(),
            "Home" => field.ins_at_left_end(field.root()),
            "End" => field.ins_at_right_end(field.root()),
            _ => panic!("unknown key {key:?}"),
        }
    }
}

/// Types every character of `text` into the field.
pub fn type_in(field: &mut MathField, text: &str) {
    for ch in text.chars() {
        field.write(ch);
    }
}

/// Renders, runs a key script, types a probe character, and returns the
/// resulting LaTeX. The probe makes the cursor's landing spot visible.
pub fn after(latex: &str, script: &str, probe: char) -> String {
    let mut field = field(latex);
    press(&mut field, script);
    field.write(probe);
    field.tree().validate(field.root());
    field.latex()
}
