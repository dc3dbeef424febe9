// ── Editing-state snapshot ────────────────────────────────────────────────────
//
// The JSON shape the host toolkit exchanges with the embedded view: the full
// text plus selection and composing offsets.  Offsets travel in UTF-16 code
// units (the platform's unit); the model speaks UTF-8 byte offsets, so this
// module owns the conversion in both directions.
// No `unsafe` — pure safe Rust + serde_json.

use serde::{Deserialize, Serialize};

use crate::{
    error::{QuillError, Result},
    model::TextInputModel,
    range::Range,
};

// ── Wire type ─────────────────────────────────────────────────────────────────

/// Snapshot of a [`TextInputModel`], in the host toolkit's wire shape.
///
/// All offsets are UTF-16 code units.  `-1` in the selection fields means
/// "no selection" (loaded as a collapsed selection at 0); `-1` in the
/// composing fields means "no composing range".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditingState {
    pub text: String,
    pub selection_base: i64,
    pub selection_extent: i64,
    // Hosts that predate composing support omit these fields entirely.
    #[serde(default = "absent")]
    pub composing_base: i64,
    #[serde(default = "absent")]
    pub composing_extent: i64,
}

fn absent() -> i64 {
    -1
}

impl EditingState {
    /// Snapshot the model.  Reversed selections survive the trip.
    pub fn of(model: &TextInputModel) -> Self {
        let text = model.text();
        let selection = model.selection();
        let (composing_base, composing_extent) = match model.composing_range() {
            Some(range) => (
                utf16_offset(text, range.start()) as i64,
                utf16_offset(text, range.end()) as i64,
            ),
            None => (-1, -1),
        };
        Self {
            text: text.to_owned(),
            selection_base: utf16_offset(text, selection.start()) as i64,
            selection_extent: utf16_offset(text, selection.end()) as i64,
            composing_base,
            composing_extent,
        }
    }

    /// Load this state into `model`, replacing its text, selection, and
    /// composing range.
    ///
    /// Fails with [`QuillError::InvalidRange`] when an offset does not map
    /// into the text (past the end, or splitting a surrogate pair); the model
    /// is left with the new text and a collapsed selection at 0 in that case.
    pub fn apply_to(&self, model: &mut TextInputModel) -> Result<()> {
        model.set_text(&self.text);

        if self.composing_base >= 0 && self.composing_extent >= 0 {
            let invalid = || QuillError::InvalidRange {
                base: self.composing_base,
                extent: self.composing_extent,
            };
            let start = byte_offset(&self.text, self.composing_base as u64).ok_or_else(invalid)?;
            let end = byte_offset(&self.text, self.composing_extent as u64).ok_or_else(invalid)?;
            model.begin_composing();
            if !model.set_composing_range(Range::new(start, end), end.saturating_sub(start)) {
                return Err(invalid());
            }
        }

        // -1 on either selection edge means "no selection yet".
        let selection = if self.selection_base < 0 || self.selection_extent < 0 {
            Range::collapsed(0)
        } else {
            let invalid = || QuillError::InvalidRange {
                base: self.selection_base,
                extent: self.selection_extent,
            };
            Range::new(
                byte_offset(&self.text, self.selection_base as u64).ok_or_else(invalid)?,
                byte_offset(&self.text, self.selection_extent as u64).ok_or_else(invalid)?,
            )
        };
        if !model.set_selection(selection) {
            return Err(QuillError::InvalidRange {
                base: self.selection_base,
                extent: self.selection_extent,
            });
        }
        Ok(())
    }

    // ── JSON ──────────────────────────────────────────────────────────────────

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

// ── Offset conversion ─────────────────────────────────────────────────────────

/// UTF-16 code-unit offset of the `char` boundary at byte offset `byte` —
/// which the model guarantees for every offset it hands out.
fn utf16_offset(text: &str, byte: usize) -> usize {
    text[..byte].chars().map(char::len_utf16).sum()
}

/// Byte offset of the `char` boundary `utf16` code units into `text`, or
/// `None` when the offset is past the end or inside a surrogate pair.
fn byte_offset(text: &str, utf16: u64) -> Option<usize> {
    let mut units: u64 = 0;
    for (byte, ch) in text.char_indices() {
        if units == utf16 {
            return Some(byte);
        }
        if units > utf16 {
            // Stepped over the target — it pointed inside this char's pair.
            return None;
        }
        units += ch.len_utf16() as u64;
    }
    (units == utf16).then_some(text.len())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn state(text: &str, base: i64, extent: i64) -> EditingState {
        EditingState {
            text: text.to_owned(),
            selection_base: base,
            selection_extent: extent,
            composing_base: -1,
            composing_extent: -1,
        }
    }

    // ── Offset conversion ─────────────────────────────────────────────────────

    #[test]
    fn byte_offset_walks_utf16_units() {
        // "a𝄞b": 'a' = 1 unit/1 byte, '𝄞' = 2 units/4 bytes.
        let text = "a𝄞b";
        assert_eq!(byte_offset(text, 0), Some(0));
        assert_eq!(byte_offset(text, 1), Some(1));
        assert_eq!(byte_offset(text, 2), None); // inside the surrogate pair
        assert_eq!(byte_offset(text, 3), Some(5));
        assert_eq!(byte_offset(text, 4), Some(6));
        assert_eq!(byte_offset(text, 5), None); // past the end
    }

    #[test]
    fn utf16_offset_inverts_byte_offset() {
        let text = "日本語abc";
        for units in [0u64, 1, 2, 3, 4, 6] {
            let byte = byte_offset(text, units).expect("valid offset");
            assert_eq!(utf16_offset(text, byte) as u64, units);
        }
    }

    // ── Snapshot / load ───────────────────────────────────────────────────────

    #[test]
    fn roundtrip_through_model() {
        let mut model = TextInputModel::new();
        state("hello", 4, 1).apply_to(&mut model).expect("apply");
        assert_eq!(model.selection(), Range::new(4, 1)); // reversed survives

        let snap = EditingState::of(&model);
        assert_eq!(snap.text, "hello");
        assert_eq!(snap.selection_base, 4);
        assert_eq!(snap.selection_extent, 1);
        assert_eq!(snap.composing_base, -1);
    }

    #[test]
    fn offsets_convert_through_cjk_text() {
        let mut model = TextInputModel::new();
        // Select "本語" — UTF-16 units 1..3, bytes 3..9.
        state("日本語", 1, 3).apply_to(&mut model).expect("apply");
        assert_eq!(model.selection(), Range::new(3, 9));

        let snap = EditingState::of(&model);
        assert_eq!(snap.selection_base, 1);
        assert_eq!(snap.selection_extent, 3);
    }

    #[test]
    fn composing_range_loads_and_snapshots() {
        let mut model = TextInputModel::new();
        let mut s = state("anib", 3, 3);
        s.composing_base = 1;
        s.composing_extent = 3;
        s.apply_to(&mut model).expect("apply");
        assert!(model.is_composing());
        assert_eq!(model.composing_range(), Some(Range::new(1, 3)));
        assert_eq!(model.selection(), Range::collapsed(3));

        let snap = EditingState::of(&model);
        assert_eq!(snap.composing_base, 1);
        assert_eq!(snap.composing_extent, 3);
    }

    #[test]
    fn negative_selection_means_no_selection() {
        let mut model = TextInputModel::new();
        state("abc", -1, -1).apply_to(&mut model).expect("apply");
        assert_eq!(model.selection(), Range::collapsed(0));
    }

    #[test]
    fn out_of_range_offsets_fail() {
        let mut model = TextInputModel::new();
        let err = state("abc", 0, 7).apply_to(&mut model).unwrap_err();
        assert!(matches!(
            err,
            QuillError::InvalidRange { base: 0, extent: 7 }
        ));
        // The model keeps the new text with a safe collapsed selection.
        assert_eq!(model.text(), "abc");
        assert_eq!(model.selection(), Range::collapsed(0));
    }

    #[test]
    fn surrogate_splitting_offset_fails() {
        let mut model = TextInputModel::new();
        assert!(state("𝄞", 1, 1).apply_to(&mut model).is_err());
    }

    // ── JSON ──────────────────────────────────────────────────────────────────

    #[test]
    fn json_uses_camel_case_fields() {
        let json = state("hi", 0, 2).to_json().expect("serialize");
        assert!(json.contains("\"selectionBase\":0"));
        assert!(json.contains("\"selectionExtent\":2"));
        assert!(json.contains("\"composingBase\":-1"));
    }

    #[test]
    fn json_roundtrip() {
        let mut s = state("日本語", 0, 3);
        s.composing_base = 0;
        s.composing_extent = 3;
        let json = s.to_json().expect("serialize");
        let s2 = EditingState::from_json(&json).expect("deserialize");
        assert_eq!(s2.text, "日本語");
        assert_eq!(s2.composing_extent, 3);
    }

    #[test]
    fn missing_composing_fields_default_to_absent() {
        let s = EditingState::from_json(
            r#"{"text":"hi","selectionBase":1,"selectionExtent":1}"#,
        )
        .expect("deserialize");
        assert_eq!(s.composing_base, -1);
        assert_eq!(s.composing_extent, -1);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            EditingState::from_json("{").unwrap_err(),
            QuillError::Json(_)
        ));
    }
}
