// ── Composing text model ──────────────────────────────────────────────────────
//
// Owns the text under edit, the selection, and the composing region the IME
// is working on.  Pure Rust — the Win32 layer feeds it, but it never calls
// the platform itself.
//
// All offsets are byte offsets into `text` and always lie on `char`
// boundaries.  Operations that would break that reject the input by
// returning `false`; nothing here panics on bad input.  UTF-16 code units
// appear only at the boundaries (`cursor_offset_utf16`, the `state` module).

use crate::range::Range;

/// The text, selection, and composing range of the embedded view's active
/// input field.
///
/// While composing, edits and cursor motion are confined to the composing
/// range; committing or ending the composition lifts the restriction.
#[derive(Debug, Clone, Default)]
pub struct TextInputModel {
    text: String,
    selection: Range,
    composing: bool,
    composing_range: Range,
}

impl TextInputModel {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The current selection.  Collapsed when there is only a cursor;
    /// reversed when the anchor sits after the active edge.
    pub fn selection(&self) -> Range {
        self.selection
    }

    /// The composing range, or `None` when no composition is in progress.
    pub fn composing_range(&self) -> Option<Range> {
        self.composing.then_some(self.composing_range)
    }

    pub fn is_composing(&self) -> bool {
        self.composing
    }

    /// Offset of the selection's active edge in UTF-16 code units — the unit
    /// the platform reports and the editing-state wire format uses.
    pub fn cursor_offset_utf16(&self) -> usize {
        self.text[..self.selection.end()]
            .chars()
            .map(char::len_utf16)
            .sum()
    }

    // ── Editable range ────────────────────────────────────────────────────────

    /// The region operations may touch: the composing range while composing,
    /// the whole text otherwise.
    fn editable_range(&self) -> Range {
        if self.composing {
            self.composing_range
        } else {
            Range::new(0, self.text.len())
        }
    }

    /// A range is acceptable as a selection when it lies inside the editable
    /// range and both edges sit on `char` boundaries.
    fn is_editable(&self, range: Range) -> bool {
        self.editable_range().contains_range(range)
            && self.text.is_char_boundary(range.start())
            && self.text.is_char_boundary(range.end())
    }

    // ── Wholesale state ───────────────────────────────────────────────────────

    /// Replace the text, collapse the selection to the start, and drop any
    /// composition in progress.
    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_owned();
        self.selection = Range::collapsed(0);
        self.composing = false;
        self.composing_range = Range::collapsed(0);
    }

    /// Set the selection.  Rejected when it falls outside the editable range
    /// or off a `char` boundary.
    pub fn set_selection(&mut self, selection: Range) -> bool {
        if !self.is_editable(selection) {
            return false;
        }
        self.selection = selection;
        true
    }

    // ── Composition lifecycle ─────────────────────────────────────────────────

    /// Mark the start of a composition.  The composing range starts collapsed
    /// at the selection's lower edge and grows as composing text arrives.
    pub fn begin_composing(&mut self) {
        self.composing = true;
        self.composing_range = Range::collapsed(self.selection.min());
    }

    /// Set the composing range directly and collapse the selection to
    /// `start + cursor_offset` (a byte offset within the range).
    ///
    /// Only legal mid-composition; rejected when not composing, when the
    /// range is reversed or does not fit the text, or when the cursor lands
    /// outside the range or off a `char` boundary.
    pub fn set_composing_range(&mut self, range: Range, cursor_offset: usize) -> bool {
        if !self.composing
            || range.is_reversed()
            || range.end() > self.text.len()
            || !self.text.is_char_boundary(range.start())
            || !self.text.is_char_boundary(range.end())
        {
            return false;
        }
        let cursor = match range.start().checked_add(cursor_offset) {
            Some(cursor) if cursor <= range.end() && self.text.is_char_boundary(cursor) => cursor,
            _ => return false,
        };
        self.composing_range = range;
        self.selection = Range::collapsed(cursor);
        true
    }

    /// Replace the composing region with `text`, resize the composing range
    /// to fit, and collapse the selection to the composing end.
    ///
    /// Returns `false` (and does nothing) when no composition is in progress.
    pub fn update_composing_text(&mut self, text: &str) -> bool {
        if !self.composing {
            return false;
        }
        // An empty update to an already-empty region preserves the selection.
        if text.is_empty() && self.composing_range.is_collapsed() {
            return true;
        }
        let start = self.composing_range.min();
        let end = self.composing_range.max();
        self.text.replace_range(start..end, text);
        self.composing_range = Range::new(start, start + text.len());
        self.selection = Range::collapsed(self.composing_range.end());
        true
    }

    /// Accept the composed text: the composing range collapses to its end
    /// and the selection follows.  The composition stays open until
    /// `end_composing` — the IME may start a new clause immediately.
    pub fn commit_composing(&mut self) {
        if self.composing_range.is_collapsed() {
            return;
        }
        self.composing_range = Range::collapsed(self.composing_range.max());
        self.selection = self.composing_range;
    }

    /// Close the composition and lift the editable-range restriction.
    pub fn end_composing(&mut self) {
        self.composing = false;
        self.composing_range = Range::collapsed(0);
    }

    // ── Edits ─────────────────────────────────────────────────────────────────

    /// Insert `text` at the cursor, replacing any selection.  While composing
    /// the composing range absorbs the insertion.
    pub fn add_text(&mut self, text: &str) {
        self.delete_selected();
        let position = self.selection.min();
        self.text.insert_str(position, text);
        if self.composing {
            self.composing_range =
                Range::new(self.composing_range.min(), self.composing_range.max() + text.len());
        }
        self.selection = Range::collapsed(position + text.len());
    }

    /// Delete the selection, or the `char` before a collapsed cursor.
    /// Returns `true` when text was removed.
    pub fn backspace(&mut self) -> bool {
        if self.delete_selected() {
            return true;
        }
        let cursor = self.selection.min();
        if cursor <= self.editable_range().min() {
            return false;
        }
        let removed = self.text[..cursor]
            .chars()
            .next_back()
            .map(char::len_utf8)
            .unwrap_or(0);
        self.remove(cursor - removed, cursor);
        self.selection = Range::collapsed(cursor - removed);
        true
    }

    /// Delete the selection, or the `char` after a collapsed cursor.
    /// Returns `true` when text was removed.
    pub fn delete(&mut self) -> bool {
        if self.delete_selected() {
            return true;
        }
        let cursor = self.selection.min();
        if cursor >= self.editable_range().max() {
            return false;
        }
        let removed = self.text[cursor..]
            .chars()
            .next()
            .map(char::len_utf8)
            .unwrap_or(0);
        self.remove(cursor, cursor + removed);
        true
    }

    /// Delete a non-collapsed selection.  Returns `true` when one existed.
    fn delete_selected(&mut self) -> bool {
        if self.selection.is_collapsed() {
            return false;
        }
        let (start, end) = (self.selection.min(), self.selection.max());
        self.remove(start, end);
        self.selection = Range::collapsed(start);
        true
    }

    // Remove `[start, end)` from the text and shrink the composing range.
    // The selection always lies inside the composing range while composing,
    // so the removed span never crosses the composing end.
    fn remove(&mut self, start: usize, end: usize) {
        self.text.replace_range(start..end, "");
        if self.composing {
            self.composing_range =
                Range::new(self.composing_range.min(), self.composing_range.max() - (end - start));
        }
    }

    // ── Cursor motion ─────────────────────────────────────────────────────────

    /// Collapse a selection to its lower edge, or step the cursor back one
    /// `char`.  Returns `false` at the editable range's start.
    pub fn move_cursor_back(&mut self) -> bool {
        if !self.selection.is_collapsed() {
            self.selection = Range::collapsed(self.selection.min());
            return true;
        }
        let cursor = self.selection.min();
        if cursor <= self.editable_range().min() {
            return false;
        }
        let step = self.text[..cursor]
            .chars()
            .next_back()
            .map(char::len_utf8)
            .unwrap_or(0);
        self.selection = Range::collapsed(cursor - step);
        true
    }

    /// Collapse a selection to its upper edge, or step the cursor forward one
    /// `char`.  Returns `false` at the editable range's end.
    pub fn move_cursor_forward(&mut self) -> bool {
        if !self.selection.is_collapsed() {
            self.selection = Range::collapsed(self.selection.max());
            return true;
        }
        let cursor = self.selection.max();
        if cursor >= self.editable_range().max() {
            return false;
        }
        let step = self.text[cursor..]
            .chars()
            .next()
            .map(char::len_utf8)
            .unwrap_or(0);
        self.selection = Range::collapsed(cursor + step);
        true
    }

    pub fn move_cursor_to_beginning(&mut self) {
        self.selection = Range::collapsed(self.editable_range().min());
    }

    pub fn move_cursor_to_end(&mut self) {
        self.selection = Range::collapsed(self.editable_range().max());
    }

    /// Extend the selection from its anchor to the editable range's start.
    pub fn select_to_beginning(&mut self) {
        self.selection = Range::new(self.selection.start(), self.editable_range().min());
    }

    /// Extend the selection from its anchor to the editable range's end.
    pub fn select_to_end(&mut self) {
        self.selection = Range::new(self.selection.start(), self.editable_range().max());
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
