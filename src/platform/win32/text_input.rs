// ── IME window management ─────────────────────────────────────────────────────
//
// Positions the IMM32 composition and candidate windows over the caret of an
// embedded view.  The host forwards WM_IME_* lifecycle notifications; this
// module turns them into caret moves, composition/candidate window placement,
// and composition-string reads.
//
// Platform-call failures are deliberately silent: an absent window, a missing
// input context, or a failed positioning call leaves the host UI correct,
// just with a default-placed IME window.  Nothing in here returns an error.

#![allow(unsafe_code)]

use windows::Win32::{
    Foundation::{HWND, POINT, RECT},
    UI::{
        Input::{
            Ime::{
                ImmGetCompositionStringW, ImmSetCandidateWindow, ImmSetCompositionWindow,
                CANDIDATEFORM, CFS_CANDIDATEPOS, CFS_POINT, COMPOSITIONFORM, GCS_COMPSTR,
                GCS_CURSORPOS, GCS_RESULTSTR, IME_COMPOSITION_STRING,
            },
            KeyboardAndMouse::GetFocus,
        },
        WindowsAndMessaging::{CreateCaret, DestroyCaret, SetCaretPos},
    },
};

use super::imm::ImmContext;
use crate::geometry::Rect;

// ── TextInputManager ──────────────────────────────────────────────────────────

/// Tracks the host window and caret rectangle, and keeps the IMM32
/// composition and candidate windows glued to the on-screen caret.
///
/// Two states: **Inactive** → **Active** on [`create_ime_window`], back to
/// **Inactive** on [`destroy_ime_window`].  The synthetic system caret exists
/// exactly while Active.  Owned by the host's UI thread; every method must be
/// called on that thread.
///
/// [`create_ime_window`]: TextInputManager::create_ime_window
/// [`destroy_ime_window`]: TextInputManager::destroy_ime_window
#[derive(Debug, Default)]
pub struct TextInputManager {
    /// The window hosting the embedded view.  `None` before attach; every
    /// operation is a no-op until one is set.
    window: Option<HWND>,
    /// Last caret rectangle reported by the view, in screen coordinates.
    caret_rect: Rect,
    /// `true` while the synthetic system caret exists.
    ime_active: bool,
}

impl TextInputManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the tracked window handle.  No validation is performed.
    pub fn set_window_handle(&mut self, window: Option<HWND>) {
        self.window = window;
    }

    /// Whether an IME session is active (the synthetic caret exists).
    pub fn ime_active(&self) -> bool {
        self.ime_active
    }

    /// Last caret rectangle stored by [`update_caret_rect`].
    ///
    /// [`update_caret_rect`]: TextInputManager::update_caret_rect
    pub fn caret_rect(&self) -> Rect {
        self.caret_rect
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────────

    /// Begin an IME session and position the IME windows.
    ///
    /// Some IMEs ignore `ImmSetCandidateWindow` and place themselves from the
    /// system caret position instead, so a 1×1 synthetic caret is created for
    /// them to read.
    pub fn create_ime_window(&mut self) {
        let Some(window) = self.window else { return };

        if !self.ime_active {
            // SAFETY: window is a live handle owned by the host.  A null
            // HBITMAP selects the default solid caret; 1×1 keeps it invisible
            // under the composition UI.  Failure is ignored — the IME then
            // falls back to its default placement.
            unsafe {
                let _ = CreateCaret(window, None, 1, 1);
            }
        }
        self.ime_active = true;

        self.move_ime_window();
    }

    /// End the IME session and destroy the synthetic caret.  Idempotent: a
    /// second call (or one while Inactive) does nothing.
    pub fn destroy_ime_window(&mut self) {
        if self.window.is_none() {
            return;
        }

        if self.ime_active {
            // SAFETY: the caret was created by create_ime_window on this
            // thread and not destroyed since.  DestroyCaret only touches the
            // calling thread's caret.
            unsafe {
                let _ = DestroyCaret();
            }
        }
        self.ime_active = false;
    }

    /// Reposition the IME windows from the last known caret rectangle.
    pub fn update_ime_window(&self) {
        if self.window.is_none() {
            return;
        }
        self.move_ime_window();
    }

    /// Store the new caret rectangle, then reposition the IME windows.
    ///
    /// The rectangle is stored even with no window attached, so the first
    /// reposition after attach uses the current caret location.
    pub fn update_caret_rect(&mut self, rect: Rect) {
        self.caret_rect = rect;

        if self.window.is_none() {
            return;
        }
        self.move_ime_window();
    }

    // ── Composition reads ─────────────────────────────────────────────────────

    /// Cursor offset within the composing string, in UTF-16 code units.
    ///
    /// `None` when no window is attached, no input context is obtainable, or
    /// the platform reports a failure.
    pub fn composing_cursor_pos(&self) -> Option<usize> {
        let window = self.window?;

        let imm = ImmContext::acquire(window);
        let context = imm.get()?;
        // SAFETY: context is held alive by the guard for the duration of the
        // call.  A null buffer with zero length is the documented way to
        // query GCS_CURSORPOS; the offset comes back in the return value,
        // negative on failure.
        let pos = unsafe { ImmGetCompositionStringW(context, GCS_CURSORPOS, None, 0) };
        usize::try_from(pos).ok()
    }

    /// The in-progress (uncommitted) composition text, or `None` when there
    /// is nothing to read.
    pub fn composing_string(&self) -> Option<String> {
        self.string(GCS_COMPSTR)
    }

    /// The finalized composition text, or `None` when there is nothing to
    /// read.
    pub fn result_string(&self) -> Option<String> {
        self.string(GCS_RESULTSTR)
    }

    // Shared read path for the composition-string variants.  `None` when no
    // window is set, IME is inactive, no context is obtainable, or the
    // reported length is non-positive.
    fn string(&self, kind: IME_COMPOSITION_STRING) -> Option<String> {
        let window = self.window?;
        if !self.ime_active {
            return None;
        }

        let imm = ImmContext::acquire(window);
        let context = imm.get()?;

        // SAFETY: a null buffer with zero length queries the byte length of
        // the requested string; negative results are IMM error codes.
        let byte_len = unsafe { ImmGetCompositionStringW(context, kind, None, 0) };
        if byte_len <= 0 {
            return None;
        }

        // The platform reports bytes; the buffer is UTF-16 code units.
        let code_units = byte_len as usize / std::mem::size_of::<u16>();
        let mut buf = vec![0u16; code_units];
        // SAFETY: buf holds exactly byte_len bytes and outlives the call;
        // ImmGetCompositionStringW writes at most byte_len bytes into it.
        // The context stays valid through the guard above.  The bytes-copied
        // result is intentionally ignored — the length was just queried.
        unsafe {
            let _ =
                ImmGetCompositionStringW(context, kind, Some(buf.as_mut_ptr().cast()), byte_len as u32);
        }
        // Lossy: a mid-edit snapshot can hold an unpaired surrogate and must
        // still be displayable.
        Some(String::from_utf16_lossy(&buf))
    }

    // ── Positioning ───────────────────────────────────────────────────────────

    /// Move the system caret and the composition/candidate windows to the
    /// caret rectangle's top-left corner.
    ///
    /// No-op unless the tracked window holds input focus and IME is active —
    /// repositioning an unfocused window's IME would steal the composition UI
    /// from whichever control actually has focus.
    fn move_ime_window(&self) {
        let Some(window) = self.window else { return };
        // SAFETY: GetFocus reads the calling thread's focus state; it takes
        // no parameters and never fails.
        let focus = unsafe { GetFocus() };
        if focus != window || !self.ime_active {
            return;
        }

        let x = self.caret_rect.left();
        let y = self.caret_rect.top();
        // SAFETY: the synthetic caret exists while ime_active is set.
        // Failure is ignored; the caret keeps its previous position.
        unsafe {
            let _ = SetCaretPos(x, y);
        }

        let imm = ImmContext::acquire(window);
        let Some(context) = imm.get() else { return };

        // Point-anchored placement: both windows anchor to the caret's
        // top-left corner; the exclusion area stays empty.
        let composition_form = COMPOSITIONFORM {
            dwStyle: CFS_POINT,
            ptCurrentPos: POINT { x, y },
            rcArea: RECT::default(),
        };
        let candidate_form = CANDIDATEFORM {
            dwIndex: 0,
            dwStyle: CFS_CANDIDATEPOS,
            ptCurrentPos: POINT { x, y },
            rcArea: RECT::default(),
        };
        // SAFETY: both forms are fully initialised stack values that outlive
        // the calls; context is held alive by the guard.  The BOOL results
        // are intentionally ignored — on failure the IME keeps its previous
        // placement.
        unsafe {
            let _ = ImmSetCompositionWindow(context, &composition_form);
            let _ = ImmSetCandidateWindow(context, &candidate_form);
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
//
// Only paths that bail out before the first platform call run here, so these
// are deterministic on any desktop, headless CI included.

#[cfg(test)]
mod tests {
    use super::*;

    fn caret(x: i32, y: i32) -> Rect {
        Rect::from_ltwh(x, y, 1, 14)
    }

    #[test]
    fn detached_manager_never_activates() {
        let mut manager = TextInputManager::new();
        manager.create_ime_window();
        assert!(!manager.ime_active());
        manager.update_ime_window();
        assert!(!manager.ime_active());
    }

    #[test]
    fn caret_rect_is_stored_without_a_window() {
        let mut manager = TextInputManager::new();
        manager.update_caret_rect(caret(40, 60));
        assert_eq!(manager.caret_rect().left(), 40);
        assert_eq!(manager.caret_rect().top(), 60);
        assert!(!manager.ime_active());
    }

    #[test]
    fn destroy_while_inactive_is_idempotent() {
        let mut manager = TextInputManager::new();
        manager.destroy_ime_window();
        manager.destroy_ime_window();
        assert!(!manager.ime_active());
    }

    #[test]
    fn composition_reads_need_a_window() {
        let manager = TextInputManager::new();
        assert_eq!(manager.composing_cursor_pos(), None);
        assert_eq!(manager.composing_string(), None);
        assert_eq!(manager.result_string(), None);
    }

    #[test]
    fn composition_strings_need_an_active_session() {
        let mut manager = TextInputManager::new();
        // A dangling handle is fine here: the inactive check fires before
        // any platform call.
        manager.set_window_handle(Some(HWND(4usize as *mut _)));
        assert_eq!(manager.composing_string(), None);
        assert_eq!(manager.result_string(), None);
    }
}
