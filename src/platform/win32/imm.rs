#![allow(unsafe_code)]

use windows::Win32::{
    Foundation::HWND,
    UI::Input::Ime::{ImmGetContext, ImmReleaseContext, HIMC},
};

// ── ImmContext ────────────────────────────────────────────────────────────────

/// Scoped IMM32 input-context handle.
///
/// Acquires the input context for a window on construction and releases it on
/// drop iff one was acquired.  Deliberately neither `Copy` nor `Clone`: the
/// release must run exactly once, on every exit path.  Never hold one across
/// calls — acquire, use, drop within a single operation.
pub(crate) struct ImmContext {
    window: HWND,
    context: HIMC,
}

impl ImmContext {
    /// Acquire the input context for `window`.
    pub(crate) fn acquire(window: HWND) -> Self {
        // SAFETY: window is a live handle owned by the host's UI thread.
        // ImmGetContext returns a null HIMC when the window has no input
        // context (or the handle is null), which `get` surfaces as None.
        let context = unsafe { ImmGetContext(window) };
        Self { window, context }
    }

    /// The acquired context, or `None` when the window has none.
    pub(crate) fn get(&self) -> Option<HIMC> {
        if self.context.is_invalid() {
            None
        } else {
            Some(self.context)
        }
    }
}

impl Drop for ImmContext {
    fn drop(&mut self) {
        if !self.context.is_invalid() {
            // SAFETY: context was returned by ImmGetContext for this window
            // and has not been released since.  The BOOL result is
            // intentionally ignored; a failed release cannot be retried.
            unsafe {
                let _ = ImmReleaseContext(self.window, self.context);
            }
        }
    }
}
