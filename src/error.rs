// ── Central error type ────────────────────────────────────────────────────────
//
// All fallible operations in quill return `error::Result<T>`.  Failures of
// Win32 calls inside `platform::win32` are NOT errors — the IME layer treats
// an absent window or context as "nothing to do" (see `text_input`).  Errors
// exist only at the toolkit surface, where the host hands us offsets or JSON.

/// Every error that quill can produce.
#[derive(Debug)]
pub enum QuillError {
    /// A selection or composing range does not map into the current text.
    ///
    /// Offsets are reported as received from the host: UTF-16 code units,
    /// `-1` meaning "absent".
    InvalidRange {
        /// Range base as supplied by the caller.
        base: i64,
        /// Range extent as supplied by the caller.
        extent: i64,
    },

    /// Editing-state JSON could not be serialized or parsed.
    Json(serde_json::Error),
}

impl std::fmt::Display for QuillError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRange { base, extent } => {
                write!(f, "range [{base},{extent}) does not fit the text")
            }
            Self::Json(e) => write!(f, "editing-state JSON error: {e}"),
        }
    }
}

impl std::error::Error for QuillError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
            Self::InvalidRange { .. } => None,
        }
    }
}

// Convert a serde_json error directly into a QuillError so that `?` can be
// used on `serde_json::Result<T>` throughout the state module.
impl From<serde_json::Error> for QuillError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, QuillError>;
