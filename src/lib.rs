// ── Safety policy ────────────────────────────────────────────────────────────
// Unsafe code is forbidden everywhere except:
//   • `platform::win32` – Win32 / IMM32 FFI
// Each unsafe block in that module MUST carry a `// SAFETY:` comment.
#![deny(unsafe_code)]

//! Text-input glue for GUI views embedded in a Win32 window.
//!
//! The platform side ([`TextInputManager`], Windows-only) keeps the IMM32
//! composition and candidate windows glued to the on-screen caret of the
//! embedded view.  The toolkit side ([`TextInputModel`], [`EditingState`])
//! owns the text under composition and its JSON snapshot.  All mutation
//! happens on the host's UI thread; nothing here locks or blocks.

pub mod error;
pub mod geometry;
pub mod model;
pub mod range;
pub mod state;

#[cfg(windows)]
pub mod platform;

pub use error::{QuillError, Result};
pub use geometry::{Point, Rect, Size};
pub use model::TextInputModel;
pub use range::Range;
pub use state::EditingState;

#[cfg(windows)]
pub use platform::win32::text_input::TextInputManager;
