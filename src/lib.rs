//! # free-bidi
//!
//! Reversible transcoding of source files stored in a legacy single-byte
//! right-to-left code page (ISO-8859-8, windows-1255, windows-1256, ...).
//!
//! Editors that only understand UTF-8 render such files as mojibake, and even
//! once decoded, RTL words embedded in left-to-right code get reordered by the
//! display bidi algorithm. This crate decodes the bytes and puts a
//! LEFT-TO-RIGHT OVERRIDE (`U+202D`) in front of every RTL run so the text is
//! shown in storage order. Saving strips the marks and re-encodes, giving back
//! the original bytes.
//!
//! ## Transform
//!
//! ```text
//! bytes  --try_decode-->  "ABC אבג DEF"  --mark-->  "ABC \u{202D}אבג DEF"
//! bytes  <--encode-----   "ABC אבג DEF"  <--strip-- "ABC \u{202D}אבג DEF"
//! ```
//!
//! - [`Decoder`] picks the first candidate [`EncodingProfile`] whose decoding
//!   contains RTL script characters
//! - [`mark_directional_runs`] / [`strip_directional_marks`] add and remove marks
//! - [`encode`] refuses characters the code page cannot represent
//! - [`mark_inserted_runs`] re-marks only around an edit
//!
//! ## Round-trip rules
//!
//! 1. Code page bytes with no assigned character are rejected on decode, never
//!    replaced
//! 2. A file without any RTL script character is left alone
//! 3. Marking is idempotent: a run already preceded by a mark is skipped
//! 4. Unencodable characters fail the save; nothing is substituted
//!
//! ## Diagnostics
//!
//! Fallbacks (unknown configured encoding, rejected candidates, failed saves)
//! are reported through a caller-supplied [`DiagnosticSink`]. No state is
//! kept between calls.

pub mod decoder;
pub mod diagnostics;
pub mod document;
pub mod encoder;
pub mod error;
pub mod incremental;
pub mod marks;
pub mod profile;
pub mod shadow;

pub use decoder::{forward_transform, try_decode, Decoded, Decoder};
pub use diagnostics::{Diagnostic, DiagnosticSink, NullSink, TracingSink};
pub use document::{Document, DocumentState};
pub use encoder::{encode, reverse_transform, Encoder};
pub use error::{DecodeFailure, DocumentError, EditError, EncodingFailure, ScriptRangeError, ShadowError};
pub use incremental::{apply_mark_edits, mark_inserted_runs, EditDelta, MarkEdit};
pub use marks::{mark_directional_runs, strip_directional_marks, MarkedText, LRO};
pub use profile::{
    resolve_encoding, BidiConfig, EncodingProfile, ScriptRange, ScriptRuns,
    DEFAULT_ENCODING, DEFAULT_RTL_RANGES,
};
