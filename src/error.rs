//! Error types

use std::path::PathBuf;
use thiserror::Error;

/// Why a byte buffer was not accepted under a profile
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeFailure {
    /// Bytes decode cleanly but contain none of the profile's script characters.
    /// The file is out of scope for transformation and must be left untouched.
    #[error("no RTL script characters found when decoding as {encoding}")]
    NoScriptCharacters { encoding: &'static str },

    /// The code page leaves this byte value undefined.
    ///
    /// Decoding never substitutes U+FFFD for such a byte: the replacement
    /// character could not be encoded back, so the file would no longer
    /// round-trip. The byte is rejected here instead.
    #[error("byte 0x{byte:02X} at offset {offset} is undefined in {encoding}")]
    UnmappedByte {
        encoding: &'static str,
        offset: usize,
        byte: u8,
    },
}

/// Failure to re-encode text into the legacy code page
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingFailure {
    #[error("character {code_point:?} (U+{:04X}) at line {line}, column {column} cannot be represented in {encoding}", scalar(.code_point))]
    UnmappableCodePoint {
        encoding: &'static str,
        code_point: char,
        line: usize,
        column: usize,
    },
}

fn scalar(c: &char) -> u32 {
    *c as u32
}

/// Invalid edit delta handed to the incremental transform
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("insertion point {point} is past the end of the buffer ({len} bytes)")]
    OutOfBounds { point: usize, len: usize },

    #[error("insertion point {point} is not on a character boundary")]
    NotCharBoundary { point: usize },

    #[error("inserted text not found at offset {point}")]
    FragmentMismatch { point: usize },
}

/// Failure to parse a script range such as `0590-05FF`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptRangeError {
    #[error("expected START-END, got '{input}'")]
    InvalidFormat { input: String },

    #[error("'{input}' is not a valid Unicode scalar value")]
    InvalidCodePoint { input: String },

    #[error("range start U+{start:04X} is after end U+{end:04X}")]
    Reversed { start: u32, end: u32 },
}

/// Failure reading a shadow artifact
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShadowError {
    #[error("shadow content is not valid UTF-8 (at byte {offset})")]
    InvalidUtf8 { offset: usize },
}

/// Engine failure tied to a specific document
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("cannot transcode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: DecodeFailure,
    },

    #[error("cannot save {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: EncodingFailure,
    },

    #[error("invalid edit in {}: {source}", path.display())]
    Edit {
        path: PathBuf,
        #[source]
        source: EditError,
    },

    #[error("cannot read shadow of {}: {source}", path.display())]
    Shadow {
        path: PathBuf,
        #[source]
        source: ShadowError,
    },
}
