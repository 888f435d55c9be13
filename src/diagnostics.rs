//! Side-channel diagnostics
//!
//! Fallbacks are not errors: the engine keeps going and reports what it did
//! through a [`DiagnosticSink`] supplied by the caller.

use crate::error::{DecodeFailure, EncodingFailure};
use std::fmt;

/// A human-readable report about a recovered or skipped operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Configured encoding name is not known
    UnrecognizedEncodingName {
        requested: String,
        fallback: &'static str,
    },
    /// Configured encoding exists but is not a single-byte code page
    NotSingleByte {
        requested: String,
        encoding: &'static str,
        fallback: &'static str,
    },
    /// A fallback encoding name is not a known single-byte code page
    UnknownFallback { requested: String },
    /// A candidate profile did not fit the bytes
    DecodeSkipped {
        encoding: &'static str,
        reason: DecodeFailure,
    },
    /// Reverse transform failed; the save must not happen
    EncodeFailed {
        document: String,
        reason: EncodingFailure,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnrecognizedEncodingName { requested, fallback } => {
                write!(f, "Invalid rtl encoding value '{}', falling back to {}", requested, fallback)
            }
            Diagnostic::NotSingleByte { requested, encoding, fallback } => {
                write!(
                    f,
                    "Encoding '{}' ({}) is not a single-byte code page, falling back to {}",
                    requested, encoding, fallback
                )
            }
            Diagnostic::UnknownFallback { requested } => {
                write!(f, "Ignoring unknown fallback encoding '{}'", requested)
            }
            Diagnostic::DecodeSkipped { encoding, reason } => {
                write!(f, "Decoding with {} skipped: {}", encoding, reason)
            }
            Diagnostic::EncodeFailed { document, reason } => {
                write!(f, "Failed to save {}: {}", document, reason)
            }
        }
    }
}

/// Receives diagnostics from engine calls
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Forwards diagnostics to `tracing` at warn level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        tracing::warn!("{}", diagnostic);
    }
}

/// Discards diagnostics
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn report(&mut self, _diagnostic: Diagnostic) {}
}
