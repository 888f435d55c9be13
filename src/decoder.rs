//! Legacy bytes to marked text

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::DecodeFailure;
use crate::marks::{mark_directional_runs, MarkedText};
use crate::profile::{BidiConfig, EncodingProfile};

/// Decode `bytes` under `profile` and check that the target script is present.
///
/// Every defined byte maps to exactly one character, so a successful result
/// re-encodes to the same bytes. Bytes the code page leaves undefined are
/// rejected instead of being replaced.
pub fn try_decode(bytes: &[u8], profile: &EncodingProfile) -> Result<String, DecodeFailure> {
    let encoding = profile.encoding();
    let text = encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .ok_or_else(|| first_unmapped_byte(bytes, profile))?;

    if !profile.contains_script(&text) {
        return Err(DecodeFailure::NoScriptCharacters {
            encoding: profile.name(),
        });
    }

    Ok(text.into_owned())
}

/// Locate the byte that made a single-byte decode fail
fn first_unmapped_byte(bytes: &[u8], profile: &EncodingProfile) -> DecodeFailure {
    let encoding = profile.encoding();
    let offset = bytes
        .iter()
        .position(|b| {
            encoding
                .decode_without_bom_handling_and_without_replacement(std::slice::from_ref(b))
                .is_none()
        })
        .unwrap_or(0);

    DecodeFailure::UnmappedByte {
        encoding: profile.name(),
        offset,
        byte: bytes.get(offset).copied().unwrap_or(0),
    }
}

/// Decode and mark in one step
pub fn forward_transform(bytes: &[u8], profile: &EncodingProfile) -> Result<MarkedText, DecodeFailure> {
    let text = try_decode(bytes, profile)?;
    Ok(mark_directional_runs(&text, profile))
}

/// Result of a successful forward transform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub text: MarkedText,
    /// The candidate that accepted the bytes; needed again to save
    pub profile: EncodingProfile,
}

/// Tries an ordered list of profiles until one accepts the bytes
#[derive(Debug, Clone)]
pub struct Decoder {
    candidates: Vec<EncodingProfile>,
}

impl Decoder {
    /// Decoder with a single profile
    pub fn new(profile: EncodingProfile) -> Self {
        Self {
            candidates: vec![profile],
        }
    }

    /// Decoder trying `candidates` in order. An empty list means the default profile.
    pub fn with_candidates(candidates: Vec<EncodingProfile>) -> Self {
        if candidates.is_empty() {
            return Self::default();
        }
        Self { candidates }
    }

    /// Resolve the candidate list from configuration
    pub fn from_config(config: &BidiConfig, sink: &mut dyn DiagnosticSink) -> Self {
        Self::with_candidates(config.candidates(sink))
    }

    pub fn candidates(&self) -> &[EncodingProfile] {
        &self.candidates
    }

    /// The first candidate, used when a document is known to be in it
    pub fn primary(&self) -> &EncodingProfile {
        &self.candidates[0]
    }

    /// Forward-transform with the first candidate that fits.
    ///
    /// Each rejected candidate is reported to `sink`. When none fits, the
    /// result is `NoScriptCharacters` if any candidate decoded the bytes
    /// cleanly, otherwise the primary candidate's failure.
    pub fn decode(&self, bytes: &[u8], sink: &mut dyn DiagnosticSink) -> Result<Decoded, DecodeFailure> {
        let mut no_script = None;
        let mut first_failure = None;

        for profile in &self.candidates {
            match forward_transform(bytes, profile) {
                Ok(text) => {
                    tracing::debug!(
                        encoding = profile.name(),
                        marks = text.mark_count(),
                        "decoded {} bytes",
                        bytes.len()
                    );
                    return Ok(Decoded {
                        text,
                        profile: profile.clone(),
                    });
                }
                Err(reason) => {
                    sink.report(Diagnostic::DecodeSkipped {
                        encoding: profile.name(),
                        reason: reason.clone(),
                    });
                    if no_script.is_none() && matches!(reason, DecodeFailure::NoScriptCharacters { .. }) {
                        no_script = Some(reason.clone());
                    }
                    first_failure.get_or_insert(reason);
                }
            }
        }

        Err(no_script
            .or(first_failure)
            .unwrap_or(DecodeFailure::NoScriptCharacters {
                encoding: self.primary().name(),
            }))
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new(EncodingProfile::default_profile())
    }
}
