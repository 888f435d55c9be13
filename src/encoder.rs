//! Marked text back to legacy bytes

use crate::error::EncodingFailure;
use crate::marks::LRO;
use crate::profile::EncodingProfile;
use encoding_rs::EncoderResult;

const CHUNK_LEN: usize = 4096;

/// Encode plain text into the profile's code page.
///
/// Fails on the first character the code page cannot represent; no partial
/// output is returned and nothing is substituted.
pub fn encode(text: &str, profile: &EncodingProfile) -> Result<Vec<u8>, EncodingFailure> {
    let mut output = Vec::with_capacity(text.len());
    encode_segment(text, 0, text, profile, &mut output)?;
    Ok(output)
}

/// Encode `text[base..base + segment.len()]`, appending to `output`.
///
/// Failure positions are reported against the whole of `text`.
fn encode_segment(
    segment: &str,
    base: usize,
    text: &str,
    profile: &EncodingProfile,
    output: &mut Vec<u8>,
) -> Result<(), EncodingFailure> {
    let mut encoder = profile.encoding().new_encoder();
    let mut chunk = [0u8; CHUNK_LEN];
    let mut consumed = 0;

    loop {
        let (result, read, written) =
            encoder.encode_from_utf8_without_replacement(&segment[consumed..], &mut chunk, true);
        output.extend_from_slice(&chunk[..written]);
        consumed += read;

        match result {
            EncoderResult::InputEmpty => return Ok(()),
            EncoderResult::OutputFull => continue,
            EncoderResult::Unmappable(c) => {
                let offset = if segment[..consumed].ends_with(c) {
                    consumed - c.len_utf8()
                } else {
                    consumed
                };
                return Err(unmappable(text, base + offset, c, profile));
            }
        }
    }
}

fn unmappable(text: &str, offset: usize, code_point: char, profile: &EncodingProfile) -> EncodingFailure {
    let before = &text[..offset];
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);

    EncodingFailure::UnmappableCodePoint {
        encoding: profile.name(),
        code_point,
        line: before.matches('\n').count() + 1,
        column: before[line_start..].chars().count() + 1,
    }
}

/// Strip every mark, then encode.
///
/// An unmappable character is located by line and column in the marked text,
/// marks included, as it appears in the shadow file.
pub fn reverse_transform(text: &str, profile: &EncodingProfile) -> Result<Vec<u8>, EncodingFailure> {
    let mut output = Vec::with_capacity(text.len());
    let mut base = 0;

    for segment in text.split(LRO) {
        encode_segment(segment, base, text, profile, &mut output)?;
        base += segment.len() + LRO.len_utf8();
    }

    Ok(output)
}

/// Reverse transform bound to one profile
#[derive(Debug, Clone)]
pub struct Encoder {
    profile: EncodingProfile,
}

impl Encoder {
    pub fn new(profile: EncodingProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &EncodingProfile {
        &self.profile
    }

    /// Reverse-transform marked text to bytes
    pub fn encode(&self, marked: &str) -> Result<Vec<u8>, EncodingFailure> {
        let bytes = reverse_transform(marked, &self.profile)?;
        tracing::debug!(encoding = self.profile.name(), "encoded {} bytes", bytes.len());
        Ok(bytes)
    }

    /// Reverse-transform directly to a writer. Nothing is written on failure.
    pub fn encode_to_writer<W: std::io::Write>(&self, marked: &str, mut writer: W) -> anyhow::Result<()> {
        let bytes = self.encode(marked)?;
        writer.write_all(&bytes)?;
        Ok(())
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new(EncodingProfile::default_profile())
    }
}
