//! Encoding profiles and script detection

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::ScriptRangeError;
use crate::marks::LRO;
use encoding_rs::Encoding;
use std::fmt;
use std::ops::Range;
use std::str::{CharIndices, FromStr};

/// Name of the profile used when nothing (valid) is configured
pub const DEFAULT_ENCODING: &str = "ISO-8859-8";

/// Hebrew, Arabic, Arabic Supplement and Arabic Extended-A, treated as one script class
pub const DEFAULT_RTL_RANGES: [ScriptRange; 4] = [
    ScriptRange::from_chars('\u{0590}', '\u{05FF}'),
    ScriptRange::from_chars('\u{0600}', '\u{06FF}'),
    ScriptRange::from_chars('\u{0750}', '\u{077F}'),
    ScriptRange::from_chars('\u{08A0}', '\u{08FF}'),
];

/// Inclusive interval of code points belonging to an RTL script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScriptRange {
    start: char,
    end: char,
}

impl ScriptRange {
    const fn from_chars(start: char, end: char) -> Self {
        Self { start, end }
    }

    /// Create a range, rejecting `start > end`
    pub fn new(start: char, end: char) -> Result<Self, ScriptRangeError> {
        if start > end {
            return Err(ScriptRangeError::Reversed {
                start: start as u32,
                end: end as u32,
            });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> char {
        self.start
    }

    pub fn end(&self) -> char {
        self.end
    }

    pub fn contains(&self, c: char) -> bool {
        self.start <= c && c <= self.end
    }

    fn parse_code_point(input: &str) -> Result<char, ScriptRangeError> {
        let digits = input
            .trim()
            .trim_start_matches("U+")
            .trim_start_matches("u+")
            .trim_start_matches("0x");
        u32::from_str_radix(digits, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| ScriptRangeError::InvalidCodePoint {
                input: input.to_string(),
            })
    }
}

impl FromStr for ScriptRange {
    type Err = ScriptRangeError;

    /// Parse `0590-05FF`, `U+0590-U+05FF` or `U+0590..U+05FF`
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (start, end) = input
            .split_once("..")
            .or_else(|| input.split_once('-'))
            .ok_or_else(|| ScriptRangeError::InvalidFormat {
                input: input.to_string(),
            })?;
        Self::new(Self::parse_code_point(start)?, Self::parse_code_point(end)?)
    }
}

impl fmt::Display for ScriptRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U+{:04X}-U+{:04X}", self.start as u32, self.end as u32)
    }
}

/// A single-byte legacy code page plus the script ranges expected in it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodingProfile {
    encoding: &'static Encoding,
    script_ranges: Vec<ScriptRange>,
}

impl EncodingProfile {
    /// Look up a single-byte encoding by label, with the default RTL ranges.
    ///
    /// Labels follow the WHATWG Encoding Standard (`ISO-8859-8`, `cp1255`,
    /// `windows-1256`, ...). Multi-byte encodings are rejected.
    pub fn for_label(label: &str) -> Option<Self> {
        let encoding = Encoding::for_label(label.trim().as_bytes())?;
        if !encoding.is_single_byte() {
            return None;
        }
        Some(Self {
            encoding,
            script_ranges: DEFAULT_RTL_RANGES.to_vec(),
        })
    }

    /// ISO-8859-8 with the default RTL ranges
    pub fn default_profile() -> Self {
        Self {
            encoding: encoding_rs::ISO_8859_8,
            script_ranges: DEFAULT_RTL_RANGES.to_vec(),
        }
    }

    /// Replace the script ranges. An empty list keeps the current ranges.
    pub fn with_script_ranges(mut self, ranges: impl IntoIterator<Item = ScriptRange>) -> Self {
        let ranges: Vec<ScriptRange> = ranges.into_iter().collect();
        if !ranges.is_empty() {
            self.script_ranges = ranges;
        }
        self
    }

    /// Canonical encoding name, e.g. `ISO-8859-8` or `windows-1255`
    pub fn name(&self) -> &'static str {
        self.encoding.name()
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    pub fn script_ranges(&self) -> &[ScriptRange] {
        &self.script_ranges
    }

    /// Whether `c` belongs to the union of the profile's script ranges
    pub fn is_script_char(&self, c: char) -> bool {
        c != LRO && self.script_ranges.iter().any(|r| r.contains(c))
    }

    /// Whether `text` contains at least one script character
    pub fn contains_script(&self, text: &str) -> bool {
        text.chars().any(|c| self.is_script_char(c))
    }

    /// Iterate the byte ranges of maximal script runs in `text`.
    ///
    /// This is the single run detector used by both the full-buffer and the
    /// edit-time transforms.
    pub fn script_runs<'p, 't>(&'p self, text: &'t str) -> ScriptRuns<'p, 't> {
        ScriptRuns {
            profile: self,
            chars: text.char_indices(),
            len: text.len(),
        }
    }
}

impl Default for EncodingProfile {
    fn default() -> Self {
        Self::default_profile()
    }
}

impl fmt::Display for EncodingProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Iterator over maximal script runs, see [`EncodingProfile::script_runs`]
pub struct ScriptRuns<'p, 't> {
    profile: &'p EncodingProfile,
    chars: CharIndices<'t>,
    len: usize,
}

impl Iterator for ScriptRuns<'_, '_> {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = loop {
            let (i, c) = self.chars.next()?;
            if self.profile.is_script_char(c) {
                break i;
            }
        };
        for (i, c) in self.chars.by_ref() {
            if !self.profile.is_script_char(c) {
                return Some(start..i);
            }
        }
        Some(start..self.len)
    }
}

/// Resolve a configured encoding name to a profile.
///
/// Never fails: a missing name selects [`DEFAULT_ENCODING`], and an unknown or
/// multi-byte name falls back to it with a diagnostic.
pub fn resolve_encoding(configured: Option<&str>, sink: &mut dyn DiagnosticSink) -> EncodingProfile {
    let requested = match configured.map(str::trim) {
        Some(name) if !name.is_empty() => name,
        _ => return EncodingProfile::default_profile(),
    };

    if let Some(profile) = EncodingProfile::for_label(requested) {
        return profile;
    }

    let diagnostic = match Encoding::for_label(requested.as_bytes()) {
        Some(encoding) => Diagnostic::NotSingleByte {
            requested: requested.to_string(),
            encoding: encoding.name(),
            fallback: DEFAULT_ENCODING,
        },
        None => Diagnostic::UnrecognizedEncodingName {
            requested: requested.to_string(),
            fallback: DEFAULT_ENCODING,
        },
    };
    sink.report(diagnostic);
    EncodingProfile::default_profile()
}

/// Engine configuration, passed explicitly into every resolving call
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BidiConfig {
    /// Primary encoding name; `None` selects [`DEFAULT_ENCODING`]
    pub encoding: Option<String>,
    /// Encodings tried, in order, when the primary one does not fit a file
    pub fallback_encodings: Vec<String>,
    /// Script ranges for every profile; empty keeps [`DEFAULT_RTL_RANGES`]
    pub script_ranges: Vec<ScriptRange>,
}

impl BidiConfig {
    pub fn with_encoding(name: impl Into<String>) -> Self {
        Self {
            encoding: Some(name.into()),
            ..Self::default()
        }
    }

    /// The primary profile
    pub fn resolve(&self, sink: &mut dyn DiagnosticSink) -> EncodingProfile {
        resolve_encoding(self.encoding.as_deref(), sink)
            .with_script_ranges(self.script_ranges.iter().copied())
    }

    /// Primary profile followed by every recognized fallback, without duplicates
    pub fn candidates(&self, sink: &mut dyn DiagnosticSink) -> Vec<EncodingProfile> {
        let mut candidates = vec![self.resolve(sink)];

        for name in &self.fallback_encodings {
            let Some(profile) = EncodingProfile::for_label(name) else {
                sink.report(Diagnostic::UnknownFallback {
                    requested: name.trim().to_string(),
                });
                continue;
            };
            let profile = profile.with_script_ranges(self.script_ranges.iter().copied());
            if !candidates.iter().any(|c| c.name() == profile.name()) {
                candidates.push(profile);
            }
        }

        candidates
    }
}
