//! Directional override marks

use crate::profile::EncodingProfile;
use std::borrow::Cow;
use std::fmt;
use std::ops::Deref;

/// LEFT-TO-RIGHT OVERRIDE, inserted before every RTL run
pub const LRO: char = '\u{202D}';

/// Decoded text with an [`LRO`] in front of every RTL script run
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MarkedText {
    text: String,
}

impl MarkedText {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    /// Number of marks in the text
    pub fn mark_count(&self) -> usize {
        self.text.matches(LRO).count()
    }
}

impl Deref for MarkedText {
    type Target = str;

    fn deref(&self) -> &str {
        &self.text
    }
}

impl AsRef<str> for MarkedText {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

impl From<MarkedText> for String {
    fn from(marked: MarkedText) -> Self {
        marked.text
    }
}

impl fmt::Display for MarkedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Insert one [`LRO`] before each maximal run of script characters.
///
/// Nothing else changes. A run already preceded by an `LRO` is left alone, so
/// marking twice gives the same result as marking once.
pub fn mark_directional_runs(text: &str, profile: &EncodingProfile) -> MarkedText {
    let mut marked = String::with_capacity(text.len() + LRO.len_utf8() * 4);
    let mut copied = 0;

    for run in profile.script_runs(text) {
        marked.push_str(&text[copied..run.start]);
        if !text[..run.start].ends_with(LRO) {
            marked.push(LRO);
        }
        copied = run.start;
    }
    marked.push_str(&text[copied..]);

    MarkedText { text: marked }
}

/// Remove every [`LRO`]. Borrows when there is nothing to remove.
pub fn strip_directional_marks(text: &str) -> Cow<'_, str> {
    if text.contains(LRO) {
        Cow::Owned(text.chars().filter(|&c| c != LRO).collect())
    } else {
        Cow::Borrowed(text)
    }
}
