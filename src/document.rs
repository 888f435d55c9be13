//! Per-document transcoding state

use crate::decoder::Decoder;
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::encoder::reverse_transform;
use crate::error::{DocumentError, EditError};
use crate::incremental::{apply_mark_edits, mark_inserted_runs, EditDelta, MarkEdit};
use crate::marks::mark_directional_runs;
use crate::profile::EncodingProfile;
use crate::shadow::{from_shadow_bytes, to_shadow_bytes};
use std::path::{Path, PathBuf};

/// Whether the buffer currently carries marks that still have to be stripped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentState {
    Unmarked,
    Marked,
}

/// An open source file and its marked buffer
#[derive(Debug, Clone)]
pub struct Document {
    path: PathBuf,
    profile: EncodingProfile,
    text: String,
    state: DocumentState,
}

impl Document {
    /// Forward-transform a file's bytes. On success the document is `Marked`.
    pub fn open(
        path: impl Into<PathBuf>,
        bytes: &[u8],
        decoder: &Decoder,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<Self, DocumentError> {
        let path = path.into();
        let decoded = decoder
            .decode(bytes, sink)
            .map_err(|source| DocumentError::Decode {
                path: path.clone(),
                source,
            })?;

        Ok(Self {
            path,
            profile: decoded.profile,
            text: decoded.text.into_string(),
            state: DocumentState::Marked,
        })
    }

    /// Rebuild a document from an existing shadow file's bytes.
    ///
    /// Runs missing a mark are marked; existing marks are kept.
    pub fn from_shadow(
        path: impl Into<PathBuf>,
        shadow_bytes: &[u8],
        profile: EncodingProfile,
    ) -> Result<Self, DocumentError> {
        let path = path.into();
        let text = from_shadow_bytes(shadow_bytes).map_err(|source| DocumentError::Shadow {
            path: path.clone(),
            source,
        })?;
        let text = mark_directional_runs(&text, &profile).into_string();

        Ok(Self {
            path,
            profile,
            text,
            state: DocumentState::Marked,
        })
    }

    /// Path of the original file
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn profile(&self) -> &EncodingProfile {
        &self.profile
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn state(&self) -> DocumentState {
        self.state
    }

    /// The shadow file content for the current buffer
    pub fn shadow_bytes(&self) -> Vec<u8> {
        to_shadow_bytes(&self.text)
    }

    /// Insert `delta` into the buffer and re-mark around it.
    ///
    /// Returns the mark edits that were applied, with offsets relative to the
    /// buffer right after the fragment was inserted.
    pub fn apply_edit(&mut self, delta: &EditDelta) -> Result<Vec<MarkEdit>, DocumentError> {
        let point = delta.insertion_point;
        if point > self.text.len() {
            return Err(self.edit_error(EditError::OutOfBounds {
                point,
                len: self.text.len(),
            }));
        }
        if !self.text.is_char_boundary(point) {
            return Err(self.edit_error(EditError::NotCharBoundary { point }));
        }

        let mut text = self.text.clone();
        text.insert_str(point, &delta.inserted_text);
        let edits = mark_inserted_runs(&text, delta, &self.profile).map_err(|e| self.edit_error(e))?;
        apply_mark_edits(&mut text, &edits).map_err(|e| self.edit_error(e))?;

        self.text = text;
        self.state = DocumentState::Marked;
        Ok(edits)
    }

    fn edit_error(&self, source: EditError) -> DocumentError {
        DocumentError::Edit {
            path: self.path.clone(),
            source,
        }
    }

    /// Reverse-transform the buffer for writing back over the original file.
    ///
    /// On success the document is `Unmarked` until the next edit. An encode
    /// failure is reported to `sink` and returned; state and buffer are kept.
    pub fn save(&mut self, sink: &mut dyn DiagnosticSink) -> Result<Vec<u8>, DocumentError> {
        match reverse_transform(&self.text, &self.profile) {
            Ok(bytes) => {
                self.state = DocumentState::Unmarked;
                Ok(bytes)
            }
            Err(source) => {
                sink.report(Diagnostic::EncodeFailed {
                    document: self.path.display().to_string(),
                    reason: source.clone(),
                });
                Err(DocumentError::Encode {
                    path: self.path.clone(),
                    source,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DecodeFailure, EncodingFailure};
    use crate::shadow::UTF8_BOM;

    const SOURCE: &[u8] = b"       DISPLAY '\xF9\xEC\xE5\xED'.\n";

    fn open(bytes: &[u8]) -> Document {
        let mut diagnostics: Vec<Diagnostic> = Vec::new();
        Document::open("PROG.cob", bytes, &Decoder::default(), &mut diagnostics).unwrap()
    }

    #[test]
    fn test_open_marks_document() {
        let doc = open(SOURCE);
        assert_eq!(doc.state(), DocumentState::Marked);
        assert_eq!(doc.text(), "       DISPLAY '\u{202D}שלום'.\n");
        assert_eq!(doc.profile().name(), "ISO-8859-8");
        assert_eq!(&doc.shadow_bytes()[..3], &UTF8_BOM[..]);
    }

    #[test]
    fn test_open_without_script_is_skipped() {
        let mut diagnostics: Vec<Diagnostic> = Vec::new();
        let result = Document::open("PROG.cob", b"STOP RUN.\n", &Decoder::default(), &mut diagnostics);
        assert!(matches!(
            result,
            Err(DocumentError::Decode {
                source: DecodeFailure::NoScriptCharacters { .. },
                ..
            })
        ));
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_edit_then_save_round_trip() {
        let mut doc = open(SOURCE);
        let point = doc.text().find('\'').unwrap();
        let edits = doc.apply_edit(&EditDelta::new(point, "אב ")).unwrap();
        assert_eq!(edits, vec![MarkEdit::Insert { offset: point }]);
        assert_eq!(doc.text(), "       DISPLAY \u{202D}אב '\u{202D}שלום'.\n");

        let mut diagnostics: Vec<Diagnostic> = Vec::new();
        let bytes = doc.save(&mut diagnostics).unwrap();
        assert_eq!(bytes, b"       DISPLAY \xE0\xE1 '\xF9\xEC\xE5\xED'.\n");
        assert_eq!(doc.state(), DocumentState::Unmarked);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_save_twice_is_deterministic() {
        let mut doc = open(SOURCE);
        let mut diagnostics: Vec<Diagnostic> = Vec::new();
        let first = doc.save(&mut diagnostics).unwrap();
        let second = doc.save(&mut diagnostics).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, SOURCE);
    }

    #[test]
    fn test_save_unmappable_keeps_document() {
        let mut doc = open(SOURCE);
        doc.apply_edit(&EditDelta::new(0, "中")).unwrap();
        let before = doc.text().to_string();

        let mut diagnostics: Vec<Diagnostic> = Vec::new();
        let result = doc.save(&mut diagnostics);
        assert!(matches!(
            result,
            Err(DocumentError::Encode {
                source: EncodingFailure::UnmappableCodePoint { code_point: '中', .. },
                ..
            })
        ));
        assert_eq!(doc.text(), before);
        assert_eq!(doc.state(), DocumentState::Marked);
        assert!(matches!(
            diagnostics.as_slice(),
            [Diagnostic::EncodeFailed { document, .. }] if document == "PROG.cob"
        ));
    }

    #[test]
    fn test_edit_after_save_marks_again() {
        let mut doc = open(SOURCE);
        let mut diagnostics: Vec<Diagnostic> = Vec::new();
        doc.save(&mut diagnostics).unwrap();
        doc.apply_edit(&EditDelta::new(0, "x")).unwrap();
        assert_eq!(doc.state(), DocumentState::Marked);
    }

    #[test]
    fn test_invalid_edit_point() {
        let mut doc = open(SOURCE);
        let len = doc.text().len();
        let result = doc.apply_edit(&EditDelta::new(len + 1, "x"));
        assert!(matches!(
            result,
            Err(DocumentError::Edit {
                source: EditError::OutOfBounds { .. },
                ..
            })
        ));
    }

    #[test]
    fn test_from_shadow_restores_buffer() {
        let doc = open(SOURCE);
        let restored = Document::from_shadow("PROG.cob", &doc.shadow_bytes(), doc.profile().clone()).unwrap();
        assert_eq!(restored.text(), doc.text());
    }

    #[test]
    fn test_from_shadow_rejects_invalid_utf8() {
        let result = Document::from_shadow("PROG.cob", b"\xFF\xFE", EncodingProfile::default_profile());
        assert!(matches!(result, Err(DocumentError::Shadow { .. })));
    }
}
