//! Shadow artifact layout
//!
//! The marked text is persisted as UTF-8 with a byte-order mark in a hidden
//! sibling directory: `dir/name` is shadowed by `dir/.freebidi/name`.

use crate::error::ShadowError;
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

/// Reserved directory segment holding shadow files
pub const SHADOW_DIR: &str = ".freebidi";

/// UTF-8 byte-order mark prefixed to every shadow file
pub const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Source extensions routed into the engine by the CLI
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["cob", "inc", "cpy", "pco"];

/// Path of the shadow file for `original`
pub fn shadow_path(original: &Path) -> Option<PathBuf> {
    let name = original.file_name()?;
    let dir = original.parent().unwrap_or_else(|| Path::new(""));
    Some(dir.join(SHADOW_DIR).join(name))
}

/// Path of the original file for a shadow path, if `shadow` is one
pub fn original_path(shadow: &Path) -> Option<PathBuf> {
    let name = shadow.file_name()?;
    let shadow_dir = shadow.parent()?;
    if shadow_dir.file_name() != Some(OsStr::new(SHADOW_DIR)) {
        return None;
    }
    let dir = shadow_dir.parent().unwrap_or_else(|| Path::new(""));
    Some(dir.join(name))
}

/// Whether `path` lies inside a shadow directory
pub fn is_shadow_path(path: &Path) -> bool {
    path.parent()
        .map(|dir| {
            dir.components()
                .any(|c| matches!(c, Component::Normal(name) if name == SHADOW_DIR))
        })
        .unwrap_or(false)
}

/// Whether `path` has one of [`SUPPORTED_EXTENSIONS`], ignoring case
pub fn is_supported_source(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .map(|ext| SUPPORTED_EXTENSIONS.iter().any(|s| s.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// Serialize marked text for the shadow file
pub fn to_shadow_bytes(text: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(UTF8_BOM.len() + text.len());
    bytes.extend_from_slice(&UTF8_BOM);
    bytes.extend_from_slice(text.as_bytes());
    bytes
}

/// Read a shadow file's content, with or without the byte-order mark
pub fn from_shadow_bytes(bytes: &[u8]) -> Result<String, ShadowError> {
    let body = bytes.strip_prefix(&UTF8_BOM[..]).unwrap_or(bytes);
    std::str::from_utf8(body)
        .map(str::to_string)
        .map_err(|e| ShadowError::InvalidUtf8 {
            offset: e.valid_up_to() + (bytes.len() - body.len()),
        })
}
