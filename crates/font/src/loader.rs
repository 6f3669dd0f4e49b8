//! Font file parsing seam.
//!
//! The resolver needs one thing from a candidate file: its canonical
//! family name. That step sits behind a trait so tests can drive the
//! resolution order with deterministic fixtures instead of real font
//! binaries.

use std::fmt;
use std::path::Path;

/// Face data extracted from a font file.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedFace {
    /// Family name from the name table (typographic family preferred).
    pub family: String,
}

/// Why a candidate file was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadError {
    /// File unreadable
    Io(String),
    /// Not parseable as a font
    Parse(String),
    /// Parsed, but the name table carries no usable family name
    NoFamilyName,
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io(msg) => write!(f, "I/O error: {}", msg),
            LoadError::Parse(msg) => write!(f, "not a valid font: {}", msg),
            LoadError::NoFamilyName => write!(f, "no family name in the name table"),
        }
    }
}

impl std::error::Error for LoadError {}

/// Derives the canonical family name of a font file.
pub trait FontLoader {
    fn load(&mut self, path: &Path) -> Result<LoadedFace, LoadError>;
}

/// Production loader: ttf-parser over the raw bytes. Handles both
/// single-program files and collections (face 0 names a collection
/// well enough for family selection).
#[derive(Debug, Default)]
pub struct TtfLoader;

impl FontLoader for TtfLoader {
    fn load(&mut self, path: &Path) -> Result<LoadedFace, LoadError> {
        let data = std::fs::read(path).map_err(|e| LoadError::Io(e.to_string()))?;
        let face =
            ttf_parser::Face::parse(&data, 0).map_err(|e| LoadError::Parse(e.to_string()))?;
        match family_name(&face) {
            Some(family) => Ok(LoadedFace { family }),
            None => Err(LoadError::NoFamilyName),
        }
    }
}

fn family_name(face: &ttf_parser::Face) -> Option<String> {
    let mut family = None;
    for name in face.names().into_iter() {
        if !name.is_unicode() {
            continue;
        }
        match name.name_id {
            ttf_parser::name_id::TYPOGRAPHIC_FAMILY => {
                if let Some(s) = name.to_string().filter(|s| !s.is_empty()) {
                    return Some(s);
                }
            }
            ttf_parser::name_id::FAMILY if family.is_none() => {
                family = name.to_string().filter(|s| !s.is_empty());
            }
            _ => {}
        }
    }
    family
}
