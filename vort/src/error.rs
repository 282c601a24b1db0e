//! Errors and recoverable diagnostics

use std::path::PathBuf;

use thiserror::Error;
use write_fonts::types::{GlyphId, Tag};

use crate::orientation::ParseError;

/// A fatal error; the conversion is abandoned and no output is written.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Error reading orientation table: {0}")]
    Orientation(#[from] ParseError),

    #[error("Glyph {0} referenced by a lookup rule does not exist")]
    MissingGlyph(GlyphId),

    #[error("Error reading font data: {0}")]
    InvalidFont(serde_json::Error),

    #[error("Error serializing font: {0}")]
    Serialization(serde_json::Error),

    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

/// A condition that is reported but does not stop the conversion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Warning {
    /// The font has no lookup registered under this feature tag.
    MissingFeatureTag(Tag),
    /// A rule was found that the substitution pass does not know how to apply.
    UnsupportedRuleKind {
        glyph: String,
        tag: Tag,
        kind: &'static str,
    },
    /// A bounding box pivot was requested but none of the selected glyphs has ink.
    EmptySelectionBounds,
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::MissingFeatureTag(tag) => write!(f, "No '{tag}' feature in font"),
            Warning::UnsupportedRuleKind { glyph, tag, kind } => {
                write!(f, "Unhandled {kind} rule under '{tag}' for glyph '{glyph}'")
            }
            Warning::EmptySelectionBounds => f.write_str(
                "Selected glyphs have no outlines, using the default rotation center",
            ),
        }
    }
}

/// Collects warnings raised while converting a font.
///
/// Every warning is logged as it is reported.
#[derive(Clone, Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    pub fn report(&mut self, warning: Warning) {
        log::warn!("{warning}");
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }
}
