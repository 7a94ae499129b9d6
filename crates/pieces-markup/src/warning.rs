//! Source locations and build warnings.

use std::fmt;

/// Where a markup occurrence appears: document id and 1-indexed line.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SourceLocation {
    /// Document identifier (e.g., `guide/install`).
    pub document_id: String,
    /// Line number (1-indexed).
    pub line: usize,
}

impl SourceLocation {
    /// Create a new source location.
    #[must_use]
    pub fn new(document_id: impl Into<String>, line: usize) -> Self {
        Self {
            document_id: document_id.into(),
            line,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.document_id, self.line)
    }
}

/// A recoverable problem with one markup occurrence.
///
/// The occurrence is skipped; the rest of the document still builds.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BuildWarning {
    /// Location of the skipped occurrence.
    pub location: SourceLocation,
    /// Human-readable message.
    pub message: String,
}

impl BuildWarning {
    /// Create a new warning.
    #[must_use]
    pub fn new(location: SourceLocation, message: impl Into<String>) -> Self {
        Self {
            location,
            message: message.into(),
        }
    }
}

impl fmt::Display for BuildWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}
