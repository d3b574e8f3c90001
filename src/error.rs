//! Error types for unidml library.
//!
//! Fatal problems abort the document and surface as [`Error`]. Problems
//! scoped to a single file, story, run, or element are recovered and
//! recorded as [`Diagnostic`] values on the resulting document.

use std::fmt;
use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for unidml operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline stage in which an error or diagnostic was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Reading the zip package
    Archive,
    /// Building generic trees from raw XML
    Tree,
    /// Style, color, and font catalogs
    Resources,
    /// Spreads, pages, and master spreads
    Structure,
    /// Page item extraction and transforms
    Geometry,
    /// Story text reconstruction
    Text,
    /// Page to element assignment
    Association,
    /// JSON/text output
    Render,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Archive => "archive",
            Stage::Tree => "tree",
            Stage::Resources => "resources",
            Stage::Structure => "structure",
            Stage::Geometry => "geometry",
            Stage::Text => "text",
            Stage::Association => "association",
            Stage::Render => "render",
        };
        f.write_str(name)
    }
}

/// Error types that can occur during IDML processing.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file is not recognized as an IDML package.
    #[error("Unknown file format: not a valid IDML package")]
    UnknownFormat,

    /// The zip package is unreadable or lacks its required entries.
    #[error("Malformed archive ({stage}): {message}")]
    MalformedArchive {
        /// Stage that detected the problem
        stage: Stage,
        /// What went wrong
        message: String,
    },

    /// A single XML file could not be parsed.
    ///
    /// Lenient parsing records this as a diagnostic and skips the file; it is
    /// only returned when strict mode is enabled.
    #[error("Malformed XML in {file}: {message}")]
    MalformedXml {
        /// Package path of the offending file
        file: String,
        /// Parser message
        message: String,
    },

    /// No pages could be extracted from the spreads.
    #[error("No pages extracted from {spread_files} spread file(s)")]
    NoPagesExtracted {
        /// Number of spread files that were inspected
        spread_files: usize,
    },

    /// Error during rendering (JSON, text).
    #[error("Rendering error: {0}")]
    Render(String),

    /// Invalid page range specification.
    #[error("Invalid page range: {0}")]
    InvalidPageRange(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error aborts the whole document.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::MalformedXml { .. })
    }

    /// Build a malformed-archive error for the archive stage.
    pub fn archive(message: impl Into<String>) -> Self {
        Error::MalformedArchive {
            stage: Stage::Archive,
            message: message.into(),
        }
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            _ => Error::archive(err.to_string()),
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::MalformedXml {
            file: String::new(),
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Render(format!("JSON serialization error: {}", err))
    }
}

/// Kind of recovered problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A file was skipped because its XML could not be parsed
    MalformedXml,
    /// A style reference could not be resolved; defaults were used
    StyleResolutionMiss,
    /// An element's page was not evident and was resolved by the cascade
    AmbiguousPageAssignment,
    /// A run's text could not be rebuilt; a placeholder was emitted
    TextReconstructionFailure,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiagnosticKind::MalformedXml => "malformed XML",
            DiagnosticKind::StyleResolutionMiss => "style resolution miss",
            DiagnosticKind::AmbiguousPageAssignment => "ambiguous page assignment",
            DiagnosticKind::TextReconstructionFailure => "text reconstruction failure",
        };
        f.write_str(name)
    }
}

/// A recovered error recorded while building a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// What kind of problem this is
    pub kind: DiagnosticKind,

    /// Stage that recorded it
    pub stage: Stage,

    /// Package path involved, if any
    pub file: Option<String>,

    /// Id of the style, story, or element involved, if any
    pub subject: Option<String>,

    /// Human-readable detail
    pub message: String,
}

impl Diagnostic {
    /// Create a new diagnostic.
    pub fn new(kind: DiagnosticKind, stage: Stage, message: impl Into<String>) -> Self {
        Self {
            kind,
            stage,
            file: None,
            subject: None,
            message: message.into(),
        }
    }

    /// Attach the package path.
    pub fn in_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Attach the subject id.
    pub fn about(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.stage, self.kind)?;
        if let Some(ref file) = self.file {
            write!(f, " in {}", file)?;
        }
        if let Some(ref subject) = self.subject {
            write!(f, " ({})", subject)?;
        }
        write!(f, ": {}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::NoPagesExtracted { spread_files: 2 };
        assert_eq!(err.to_string(), "No pages extracted from 2 spread file(s)");

        let err = Error::MalformedXml {
            file: "Stories/Story_u1.xml".to_string(),
            message: "unexpected end".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Malformed XML in Stories/Story_u1.xml: unexpected end"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_fatality() {
        assert!(Error::archive("no designmap").is_fatal());
        assert!(Error::NoPagesExtracted { spread_files: 0 }.is_fatal());
        assert!(!Error::MalformedXml {
            file: "a.xml".into(),
            message: "x".into()
        }
        .is_fatal());
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::new(
            DiagnosticKind::StyleResolutionMiss,
            Stage::Resources,
            "basedOn cycle",
        )
        .in_file("Resources/Styles.xml")
        .about("ParagraphStyle/A");
        assert_eq!(
            diag.to_string(),
            "[resources] style resolution miss in Resources/Styles.xml (ParagraphStyle/A): basedOn cycle"
        );
    }
}
