//! Parsing options and configuration.

use serde::{Deserialize, Serialize};

use crate::model::Alignment;
use crate::units::DEFAULT_DPI;

/// Options for parsing IDML documents.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Output resolution for pixel geometry
    pub dpi: f64,

    /// Error handling mode
    pub error_mode: ErrorMode,

    /// What to extract from the document
    pub extract_mode: ExtractMode,

    /// Whether batch parsing runs documents in parallel
    pub parallel: bool,

    /// Formatting used when neither run nor styles specify a value
    pub defaults: FormattingDefaults,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output DPI. Non-positive values are ignored.
    pub fn with_dpi(mut self, dpi: f64) -> Self {
        if dpi > 0.0 && dpi.is_finite() {
            self.dpi = dpi;
        }
        self
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Skip malformed files and keep going (the default).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Fail on the first malformed file.
    pub fn strict(mut self) -> Self {
        self.error_mode = ErrorMode::Strict;
        self
    }

    /// Set extract mode.
    pub fn with_extract_mode(mut self, mode: ExtractMode) -> Self {
        self.extract_mode = mode;
        self
    }

    /// Skip story text reconstruction.
    pub fn structure_only(mut self) -> Self {
        self.extract_mode = ExtractMode::StructureOnly;
        self
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set the formatting defaults.
    pub fn with_defaults(mut self, defaults: FormattingDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub(crate) fn is_strict(&self) -> bool {
        self.error_mode == ErrorMode::Strict
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            error_mode: ErrorMode::Lenient,
            extract_mode: ExtractMode::Full,
            parallel: true,
            defaults: FormattingDefaults::default(),
        }
    }
}

/// Error handling mode during parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on malformed files
    Strict,
    /// Skip malformed files and record a diagnostic
    #[default]
    Lenient,
}

/// What content to extract from the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractMode {
    /// Structure, geometry, and story text
    #[default]
    Full,
    /// Structure and geometry only (no story text)
    StructureOnly,
}

/// Document-level formatting defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattingDefaults {
    /// Font family
    pub font_family: String,

    /// Font size in points
    pub font_size: f64,

    /// Text color as `#RRGGBB`
    pub color: String,

    /// Paragraph alignment
    pub alignment: Alignment,

    /// Auto leading as a multiple of the font size
    pub leading_factor: f64,
}

impl Default for FormattingDefaults {
    fn default() -> Self {
        Self {
            font_family: "Minion Pro".to_string(),
            font_size: 12.0,
            color: "#000000".to_string(),
            alignment: Alignment::Left,
            leading_factor: 1.2,
        }
    }
}
