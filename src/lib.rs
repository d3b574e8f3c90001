//! # unidml
//!
//! IDML (InDesign Markup Language) document extraction library for Rust.
//!
//! This library reads IDML packages and builds a structured document model:
//! pages and spreads, positioned page items in pixels, reconstructed story
//! text with fully resolved formatting, and the style/color/font catalog.
//!
//! ## Quick Start
//!
//! ```no_run
//! use unidml::{parse_file, render};
//!
//! fn main() -> unidml::Result<()> {
//!     // Parse an IDML package
//!     let doc = parse_file("brochure.idml")?;
//!
//!     // Text in page order
//!     let text = render::to_text(&doc, &render::RenderOptions::default())?;
//!     println!("{}", text);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Document model**: pages, spreads, elements, stories, resources
//! - **Pixel geometry**: transforms composed through groups, DPI aware
//! - **Faithful text**: break placement and run order follow the source file
//! - **Page association**: every element lands on exactly one page
//! - **Output formats**: JSON and plain text
//! - **Batch processing**: Uses Rayon to parse many documents in parallel

pub mod color;
pub mod convert;
pub mod detect;
pub mod error;
pub mod model;
pub mod package;
pub mod parser;
pub mod render;
pub mod tree;
pub mod units;

// Re-export commonly used types
pub use convert::{
    ConvertOptions, ConvertResult, ConverterRegistry, DocumentConverter, IdmlConverter,
    OutputFormat,
};
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_idml, IdmlFormat};
pub use error::{Diagnostic, DiagnosticKind, Error, Result, Stage};
pub use model::{
    Alignment, AssignmentStrategy, BreakType, DocumentModel, Element, ElementKind,
    FormattedRun, Geometry, Metadata, Page, Point, Rect, ResolvedFormatting, ResourceCatalog,
    Spread, Story,
};
pub use package::PackageContents;
pub use parser::{ErrorMode, ExtractMode, FormattingDefaults, IdmlParser, ParseOptions};
pub use render::{ExtractionStats, JsonFormat, PageSelection, RenderOptions};
pub use units::Unit;

use rayon::prelude::*;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Parse an IDML file and return its document model.
///
/// # Example
///
/// ```no_run
/// use unidml::parse_file;
///
/// let doc = parse_file("brochure.idml").unwrap();
/// println!("Pages: {}", doc.page_count());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<DocumentModel> {
    let parser = IdmlParser::open(path)?;
    parser.parse()
}

/// Parse an IDML file with custom options.
///
/// # Example
///
/// ```no_run
/// use unidml::{parse_file_with_options, ParseOptions};
///
/// let options = ParseOptions::new()
///     .with_dpi(144.0)
///     .structure_only();
/// let doc = parse_file_with_options("brochure.idml", options).unwrap();
/// ```
pub fn parse_file_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<DocumentModel> {
    let parser = IdmlParser::open_with_options(path, options)?;
    parser.parse()
}

/// Parse an IDML package from bytes.
///
/// # Example
///
/// ```no_run
/// use unidml::parse_bytes;
///
/// let data = std::fs::read("brochure.idml").unwrap();
/// let doc = parse_bytes(&data).unwrap();
/// ```
pub fn parse_bytes(data: &[u8]) -> Result<DocumentModel> {
    let parser = IdmlParser::from_bytes(data)?;
    parser.parse()
}

/// Parse an IDML package from bytes with custom options.
pub fn parse_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<DocumentModel> {
    let parser = IdmlParser::from_bytes_with_options(data, options)?;
    parser.parse()
}

/// Parse an IDML package from a reader.
pub fn parse_reader<R: Read>(reader: R) -> Result<DocumentModel> {
    let parser = IdmlParser::from_reader(reader)?;
    parser.parse()
}

/// Parse an IDML package from a reader with custom options.
pub fn parse_reader_with_options<R: Read>(reader: R, options: ParseOptions) -> Result<DocumentModel> {
    let parser = IdmlParser::from_reader_with_options(reader, options)?;
    parser.parse()
}

/// Build a document model from package files that were already read.
///
/// Use this when the package comes from somewhere other than a zip file,
/// for example trees built with [`PackageContents::from_json`].
pub fn parse_package(package: PackageContents, options: ParseOptions) -> Result<DocumentModel> {
    IdmlParser::from_package(package, options).parse()
}

/// Parse many IDML files.
///
/// Each file gets its own independent pipeline. Files are parsed in
/// parallel unless `options.parallel` is off; results keep input order.
pub fn parse_files<P>(paths: &[P], options: &ParseOptions) -> Vec<(PathBuf, Result<DocumentModel>)>
where
    P: AsRef<Path> + Sync,
{
    let parse_one = |path: &P| {
        let path = path.as_ref();
        (path.to_path_buf(), parse_file_with_options(path, options.clone()))
    };

    if options.parallel {
        paths.par_iter().map(parse_one).collect()
    } else {
        paths.iter().map(parse_one).collect()
    }
}

/// Parse an IDML file, reading it asynchronously.
///
/// The archive is read with `tokio::fs`; parsing then runs on a blocking
/// thread.
#[cfg(feature = "async")]
pub async fn parse_file_async<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<DocumentModel> {
    let data = tokio::fs::read(path.as_ref()).await?;
    tokio::task::spawn_blocking(move || parse_bytes_with_options(&data, options))
        .await
        .map_err(|e| Error::Other(format!("parse task failed: {}", e)))?
}

/// Extract plain text from an IDML file, in page order.
///
/// # Example
///
/// ```no_run
/// use unidml::extract_text;
///
/// let text = extract_text("brochure.idml").unwrap();
/// println!("{}", text);
/// ```
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let doc = parse_file(path)?;
    render::to_text(&doc, &RenderOptions::default())
}

/// Convert an IDML file to plain text with custom options.
pub fn to_text<P: AsRef<Path>>(path: P, options: &RenderOptions) -> Result<String> {
    let doc = parse_file(path)?;
    render::to_text(&doc, options)
}

/// Convert an IDML file to its JSON document model.
///
/// # Example
///
/// ```no_run
/// use unidml::{to_json, JsonFormat};
///
/// let json = to_json("brochure.idml", JsonFormat::Pretty).unwrap();
/// std::fs::write("brochure.json", json).unwrap();
/// ```
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let doc = parse_file(path)?;
    render::to_json(&doc, format)
}

/// Builder for parsing and rendering IDML documents.
///
/// # Example
///
/// ```no_run
/// use unidml::Unidml;
///
/// let json = Unidml::new()
///     .with_dpi(72.0)
///     .without_diagnostics()
///     .parse("brochure.idml")?
///     .to_json()?;
/// # Ok::<(), unidml::Error>(())
/// ```
pub struct Unidml {
    parse_options: ParseOptions,
    render_options: RenderOptions,
}

impl Unidml {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            parse_options: ParseOptions::default(),
            render_options: RenderOptions::default(),
        }
    }

    /// Fail on malformed XML files instead of skipping them.
    pub fn strict(mut self) -> Self {
        self.parse_options = self.parse_options.strict();
        self
    }

    /// Skip malformed XML files (default).
    pub fn lenient(mut self) -> Self {
        self.parse_options = self.parse_options.lenient();
        self
    }

    /// Extract structure and geometry only.
    pub fn structure_only(mut self) -> Self {
        self.parse_options = self.parse_options.structure_only();
        self
    }

    /// Disable parallel batch processing.
    pub fn sequential(mut self) -> Self {
        self.parse_options = self.parse_options.sequential();
        self
    }

    /// Set the output DPI.
    pub fn with_dpi(mut self, dpi: f64) -> Self {
        self.parse_options = self.parse_options.with_dpi(dpi);
        self
    }

    /// Set the formatting defaults.
    pub fn with_defaults(mut self, defaults: FormattingDefaults) -> Self {
        self.parse_options = self.parse_options.with_defaults(defaults);
        self
    }

    /// Set page selection for rendering.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.render_options = self.render_options.with_pages(pages);
        self
    }

    /// Set the JSON layout.
    pub fn with_json_format(mut self, format: JsonFormat) -> Self {
        self.render_options = self.render_options.with_json_format(format);
        self
    }

    /// Omit diagnostics from JSON output.
    pub fn without_diagnostics(mut self) -> Self {
        self.render_options = self.render_options.with_diagnostics(false);
        self
    }

    /// Parse an IDML file.
    pub fn parse<P: AsRef<Path>>(self, path: P) -> Result<UnidmlResult> {
        let parser = IdmlParser::open_with_options(path, self.parse_options)?;
        let document = parser.parse()?;
        Ok(UnidmlResult {
            document,
            render_options: self.render_options,
        })
    }

    /// Parse an IDML package from bytes.
    pub fn parse_bytes(self, data: &[u8]) -> Result<UnidmlResult> {
        let parser = IdmlParser::from_bytes_with_options(data, self.parse_options)?;
        let document = parser.parse()?;
        Ok(UnidmlResult {
            document,
            render_options: self.render_options,
        })
    }
}

impl Default for Unidml {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of parsing an IDML document.
pub struct UnidmlResult {
    /// The parsed document
    pub document: DocumentModel,
    /// Render options to use
    render_options: RenderOptions,
}

impl UnidmlResult {
    /// Convert to JSON.
    pub fn to_json(&self) -> Result<String> {
        render::to_json_with_options(&self.document, &self.render_options)
    }

    /// Convert to plain text in page order.
    pub fn to_text(&self) -> Result<String> {
        render::to_text(&self.document, &self.render_options)
    }

    /// Extraction statistics.
    pub fn stats(&self) -> ExtractionStats {
        ExtractionStats::from_document(&self.document)
    }

    /// Recovered problems.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.document.diagnostics
    }

    /// Get the document.
    pub fn document(&self) -> &DocumentModel {
        &self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unidml_builder() {
        let builder = Unidml::new().strict().with_dpi(72.0).without_diagnostics();
        assert_eq!(builder.parse_options.error_mode, ErrorMode::Strict);
        assert_eq!(builder.parse_options.dpi, 72.0);
        assert!(!builder.render_options.include_diagnostics);
    }

    #[test]
    fn test_unidml_builder_default() {
        let builder = Unidml::default();
        assert_eq!(builder.parse_options.error_mode, ErrorMode::Lenient);
        assert!(builder.render_options.include_diagnostics);
    }

    #[test]
    fn test_unidml_builder_structure_only() {
        let builder = Unidml::new().structure_only().sequential();
        assert_eq!(builder.parse_options.extract_mode, ExtractMode::StructureOnly);
        assert!(!builder.parse_options.parallel);
    }

    #[test]
    fn test_unidml_builder_with_pages() {
        let builder = Unidml::new().with_pages(PageSelection::Range(1..=5));
        assert_eq!(builder.render_options.page_selection, PageSelection::Range(1..=5));
    }

    // ==================== Edge Case Tests ====================

    #[test]
    fn test_parse_bytes_empty_data() {
        let result = parse_bytes(&[]);
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_parse_bytes_unknown_magic() {
        let data = [0xFF, 0xFE, 0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
        assert!(parse_bytes(&data).is_err());
    }

    #[test]
    fn test_builder_parse_invalid_bytes() {
        let result = Unidml::new().parse_bytes(b"not an idml package");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_files_missing_paths() {
        let paths = ["missing-a.idml", "missing-b.idml"];
        for options in [ParseOptions::default(), ParseOptions::new().sequential()] {
            let results = parse_files(&paths, &options);
            assert_eq!(results.len(), 2);
            assert_eq!(results[0].0, PathBuf::from("missing-a.idml"));
            assert!(results.iter().all(|(_, r)| matches!(r, Err(Error::Io(_)))));
        }
    }
}
