//! One-call conversion of layout packages to rendered output.
//!
//! A [`DocumentConverter`] turns a source file, or its bytes, into a
//! [`ConvertResult`]: the document model as JSON or the page-ordered text.
//! [`ConverterRegistry`] picks the converter from the file extension, so a
//! caller holding a path never has to decide which parser applies.
//!
//! ```no_run
//! use std::path::Path;
//! use unidml::convert::{ConvertOptions, ConverterRegistry, OutputFormat};
//!
//! fn main() -> unidml::Result<()> {
//!     let registry = ConverterRegistry::with_defaults();
//!     let options = ConvertOptions::new().with_format(OutputFormat::Text);
//!     let result = registry.convert(Path::new("brochure.idml"), &options)?;
//!     print!("{}", result.content);
//!     Ok(())
//! }
//! ```

mod idml;

pub use idml::IdmlConverter;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::model::Metadata;
use crate::parser::ParseOptions;
use crate::render::{ExtractionStats, RenderOptions};

/// How a package is parsed and what comes out.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Passed to the parser
    pub parse: ParseOptions,

    /// Passed to the renderer
    pub render: RenderOptions,

    /// Count pages, stories and elements into [`ConvertResult::stats`]
    pub collect_stats: bool,

    pub output_format: OutputFormat,
}

impl ConvertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse = options;
        self
    }

    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render = options;
        self
    }

    pub fn with_stats(mut self, collect: bool) -> Self {
        self.collect_stats = collect;
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }
}

/// Rendering target of a conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// The whole document model, serialized
    #[default]
    Json,

    /// Story text, one page after another
    Text,
}

impl OutputFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Json => "application/json",
            OutputFormat::Text => "text/plain",
        }
    }

    /// File extension for writing the output, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Text => "txt",
        }
    }
}

/// Rendered output plus what the parse learned about the source.
#[derive(Debug, Clone)]
pub struct ConvertResult {
    /// JSON or text, per [`ConvertOptions::output_format`]
    pub content: String,

    pub metadata: Metadata,

    /// Present when [`ConvertOptions::collect_stats`] was set
    pub stats: Option<ExtractionStats>,

    /// Recovered problems recorded while parsing
    pub diagnostic_count: usize,

    pub mime_type: &'static str,
}

impl ConvertResult {
    /// A JSON result with no stats or diagnostics.
    pub fn new(content: String, metadata: Metadata) -> Self {
        Self {
            content,
            metadata,
            stats: None,
            diagnostic_count: 0,
            mime_type: OutputFormat::Json.mime_type(),
        }
    }

    pub fn with_stats(mut self, stats: ExtractionStats) -> Self {
        self.stats = Some(stats);
        self
    }

    pub fn with_diagnostic_count(mut self, count: usize) -> Self {
        self.diagnostic_count = count;
        self
    }

    pub fn with_mime_type(mut self, mime_type: &'static str) -> Self {
        self.mime_type = mime_type;
        self
    }

    /// Length of `content` in bytes.
    pub fn content_len(&self) -> usize {
        self.content.len()
    }
}

/// A source format the registry can dispatch to.
pub trait DocumentConverter: Send + Sync {
    /// Lowercase extensions handled, without the dot.
    fn supported_extensions(&self) -> &[&str];

    /// Registry key; matched case-insensitively.
    fn name(&self) -> &str;

    fn convert(&self, path: &Path, options: &ConvertOptions) -> Result<ConvertResult>;

    fn convert_bytes(&self, bytes: &[u8], options: &ConvertOptions) -> Result<ConvertResult>;

    /// Case-insensitive extension check.
    fn supports_extension(&self, ext: &str) -> bool {
        let ext = ext.to_lowercase();
        self.supported_extensions().iter().any(|known| *known == ext)
    }
}

/// Converters keyed by name, with an extension index over them.
///
/// Registering a second converter for an extension takes the extension
/// over; the first converter stays reachable by name.
pub struct ConverterRegistry {
    by_name: IndexMap<String, Arc<dyn DocumentConverter>>,
    by_extension: HashMap<String, String>,
}

impl ConverterRegistry {
    /// A registry with nothing registered.
    pub fn new() -> Self {
        Self {
            by_name: IndexMap::new(),
            by_extension: HashMap::new(),
        }
    }

    /// A registry holding [`IdmlConverter`].
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(IdmlConverter::new()));
        registry
    }

    pub fn register(&mut self, converter: Arc<dyn DocumentConverter>) {
        let name = converter.name().to_lowercase();
        for ext in converter.supported_extensions() {
            self.by_extension.insert(ext.to_lowercase(), name.clone());
        }
        self.by_name.insert(name, converter);
    }

    pub fn get_by_extension(&self, ext: &str) -> Option<Arc<dyn DocumentConverter>> {
        self.by_extension
            .get(&ext.to_lowercase())
            .and_then(|name| self.by_name.get(name))
            .cloned()
    }

    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn DocumentConverter>> {
        self.by_name.get(&name.to_lowercase()).cloned()
    }

    pub fn supports(&self, ext: &str) -> bool {
        self.by_extension.contains_key(&ext.to_lowercase())
    }

    /// Registered extensions in alphabetical order.
    pub fn supported_extensions(&self) -> Vec<&str> {
        let mut extensions: Vec<&str> = self.by_extension.keys().map(String::as_str).collect();
        extensions.sort_unstable();
        extensions
    }

    fn converter_for(&self, ext: &str) -> Result<Arc<dyn DocumentConverter>> {
        self.get_by_extension(ext)
            .ok_or_else(|| Error::Other(format!("no converter registered for .{}", ext)))
    }

    /// Convert a file, choosing the converter by its extension.
    pub fn convert(&self, path: &Path, options: &ConvertOptions) -> Result<ConvertResult> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| Error::Other(format!("{} has no extension", path.display())))?;
        let converter = self.converter_for(ext)?;
        log::debug!("{} → {} converter", path.display(), converter.name());
        converter.convert(path, options)
    }

    /// Convert in-memory bytes; `ext` names the source format.
    pub fn convert_bytes(
        &self,
        bytes: &[u8],
        ext: &str,
        options: &ConvertOptions,
    ) -> Result<ConvertResult> {
        self.converter_for(ext)?.convert_bytes(bytes, options)
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
