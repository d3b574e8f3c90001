//! Converter for `.idml` packages.

use crate::error::Result;
use crate::model::DocumentModel;
use crate::parser::IdmlParser;
use crate::render::{to_json_with_options, to_text, ExtractionStats};
use std::path::Path;

use super::{ConvertOptions, ConvertResult, DocumentConverter, OutputFormat};

/// Parses a package with [`IdmlParser`] and renders the model in the
/// requested [`OutputFormat`].
#[derive(Debug, Clone, Default)]
pub struct IdmlConverter {
    _private: (),
}

impl IdmlConverter {
    pub fn new() -> Self {
        Self { _private: () }
    }

    fn convert_document(&self, doc: DocumentModel, options: &ConvertOptions) -> Result<ConvertResult> {
        let content = match options.output_format {
            OutputFormat::Json => to_json_with_options(&doc, &options.render)?,
            OutputFormat::Text => to_text(&doc, &options.render)?,
        };

        let mut result = ConvertResult::new(content, doc.metadata.clone())
            .with_mime_type(options.output_format.mime_type())
            .with_diagnostic_count(doc.diagnostics.len());
        if options.collect_stats {
            result = result.with_stats(ExtractionStats::from_document(&doc));
        }
        Ok(result)
    }
}

impl DocumentConverter for IdmlConverter {
    fn supported_extensions(&self) -> &[&str] {
        &["idml"]
    }

    fn name(&self) -> &str {
        "idml"
    }

    fn convert(&self, path: &Path, options: &ConvertOptions) -> Result<ConvertResult> {
        let parser = IdmlParser::open_with_options(path, options.parse.clone())?;
        let doc = parser.parse()?;
        self.convert_document(doc, options)
    }

    fn convert_bytes(&self, bytes: &[u8], options: &ConvertOptions) -> Result<ConvertResult> {
        let parser = IdmlParser::from_bytes_with_options(bytes, options.parse.clone())?;
        let doc = parser.parse()?;
        self.convert_document(doc, options)
    }
}
