//! Rendering result with metadata and statistics.

use serde::{Deserialize, Serialize};

use crate::model::{DocumentModel, ElementKind, Metadata};

/// Result of rendering a document, including content and statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderResult {
    /// The rendered content (JSON or text)
    pub content: String,

    /// Document metadata (copied from source document)
    pub metadata: Metadata,

    /// Extraction statistics
    pub stats: ExtractionStats,
}

impl RenderResult {
    /// Create a new render result.
    pub fn new(content: String, metadata: Metadata, stats: ExtractionStats) -> Self {
        Self {
            content,
            metadata,
            stats,
        }
    }

    /// Get the content length in bytes.
    pub fn content_len(&self) -> usize {
        self.content.len()
    }
}

/// Statistics about what was extracted from a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Number of document pages
    pub page_count: u32,

    /// Number of document spreads
    pub spread_count: u32,

    /// Number of master spreads
    pub master_spread_count: u32,

    /// Number of page items
    pub element_count: u32,

    /// Number of text frames
    pub text_frame_count: u32,

    /// Number of frames holding a placed graphic
    pub image_count: u32,

    /// Number of groups
    pub group_count: u32,

    /// Number of stories
    pub story_count: u32,

    /// Number of paragraph and character styles
    pub style_count: u32,

    /// Number of color swatches
    pub color_count: u32,

    /// Total words across stories
    pub word_count: u32,

    /// Total characters across stories
    pub char_count: u32,

    /// Total paragraphs across stories
    pub paragraph_count: u32,

    /// Total line breaks across stories
    pub line_break_count: u32,

    /// Number of recovered problems
    pub diagnostic_count: u32,
}

impl ExtractionStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect statistics from a parsed document.
    pub fn from_document(doc: &DocumentModel) -> Self {
        let mut stats = Self {
            page_count: doc.pages.len() as u32,
            spread_count: doc.spreads.len() as u32,
            master_spread_count: doc.master_spreads.len() as u32,
            element_count: doc.elements.len() as u32,
            story_count: doc.stories.len() as u32,
            style_count: doc.resources.style_count() as u32,
            color_count: doc.resources.colors.len() as u32,
            diagnostic_count: doc.diagnostics.len() as u32,
            ..Self::default()
        };

        for element in doc.elements.values() {
            match element.kind {
                ElementKind::TextFrame => stats.text_frame_count += 1,
                ElementKind::Group => stats.group_count += 1,
                _ => {}
            }
            if element.image_uri.is_some() {
                stats.image_count += 1;
            }
        }

        for story in doc.stories.values() {
            stats.word_count += story.word_count as u32;
            stats.char_count += story.char_count as u32;
            stats.paragraph_count += story.paragraph_count as u32;
            stats.line_break_count += story.line_breaks.total() as u32;
        }
        stats
    }

    /// Merge another stats instance into this one.
    pub fn merge(&mut self, other: &ExtractionStats) {
        self.page_count += other.page_count;
        self.spread_count += other.spread_count;
        self.master_spread_count += other.master_spread_count;
        self.element_count += other.element_count;
        self.text_frame_count += other.text_frame_count;
        self.image_count += other.image_count;
        self.group_count += other.group_count;
        self.story_count += other.story_count;
        self.style_count += other.style_count;
        self.color_count += other.color_count;
        self.word_count += other.word_count;
        self.char_count += other.char_count;
        self.paragraph_count += other.paragraph_count;
        self.line_break_count += other.line_break_count;
        self.diagnostic_count += other.diagnostic_count;
    }
}
