//! Document-level types.

use super::{Element, Page, Point, ResourceCatalog, Spread, Story};
use crate::error::Diagnostic;
use crate::units::Unit;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A parsed IDML document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentModel {
    /// Document metadata
    pub metadata: Metadata,

    /// Styles, colors, and fonts
    pub resources: ResourceCatalog,

    /// Document spreads in order
    pub spreads: Vec<Spread>,

    /// Pages in document order
    pub pages: Vec<Page>,

    /// Master spreads
    pub master_spreads: Vec<Spread>,

    /// Pages of the master spreads
    pub master_pages: Vec<Page>,

    /// Elements by id, in source order
    pub elements: IndexMap<String, Element>,

    /// Stories by id, in document order
    pub stories: IndexMap<String, Story>,

    /// Page id → element ids, in page order
    pub page_index: IndexMap<String, Vec<String>>,

    /// Spread space → element space translation, pixels
    pub coordinate_offset: Point,

    /// DPI used for pixel values
    pub dpi: f64,

    /// Recovered problems
    pub diagnostics: Vec<Diagnostic>,
}

impl DocumentModel {
    /// Create a new empty document.
    pub fn new(dpi: f64) -> Self {
        Self {
            metadata: Metadata::default(),
            resources: ResourceCatalog::default(),
            spreads: Vec::new(),
            pages: Vec::new(),
            master_spreads: Vec::new(),
            master_pages: Vec::new(),
            elements: IndexMap::new(),
            stories: IndexMap::new(),
            page_index: IndexMap::new(),
            coordinate_offset: Point::default(),
            dpi,
            diagnostics: Vec::new(),
        }
    }

    /// Get the number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Get a page by number (1-indexed).
    pub fn get_page(&self, page_num: usize) -> Option<&Page> {
        if page_num == 0 {
            return None;
        }
        self.pages.get(page_num - 1)
    }

    /// Get a page by id.
    pub fn page(&self, id: &str) -> Option<&Page> {
        self.pages.iter().find(|p| p.id == id)
    }

    /// Get an element by id.
    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.get(id)
    }

    /// Get a story by id.
    pub fn story(&self, id: &str) -> Option<&Story> {
        self.stories.get(id)
    }

    /// Elements on a page, in source order.
    pub fn elements_on_page(&self, page_id: &str) -> Vec<&Element> {
        self.page_index
            .get(page_id)
            .map(|ids| ids.iter().filter_map(|id| self.elements.get(id)).collect())
            .unwrap_or_default()
    }

    /// Check if the document has any pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Plain text of every story, in document order.
    pub fn plain_text(&self) -> String {
        self.stories
            .values()
            .filter(|s| !s.is_empty())
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl Default for DocumentModel {
    fn default() -> Self {
        Self::new(crate::units::DEFAULT_DPI)
    }
}

/// Document metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// DOM version of the package (e.g. "18.0")
    pub dom_version: Option<String>,

    /// Document name from the designmap
    pub name: Option<String>,

    /// XMP title
    pub title: Option<String>,

    /// XMP creator
    pub creator: Option<String>,

    /// Application that wrote the file
    pub creator_tool: Option<String>,

    /// Creation date
    pub created: Option<DateTime<Utc>>,

    /// Last modification date
    pub modified: Option<DateTime<Utc>>,

    /// Horizontal measurement unit of the document
    pub measurement_unit: Unit,

    /// Whether pages are laid out as facing pairs
    pub facing_pages: bool,

    /// Total number of pages
    pub page_count: usize,

    /// Total number of spreads
    pub spread_count: usize,

    /// Total number of stories
    pub story_count: usize,

    /// Total number of elements
    pub element_count: usize,
}

impl Metadata {
    /// Short human-readable summary.
    pub fn summary(&self) -> String {
        let name = self
            .title
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or("untitled");
        format!(
            "{}: {} page(s), {} spread(s), {} stor{}, {} element(s)",
            name,
            self.page_count,
            self.spread_count,
            self.story_count,
            if self.story_count == 1 { "y" } else { "ies" },
            self.element_count
        )
    }
}
