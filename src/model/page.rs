//! Page and spread types.

use super::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Page margins and column setup, in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    /// Top margin
    pub top: f64,
    /// Bottom margin
    pub bottom: f64,
    /// Left (inside) margin
    pub left: f64,
    /// Right (outside) margin
    pub right: f64,
    /// Number of text columns
    pub column_count: u32,
    /// Gap between columns
    pub column_gutter: f64,
}

/// A single page in the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Page id (`Self` attribute)
    pub id: String,

    /// Folio label (e.g. "1", "iv", "A")
    pub name: String,

    /// Zero-based position in the document
    pub index: usize,

    /// Id of the spread that holds this page
    pub spread_id: String,

    /// Page rectangle in spread coordinates, pixels
    pub bounds: Rect,

    /// Page origin in element space, pixels
    pub origin: Point,

    /// Page width in pixels
    pub width: f64,

    /// Page height in pixels
    pub height: f64,

    /// Margins and columns
    pub margins: Margins,

    /// Applied master spread id, if any
    pub applied_master: Option<String>,

    /// Background color as `#RRGGBB`
    pub background_color: String,
}

impl Page {
    /// Create a new page with the given spread-space bounds.
    pub fn new(id: impl Into<String>, spread_id: impl Into<String>, bounds: Rect) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            index: 0,
            spread_id: spread_id.into(),
            bounds,
            origin: Point::new(bounds.x, bounds.y),
            width: bounds.width,
            height: bounds.height,
            margins: Margins::default(),
            applied_master: None,
            background_color: "#FFFFFF".to_string(),
        }
    }

    /// The page rectangle in element space.
    pub fn element_rect(&self) -> Rect {
        Rect::new(self.origin.x, self.origin.y, self.width, self.height)
    }

    /// Check if the page is in landscape orientation.
    pub fn is_landscape(&self) -> bool {
        self.width > self.height
    }
}

/// A layout surface grouping one or more pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spread {
    /// Spread id
    pub id: String,

    /// Package path the spread was read from
    pub source: String,

    /// Page ids in order
    pub page_ids: Vec<String>,

    /// Background color as `#RRGGBB`
    pub background_color: String,

    /// Whether this is a master spread
    pub is_master: bool,

    /// Master name prefix (e.g. "A")
    pub name_prefix: Option<String>,

    /// Master base name (e.g. "Master")
    pub base_name: Option<String>,
}

impl Spread {
    /// Create a new document spread.
    pub fn new(id: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            page_ids: Vec::new(),
            background_color: "#FFFFFF".to_string(),
            is_master: false,
            name_prefix: None,
            base_name: None,
        }
    }

    /// Number of pages on the spread.
    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Display name of a master spread (`A-Master`).
    pub fn master_name(&self) -> Option<String> {
        match (&self.name_prefix, &self.base_name) {
            (Some(prefix), Some(base)) => Some(format!("{}-{}", prefix, base)),
            (Some(prefix), None) => Some(prefix.clone()),
            (None, Some(base)) => Some(base.clone()),
            (None, None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_new() {
        let page = Page::new("p1", "s1", Rect::new(-816.0, 0.0, 816.0, 1056.0));
        assert_eq!(page.width, 816.0);
        assert_eq!(page.origin, Point::new(-816.0, 0.0));
        assert_eq!(page.background_color, "#FFFFFF");
        assert!(!page.is_landscape());
    }

    #[test]
    fn test_master_name() {
        let mut spread = Spread::new("m1", "MasterSpreads/MasterSpread_m1.xml");
        spread.is_master = true;
        spread.name_prefix = Some("A".into());
        spread.base_name = Some("Master".into());
        assert_eq!(spread.master_name().as_deref(), Some("A-Master"));
    }
}
