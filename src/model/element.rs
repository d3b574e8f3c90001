//! Positioned page items.

use super::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Kind of page item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    /// Frame that displays a story
    TextFrame,
    /// Plain rectangle
    Rectangle,
    /// Ellipse
    Oval,
    /// Polygon or freeform path
    Polygon,
    /// Straight or curved line
    GraphicLine,
    /// Group of page items
    Group,
    /// Interactive button
    Button,
    /// Frame holding a placed graphic
    ContentFrame,
}

impl ElementKind {
    /// Map a page item tag to its kind.
    pub fn from_tag(tag: &str) -> Option<ElementKind> {
        let kind = match tag {
            "TextFrame" => ElementKind::TextFrame,
            "Rectangle" => ElementKind::Rectangle,
            "Oval" => ElementKind::Oval,
            "Polygon" => ElementKind::Polygon,
            "GraphicLine" => ElementKind::GraphicLine,
            "Group" => ElementKind::Group,
            "Button" => ElementKind::Button,
            _ => return None,
        };
        Some(kind)
    }

    /// Whether this kind may hold a placed graphic.
    pub fn can_hold_graphic(self) -> bool {
        matches!(
            self,
            ElementKind::Rectangle | ElementKind::Oval | ElementKind::Polygon
        )
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ElementKind::TextFrame => "text frame",
            ElementKind::Rectangle => "rectangle",
            ElementKind::Oval => "oval",
            ElementKind::Polygon => "polygon",
            ElementKind::GraphicLine => "graphic line",
            ElementKind::Group => "group",
            ElementKind::Button => "button",
            ElementKind::ContentFrame => "content frame",
        };
        f.write_str(name)
    }
}

/// Element placement in pixels, element space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// Left edge of the unrotated box
    pub x: f64,
    /// Top edge of the unrotated box
    pub y: f64,
    /// Unrotated width
    pub width: f64,
    /// Unrotated height
    pub height: f64,
    /// Rotation in degrees
    pub rotation: f64,
    /// Axis-aligned bounds of the transformed shape
    pub bounds: Rect,
}

impl Geometry {
    /// Center of the unrotated box.
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// The unrotated box.
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// Strategy that assigned an element to its page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStrategy {
    /// The element already named a valid page
    Direct,
    /// The element's structural parent is a page
    StructuralParent,
    /// The element's spread has a single page
    SinglePageSpread,
    /// The element's center falls inside the page
    Spatial,
    /// Nothing else matched; first page of the document
    Fallback,
}

/// A positioned page item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Element {
    /// Element id (`Self` attribute)
    pub id: String,

    /// Element kind
    pub kind: ElementKind,

    /// User-visible name, if set
    pub name: Option<String>,

    /// Placement in pixels
    pub geometry: Geometry,

    /// Id of the spread holding the element
    pub spread_id: String,

    /// Id of the structural parent (spread, page, or group)
    pub parent_id: Option<String>,

    /// Layer id
    pub layer_id: Option<String>,

    /// Whether the element is visible
    pub visible: bool,

    /// Fill swatch reference
    pub fill_color_ref: Option<String>,

    /// Stroke swatch reference
    pub stroke_color_ref: Option<String>,

    /// Resolved fill as `#RRGGBB`
    pub fill_color: Option<String>,

    /// Resolved stroke as `#RRGGBB`
    pub stroke_color: Option<String>,

    /// Stroke weight in pixels
    pub stroke_weight: f64,

    /// Applied object style
    pub object_style: Option<String>,

    /// Story displayed by a text frame
    pub parent_story_id: Option<String>,

    /// Previous frame in the text thread
    pub previous_frame_id: Option<String>,

    /// Next frame in the text thread
    pub next_frame_id: Option<String>,

    /// Placed graphic URI of a content frame
    pub image_uri: Option<String>,

    /// Member ids of a group
    pub child_ids: Vec<String>,

    /// Assigned page
    pub page_id: Option<String>,

    /// How the page was assigned
    pub assignment: Option<AssignmentStrategy>,

    /// Top-left relative to the assigned page's origin
    pub page_position: Option<Point>,
}

impl Element {
    /// Create a new element with default attributes.
    pub fn new(id: impl Into<String>, kind: ElementKind, spread_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            name: None,
            geometry: Geometry::default(),
            spread_id: spread_id.into(),
            parent_id: None,
            layer_id: None,
            visible: true,
            fill_color_ref: None,
            stroke_color_ref: None,
            fill_color: None,
            stroke_color: None,
            stroke_weight: 0.0,
            object_style: None,
            parent_story_id: None,
            previous_frame_id: None,
            next_frame_id: None,
            image_uri: None,
            child_ids: Vec::new(),
            page_id: None,
            assignment: None,
            page_position: None,
        }
    }

    /// Builder: set geometry.
    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = geometry;
        self
    }

    /// Builder: set the structural parent.
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Builder: preset the page.
    pub fn with_page(mut self, page_id: impl Into<String>) -> Self {
        self.page_id = Some(page_id.into());
        self
    }

    /// Check if this element displays a story.
    pub fn is_text_frame(&self) -> bool {
        self.kind == ElementKind::TextFrame
    }

    /// Check if this element holds a placed graphic.
    pub fn is_content_frame(&self) -> bool {
        self.kind == ElementKind::ContentFrame
    }
}
