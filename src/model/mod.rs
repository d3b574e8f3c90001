//! Document model types for IDML content representation.
//!
//! The model is the sole output of the parsing pipeline: pages and spreads,
//! positioned elements, reconstructed stories, and the resource catalog.
//! Every type serializes with serde.

mod document;
mod element;
mod geometry;
mod page;
mod resource;
mod story;

pub use document::{DocumentModel, Metadata};
pub use element::{AssignmentStrategy, Element, ElementKind, Geometry};
pub use geometry::{Point, Rect, Transform};
pub use page::{Margins, Page, Spread};
pub use resource::{
    ColorDefinition, ColorModel, ColorSpace, FontFamily, FontRecord, FormattingAttributes,
    Leading, ResourceCatalog, StyleDefinition, StyleKind,
};
pub use story::{Alignment, BreakType, FormattedRun, LineBreakStats, ResolvedFormatting, Story};
