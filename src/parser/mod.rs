//! IDML parsing pipeline.
//!
//! Stages run in order over one [`ParseContext`]: resource catalog,
//! structure, page item geometry, story text, then page association.

pub mod association;
mod context;
pub mod geometry;
mod idml_parser;
mod options;
pub mod resources;
pub mod structure;
pub mod text;

pub use association::{AssociationContext, Strategy, STRATEGIES};
pub use context::ParseContext;
pub use idml_parser::IdmlParser;
pub use options::{ErrorMode, ExtractMode, FormattingDefaults, ParseOptions};
pub use resources::{resolve_formatting, StyleLevel};
pub use structure::Structure;
