//! Rendering module for converting document models to output formats.

mod json;
mod options;
mod result;
mod text;

pub use json::{to_json, to_json_with_options, JsonFormat};
pub use options::{PageSelection, RenderOptions};
pub use result::{ExtractionStats, RenderResult};
pub use text::to_text;
