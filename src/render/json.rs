//! JSON rendering for IDML documents.

use std::collections::HashSet;

use crate::error::Result;
use crate::model::{DocumentModel, ResourceCatalog};

use super::RenderOptions;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert a document to JSON.
pub fn to_json(doc: &DocumentModel, format: JsonFormat) -> Result<String> {
    let json = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(doc)?,
        JsonFormat::Compact => serde_json::to_string(doc)?,
    };
    Ok(json)
}

/// Convert a document to JSON, honoring page selection and omissions.
pub fn to_json_with_options(doc: &DocumentModel, options: &RenderOptions) -> Result<String> {
    if options.page_selection.is_all() && options.include_diagnostics && options.include_resources {
        return to_json(doc, options.json_format);
    }
    to_json(&select(doc, options), options.json_format)
}

/// Copy of the document restricted to the selected pages.
///
/// Elements and stories are kept when they sit on a selected page; spreads
/// are kept when any of their pages is.
fn select(doc: &DocumentModel, options: &RenderOptions) -> DocumentModel {
    let mut selected = doc.clone();
    if !options.include_diagnostics {
        selected.diagnostics.clear();
    }
    if !options.include_resources {
        selected.resources = ResourceCatalog::default();
    }
    if options.page_selection.is_all() {
        return selected;
    }

    selected
        .pages
        .retain(|page| options.page_selection.includes(page.index as u32 + 1));
    let page_ids: HashSet<&str> = selected.pages.iter().map(|p| p.id.as_str()).collect();

    selected.page_index.retain(|page, _| page_ids.contains(page.as_str()));
    let element_ids: HashSet<&str> = selected
        .page_index
        .values()
        .flatten()
        .map(String::as_str)
        .collect();
    selected.elements = doc
        .elements
        .iter()
        .filter(|(id, _)| element_ids.contains(id.as_str()))
        .map(|(id, e)| (id.clone(), e.clone()))
        .collect();

    let story_ids: HashSet<&str> = selected
        .elements
        .values()
        .filter_map(|e| e.parent_story_id.as_deref())
        .collect();
    selected.stories = doc
        .stories
        .iter()
        .filter(|(id, _)| story_ids.contains(id.as_str()))
        .map(|(id, s)| (id.clone(), s.clone()))
        .collect();

    selected
        .spreads
        .retain(|spread| spread.page_ids.iter().any(|id| page_ids.contains(id.as_str())));
    selected
}
