//! Plain text rendering for IDML documents.

use std::collections::HashSet;

use crate::error::Result;
use crate::model::DocumentModel;

use super::RenderOptions;

/// Convert a document to plain text in page order.
///
/// A story is written at the page holding its first text frame. Stories
/// with no frame on any page follow at the end when every page is selected.
pub fn to_text(doc: &DocumentModel, options: &RenderOptions) -> Result<String> {
    let mut written: HashSet<&str> = HashSet::new();
    let mut parts: Vec<&str> = Vec::new();

    // Frames already seen on earlier pages, including unselected ones
    for page in &doc.pages {
        let selected = options.page_selection.includes(page.index as u32 + 1);
        for element in doc.elements_on_page(&page.id) {
            let Some(story_id) = element.parent_story_id.as_deref() else {
                continue;
            };
            if !element.is_text_frame() || !written.insert(story_id) || !selected {
                continue;
            }
            if let Some(story) = doc.story(story_id).filter(|s| !s.is_empty()) {
                parts.push(story.text.as_str());
            }
        }
    }

    if options.page_selection.is_all() {
        parts.extend(
            doc.stories
                .values()
                .filter(|s| !s.is_empty() && !written.contains(s.id.as_str()))
                .map(|s| s.text.as_str()),
        );
    }

    Ok(parts.join(&options.story_separator).trim().to_string())
}
