//! Rendering options and configuration.

use std::ops::RangeInclusive;

use super::JsonFormat;

/// Options for rendering a document model.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// JSON layout
    pub json_format: JsonFormat,

    /// Pages to render (1-indexed)
    pub page_selection: PageSelection,

    /// Include recovered diagnostics in JSON output
    pub include_diagnostics: bool,

    /// Include the resource catalog in JSON output
    pub include_resources: bool,

    /// Separator between stories in text output
    pub story_separator: String,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the JSON layout.
    pub fn with_json_format(mut self, format: JsonFormat) -> Self {
        self.json_format = format;
        self
    }

    /// Compact JSON.
    pub fn compact(mut self) -> Self {
        self.json_format = JsonFormat::Compact;
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, selection: PageSelection) -> Self {
        self.page_selection = selection;
        self
    }

    /// Set specific page range.
    pub fn with_page_range(mut self, range: RangeInclusive<u32>) -> Self {
        self.page_selection = PageSelection::Range(range);
        self
    }

    /// Set specific pages.
    pub fn with_page_list(mut self, pages: Vec<u32>) -> Self {
        self.page_selection = PageSelection::Pages(pages);
        self
    }

    /// Include or omit diagnostics.
    pub fn with_diagnostics(mut self, include: bool) -> Self {
        self.include_diagnostics = include;
        self
    }

    /// Include or omit the resource catalog.
    pub fn with_resources(mut self, include: bool) -> Self {
        self.include_resources = include;
        self
    }

    /// Set the separator placed between stories in text output.
    pub fn with_story_separator(mut self, separator: impl Into<String>) -> Self {
        self.story_separator = separator.into();
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            json_format: JsonFormat::Pretty,
            page_selection: PageSelection::All,
            include_diagnostics: true,
            include_resources: true,
            story_separator: "\n\n".to_string(),
        }
    }
}

/// Page selection for rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageSelection {
    /// Render all pages
    #[default]
    All,
    /// Render a range of pages (inclusive, 1-indexed)
    Range(RangeInclusive<u32>),
    /// Render specific pages (1-indexed)
    Pages(Vec<u32>),
}

impl PageSelection {
    /// Check if a page number should be included.
    pub fn includes(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Range(range) => range.contains(&page),
            PageSelection::Pages(pages) => pages.contains(&page),
        }
    }

    /// Whether every page is selected.
    pub fn is_all(&self) -> bool {
        matches!(self, PageSelection::All)
    }

    /// Parse a page selection string (e.g., "1-10", "1,3,5,7-10").
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();

        if s.is_empty() || s == "all" {
            return Ok(PageSelection::All);
        }

        let number = |part: &str| -> Result<u32, String> {
            match part.trim().parse::<u32>() {
                Ok(0) | Err(_) => Err(format!("Invalid page number: {}", part.trim())),
                Ok(n) => Ok(n),
            }
        };

        if let Some((start, end)) = s.split_once('-') {
            if !start.contains(',') && !end.contains(',') {
                let (start, end) = (number(start)?, number(end)?);
                if start > end {
                    return Err(format!("Invalid page range: {}", s));
                }
                return Ok(PageSelection::Range(start..=end));
            }
        }

        let mut pages = Vec::new();
        for part in s.split(',') {
            match part.split_once('-') {
                Some((start, end)) => pages.extend(number(start)?..=number(end)?),
                None => pages.push(number(part)?),
            }
        }
        pages.sort_unstable();
        pages.dedup();
        Ok(PageSelection::Pages(pages))
    }
}
