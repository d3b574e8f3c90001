//! Stories and formatted runs.

use serde::{Deserialize, Serialize};

/// Paragraph alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    /// Left alignment (default)
    #[default]
    Left,
    /// Center alignment
    Center,
    /// Right alignment
    Right,
    /// Justified alignment
    Justify,
}

impl Alignment {
    /// Map a `Justification` value.
    pub fn from_justification(value: &str) -> Option<Alignment> {
        let alignment = match value {
            "LeftAlign" | "ToBindingSide" | "LeftJustified" => Alignment::Left,
            "CenterAlign" | "CenterJustified" => Alignment::Center,
            "RightAlign" | "AwayFromBindingSide" | "RightJustified" => Alignment::Right,
            "FullyJustified" => Alignment::Justify,
            _ => return None,
        };
        Some(alignment)
    }
}

/// Kind of line break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakType {
    /// A break marker or forced line break in the source
    Explicit,
    /// Inserted between a heading and body text
    Implicit,
    /// Paragraph boundary
    Paragraph,
}

/// Fully resolved formatting of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedFormatting {
    /// Font family
    pub font_family: String,

    /// Font style (e.g. "Bold Italic")
    pub font_style: Option<String>,

    /// Font size in points
    pub font_size: f64,

    /// Leading in points
    pub leading: f64,

    /// Tracking in thousandths of an em
    pub tracking: f64,

    /// Text color as `#RRGGBB`
    pub color: String,

    /// Stroke color as `#RRGGBB`
    pub stroke_color: Option<String>,

    /// Paragraph alignment
    pub alignment: Alignment,

    /// Applied paragraph style id
    pub paragraph_style: Option<String>,

    /// Applied character style id
    pub character_style: Option<String>,

    /// Left indent in points
    pub left_indent: f64,

    /// Right indent in points
    pub right_indent: f64,

    /// First line indent in points
    pub first_line_indent: f64,

    /// Space before the paragraph in points
    pub space_before: f64,

    /// Space after the paragraph in points
    pub space_after: f64,

    /// Underlined text
    pub underline: bool,

    /// Struck-through text
    pub strike_through: bool,

    /// Capitalization (e.g. "AllCaps", "SmallCaps")
    pub capitalization: Option<String>,

    /// Position (e.g. "Superscript", "Subscript")
    pub position: Option<String>,
}

/// A text fragment or break with its formatting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedRun {
    /// Text of the run
    pub text: String,

    /// Resolved formatting snapshot
    pub formatting: ResolvedFormatting,

    /// Whether this run is a line break
    pub is_break: bool,

    /// Kind of break, for break runs
    pub break_type: Option<BreakType>,

    /// Whether this run is an inserted word space
    pub is_space: bool,

    /// Zero-based paragraph index within the story
    pub paragraph_index: usize,
}

impl FormattedRun {
    /// Create a text run.
    pub fn text(text: impl Into<String>, formatting: ResolvedFormatting, paragraph_index: usize) -> Self {
        Self {
            text: text.into(),
            formatting,
            is_break: false,
            break_type: None,
            is_space: false,
            paragraph_index,
        }
    }

    /// Create a break run emitting `\n`.
    pub fn line_break(kind: BreakType, formatting: ResolvedFormatting, paragraph_index: usize) -> Self {
        Self {
            text: "\n".to_string(),
            formatting,
            is_break: true,
            break_type: Some(kind),
            is_space: false,
            paragraph_index,
        }
    }

    /// Create an inserted space run.
    pub fn space(formatting: ResolvedFormatting, paragraph_index: usize) -> Self {
        Self {
            text: " ".to_string(),
            formatting,
            is_break: false,
            break_type: None,
            is_space: true,
            paragraph_index,
        }
    }
}

/// Break counts by type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineBreakStats {
    /// Explicit breaks
    pub explicit: usize,
    /// Implicit breaks
    pub implicit: usize,
    /// Paragraph breaks
    pub paragraph: usize,
}

impl LineBreakStats {
    /// Count one break.
    pub fn record(&mut self, kind: BreakType) {
        match kind {
            BreakType::Explicit => self.explicit += 1,
            BreakType::Implicit => self.implicit += 1,
            BreakType::Paragraph => self.paragraph += 1,
        }
    }

    /// Total breaks.
    pub fn total(&self) -> usize {
        self.explicit + self.implicit + self.paragraph
    }
}

/// A reconstructed story.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Story {
    /// Story id
    pub id: String,

    /// Story title, if set
    pub title: Option<String>,

    /// Package path the story was read from
    pub source: String,

    /// Plain text with newlines preserved
    pub text: String,

    /// Runs in document order
    pub runs: Vec<FormattedRun>,

    /// Whitespace-separated token count
    pub word_count: usize,

    /// Unicode scalar value count
    pub char_count: usize,

    /// Number of paragraphs
    pub paragraph_count: usize,

    /// Break counts
    pub line_breaks: LineBreakStats,

    /// Text frames displaying the story, in thread order
    pub frame_ids: Vec<String>,
}

impl Story {
    /// Create an empty story.
    pub fn new(id: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            ..Default::default()
        }
    }

    /// Check if the story has no visible text.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Runs that carry text (no breaks or inserted spaces).
    pub fn text_runs(&self) -> impl Iterator<Item = &FormattedRun> {
        self.runs.iter().filter(|r| !r.is_break && !r.is_space)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment_from_justification() {
        assert_eq!(Alignment::from_justification("CenterAlign"), Some(Alignment::Center));
        assert_eq!(Alignment::from_justification("FullyJustified"), Some(Alignment::Justify));
        assert_eq!(Alignment::from_justification("Sideways"), None);
    }

    #[test]
    fn test_line_break_stats() {
        let mut stats = LineBreakStats::default();
        stats.record(BreakType::Explicit);
        stats.record(BreakType::Paragraph);
        stats.record(BreakType::Paragraph);
        assert_eq!(stats.paragraph, 2);
        assert_eq!(stats.total(), 3);
    }
}
