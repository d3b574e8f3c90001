//! Resource catalog: styles, colors, and fonts.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::Alignment;

/// Kind of text style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleKind {
    /// Paragraph style
    Paragraph,
    /// Character style
    Character,
}

impl StyleKind {
    /// Id prefix of styles of this kind.
    pub fn prefix(self) -> &'static str {
        match self {
            StyleKind::Paragraph => "ParagraphStyle/",
            StyleKind::Character => "CharacterStyle/",
        }
    }
}

/// Leading value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Leading {
    /// Proportional to the font size
    Auto,
    /// Fixed, in points
    Points(f64),
}

/// A partial set of formatting attributes. `None` means "not specified".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormattingAttributes {
    /// Font family (`AppliedFont`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,

    /// Font style (`FontStyle`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_style: Option<String>,

    /// Point size
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,

    /// Leading
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leading: Option<Leading>,

    /// Tracking
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking: Option<f64>,

    /// Fill color reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,

    /// Stroke color reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<String>,

    /// Alignment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment: Option<Alignment>,

    /// Left indent in points
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_indent: Option<f64>,

    /// Right indent in points
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_indent: Option<f64>,

    /// First line indent in points
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_line_indent: Option<f64>,

    /// Space before in points
    #[serde(skip_serializing_if = "Option::is_none")]
    pub space_before: Option<f64>,

    /// Space after in points
    #[serde(skip_serializing_if = "Option::is_none")]
    pub space_after: Option<f64>,

    /// Underline
    #[serde(skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,

    /// Strike-through
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strike_through: Option<bool>,

    /// Capitalization
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capitalization: Option<String>,

    /// Position (superscript, subscript, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
}

impl FormattingAttributes {
    /// Create an empty attribute set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite every attribute that `other` specifies.
    pub fn overlay(&mut self, other: &FormattingAttributes) {
        fn take<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
            if value.is_some() {
                slot.clone_from(value);
            }
        }
        take(&mut self.font_family, &other.font_family);
        take(&mut self.font_style, &other.font_style);
        take(&mut self.font_size, &other.font_size);
        take(&mut self.leading, &other.leading);
        take(&mut self.tracking, &other.tracking);
        take(&mut self.fill_color, &other.fill_color);
        take(&mut self.stroke_color, &other.stroke_color);
        take(&mut self.alignment, &other.alignment);
        take(&mut self.left_indent, &other.left_indent);
        take(&mut self.right_indent, &other.right_indent);
        take(&mut self.first_line_indent, &other.first_line_indent);
        take(&mut self.space_before, &other.space_before);
        take(&mut self.space_after, &other.space_after);
        take(&mut self.underline, &other.underline);
        take(&mut self.strike_through, &other.strike_through);
        take(&mut self.capitalization, &other.capitalization);
        take(&mut self.position, &other.position);
    }

    /// Builder: font size.
    pub fn with_font_size(mut self, size: f64) -> Self {
        self.font_size = Some(size);
        self
    }

    /// Builder: font family.
    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = Some(family.into());
        self
    }

    /// Builder: fill color reference.
    pub fn with_fill_color(mut self, color: impl Into<String>) -> Self {
        self.fill_color = Some(color.into());
        self
    }

    /// Whether nothing is specified.
    pub fn is_empty(&self) -> bool {
        *self == FormattingAttributes::default()
    }
}

/// A paragraph or character style.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleDefinition {
    /// Style id (`ParagraphStyle/Body`)
    pub id: String,

    /// Display name
    pub name: String,

    /// Paragraph or character
    pub kind: StyleKind,

    /// Parent style id, with its kind prefix
    pub based_on: Option<String>,

    /// Names of the enclosing style groups, outermost first
    pub group_path: Vec<String>,

    /// Attributes set on the style itself
    pub attributes: FormattingAttributes,

    /// Attributes after applying the `basedOn` chain
    pub resolved: FormattingAttributes,
}

impl StyleDefinition {
    /// Create a style with no attributes.
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: StyleKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            based_on: None,
            group_path: Vec::new(),
            attributes: FormattingAttributes::default(),
            resolved: FormattingAttributes::default(),
        }
    }

    /// Builder: parent style.
    pub fn based_on(mut self, parent: impl Into<String>) -> Self {
        self.based_on = Some(parent.into());
        self
    }

    /// Builder: own attributes.
    pub fn with_attributes(mut self, attributes: FormattingAttributes) -> Self {
        self.attributes = attributes;
        self
    }
}

/// Color space of a color definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorSpace {
    /// Red, green, blue (0-255)
    Rgb,
    /// Cyan, magenta, yellow, black (0-100)
    Cmyk,
    /// CIE L*a*b*
    Lab,
    /// Named or tint swatch without own components
    Named,
}

/// Ink model of a color definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorModel {
    /// Process color
    Process,
    /// Spot color
    Spot,
    /// Registration color
    Registration,
    /// Mixed ink or unknown
    Other,
}

impl ColorModel {
    /// Map a `Model` attribute value.
    pub fn parse(value: &str) -> ColorModel {
        match value {
            "Process" => ColorModel::Process,
            "Spot" => ColorModel::Spot,
            "Registration" => ColorModel::Registration,
            _ => ColorModel::Other,
        }
    }
}

/// A color, tint, or swatch definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorDefinition {
    /// Swatch id (`Color/Red`, `Tint/...`)
    pub id: String,

    /// Swatch name
    pub name: String,

    /// Authoritative color space
    pub space: ColorSpace,

    /// Components in `space`
    pub values: Vec<f64>,

    /// Ink model
    pub model: ColorModel,

    /// Base color of a tint swatch
    pub base_color: Option<String>,

    /// Tint percentage of a tint swatch
    pub tint: Option<f64>,

    /// Whether black is the intended value
    pub intentional_black: bool,

    /// Resolved value as `#RRGGBB`, or `None` for "no color"
    pub hex: Option<String>,
}

impl ColorDefinition {
    /// Create a color definition.
    pub fn new(id: impl Into<String>, name: impl Into<String>, space: ColorSpace, values: Vec<f64>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            space,
            values,
            model: ColorModel::Process,
            base_color: None,
            tint: None,
            intentional_black: false,
            hex: None,
        }
    }

    /// Whether this is a tint swatch.
    pub fn is_tint(&self) -> bool {
        self.base_color.is_some()
    }
}

/// One font of a family.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FontRecord {
    /// Full font name
    pub full_name: String,
    /// PostScript name
    pub postscript_name: Option<String>,
    /// Style name (e.g. "Bold")
    pub font_style: Option<String>,
    /// Font technology (e.g. "OpenTypeCFF")
    pub font_type: Option<String>,
    /// Install status (e.g. "Installed", "NotAvailable")
    pub status: Option<String>,
}

/// A font family and its member fonts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FontFamily {
    /// Family id
    pub id: String,
    /// Family name
    pub name: String,
    /// Member fonts
    pub fonts: Vec<FontRecord>,
}

/// Styles, colors, and fonts of a document.
///
/// Built once per document and read-only afterward.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceCatalog {
    /// Paragraph styles by id
    pub paragraph_styles: IndexMap<String, StyleDefinition>,

    /// Character styles by id
    pub character_styles: IndexMap<String, StyleDefinition>,

    /// Colors, tints, and swatches by id
    pub colors: IndexMap<String, ColorDefinition>,

    /// Font families by name
    pub fonts: IndexMap<String, FontFamily>,

    /// Document-level defaults from the root paragraph style
    pub document_defaults: FormattingAttributes,
}

impl ResourceCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a style by kind and id.
    pub fn style(&self, kind: StyleKind, id: &str) -> Option<&StyleDefinition> {
        match kind {
            StyleKind::Paragraph => self.paragraph_styles.get(id),
            StyleKind::Character => self.character_styles.get(id),
        }
    }

    /// Look up a paragraph style.
    pub fn paragraph_style(&self, id: &str) -> Option<&StyleDefinition> {
        self.paragraph_styles.get(id)
    }

    /// Look up a character style.
    pub fn character_style(&self, id: &str) -> Option<&StyleDefinition> {
        self.character_styles.get(id)
    }

    /// Look up a color definition.
    pub fn color(&self, id: &str) -> Option<&ColorDefinition> {
        self.colors.get(id)
    }

    /// Look up a font family by name.
    pub fn font_family(&self, name: &str) -> Option<&FontFamily> {
        self.fonts.get(name)
    }

    /// Total number of styles.
    pub fn style_count(&self) -> usize {
        self.paragraph_styles.len() + self.character_styles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay() {
        let mut base = FormattingAttributes::new()
            .with_font_size(10.0)
            .with_font_family("Minion Pro");
        let top = FormattingAttributes::new().with_font_size(12.0);
        base.overlay(&top);
        assert_eq!(base.font_size, Some(12.0));
        assert_eq!(base.font_family.as_deref(), Some("Minion Pro"));
    }

    #[test]
    fn test_is_empty() {
        assert!(FormattingAttributes::new().is_empty());
        assert!(!FormattingAttributes::new().with_fill_color("Color/Black").is_empty());
    }

    #[test]
    fn test_catalog_lookup() {
        let mut catalog = ResourceCatalog::new();
        catalog.paragraph_styles.insert(
            "ParagraphStyle/Body".into(),
            StyleDefinition::new("ParagraphStyle/Body", "Body", StyleKind::Paragraph),
        );
        assert!(catalog.style(StyleKind::Paragraph, "ParagraphStyle/Body").is_some());
        assert!(catalog.style(StyleKind::Character, "ParagraphStyle/Body").is_none());
        assert_eq!(catalog.style_count(), 1);
    }
}
