//! Resource catalog construction and formatting resolution.
//!
//! Styles come from `Resources/Styles.xml`, colors from
//! `Resources/Graphic.xml`, fonts from `Resources/Fonts.xml`. All styles are
//! resolved through their `basedOn` chains when the catalog is built.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::color::{cmyk_to_rgb, hex_to_rgb, lab_to_rgb, Cmyk, Rgb};
use crate::error::{Diagnostic, DiagnosticKind, Stage};
use crate::model::{
    Alignment, ColorDefinition, ColorModel, ColorSpace, FontFamily, FontRecord,
    FormattingAttributes, Leading, ResolvedFormatting, ResourceCatalog, StyleDefinition,
    StyleKind,
};
use crate::package::{PackageContents, ResourceFile};
use crate::tree::XmlElement;

use super::context::ParseContext;
use super::options::FormattingDefaults;

/// Maximum length of a `basedOn` chain.
pub const MAX_STYLE_DEPTH: usize = 32;

/// Id of the root paragraph style.
pub const ROOT_PARAGRAPH_STYLE: &str = "ParagraphStyle/$ID/[No paragraph style]";

/// Swatch meaning "no color".
pub const NONE_SWATCH: &str = "Swatch/None";

/// Where a resolved color is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorUse {
    /// Text fill; unresolved colors fall back to black
    Text,
    /// Frame or page fill; unresolved colors are transparent
    Background,
}

/// Read formatting attributes from an element and its `Properties` child.
pub fn parse_formatting(element: &XmlElement) -> FormattingAttributes {
    let text = |key: &str| element.property(key).map(|v| v.into_owned());
    let number = |key: &str| element.property(key).and_then(|v| v.trim().parse::<f64>().ok());
    let flag = |key: &str| {
        element.property(key).and_then(|v| match v.as_ref() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        })
    };

    FormattingAttributes {
        font_family: text("AppliedFont").map(|f| f.trim().to_string()).filter(|f| !f.is_empty()),
        font_style: text("FontStyle"),
        font_size: number("PointSize"),
        leading: element.property("Leading").and_then(|v| {
            if v.eq_ignore_ascii_case("auto") {
                Some(Leading::Auto)
            } else {
                v.trim().parse::<f64>().ok().map(Leading::Points)
            }
        }),
        tracking: number("Tracking"),
        fill_color: text("FillColor"),
        stroke_color: text("StrokeColor"),
        alignment: element
            .property("Justification")
            .and_then(|v| Alignment::from_justification(&v)),
        left_indent: number("LeftIndent"),
        right_indent: number("RightIndent"),
        first_line_indent: number("FirstLineIndent"),
        space_before: number("SpaceBefore"),
        space_after: number("SpaceAfter"),
        underline: flag("Underline"),
        strike_through: flag("StrikeThru"),
        capitalization: text("Capitalization"),
        position: text("Position"),
    }
}

/// Prefix a bare style reference with its kind (`$ID/x` → `ParagraphStyle/$ID/x`).
pub fn qualify_style_ref(kind: StyleKind, reference: &str) -> String {
    if reference.starts_with(kind.prefix()) {
        reference.to_string()
    } else {
        format!("{}{}", kind.prefix(), reference)
    }
}

/// Whether a reference names a built-in "no style" placeholder.
fn is_builtin_placeholder(reference: &str) -> bool {
    reference.contains("$ID/[No")
}

/// Build the resource catalog of a package.
pub fn build_catalog(package: &PackageContents, ctx: &mut ParseContext) -> ResourceCatalog {
    let mut catalog = ResourceCatalog::new();

    if let Some(styles) = package.resource(ResourceFile::Styles) {
        for (group, kind) in [
            ("RootParagraphStyleGroup", StyleKind::Paragraph),
            ("RootCharacterStyleGroup", StyleKind::Character),
        ] {
            let target = match kind {
                StyleKind::Paragraph => &mut catalog.paragraph_styles,
                StyleKind::Character => &mut catalog.character_styles,
            };
            for root in styles.children(group) {
                collect_styles(root, kind, &mut Vec::new(), target);
            }
        }
        resolve_all(&mut catalog.paragraph_styles, ctx);
        resolve_all(&mut catalog.character_styles, ctx);
    } else {
        log::debug!("No {} in package", ResourceFile::Styles.path());
    }

    if let Some(root) = catalog.paragraph_styles.get(ROOT_PARAGRAPH_STYLE) {
        catalog.document_defaults = root.resolved.clone();
    }

    if let Some(graphic) = package.resource(ResourceFile::Graphic) {
        catalog.colors = collect_colors(graphic);
    }

    if let Some(fonts) = package.resource(ResourceFile::Fonts) {
        catalog.fonts = collect_fonts(fonts);
    }

    log::debug!(
        "Catalog: {} paragraph style(s), {} character style(s), {} color(s), {} font famil(ies)",
        catalog.paragraph_styles.len(),
        catalog.character_styles.len(),
        catalog.colors.len(),
        catalog.fonts.len()
    );
    catalog
}

fn collect_styles(
    group: &XmlElement,
    kind: StyleKind,
    path: &mut Vec<String>,
    out: &mut IndexMap<String, StyleDefinition>,
) {
    let (style_tag, group_tag) = match kind {
        StyleKind::Paragraph => ("ParagraphStyle", "ParagraphStyleGroup"),
        StyleKind::Character => ("CharacterStyle", "CharacterStyleGroup"),
    };

    for element in group.children(style_tag) {
        let Some(id) = element.attr_text("Self") else {
            continue;
        };
        let id = id.into_owned();
        let name = element
            .attr_text("Name")
            .map(|n| n.into_owned())
            .unwrap_or_else(|| id.trim_start_matches(kind.prefix()).to_string());
        let mut style = StyleDefinition::new(id.clone(), name, kind)
            .with_attributes(parse_formatting(element));
        style.based_on = element
            .property("BasedOn")
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty())
            .map(|b| qualify_style_ref(kind, &b));
        style.group_path = path.clone();
        out.insert(id, style);
    }

    for sub in group.children(group_tag) {
        let name = sub
            .attr_text("Name")
            .map(|n| n.into_owned())
            .unwrap_or_default();
        path.push(name);
        collect_styles(sub, kind, path, out);
        path.pop();
    }
}

enum Chain {
    /// Style ids, nearest first
    Resolved(Vec<String>),
    /// Cycle or over-deep chain
    Broken(String),
}

fn walk_chain(styles: &IndexMap<String, StyleDefinition>, id: &str, ctx: &mut ParseContext) -> Chain {
    let mut chain = vec![id.to_string()];
    let mut visited: HashSet<&str> = HashSet::new();
    visited.insert(id);
    let mut current = styles.get(id);

    while let Some(parent) = current.and_then(|s| s.based_on.as_deref()) {
        if visited.contains(parent) {
            return Chain::Broken(format!("basedOn cycle through {}", parent));
        }
        if chain.len() >= MAX_STYLE_DEPTH {
            return Chain::Broken(format!("basedOn chain deeper than {}", MAX_STYLE_DEPTH));
        }
        match styles.get(parent) {
            Some(style) => {
                visited.insert(parent);
                chain.push(parent.to_string());
                current = Some(style);
            }
            None => {
                if !is_builtin_placeholder(parent) {
                    ctx.record_once(
                        parent.to_string(),
                        Diagnostic::new(
                            DiagnosticKind::StyleResolutionMiss,
                            Stage::Resources,
                            format!("basedOn target {} does not exist", parent),
                        )
                        .in_file(ResourceFile::Styles.path())
                        .about(id),
                    );
                }
                break;
            }
        }
    }
    Chain::Resolved(chain)
}

fn resolve_all(styles: &mut IndexMap<String, StyleDefinition>, ctx: &mut ParseContext) {
    let ids: Vec<String> = styles.keys().cloned().collect();
    for id in ids {
        let resolved = match walk_chain(styles, &id, ctx) {
            Chain::Resolved(chain) => {
                let mut attributes = FormattingAttributes::new();
                for ancestor in chain.iter().rev() {
                    if let Some(style) = styles.get(ancestor) {
                        attributes.overlay(&style.attributes);
                    }
                }
                attributes
            }
            Chain::Broken(reason) => {
                ctx.record(
                    Diagnostic::new(DiagnosticKind::StyleResolutionMiss, Stage::Resources, reason)
                        .in_file(ResourceFile::Styles.path())
                        .about(id.clone()),
                );
                FormattingAttributes::new()
            }
        };
        if let Some(style) = styles.get_mut(&id) {
            style.resolved = resolved;
        }
    }
}

/// Whether a swatch is meant to be black.
pub fn is_intentional_black(id: &str, name: &str) -> bool {
    matches!(id, "Color/Black" | "Color/Registration")
        || matches!(name, "Black" | "Registration")
        || name.to_lowercase().contains("black")
}

fn color_components(element: &XmlElement) -> Vec<f64> {
    element.attr_numbers("ColorValue").unwrap_or_default()
}

/// Resolve a plain color definition to RGB.
///
/// True black is kept only for intentional black swatches; any other black
/// is left unresolved so the consuming context applies its fallback.
fn color_rgb(def: &ColorDefinition) -> Option<Rgb> {
    let rgb = match (def.space, def.values.as_slice()) {
        (ColorSpace::Rgb, [r, g, b, ..]) => Rgb::from_components(*r, *g, *b),
        (ColorSpace::Cmyk, [c, m, y, k, ..]) => cmyk_to_rgb(Cmyk::new(*c, *m, *y, *k)),
        (ColorSpace::Lab, [l, a, b, ..]) => lab_to_rgb(*l, *a, *b),
        _ if def.intentional_black => Rgb::BLACK,
        _ => return None,
    };
    (!rgb.is_black() || def.intentional_black).then_some(rgb)
}

fn collect_colors(graphic: &XmlElement) -> IndexMap<String, ColorDefinition> {
    let mut colors: IndexMap<String, ColorDefinition> = IndexMap::new();

    for element in graphic.children("Color") {
        let Some(id) = element.attr_text("Self").map(|s| s.into_owned()) else {
            continue;
        };
        let name = element.attr_text("Name").map(|s| s.into_owned()).unwrap_or_default();
        let space = match element.attr_text("Space").as_deref() {
            Some("RGB") => ColorSpace::Rgb,
            Some("CMYK") => ColorSpace::Cmyk,
            Some("LAB") => ColorSpace::Lab,
            _ => ColorSpace::Named,
        };
        let mut def = ColorDefinition::new(id.clone(), name.clone(), space, color_components(element));
        def.model = element
            .attr_text("Model")
            .map(|m| ColorModel::parse(&m))
            .unwrap_or(ColorModel::Process);
        def.intentional_black = is_intentional_black(&id, &name);
        def.hex = color_rgb(&def).map(|rgb| rgb.to_hex());
        colors.insert(id, def);
    }

    for element in graphic.children("Tint") {
        let Some(id) = element.attr_text("Self").map(|s| s.into_owned()) else {
            continue;
        };
        let base = element.attr_text("BaseColor").map(|s| s.into_owned());
        let tint = element.attr_f64("TintValue").filter(|t| *t >= 0.0);
        let name = element
            .attr_text("Name")
            .map(|s| s.into_owned())
            .unwrap_or_else(|| id.clone());
        let mut def = ColorDefinition::new(id.clone(), name, ColorSpace::Named, Vec::new());
        def.tint = tint;
        def.hex = base
            .as_deref()
            .and_then(|b| colors.get(b))
            .and_then(|b| b.hex.as_deref())
            .and_then(hex_to_rgb)
            .map(|rgb| rgb.tinted(tint.unwrap_or(100.0)).to_hex());
        def.base_color = base;
        colors.insert(id, def);
    }

    for element in graphic.children("Swatch") {
        let Some(id) = element.attr_text("Self").map(|s| s.into_owned()) else {
            continue;
        };
        let name = element.attr_text("Name").map(|s| s.into_owned()).unwrap_or_default();
        let mut def = ColorDefinition::new(id.clone(), name, ColorSpace::Named, Vec::new());
        def.model = ColorModel::Other;
        colors.insert(id, def);
    }

    colors
}

fn collect_fonts(fonts: &XmlElement) -> IndexMap<String, FontFamily> {
    let mut families = IndexMap::new();
    for element in fonts.children("FontFamily") {
        let name = element.attr_text("Name").map(|s| s.into_owned()).unwrap_or_default();
        let family = FontFamily {
            id: element.attr_text("Self").map(|s| s.into_owned()).unwrap_or_default(),
            name: name.clone(),
            fonts: element
                .children("Font")
                .iter()
                .map(|font| FontRecord {
                    full_name: font
                        .attr_text("FullName")
                        .or_else(|| font.attr_text("Name"))
                        .map(|s| s.into_owned())
                        .unwrap_or_default(),
                    postscript_name: font.attr_text("PostScriptName").map(|s| s.into_owned()),
                    font_style: font.attr_text("FontStyleName").map(|s| s.into_owned()),
                    font_type: font.attr_text("FontType").map(|s| s.into_owned()),
                    status: font.attr_text("Status").map(|s| s.into_owned()),
                })
                .collect(),
        };
        families.insert(name, family);
    }
    families
}

/// Resolve a swatch reference to `#RRGGBB`.
///
/// Returns `None` for "no color". Unknown references are recorded once and
/// resolve to the fallback of `usage`: black for text, transparent for
/// backgrounds.
pub fn resolve_color(
    catalog: &ResourceCatalog,
    ctx: &mut ParseContext,
    reference: Option<&str>,
    usage: ColorUse,
) -> Option<String> {
    let fallback = || match usage {
        ColorUse::Text => Some(Rgb::BLACK.to_hex()),
        ColorUse::Background => None,
    };

    let Some(reference) = reference.map(str::trim).filter(|r| !r.is_empty()) else {
        return fallback();
    };
    if reference == NONE_SWATCH || reference == "n" {
        return None;
    }
    match catalog.color(reference) {
        Some(def) => match &def.hex {
            Some(hex) => Some(hex.clone()),
            None if def.id == NONE_SWATCH => None,
            None => fallback(),
        },
        None => {
            ctx.record_once(
                reference.to_string(),
                Diagnostic::new(
                    DiagnosticKind::StyleResolutionMiss,
                    Stage::Resources,
                    format!("color {} is not defined", reference),
                )
                .about(reference),
            );
            fallback()
        }
    }
}

/// A style reference plus the direct attributes of one level.
#[derive(Debug, Clone, Copy, Default)]
pub struct StyleLevel<'a> {
    /// Applied style id
    pub style: Option<&'a str>,
    /// Attributes set directly on the range
    pub direct: Option<&'a FormattingAttributes>,
}

/// Resolve the formatting of a text run.
///
/// Precedence, highest first: run direct attributes, character style,
/// paragraph direct attributes, paragraph style, document defaults.
pub fn resolve_formatting(
    catalog: &ResourceCatalog,
    ctx: &mut ParseContext,
    run: StyleLevel<'_>,
    paragraph: StyleLevel<'_>,
) -> ResolvedFormatting {
    let defaults = ctx.options().defaults.clone();
    let mut merged = defaults_as_attributes(&defaults);
    merged.overlay(&catalog.document_defaults);

    let paragraph_style = paragraph
        .style
        .map(|s| qualify_style_ref(StyleKind::Paragraph, s));
    let character_style = run.style.map(|s| qualify_style_ref(StyleKind::Character, s));

    if let Some(id) = paragraph_style.as_deref() {
        overlay_style(catalog, ctx, StyleKind::Paragraph, id, &mut merged);
    }
    if let Some(direct) = paragraph.direct {
        merged.overlay(direct);
    }
    if let Some(id) = character_style.as_deref() {
        overlay_style(catalog, ctx, StyleKind::Character, id, &mut merged);
    }
    if let Some(direct) = run.direct {
        merged.overlay(direct);
    }

    let font_size = merged.font_size.unwrap_or(defaults.font_size);
    let leading = match merged.leading {
        Some(Leading::Points(points)) => points,
        Some(Leading::Auto) | None => font_size * defaults.leading_factor,
    };
    let color = match merged.fill_color.as_deref() {
        Some(reference) => resolve_color(catalog, ctx, Some(reference), ColorUse::Text)
            .unwrap_or_else(|| defaults.color.clone()),
        None => defaults.color.clone(),
    };
    let stroke_color = merged
        .stroke_color
        .as_deref()
        .and_then(|reference| resolve_color(catalog, ctx, Some(reference), ColorUse::Background));

    ResolvedFormatting {
        font_family: merged.font_family.unwrap_or(defaults.font_family),
        font_style: merged.font_style,
        font_size,
        leading,
        tracking: merged.tracking.unwrap_or(0.0),
        color,
        stroke_color,
        alignment: merged.alignment.unwrap_or(defaults.alignment),
        paragraph_style,
        character_style,
        left_indent: merged.left_indent.unwrap_or(0.0),
        right_indent: merged.right_indent.unwrap_or(0.0),
        first_line_indent: merged.first_line_indent.unwrap_or(0.0),
        space_before: merged.space_before.unwrap_or(0.0),
        space_after: merged.space_after.unwrap_or(0.0),
        underline: merged.underline.unwrap_or(false),
        strike_through: merged.strike_through.unwrap_or(false),
        capitalization: merged.capitalization.filter(|c| c != "Normal"),
        position: merged.position.filter(|p| p != "Normal"),
    }
}

fn defaults_as_attributes(defaults: &FormattingDefaults) -> FormattingAttributes {
    FormattingAttributes {
        font_family: Some(defaults.font_family.clone()),
        font_size: Some(defaults.font_size),
        alignment: Some(defaults.alignment),
        ..Default::default()
    }
}

fn overlay_style(
    catalog: &ResourceCatalog,
    ctx: &mut ParseContext,
    kind: StyleKind,
    id: &str,
    merged: &mut FormattingAttributes,
) {
    match catalog.style(kind, id) {
        Some(style) => merged.overlay(&style.resolved),
        None if is_builtin_placeholder(id) => {}
        None => ctx.record_once(
            id.to_string(),
            Diagnostic::new(
                DiagnosticKind::StyleResolutionMiss,
                Stage::Resources,
                format!("style {} does not exist", id),
            )
            .about(id),
        ),
    }
}
