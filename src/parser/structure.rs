//! Spreads, pages, master spreads, and document metadata.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::color::PAPER_COLOR_ID;
use crate::error::{Error, Result};
use crate::model::{Margins, Metadata, Page, Point, Rect, ResourceCatalog, Spread, Transform};
use crate::package::{PackageContents, ResourceFile};
use crate::tree::{Scalar, XmlElement};
use crate::units::{points_scale, round2, Unit};

use super::context::ParseContext;

/// US Letter in points.
pub const LETTER_SIZE: (f64, f64) = (612.0, 792.0);

/// Spreads and pages of a document.
#[derive(Debug, Clone, Default)]
pub struct Structure {
    /// Document spreads in order
    pub spreads: Vec<Spread>,
    /// Document pages in order
    pub pages: Vec<Page>,
    /// Master spreads
    pub master_spreads: Vec<Spread>,
    /// Pages of master spreads
    pub master_pages: Vec<Page>,
    /// Spread space → element space translation, pixels
    pub coordinate_offset: Point,
}

impl Structure {
    /// Spread by id.
    pub fn spread(&self, id: &str) -> Option<&Spread> {
        self.spreads
            .iter()
            .chain(&self.master_spreads)
            .find(|s| s.id == id)
    }
}

/// Page size from `DocumentPreference`, in points.
fn preferred_page_size(package: &PackageContents) -> (f64, f64) {
    package
        .resource(ResourceFile::Preferences)
        .and_then(|prefs| prefs.find_first("DocumentPreference"))
        .and_then(|pref| {
            let width = pref.attr_f64("PageWidth").filter(|w| *w > 0.0)?;
            let height = pref.attr_f64("PageHeight").filter(|h| *h > 0.0)?;
            Some((width, height))
        })
        .unwrap_or(LETTER_SIZE)
}

/// Paper color of the document as `#RRGGBB`.
fn paper_color(catalog: &ResourceCatalog) -> String {
    catalog
        .color(PAPER_COLOR_ID)
        .and_then(|c| c.hex.clone())
        .unwrap_or_else(|| "#FFFFFF".to_string())
}

/// Element transform from `ItemTransform`; identity when missing or malformed.
pub fn item_transform(element: &XmlElement) -> Transform {
    element
        .attr_numbers("ItemTransform")
        .and_then(|values| Transform::from_slice(&values))
        .unwrap_or_default()
}

/// Build spreads, pages, and the coordinate offset.
///
/// Fails with [`Error::NoPagesExtracted`] when no document spread holds a
/// page.
pub fn build_structure(
    package: &PackageContents,
    catalog: &ResourceCatalog,
    ctx: &ParseContext,
) -> Result<Structure> {
    let scale = points_scale(ctx.options().dpi);
    let default_size = preferred_page_size(package);
    let background = paper_color(catalog);
    let mut structure = Structure::default();

    let spread_paths = package.spread_paths();
    for path in &spread_paths {
        let Some(root) = package.tree(path) else {
            continue;
        };
        let Some(spread_el) = root.find_first("Spread") else {
            log::warn!("No Spread element in {}", path);
            continue;
        };
        let (spread, pages) = read_spread(path, spread_el, false, scale, default_size, &background);
        for mut page in pages {
            page.index = structure.pages.len();
            structure.pages.push(page);
        }
        structure.spreads.push(spread);
    }

    for path in package.master_spread_paths() {
        let Some(spread_el) = package.tree(&path).and_then(|root| root.find_first("MasterSpread"))
        else {
            continue;
        };
        let (spread, pages) = read_spread(&path, spread_el, true, scale, default_size, &background);
        for mut page in pages {
            page.index = structure.master_pages.len();
            structure.master_pages.push(page);
        }
        structure.master_spreads.push(spread);
    }

    let first = structure.pages.first().ok_or(Error::NoPagesExtracted {
        spread_files: spread_paths.len(),
    })?;
    let offset = Point::new(-first.bounds.x, -first.bounds.y);
    structure.coordinate_offset = offset;
    for page in structure.pages.iter_mut().chain(structure.master_pages.iter_mut()) {
        page.origin = Point::new(round2(page.bounds.x + offset.x), round2(page.bounds.y + offset.y));
    }

    log::debug!(
        "Structure: {} spread(s), {} page(s), {} master spread(s)",
        structure.spreads.len(),
        structure.pages.len(),
        structure.master_spreads.len()
    );
    Ok(structure)
}

fn read_spread(
    path: &str,
    spread_el: &XmlElement,
    is_master: bool,
    scale: f64,
    default_size: (f64, f64),
    background: &str,
) -> (Spread, Vec<Page>) {
    let id = spread_el
        .attr_text("Self")
        .map(|s| s.into_owned())
        .unwrap_or_else(|| path.to_string());
    let mut spread = Spread::new(id.clone(), path);
    spread.is_master = is_master;
    if is_master {
        spread.name_prefix = spread_el.attr_text("NamePrefix").map(|s| s.into_owned());
        spread.base_name = spread_el.attr_text("BaseName").map(|s| s.into_owned());
    }

    let pages: Vec<Page> = spread_el
        .children("Page")
        .iter()
        .enumerate()
        .map(|(i, page_el)| read_page(page_el, &id, i, scale, default_size, background))
        .collect();

    spread.page_ids = pages.iter().map(|p| p.id.clone()).collect();
    if let Some(first) = pages.first() {
        spread.background_color = first.background_color.clone();
    }
    (spread, pages)
}

fn read_page(
    page_el: &XmlElement,
    spread_id: &str,
    position: usize,
    scale: f64,
    default_size: (f64, f64),
    background: &str,
) -> Page {
    let id = page_el
        .attr_text("Self")
        .map(|s| s.into_owned())
        .unwrap_or_else(|| format!("{}_page{}", spread_id, position + 1));

    let local = page_el
        .attr_numbers("GeometricBounds")
        .and_then(|b| match b.as_slice() {
            [top, left, bottom, right] => {
                Some(Rect::from_corners(Point::new(*left, *top), Point::new(*right, *bottom)))
            }
            _ => None,
        })
        .unwrap_or_else(|| Rect::new(0.0, 0.0, default_size.0, default_size.1));

    let bounds = item_transform(page_el)
        .apply_rect(&local)
        .scaled(scale)
        .rounded();

    let mut page = Page::new(id, spread_id, bounds);
    page.name = page_el
        .attr_text("Name")
        .map(|s| s.into_owned())
        .unwrap_or_else(|| (position + 1).to_string());
    page.applied_master = page_el
        .attr_text("AppliedMaster")
        .filter(|m| m != "n")
        .map(|m| m.into_owned());
    page.background_color = background.to_string();
    if let Some(margins) = page_el.child("MarginPreference") {
        page.margins = read_margins(margins, scale);
    }
    page
}

fn read_margins(el: &XmlElement, scale: f64) -> Margins {
    let px = |key: &str| round2(el.attr_f64(key).unwrap_or(0.0) * scale);
    Margins {
        top: px("Top"),
        bottom: px("Bottom"),
        left: px("Left"),
        right: px("Right"),
        column_count: el.attr_f64("ColumnCount").map(|c| c.max(1.0) as u32).unwrap_or(1),
        column_gutter: px("ColumnGutter"),
    }
}

/// Read metadata from the designmap, preferences, and XMP packet.
pub fn read_metadata(package: &PackageContents) -> Metadata {
    let mut metadata = Metadata::default();

    if let Some(designmap) = package.designmap() {
        let document = designmap.find_first("Document").unwrap_or(designmap);
        metadata.dom_version = document.attr("DOMVersion").map(|v| match v {
            Scalar::Number(n) => format!("{:?}", n),
            other => other.to_text().into_owned(),
        });
        metadata.name = document.attr_text("Name").map(|v| v.into_owned());
    }

    if let Some(prefs) = package.resource(ResourceFile::Preferences) {
        if let Some(unit) = prefs
            .find_first("ViewPreference")
            .and_then(|view| view.attr_text("HorizontalMeasurementUnits"))
            .and_then(|unit| Unit::parse(&unit))
        {
            metadata.measurement_unit = unit;
        }
        metadata.facing_pages = prefs
            .find_first("DocumentPreference")
            .and_then(|pref| pref.attr_bool("FacingPages"))
            .unwrap_or(false);
    }

    if let Some(xmp) = package.metadata() {
        let text = |name: &str| {
            xmp.find_first(name).and_then(|el| {
                el.find_first("rdf:li")
                    .and_then(|li| li.text())
                    .or_else(|| el.text())
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
            })
        };
        metadata.title = text("dc:title");
        metadata.creator = text("dc:creator");
        metadata.creator_tool = text("xmp:CreatorTool");
        metadata.created = text("xmp:CreateDate").and_then(|d| parse_xmp_date(&d));
        metadata.modified = text("xmp:ModifyDate").and_then(|d| parse_xmp_date(&d));
    }

    metadata
}

/// Parse an XMP date: RFC 3339, or a local timestamp taken as UTC.
pub fn parse_xmp_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Some(date.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}
