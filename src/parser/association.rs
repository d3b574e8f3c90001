//! Page to element assignment.
//!
//! Every element ends up on exactly one page. Strategies are tried in order
//! and the first one that names a page wins; the last one always does.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::color::{classify_swatch, hex_to_rgb, is_paper, rgb_to_cmyk, Cmyk};
use crate::error::{Diagnostic, DiagnosticKind, Stage};
use crate::model::{
    AssignmentStrategy, ColorSpace, Element, ElementKind, Page, Point, ResourceCatalog,
};

use super::context::ParseContext;

/// Slack per side when testing whether a rectangle covers a page, pixels.
pub const FULL_PAGE_TOLERANCE: f64 = 2.0;

/// Read-only view of the pages used by the strategies.
#[derive(Debug)]
pub struct AssociationContext<'a> {
    pages: &'a [Page],
    by_id: HashMap<&'a str, usize>,
    by_spread: HashMap<&'a str, Vec<usize>>,
}

impl<'a> AssociationContext<'a> {
    /// Index a page list.
    pub fn new(pages: &'a [Page]) -> Self {
        let mut by_id = HashMap::new();
        let mut by_spread: HashMap<&str, Vec<usize>> = HashMap::new();
        for (i, page) in pages.iter().enumerate() {
            by_id.insert(page.id.as_str(), i);
            by_spread.entry(page.spread_id.as_str()).or_default().push(i);
        }
        Self {
            pages,
            by_id,
            by_spread,
        }
    }

    /// Page by id.
    pub fn page(&self, id: &str) -> Option<&'a Page> {
        self.by_id.get(id).map(|&i| &self.pages[i])
    }

    /// Pages of a spread, in order.
    pub fn spread_pages(&self, spread_id: &str) -> Vec<&'a Page> {
        self.by_spread
            .get(spread_id)
            .map(|indices| indices.iter().map(|&i| &self.pages[i]).collect())
            .unwrap_or_default()
    }

    /// First page of the document.
    pub fn first_page(&self) -> Option<&'a Page> {
        self.pages.first()
    }
}

/// A page assignment strategy.
pub type Strategy = fn(&Element, &AssociationContext<'_>) -> Option<String>;

/// Keep a preset page id that names a known page.
pub fn direct(element: &Element, ctx: &AssociationContext<'_>) -> Option<String> {
    let id = element.page_id.as_deref()?;
    ctx.page(id).map(|page| page.id.clone())
}

/// Use the structural parent when it is a page.
pub fn structural_parent(element: &Element, ctx: &AssociationContext<'_>) -> Option<String> {
    let parent = element.parent_id.as_deref()?;
    ctx.page(parent).map(|page| page.id.clone())
}

/// Use the only page of the element's spread.
pub fn single_page_spread(element: &Element, ctx: &AssociationContext<'_>) -> Option<String> {
    match ctx.spread_pages(&element.spread_id).as_slice() {
        [only] => Some(only.id.clone()),
        _ => None,
    }
}

/// Use the first candidate page whose element-space rectangle contains the
/// element's center. Candidates are the spread's pages, or all pages when
/// the spread is unknown.
pub fn spatial(element: &Element, ctx: &AssociationContext<'_>) -> Option<String> {
    let center = element.geometry.center();
    let candidates = ctx.spread_pages(&element.spread_id);
    let found = if candidates.is_empty() {
        ctx.pages.iter().find(|p| p.element_rect().contains(center))
    } else {
        candidates.into_iter().find(|p| p.element_rect().contains(center))
    };
    found.map(|page| page.id.clone())
}

/// First page of the document.
pub fn fallback(_element: &Element, ctx: &AssociationContext<'_>) -> Option<String> {
    ctx.first_page().map(|page| page.id.clone())
}

/// Strategies in the order they are tried.
pub const STRATEGIES: [(AssignmentStrategy, Strategy); 5] = [
    (AssignmentStrategy::Direct, direct),
    (AssignmentStrategy::StructuralParent, structural_parent),
    (AssignmentStrategy::SinglePageSpread, single_page_spread),
    (AssignmentStrategy::Spatial, spatial),
    (AssignmentStrategy::Fallback, fallback),
];

/// Assign every element to a page and build the page index.
///
/// The index lists every page (possibly with no elements) in page order,
/// and each element id exactly once.
pub fn associate(
    elements: &mut [Element],
    pages: &[Page],
    ctx: &mut ParseContext,
) -> IndexMap<String, Vec<String>> {
    let assoc = AssociationContext::new(pages);
    let mut index: IndexMap<String, Vec<String>> =
        pages.iter().map(|p| (p.id.clone(), Vec::new())).collect();

    for element in elements.iter_mut() {
        if let Some(preset) = element.page_id.as_deref() {
            if assoc.page(preset).is_none() {
                ctx.record(
                    Diagnostic::new(
                        DiagnosticKind::AmbiguousPageAssignment,
                        Stage::Association,
                        format!("preset page {} does not exist", preset),
                    )
                    .about(element.id.clone()),
                );
            }
        }

        let assigned = STRATEGIES
            .iter()
            .find_map(|(strategy, run)| run(element, &assoc).map(|page| (*strategy, page)));
        let Some((strategy, page_id)) = assigned else {
            continue;
        };

        if strategy == AssignmentStrategy::Fallback {
            ctx.record(
                Diagnostic::new(
                    DiagnosticKind::AmbiguousPageAssignment,
                    Stage::Association,
                    format!("no page contains the element; assigned to {}", page_id),
                )
                .about(element.id.clone()),
            );
        }

        if let Some(page) = assoc.page(&page_id) {
            element.page_position = Some(Point::new(
                crate::units::round2(element.geometry.x - page.origin.x),
                crate::units::round2(element.geometry.y - page.origin.y),
            ));
        }
        log::trace!("{} → {} ({:?})", element.id, page_id, strategy);
        element.page_id = Some(page_id.clone());
        element.assignment = Some(strategy);
        index.entry(page_id).or_default().push(element.id.clone());
    }

    index
}

/// CMYK equivalent of a fill for background classification.
fn fill_cmyk(element: &Element, catalog: &ResourceCatalog) -> Option<Cmyk> {
    if let Some(def) = element.fill_color_ref.as_deref().and_then(|r| catalog.color(r)) {
        if let (ColorSpace::Cmyk, [c, m, y, k, ..]) = (def.space, def.values.as_slice()) {
            return Some(Cmyk::new(*c, *m, *y, *k));
        }
    }
    element
        .fill_color
        .as_deref()
        .and_then(hex_to_rgb)
        .map(rgb_to_cmyk)
}

/// Set page backgrounds from full-page rectangles.
///
/// Among the rectangles covering a page, the largest wins; ties keep
/// source order. Its fill is used when it is the paper color or light
/// enough for a background. Spread backgrounds follow their first page.
pub fn apply_backgrounds(
    pages: &mut [Page],
    spreads: &mut [crate::model::Spread],
    elements: &[Element],
    catalog: &ResourceCatalog,
) {
    for page in pages.iter_mut() {
        let page_rect = page.element_rect();
        let mut best: Option<&Element> = None;
        for element in elements {
            let candidate = element.page_id.as_deref() == Some(page.id.as_str())
                && element.kind == ElementKind::Rectangle
                && element.fill_color.is_some()
                && element.geometry.bounds.covers(&page_rect, FULL_PAGE_TOLERANCE);
            if !candidate {
                continue;
            }
            let area = element.geometry.bounds.area();
            if best.map_or(true, |b| area > b.geometry.bounds.area()) {
                best = Some(element);
            }
        }

        let Some(rect) = best else {
            continue;
        };
        let fill_ref = rect.fill_color_ref.as_deref().unwrap_or_default();
        let suitable = is_paper(fill_ref)
            || fill_cmyk(rect, catalog)
                .map(|cmyk| classify_swatch(fill_ref, cmyk).is_suitable())
                .unwrap_or(false);
        if suitable {
            if let Some(hex) = &rect.fill_color {
                log::debug!("Page {} background {} from {}", page.id, hex, rect.id);
                page.background_color = hex.clone();
            }
        }
    }

    for spread in spreads.iter_mut() {
        if let Some(first) = spread
            .page_ids
            .first()
            .and_then(|id| pages.iter().find(|p| &p.id == id))
        {
            spread.background_color = first.background_color.clone();
        }
    }
}
