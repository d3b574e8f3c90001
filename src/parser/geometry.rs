//! Page item extraction and pixel geometry.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::model::{Element, ElementKind, Geometry, Point, Rect, ResourceCatalog, Transform};
use crate::package::PackageContents;
use crate::tree::{CollectVisitor, TreeVisitor, VisitAction, XmlElement};
use crate::units::{points_scale, round2};

use super::context::ParseContext;
use super::resources::{resolve_color, ColorUse};
use super::structure::{item_transform, Structure};

/// Child tags that make a frame a content frame.
pub const GRAPHIC_TAGS: [&str; 5] = ["Image", "PDF", "EPS", "ImportedPage", "WMF"];

/// Local bounds of a page item, in its own coordinates (points).
///
/// Path anchors win over `GeometricBounds`; items with neither sit at the
/// origin with zero size.
pub fn local_bounds(item: &XmlElement) -> Rect {
    if let Some(path) = item
        .child("Properties")
        .and_then(|props| props.child("PathGeometry"))
    {
        let anchors: Vec<Point> = CollectVisitor::new(&["PathPointType"])
            .collect(path)
            .into_iter()
            .filter_map(|point| point.attr_numbers("Anchor"))
            .filter_map(|xy| match xy.as_slice() {
                [x, y] => Some(Point::new(*x, *y)),
                _ => None,
            })
            .collect();
        if let Some(rect) = Rect::bounding(&anchors) {
            return rect;
        }
    }

    item.attr_numbers("GeometricBounds")
        .and_then(|b| match b.as_slice() {
            [top, left, bottom, right] => {
                Some(Rect::from_corners(Point::new(*left, *top), Point::new(*right, *bottom)))
            }
            _ => None,
        })
        .unwrap_or_default()
}

/// Pixel geometry in element space from local bounds and a spread transform.
pub fn compute_geometry(local: &Rect, transform: &Transform, scale: f64, offset: Point) -> Geometry {
    let center = transform.apply(local.center());
    let width = local.width * transform.scale_x();
    let height = local.height * transform.scale_y();
    let to_element = |v: f64, shift: f64| round2(v * scale + shift);

    Geometry {
        x: to_element(center.x - width / 2.0, offset.x),
        y: to_element(center.y - height / 2.0, offset.y),
        width: round2(width * scale),
        height: round2(height * scale),
        rotation: round2(transform.rotation_degrees()),
        bounds: transform
            .apply_rect(local)
            .scaled(scale)
            .offset(offset)
            .rounded(),
    }
}

fn optional_ref(item: &XmlElement, key: &str) -> Option<String> {
    item.attr_text(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && v != "n")
}

/// Element ids in use across a document.
///
/// Every `Self` id in the spreads is reserved before extraction, so a
/// renamed repeat never takes an id that a later item really has.
#[derive(Debug, Default)]
struct IdRegistry {
    reserved: HashSet<String>,
    claimed: HashSet<String>,
}

impl IdRegistry {
    fn reserve(&mut self, root: &XmlElement) {
        if let Some(id) = root.attr_text("Self") {
            self.reserved.insert(id.into_owned());
        }
        for child in root.all_children() {
            self.reserve(child);
        }
    }

    /// Claim `id`, or the first free `{id}_{n}` when it is already taken.
    fn claim(&mut self, id: String) -> String {
        if self.claimed.insert(id.clone()) {
            return id;
        }
        let mut n = 1;
        loop {
            n += 1;
            let candidate = format!("{}_{}", id, n);
            if !self.reserved.contains(&candidate) && self.claimed.insert(candidate.clone()) {
                log::warn!("Duplicate element id {}; renamed to {}", id, candidate);
                return candidate;
            }
        }
    }
}

struct Open {
    transform: Transform,
    /// Index of the element in the output, for groups
    group: Option<usize>,
}

/// Visitor that turns a spread's page items into elements.
struct PageItemVisitor<'a> {
    spread_id: &'a str,
    scale: f64,
    offset: Point,
    catalog: &'a ResourceCatalog,
    ctx: &'a mut ParseContext,
    ids: &'a mut IdRegistry,
    stack: Vec<Open>,
    elements: Vec<Element>,
    anonymous: usize,
}

impl PageItemVisitor<'_> {
    fn parent(&self) -> (Transform, Option<usize>) {
        self.stack
            .last()
            .map(|open| (open.transform, open.group))
            .unwrap_or((Transform::IDENTITY, None))
    }

    fn build(&mut self, item: &XmlElement, kind: ElementKind) -> Element {
        let (parent_transform, parent_group) = self.parent();
        let transform = item_transform(item).then(&parent_transform);

        let id = match item.attr_text("Self") {
            Some(id) => id.into_owned(),
            None => {
                self.anonymous += 1;
                format!("{}_{}{}", self.spread_id, item.name, self.anonymous)
            }
        };
        let id = self.ids.claim(id);

        let graphic = GRAPHIC_TAGS.iter().find_map(|tag| item.child(tag));
        let kind = match graphic {
            Some(_) if kind.can_hold_graphic() => ElementKind::ContentFrame,
            _ => kind,
        };

        let geometry = compute_geometry(&local_bounds(item), &transform, self.scale, self.offset);
        let mut element = Element::new(id, kind, self.spread_id).with_geometry(geometry);

        element.parent_id = Some(match parent_group {
            Some(index) => self.elements[index].id.clone(),
            None => self.spread_id.to_string(),
        });
        element.name = item
            .attr_text("Name")
            .filter(|n| !n.is_empty() && !n.starts_with("$ID/"))
            .map(|n| n.into_owned());
        element.layer_id = optional_ref(item, "ItemLayer");
        element.visible = item.attr_bool("Visible").unwrap_or(true);
        element.object_style = optional_ref(item, "AppliedObjectStyle");
        element.stroke_weight = round2(item.attr_f64("StrokeWeight").unwrap_or(0.0) * self.scale);

        element.fill_color_ref = optional_ref(item, "FillColor");
        element.stroke_color_ref = optional_ref(item, "StrokeColor");
        element.fill_color = element.fill_color_ref.as_deref().and_then(|r| {
            resolve_color(self.catalog, self.ctx, Some(r), ColorUse::Background)
        });
        element.stroke_color = element.stroke_color_ref.as_deref().and_then(|r| {
            resolve_color(self.catalog, self.ctx, Some(r), ColorUse::Background)
        });

        if kind == ElementKind::TextFrame {
            element.parent_story_id = optional_ref(item, "ParentStory");
            element.previous_frame_id = optional_ref(item, "PreviousTextFrame");
            element.next_frame_id = optional_ref(item, "NextTextFrame");
        }
        element.image_uri = graphic
            .and_then(|g| g.child("Link"))
            .and_then(|link| optional_ref(link, "LinkResourceURI"));

        if let Some(index) = parent_group {
            let child_id = element.id.clone();
            self.elements[index].child_ids.push(child_id);
        }

        log::trace!("{} {} at {:?}", element.kind, element.id, element.geometry.bounds);
        element
    }
}

impl TreeVisitor for PageItemVisitor<'_> {
    fn enter(&mut self, element: &XmlElement, depth: usize) -> VisitAction {
        if depth == 0 {
            return VisitAction::Continue;
        }
        let Some(kind) = ElementKind::from_tag(&element.name) else {
            return VisitAction::SkipChildren;
        };

        let built = self.build(element, kind);
        let (parent_transform, _) = self.parent();
        self.elements.push(built);

        if kind == ElementKind::Group {
            self.stack.push(Open {
                transform: item_transform(element).then(&parent_transform),
                group: Some(self.elements.len() - 1),
            });
            VisitAction::Continue
        } else {
            VisitAction::SkipChildren
        }
    }

    fn leave(&mut self, element: &XmlElement, depth: usize) {
        if depth > 0 && element.name == "Group" {
            self.stack.pop();
        }
    }
}

/// Extract the page items of every document spread.
///
/// Ids repeated anywhere in the document are renamed `{id}_{n}` as the
/// items are built, so group parent and child links use the final ids.
pub fn extract_elements(
    package: &PackageContents,
    structure: &Structure,
    catalog: &ResourceCatalog,
    ctx: &mut ParseContext,
) -> Vec<Element> {
    let scale = points_scale(ctx.options().dpi);
    let mut elements = Vec::new();

    let spreads: Vec<_> = structure
        .spreads
        .iter()
        .filter_map(|spread| {
            package
                .tree(&spread.source)
                .and_then(|root| root.find_first("Spread"))
                .map(|el| (spread, el))
        })
        .collect();
    let mut ids = IdRegistry::default();
    for (_, spread_el) in &spreads {
        ids.reserve(spread_el);
    }

    for (spread, spread_el) in spreads {
        let mut visitor = PageItemVisitor {
            spread_id: &spread.id,
            scale,
            offset: structure.coordinate_offset,
            catalog,
            ctx: &mut *ctx,
            ids: &mut ids,
            stack: Vec::new(),
            elements: Vec::new(),
            anonymous: 0,
        };
        spread_el.walk(&mut visitor);
        elements.append(&mut visitor.elements);
    }

    log::debug!("Extracted {} page item(s)", elements.len());
    elements
}

/// Text frames of each story in thread order.
pub fn thread_frames<'a>(elements: impl IntoIterator<Item = &'a Element>) -> IndexMap<String, Vec<String>> {
    let frames: IndexMap<&str, &Element> = elements
        .into_iter()
        .filter(|e| e.is_text_frame() && e.parent_story_id.is_some())
        .map(|e| (e.id.as_str(), e))
        .collect();

    let mut threads: IndexMap<String, Vec<String>> = IndexMap::new();
    let mut placed: HashSet<&str> = HashSet::new();

    let heads: Vec<&Element> = frames
        .values()
        .copied()
        .filter(|frame| {
            frame
                .previous_frame_id
                .as_deref()
                .map_or(true, |prev| !frames.contains_key(prev))
        })
        .collect();

    // Frames not reached from a head belong to cycles
    for start in heads.into_iter().chain(frames.values().copied()) {
        let mut current = Some(start);
        while let Some(frame) = current {
            if !placed.insert(frame.id.as_str()) {
                break;
            }
            if let Some(story) = &frame.parent_story_id {
                threads.entry(story.clone()).or_default().push(frame.id.clone());
            }
            current = frame
                .next_frame_id
                .as_deref()
                .and_then(|next| frames.get(next).copied());
        }
    }
    threads
}
