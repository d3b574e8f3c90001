//! Visitor interface for walking generic trees.
//!
//! # Example
//!
//! ```
//! use unidml::tree::{TreeVisitor, VisitAction, XmlElement};
//!
//! struct CountColors(usize);
//!
//! impl TreeVisitor for CountColors {
//!     fn enter(&mut self, element: &XmlElement, _depth: usize) -> VisitAction {
//!         if element.name == "Color" {
//!             self.0 += 1;
//!         }
//!         VisitAction::Continue
//!     }
//! }
//!
//! let tree = XmlElement::new("idPkg:Graphic")
//!     .with_child(XmlElement::new("Color"))
//!     .with_child(XmlElement::new("Color"));
//! let mut counter = CountColors(0);
//! tree.walk(&mut counter);
//! assert_eq!(counter.0, 2);
//! ```

use super::XmlElement;

/// Action returned by [`TreeVisitor::enter`] to steer the walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VisitAction {
    /// Descend into the element's children.
    #[default]
    Continue,

    /// Do not descend into this element's children.
    SkipChildren,

    /// Abort the whole walk.
    Stop,
}

impl VisitAction {
    /// Check if this action stops the walk.
    pub fn is_stop(&self) -> bool {
        matches!(self, VisitAction::Stop)
    }
}

/// Trait for visiting tree elements depth-first.
pub trait TreeVisitor {
    /// Called before an element's children are visited.
    fn enter(&mut self, element: &XmlElement, depth: usize) -> VisitAction;

    /// Called after an element's children were visited.
    fn leave(&mut self, element: &XmlElement, depth: usize) {
        let _ = (element, depth);
    }
}

/// Visitor that collects every element with one of the given names.
///
/// Collected elements are not descended into.
pub struct CollectVisitor<'a, 'n> {
    names: &'n [&'n str],
    found: Vec<&'a XmlElement>,
}

impl<'a, 'n> CollectVisitor<'a, 'n> {
    /// Collect elements whose name is in `names`.
    pub fn new(names: &'n [&'n str]) -> Self {
        Self {
            names,
            found: Vec::new(),
        }
    }

    /// Walk `root` and return the matches in document order.
    pub fn collect(mut self, root: &'a XmlElement) -> Vec<&'a XmlElement> {
        self.visit(root);
        self.found
    }

    fn visit(&mut self, element: &'a XmlElement) {
        if self.names.contains(&element.name.as_str()) {
            self.found.push(element);
            return;
        }
        for child in element.all_children() {
            self.visit(child);
        }
    }
}
