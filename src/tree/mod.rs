//! Generic XML trees.
//!
//! Every package file is turned into an [`XmlElement`] tree before any
//! layout logic runs. Trees come either from raw XML text ([`parse_xml`]) or
//! from prefix-keyed JSON objects ([`document_from_json`]).

mod json;
mod node;
mod visitor;
mod xml;

pub use json::{document_from_json, element_from_json, ATTRIBUTE_PREFIX, TEXT_KEY};
pub use node::{Scalar, XmlElement};
pub use visitor::{CollectVisitor, TreeVisitor, VisitAction};
pub use xml::parse_xml;
