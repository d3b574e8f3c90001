//! Build generic trees from prefix-keyed JSON objects.
//!
//! Generic XML-to-JSON converters represent an element as an object whose
//! attribute keys carry a reserved prefix (`@_`), whose text lives under
//! `#text`, and whose repeated children are arrays.

use serde_json::Value;

use super::{Scalar, XmlElement};

/// Reserved prefix of attribute keys.
pub const ATTRIBUTE_PREFIX: &str = "@_";

/// Reserved key of text content.
pub const TEXT_KEY: &str = "#text";

/// Convert one JSON value into an element named `name`.
pub fn element_from_json(name: &str, value: &Value) -> XmlElement {
    let mut element = XmlElement::new(name);
    match value {
        Value::Object(map) => {
            for (key, item) in map {
                if let Some(attr) = key.strip_prefix(ATTRIBUTE_PREFIX) {
                    if let Some(scalar) = scalar_from_json(item) {
                        element.attributes.insert(attr.to_string(), scalar);
                    }
                } else if key == TEXT_KEY {
                    element.text = scalar_from_json(item);
                } else if let Value::Array(items) = item {
                    for child in items {
                        element.push_child(element_from_json(key, child));
                    }
                } else {
                    element.push_child(element_from_json(key, item));
                }
            }
        }
        Value::Null => {}
        other => element.text = scalar_from_json(other),
    }
    element
}

/// Convert a whole-file JSON object into its root element.
///
/// Declaration keys (`?xml`) are skipped; the first remaining key is the
/// root. Returns `None` when no element key is present.
pub fn document_from_json(value: &Value) -> Option<XmlElement> {
    let map = value.as_object()?;
    map.iter()
        .find(|(key, _)| !key.starts_with('?') && !key.starts_with(ATTRIBUTE_PREFIX))
        .map(|(key, item)| element_from_json(key, item))
}

fn scalar_from_json(value: &Value) -> Option<Scalar> {
    match value {
        Value::Bool(b) => Some(Scalar::Bool(*b)),
        Value::Number(n) => n.as_f64().map(Scalar::Number),
        Value::String(s) => Some(Scalar::Text(s.clone())),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
