//! Generic XML tree node.

use std::borrow::Cow;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::visitor::{TreeVisitor, VisitAction};

/// A pre-typed attribute or text value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// `true` / `false`
    Bool(bool),
    /// A plain decimal number
    Number(f64),
    /// Anything else
    Text(String),
}

impl Scalar {
    /// Type a raw attribute value: booleans and plain decimal numbers are
    /// converted, everything else stays text. Values whose text would not
    /// survive a round trip (leading zeros, `+`, exponents) stay text.
    pub fn infer(raw: &str) -> Scalar {
        match raw {
            "true" => return Scalar::Bool(true),
            "false" => return Scalar::Bool(false),
            _ => {}
        }
        if is_plain_number(raw) {
            if let Ok(n) = raw.parse::<f64>() {
                return Scalar::Number(n);
            }
        }
        Scalar::Text(raw.to_string())
    }

    /// Borrow the text, if this is a text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Render the value as text regardless of its type.
    pub fn to_text(&self) -> Cow<'_, str> {
        match self {
            Scalar::Text(s) => Cow::Borrowed(s),
            Scalar::Bool(b) => Cow::Owned(b.to_string()),
            Scalar::Number(n) => Cow::Owned(format_number(*n)),
        }
    }

    /// Numeric view; text is parsed when possible.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => Some(*n),
            Scalar::Text(s) => s.trim().parse().ok(),
            Scalar::Bool(_) => None,
        }
    }

    /// Boolean view; text `"true"`/`"false"` is accepted.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Bool(b) => Some(*b),
            Scalar::Text(s) => match s.as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            Scalar::Number(_) => None,
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Text(s)
    }
}

impl From<f64> for Scalar {
    fn from(n: f64) -> Self {
        Scalar::Number(n)
    }
}

impl From<i32> for Scalar {
    fn from(n: i32) -> Self {
        Scalar::Number(n as f64)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

fn is_plain_number(raw: &str) -> bool {
    let digits = raw.strip_prefix('-').unwrap_or(raw);
    if digits.is_empty() {
        return false;
    }
    let (int, frac) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits, None),
    };
    if int.is_empty() || !int.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    if int.len() > 1 && int.starts_with('0') {
        return false;
    }
    match frac {
        Some(f) => !f.is_empty() && f.bytes().all(|b| b.is_ascii_digit()),
        None => true,
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// An element of the generic tree.
///
/// Children are grouped by element name. Order within one name is preserved;
/// order across different names is not.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct XmlElement {
    /// Qualified element name (e.g. `idPkg:Story`)
    pub name: String,

    /// Attributes in source order
    pub attributes: IndexMap<String, Scalar>,

    /// Child elements grouped by name
    pub children: IndexMap<String, Vec<XmlElement>>,

    /// Text content, if any
    pub text: Option<Scalar>,
}

impl XmlElement {
    /// Create an empty element.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder: add an attribute.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Builder: append a child.
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.push_child(child);
        self
    }

    /// Builder: set text.
    pub fn with_text(mut self, text: impl Into<Scalar>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Append a child under its own name.
    pub fn push_child(&mut self, child: XmlElement) {
        self.children
            .entry(child.name.clone())
            .or_default()
            .push(child);
    }

    /// Raw attribute value.
    pub fn attr(&self, key: &str) -> Option<&Scalar> {
        self.attributes.get(key)
    }

    /// Attribute rendered as text.
    pub fn attr_text(&self, key: &str) -> Option<Cow<'_, str>> {
        self.attr(key).map(Scalar::to_text)
    }

    /// Attribute as a number.
    pub fn attr_f64(&self, key: &str) -> Option<f64> {
        self.attr(key).and_then(Scalar::as_f64)
    }

    /// Attribute as a boolean.
    pub fn attr_bool(&self, key: &str) -> Option<bool> {
        self.attr(key).and_then(Scalar::as_bool)
    }

    /// Attribute holding a whitespace-separated list of numbers.
    ///
    /// Returns `None` when the attribute is missing or any item fails to parse.
    pub fn attr_numbers(&self, key: &str) -> Option<Vec<f64>> {
        match self.attr(key)? {
            Scalar::Number(n) => Some(vec![*n]),
            Scalar::Text(s) => s
                .split_whitespace()
                .map(|part| part.parse::<f64>().ok())
                .collect(),
            Scalar::Bool(_) => None,
        }
    }

    /// Text content rendered as a string.
    pub fn text(&self) -> Option<Cow<'_, str>> {
        self.text.as_ref().map(Scalar::to_text)
    }

    /// Children with the given name, in order.
    pub fn children(&self, name: &str) -> &[XmlElement] {
        self.children.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First child with the given name.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children(name).first()
    }

    /// Whether any child element exists.
    pub fn has_children(&self) -> bool {
        self.children.values().any(|list| !list.is_empty())
    }

    /// All children, grouped by name in first-seen order.
    pub fn all_children(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.values().flatten()
    }

    /// A formatting property stored either as an attribute or as a child of
    /// the element's `Properties` block (`<Properties><AppliedFont>..`).
    pub fn property(&self, key: &str) -> Option<Cow<'_, str>> {
        if let Some(value) = self.attr_text(key) {
            return Some(value);
        }
        self.child("Properties")
            .and_then(|props| props.child(key))
            .and_then(|el| el.text())
    }

    /// Depth-first search for the first element with the given name,
    /// including `self`.
    pub fn find_first(&self, name: &str) -> Option<&XmlElement> {
        if self.name == name {
            return Some(self);
        }
        self.all_children().find_map(|child| child.find_first(name))
    }

    /// Walk the subtree depth-first. Returns `false` if the visitor stopped.
    pub fn walk<V: TreeVisitor + ?Sized>(&self, visitor: &mut V) -> bool {
        self.walk_at(visitor, 0)
    }

    fn walk_at<V: TreeVisitor + ?Sized>(&self, visitor: &mut V, depth: usize) -> bool {
        match visitor.enter(self, depth) {
            VisitAction::Stop => return false,
            VisitAction::SkipChildren => {}
            VisitAction::Continue => {
                for child in self.all_children() {
                    if !child.walk_at(visitor, depth + 1) {
                        return false;
                    }
                }
            }
        }
        visitor.leave(self, depth);
        true
    }
}
