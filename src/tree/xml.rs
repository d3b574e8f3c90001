//! Build generic trees from raw XML text with quick-xml.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::{Scalar, XmlElement};
use crate::error::{Error, Result};

struct Frame {
    element: XmlElement,
    text: String,
}

impl Frame {
    fn finish(self) -> XmlElement {
        let Frame { mut element, text } = self;
        if !element.has_children() {
            // Leaf text is kept verbatim; typing it would lose leading zeros
            // and whitespace that story content depends on.
            if !text.is_empty() {
                element.text = Some(Scalar::Text(text));
            }
        } else {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                element.text = Some(Scalar::Text(trimmed.to_string()));
            }
        }
        element
    }
}

/// Parse one XML file into its root element.
///
/// Processing instructions, comments and the declaration are dropped.
/// Attribute values are typed with [`Scalar::infer`].
pub fn parse_xml(path: &str, source: &str) -> Result<XmlElement> {
    let malformed = |message: String| Error::MalformedXml {
        file: path.to_string(),
        message,
    };

    let mut reader = Reader::from_str(source);
    reader.trim_text(false);

    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let position = reader.buffer_position();
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let element = start_element(&e).map_err(&malformed)?;
                stack.push(Frame {
                    element,
                    text: String::new(),
                });
            }
            Ok(Event::Empty(e)) => {
                let element = start_element(&e).map_err(&malformed)?;
                attach(&mut stack, &mut root, element).map_err(&malformed)?;
            }
            Ok(Event::End(_)) => {
                let frame = stack
                    .pop()
                    .ok_or_else(|| malformed(format!("unexpected end tag at byte {}", position)))?;
                attach(&mut stack, &mut root, frame.finish()).map_err(&malformed)?;
            }
            Ok(Event::Text(t)) => {
                if let Some(frame) = stack.last_mut() {
                    let text = t
                        .unescape()
                        .map_err(|e| malformed(format!("at byte {}: {}", position, e)))?;
                    frame.text.push_str(&text);
                }
            }
            Ok(Event::CData(c)) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(malformed(format!("at byte {}: {}", position, e))),
        }
    }

    if let Some(open) = stack.last() {
        return Err(malformed(format!("unclosed element <{}>", open.element.name)));
    }
    root.ok_or_else(|| malformed("no root element".to_string()))
}

fn start_element(start: &BytesStart<'_>) -> std::result::Result<XmlElement, String> {
    let mut element = XmlElement::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    for attr in start.attributes() {
        let attr = attr.map_err(|e| format!("bad attribute on <{}>: {}", element.name, e))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| format!("bad attribute value {}: {}", key, e))?;
        element.attributes.insert(key, Scalar::infer(&value));
    }
    Ok(element)
}

fn attach(
    stack: &mut [Frame],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> std::result::Result<(), String> {
    match stack.last_mut() {
        Some(parent) => {
            parent.element.push_child(element);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(format!("second root element <{}>", element.name)),
    }
}
