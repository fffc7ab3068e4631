//! XML to generic key/value tree.
//!
//! Produces a `serde_json::Value` with these conventions:
//!
//! - attributes become `@name` keys
//! - an element holding only text becomes a string
//! - an empty element without attributes becomes `null`
//! - text next to child elements or attributes goes under `#text`
//! - repeated child names collapse into an array
//!
//! So `<title>Plain</title>` stays a string, while a title with inline
//! markup (`<title>On <i>x</i></title>`) becomes an object.

use crate::error::{MinerError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Value};

const TEXT_KEY: &str = "#text";

struct Frame {
    name: String,
    children: Map<String, Value>,
    text: String,
}

impl Frame {
    fn open(start: &BytesStart<'_>) -> Result<Self> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut children = Map::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| MinerError::Xml(e.to_string()))?;
            let key = format!("@{}", String::from_utf8_lossy(attr.key.as_ref()));
            let value = attr
                .unescape_value()
                .map_err(|e| MinerError::Xml(e.to_string()))?;
            children.insert(key, Value::String(value.into_owned()));
        }
        Ok(Self {
            name,
            children,
            text: String::new(),
        })
    }

    fn close(self) -> (String, Value) {
        let text = self.text.trim();
        let value = if self.children.is_empty() {
            if text.is_empty() {
                Value::Null
            } else {
                Value::String(text.to_string())
            }
        } else {
            let mut children = self.children;
            if !text.is_empty() {
                children.insert(TEXT_KEY.to_string(), Value::String(text.to_string()));
            }
            Value::Object(children)
        };
        (self.name, value)
    }
}

/// Insert `value` under `key`, turning repeats into an array
fn push_child(map: &mut Map<String, Value>, key: String, value: Value) {
    match map.get_mut(&key) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            map.insert(key, value);
        }
    }
}

/// Parse an XML document into a generic tree rooted at an object holding
/// the document element.
pub fn parse(xml: &str) -> Result<Value> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut root = Map::new();
    let mut stack: Vec<Frame> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => stack.push(Frame::open(e)?),
            Ok(Event::Empty(ref e)) => {
                let (name, value) = Frame::open(e)?.close();
                match stack.last_mut() {
                    Some(parent) => push_child(&mut parent.children, name, value),
                    None => push_child(&mut root, name, value),
                }
            }
            Ok(Event::End(_)) => {
                let frame = stack
                    .pop()
                    .ok_or_else(|| MinerError::Xml("unbalanced closing tag".to_string()))?;
                let (name, value) = frame.close();
                match stack.last_mut() {
                    Some(parent) => push_child(&mut parent.children, name, value),
                    None => push_child(&mut root, name, value),
                }
            }
            Ok(Event::Text(ref e)) => {
                if let Some(frame) = stack.last_mut() {
                    // Unknown entities are kept verbatim
                    match e.unescape() {
                        Ok(text) => frame.text.push_str(&text),
                        Err(_) => frame.text.push_str(&String::from_utf8_lossy(e.as_ref())),
                    }
                }
            }
            Ok(Event::CData(ref e)) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(MinerError::Xml(format!(
                    "at byte {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(MinerError::Xml("unexpected end of document".to_string()));
    }
    if root.is_empty() {
        return Err(MinerError::Xml("document has no root element".to_string()));
    }
    Ok(Value::Object(root))
}
