//! XML string-resource format adapter.
//!
//! Reads and writes Android-style resource files:
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <resources>
//!   <string name="app_title">Hello</string>
//! </resources>
//! ```
//!
//! Pull yields a single-level ordered object of name → text; push
//! serializes back with two-space indentation.

use color_eyre::eyre::eyre;
use locflow_core::Result;
use locflow_pipeline::{StageContext, Transform};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde_json::{Map, Value};

const ROOT_TAG: &str = "resources";
const ENTRY_TAG: &str = "string";
const NAME_ATTR: &str = "name";

#[derive(Debug, Default)]
pub struct XmlResourceFormat;

impl XmlResourceFormat {
    pub fn new() -> Self {
        XmlResourceFormat
    }

    fn parse(text: &str) -> Result<Map<String, Value>> {
        let mut out = Map::new();
        if text.trim().is_empty() {
            return Ok(out);
        }
        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(true);
        let mut buf = Vec::new();
        let mut current: Option<String> = None;
        let mut depth = 0usize;
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    depth += 1;
                    if depth == 2 && e.name().as_ref() == ENTRY_TAG.as_bytes() {
                        current = entry_name(&e)?;
                        if let Some(name) = &current {
                            out.insert(name.clone(), Value::String(String::new()));
                        }
                    }
                }
                Ok(Event::Empty(e)) => {
                    if depth == 1 && e.name().as_ref() == ENTRY_TAG.as_bytes() {
                        if let Some(name) = entry_name(&e)? {
                            out.insert(name, Value::String(String::new()));
                        }
                    }
                }
                Ok(Event::Text(t)) => {
                    if let Some(name) = &current {
                        let value = t
                            .unescape()
                            .unwrap_or_else(|_| {
                                std::borrow::Cow::Owned(
                                    String::from_utf8_lossy(t.as_ref()).into_owned(),
                                )
                            })
                            .to_string();
                        out.insert(name.clone(), Value::String(value));
                    }
                }
                Ok(Event::End(_)) => {
                    if depth == 2 {
                        current = None;
                    }
                    depth = depth.saturating_sub(1);
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(eyre!("malformed XML resource file: {e}")),
                _ => {}
            }
            buf.clear();
        }
        Ok(out)
    }

    fn serialize(entries: &Map<String, Value>) -> Result<String> {
        let mut w = Writer::new_with_indent(Vec::new(), b' ', 2);
        w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        w.write_event(Event::Start(BytesStart::new(ROOT_TAG)))?;
        for (name, value) in entries {
            let text = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            let mut tag = BytesStart::new(ENTRY_TAG);
            tag.push_attribute((NAME_ATTR, name.as_str()));
            w.write_event(Event::Start(tag))?;
            w.write_event(Event::Text(BytesText::new(&text)))?;
            w.write_event(Event::End(BytesEnd::new(ENTRY_TAG)))?;
        }
        w.write_event(Event::End(BytesEnd::new(ROOT_TAG)))?;
        let mut bytes = w.into_inner();
        bytes.push(b'\n');
        Ok(String::from_utf8(bytes)?)
    }
}

fn entry_name(e: &BytesStart<'_>) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr.map_err(|e| eyre!("malformed attribute: {e}"))?;
        if attr.key.as_ref() == NAME_ATTR.as_bytes() {
            let value = attr
                .unescape_value()
                .map_err(|e| eyre!("malformed attribute value: {e}"))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

impl Transform for XmlResourceFormat {
    fn name(&self) -> &'static str {
        "xml-resources"
    }

    fn pull(&mut self, _locale: &str, input: Value, _ctx: StageContext<'_>) -> Result<Value> {
        let text = input.as_str().unwrap_or_default();
        Ok(Value::Object(Self::parse(text)?))
    }

    fn push(&mut self, _locale: &str, data: Value, _ctx: StageContext<'_>) -> Result<Value> {
        let entries = match &data {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };
        Ok(Value::String(Self::serialize(&entries)?))
    }
}
