//! Pull-style node reader over quick-xml.
//!
//! Flattens quick-xml events into the four node kinds the element contexts
//! consume and maps byte offsets back to line/column pairs for diagnostics.

use crate::{DecodeError, Result};
use quick_xml::Reader;
use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::{BytesStart, Event};
use std::io::Cursor;
use tracing::trace;

/// A name/value attribute pair, value already unescaped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// Local name and attributes of an element start tag
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StartTag {
    pub name: String,
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Start(StartTag),
    End,
    Text(String),
    Eof,
}

/// Incremental offset to line/column conversion.
#[derive(Debug, Default)]
struct LineCursor {
    offset: usize,
    line: usize,
    column: usize,
}

impl LineCursor {
    fn advance_to(&mut self, data: &[u8], target: usize) -> (usize, usize) {
        let target = target.min(data.len());
        if target < self.offset || self.line == 0 {
            *self = LineCursor {
                offset: 0,
                line: 1,
                column: 1,
            };
        }
        for &byte in &data[self.offset..target] {
            if byte == b'\n' {
                self.line += 1;
                self.column = 1;
            } else if byte & 0xC0 != 0x80 {
                // count characters, not UTF-8 continuation bytes
                self.column += 1;
            }
        }
        self.offset = target;
        (self.line, self.column)
    }
}

pub struct XmlReader {
    reader: Reader<Cursor<Vec<u8>>>,
    buf: Vec<u8>,
    uri: String,
    cursor: LineCursor,
}

impl XmlReader {
    /// Create a reader over a complete document
    pub fn from_bytes(data: Vec<u8>, uri: impl Into<String>) -> Self {
        let mut reader = Reader::from_reader(Cursor::new(data));
        let config = reader.config_mut();
        config.trim_text(false);
        config.expand_empty_elements = true;
        config.check_end_names = true;
        Self {
            reader,
            buf: Vec::new(),
            uri: uri.into(),
            cursor: LineCursor::default(),
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Line and column of the current read position
    pub fn position(&mut self) -> (usize, usize) {
        let offset = self.reader.buffer_position() as usize;
        self.location(offset)
    }

    /// Line and column where the last syntax error was detected
    pub fn error_position(&mut self) -> (usize, usize) {
        let offset = self.reader.error_position() as usize;
        self.location(offset)
    }

    fn location(&mut self, offset: usize) -> (usize, usize) {
        let data = self.reader.get_ref().get_ref();
        self.cursor.advance_to(data, offset)
    }

    /// Read the next node, skipping comments, declarations and processing instructions
    ///
    /// Empty elements arrive as a start node followed by an end node.
    pub fn advance(&mut self) -> Result<Node> {
        loop {
            self.buf.clear();
            let node = match self.reader.read_event_into(&mut self.buf)? {
                Event::Start(e) | Event::Empty(e) => Node::Start(start_tag(&e)?),
                Event::End(_) => Node::End,
                Event::Text(e) => {
                    let text = e
                        .decode()
                        .map_err(|err| DecodeError::Malformed(err.to_string()))?;
                    Node::Text(text.into_owned())
                }
                Event::CData(e) => Node::Text(utf8(&e)?),
                Event::GeneralRef(e) => {
                    let raw = e
                        .decode()
                        .map_err(|err| DecodeError::Malformed(err.to_string()))?;
                    Node::Text(resolve_reference(&raw)?)
                }
                Event::Eof => Node::Eof,
                Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => continue,
            };
            trace!(?node, "xml node");
            return Ok(node);
        }
    }
}

fn start_tag(e: &BytesStart<'_>) -> Result<StartTag> {
    let name = utf8(e.local_name().as_ref())?;
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| DecodeError::Malformed(err.to_string()))?;
        let key = attr.key.as_ref();
        if key == b"xmlns" || key.starts_with(b"xmlns:") {
            continue;
        }
        attributes.push(Attribute {
            name: utf8(attr.key.local_name().as_ref())?,
            value: attr.unescape_value()?.into_owned(),
        });
    }
    Ok(StartTag { name, attributes })
}

fn utf8(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|err| DecodeError::Malformed(format!("invalid UTF-8: {err}")))
}

/// Resolve a predefined entity (`lt`) or a character reference (`#10`, `#x41`).
fn resolve_reference(raw: &str) -> Result<String> {
    if let Some(resolved) = resolve_xml_entity(raw) {
        return Ok(resolved.to_string());
    }
    let code = match raw.strip_prefix('#') {
        Some(rest) => match rest.strip_prefix('x').or_else(|| rest.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => rest.parse::<u32>().ok(),
        },
        None => None,
    };
    code.and_then(char::from_u32)
        .map(String::from)
        .ok_or_else(|| DecodeError::Malformed(format!("unknown entity reference '&{raw};'")))
}
