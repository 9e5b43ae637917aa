//! XML adapter: text ⇄ document tree
//!
//! Parsing is event driven with `quick-xml`. Open elements live on a stack of
//! frames; a frame collapses to [`Node::Text`] when it closes without attributes or
//! children, otherwise it becomes an [`Element`] appended to its parent (see
//! [`Element::append`] for how repeated names become lists).

use crate::tree::{ATTRIBUTE_PREFIX, Element, Node, TEXT_KEY, attribute_key};
use crate::{MergeError, Result};
use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

/// An element that has been opened but not closed yet
struct Frame {
    name: String,
    element: Element,
    text: String,
}

impl Frame {
    fn open(start: &BytesStart<'_>) -> Result<Self> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut element = Element::new();
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            element.insert(attribute_key(&key), Node::Text(value));
        }
        Ok(Self {
            name,
            element,
            text: String::new(),
        })
    }

    fn close(self) -> (String, Node) {
        let Frame {
            name,
            mut element,
            text,
        } = self;
        // Trimmed once per element, so whitespace between comment-split pieces survives
        let text = text.trim();
        let node = if element.is_empty() {
            Node::Text(text.to_string())
        } else {
            if !text.is_empty() {
                element.insert(TEXT_KEY, Node::Text(text.to_string()));
            }
            Node::Element(element)
        };
        (name, node)
    }
}

/// Parse XML text into a tree whose top-level element maps root names to nodes.
///
/// A GPX file therefore parses to `{ gpx: { @version, @creator, wpt: ..., trk: ... } }`.
/// The XML declaration, comments and processing instructions are dropped.
pub fn parse(text: &str) -> Result<Node> {
    #[cfg(feature = "profiling")]
    profiling::scope!("xml::parse");

    let mut reader = Reader::from_str(text);

    let mut root = Element::new();
    let mut stack: Vec<Frame> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(Frame::open(&start)?),
            Event::Empty(start) => {
                let (name, node) = Frame::open(&start)?.close();
                match stack.last_mut() {
                    Some(parent) => parent.element.append(name, node),
                    None => root.append(name, node),
                }
            }
            Event::Text(text) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&text.unescape()?);
                }
            }
            Event::CData(data) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::End(end) => {
                let frame = stack.pop().ok_or_else(|| {
                    MergeError::UnexpectedEnd(String::from_utf8_lossy(end.name().as_ref()).into_owned())
                })?;
                let (name, node) = frame.close();
                match stack.last_mut() {
                    Some(parent) => parent.element.append(name, node),
                    None => root.append(name, node),
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(frame) = stack.pop() {
        return Err(MergeError::UnclosedElement(frame.name));
    }

    Ok(Node::Element(root))
}

/// Serialize a tree produced by [`parse`] (or by the aggregate) back into XML.
///
/// The output starts with an XML declaration and is indented by two spaces.
pub fn write(document: &Node) -> Result<Vec<u8>> {
    #[cfg(feature = "profiling")]
    profiling::scope!("xml::write");

    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    match document {
        Node::Element(root) => {
            for (name, node) in root.iter() {
                write_node(&mut writer, name, node)?;
            }
        }
        Node::Text(_) | Node::List(_) => {
            return Err(MergeError::Malformed {
                section: "document",
                reason: "root must be an element mapping".to_string(),
            });
        }
    }

    Ok(writer.into_inner())
}

fn write_node(writer: &mut Writer<Vec<u8>>, name: &str, node: &Node) -> Result<()> {
    match node {
        Node::Text(text) if text.is_empty() => {
            writer.write_event(Event::Empty(BytesStart::new(name)))?;
        }
        Node::Text(text) => {
            writer.write_event(Event::Start(BytesStart::new(name)))?;
            writer.write_event(Event::Text(BytesText::new(text)))?;
            writer.write_event(Event::End(BytesEnd::new(name)))?;
        }
        Node::List(items) => {
            for item in items {
                write_node(writer, name, item)?;
            }
        }
        Node::Element(element) => {
            let mut start = BytesStart::new(name);
            let mut has_content = false;
            for (key, value) in element.iter() {
                match key.strip_prefix(ATTRIBUTE_PREFIX) {
                    Some(attr) => start.push_attribute((attr, value.as_text().unwrap_or_default())),
                    None => has_content = true,
                }
            }

            if !has_content {
                writer.write_event(Event::Empty(start))?;
                return Ok(());
            }

            writer.write_event(Event::Start(start))?;
            for (key, value) in element.iter() {
                if key.starts_with(ATTRIBUTE_PREFIX) {
                    continue;
                }
                if key == TEXT_KEY {
                    if let Some(text) = value.as_text() {
                        writer.write_event(Event::Text(BytesText::new(text)))?;
                    }
                    continue;
                }
                write_node(writer, key, value)?;
            }
            writer.write_event(Event::End(BytesEnd::new(name)))?;
        }
    }
    Ok(())
}
