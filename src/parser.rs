//! TEI-XML document loader.
//!
//! Builds a small owned element tree from quick-xml events. Element and
//! attribute names are stored by their local part only, so `xml:id` is looked
//! up as `id` and `tei:title` as `title`.

use crate::config::MAX_ELEMENT_DEPTH;
use crate::error::{ExtractError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    fn from_start(start: &BytesStart<'_>, position: usize) -> Result<Self> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let mut attributes = Vec::new();

        for attr in start.attributes() {
            let attr = attr.map_err(|e| ExtractError::malformed(position, e.to_string()))?;
            // xmlns declarations are not data
            if attr.key.as_namespace_binding().is_some() {
                continue;
            }
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| ExtractError::malformed(position, e.to_string()))?
                .into_owned();
            attributes.push((key, value));
        }

        Ok(Self {
            name,
            attributes,
            children: Vec::new(),
        })
    }

    /// Local element name, without any namespace prefix.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attribute value by local name, ignoring any namespace prefix.
    pub fn attr(&self, local_name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == local_name)
            .map(|(_, value)| value.as_str())
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        })
    }

    /// All descendant elements in document order (pre-order), excluding `self`.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: vec![self.children.iter()],
        }
    }

    /// Concatenated text of every descendant text node, unmodified.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(text) => out.push_str(text),
                Node::Element(el) => el.collect_text(out),
            }
        }
    }
}

pub struct Descendants<'a> {
    stack: Vec<std::slice::Iter<'a, Node>>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<&'a Element> {
        while let Some(iter) = self.stack.last_mut() {
            match iter.next() {
                Some(Node::Element(el)) => {
                    self.stack.push(el.children.iter());
                    return Some(el);
                }
                Some(Node::Text(_)) => {}
                None => {
                    self.stack.pop();
                }
            }
        }
        None
    }
}

/// A parsed TEI document. Owns its whole tree; nothing is shared between documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeiDocument {
    root: Element,
}

impl TeiDocument {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let xml = std::str::from_utf8(bytes).map_err(|e| {
            ExtractError::malformed(e.valid_up_to(), "input is not valid UTF-8")
        })?;
        Self::parse(xml)
    }

    pub fn parse(xml: &str) -> Result<Self> {
        let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
        let mut reader = Reader::from_str(xml);
        reader.trim_text(false);
        reader.check_end_names(true);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let position = reader.buffer_position();
            match reader.read_event() {
                Ok(Event::Start(start)) => {
                    if root.is_some() {
                        return Err(ExtractError::malformed(
                            position,
                            "content after the root element",
                        ));
                    }
                    check_depth(stack.len() + 1, position)?;
                    stack.push(Element::from_start(&start, position)?);
                }
                Ok(Event::Empty(start)) => {
                    check_depth(stack.len() + 1, position)?;
                    let el = Element::from_start(&start, position)?;
                    attach(&mut stack, &mut root, el, position)?;
                }
                Ok(Event::End(_)) => {
                    let el = stack.pop().ok_or_else(|| {
                        ExtractError::malformed(position, "closing tag without an open element")
                    })?;
                    attach(&mut stack, &mut root, el, position)?;
                }
                Ok(Event::Text(text)) => {
                    let text = text
                        .unescape()
                        .map_err(|e| ExtractError::malformed(position, e.to_string()))?;
                    push_text(&mut stack, text.into_owned(), position)?;
                }
                Ok(Event::CData(cdata)) => {
                    let text = String::from_utf8(cdata.into_inner().into_owned())
                        .map_err(|_| ExtractError::malformed(position, "CDATA is not valid UTF-8"))?;
                    push_text(&mut stack, text, position)?;
                }
                Ok(Event::Eof) => break,
                // declarations, comments, processing instructions, doctype
                Ok(_) => {}
                Err(e) => {
                    return Err(ExtractError::malformed(
                        reader.buffer_position(),
                        e.to_string(),
                    ))
                }
            }
        }

        if let Some(open) = stack.last() {
            return Err(ExtractError::malformed(
                reader.buffer_position(),
                format!("unclosed element <{}>", open.name()),
            ));
        }

        let root = root.ok_or_else(|| {
            ExtractError::malformed(reader.buffer_position(), "document has no root element")
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Element {
        &self.root
    }
}

/// Tree drop and text collection recurse per level, so nesting is bounded.
fn check_depth(depth: usize, position: usize) -> Result<()> {
    if depth > MAX_ELEMENT_DEPTH {
        return Err(ExtractError::malformed(
            position,
            format!("element nesting exceeds {} levels", MAX_ELEMENT_DEPTH),
        ));
    }
    Ok(())
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    el: Element,
    position: usize,
) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(Node::Element(el));
    } else if root.is_some() {
        return Err(ExtractError::malformed(
            position,
            "content after the root element",
        ));
    } else {
        *root = Some(el);
    }
    Ok(())
}

fn push_text(stack: &mut [Element], text: String, position: usize) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(Node::Text(text));
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(ExtractError::malformed(
            position,
            "text outside the root element",
        )),
    }
}
