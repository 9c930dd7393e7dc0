//! Owned element tree built from the transcoded XML with `quick-xml`.
//!
//! Lookups compare tag names ignoring ASCII case; well-formedness checks
//! (matching end tags, a single root) are exact.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::borrow::Cow;
use std::iter;
use thiserror::Error;

/// Deepest element nesting accepted. OFX statements stay far below this.
pub const MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum XmlError {
    #[error("{message} at position {position}")]
    Syntax { message: String, position: usize },
    #[error("unexpected end tag </{found}> at position {position}")]
    UnexpectedEnd { found: String, position: usize },
    #[error("expected </{expected}>, found </{found}> at position {position}")]
    MismatchedEnd {
        expected: String,
        found: String,
        position: usize,
    },
    #[error("element <{0}> is not closed")]
    Unclosed(String),
    #[error("document has more than one root element")]
    MultipleRoots,
    #[error("text outside the root element")]
    TextOutsideRoot,
    #[error("document has no root element")]
    NoRoot,
    #[error("elements nested deeper than {0} levels")]
    TooDeep(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub nodes: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        XmlElement {
            name: name.into(),
            nodes: Vec::new(),
        }
    }

    pub fn is(&self, tag: &str) -> bool {
        self.name.eq_ignore_ascii_case(tag)
    }

    /// Direct child elements, in document order.
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.nodes.iter().filter_map(|node| match node {
            XmlNode::Element(el) => Some(el),
            XmlNode::Text(_) => None,
        })
    }

    pub fn has_elements(&self) -> bool {
        self.elements().next().is_some()
    }

    pub fn child(&self, tag: &str) -> Option<&XmlElement> {
        self.elements().find(|el| el.is(tag))
    }

    pub fn children_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.elements().filter(move |el| el.is(tag))
    }

    /// All elements below this one in pre-order (document order), excluding
    /// `self`.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: vec![self.nodes.iter()],
        }
    }

    pub fn self_and_descendants(&self) -> impl Iterator<Item = &XmlElement> {
        iter::once(self).chain(self.descendants())
    }

    pub fn first_descendant(&self, tag: &str) -> Option<&XmlElement> {
        self.descendants().find(|el| el.is(tag))
    }

    /// Concatenated text of this element and everything below it.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.nodes {
            match node {
                XmlNode::Text(t) => out.push_str(t),
                XmlNode::Element(el) => el.collect_text(out),
            }
        }
    }
}

pub struct Descendants<'a> {
    stack: Vec<std::slice::Iter<'a, XmlNode>>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a XmlElement;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(top) = self.stack.last_mut() {
            match top.next() {
                Some(XmlNode::Element(el)) => {
                    self.stack.push(el.nodes.iter());
                    return Some(el);
                }
                Some(XmlNode::Text(_)) => {}
                None => {
                    self.stack.pop();
                }
            }
        }
        None
    }
}

/// Parses `xml` into its root element.
pub fn parse_document(xml: &str) -> Result<XmlElement, XmlError> {
    let mut reader = Reader::from_str(xml);
    reader.check_end_names(false);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => {
                return Err(XmlError::Syntax {
                    message: e.to_string(),
                    position: reader.buffer_position(),
                })
            }
        };

        match event {
            Event::Start(start) => {
                if stack.is_empty() && root.is_some() {
                    return Err(XmlError::MultipleRoots);
                }
                if stack.len() >= MAX_DEPTH {
                    return Err(XmlError::TooDeep(MAX_DEPTH));
                }
                stack.push(XmlElement::new(lossy(start.name().as_ref())));
            }
            Event::Empty(start) => {
                if stack.len() >= MAX_DEPTH {
                    return Err(XmlError::TooDeep(MAX_DEPTH));
                }
                attach(&mut stack, &mut root, XmlElement::new(lossy(start.name().as_ref())))?;
            }
            Event::End(end) => {
                let found = lossy(end.name().as_ref());
                let position = reader.buffer_position();
                let element = stack
                    .pop()
                    .ok_or_else(|| XmlError::UnexpectedEnd {
                        found: found.clone(),
                        position,
                    })?;
                if element.name != found {
                    return Err(XmlError::MismatchedEnd {
                        expected: element.name,
                        found,
                        position,
                    });
                }
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                // Bare '&' is common in bank payee names; keep such text as-is.
                let value = text
                    .unescape()
                    .map(Cow::into_owned)
                    .unwrap_or_else(|_| lossy(&text));
                push_text(&mut stack, value)?;
            }
            Event::CData(data) => push_text(&mut stack, lossy(&data))?,
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(XmlError::Unclosed(open.name));
    }
    root.ok_or(XmlError::NoRoot)
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<(), XmlError> {
    match stack.last_mut() {
        Some(parent) => parent.nodes.push(XmlNode::Element(element)),
        None if root.is_some() => return Err(XmlError::MultipleRoots),
        None => *root = Some(element),
    }
    Ok(())
}

fn push_text(stack: &mut [XmlElement], value: String) -> Result<(), XmlError> {
    match stack.last_mut() {
        Some(parent) => parent.nodes.push(XmlNode::Text(value)),
        None if value.trim().is_empty() => {}
        None => return Err(XmlError::TextOutsideRoot),
    }
    Ok(())
}
