//! Minimal XML element tree for build descriptors.
//!
//! Descriptors are parsed with the tree-sitter XML grammar and lowered into
//! owned [`XmlElement`]s so the Maven, Ant and Ivy readers can query them by
//! local element name without touching syntax nodes.

use thiserror::Error;
use tree_sitter::{Node as TSNode, Parser};

use crate::parsers::common::{extract_text, find_child_by_kind};

#[derive(Debug, Error)]
pub enum MarkupError {
    #[error("XML grammar could not be loaded: {0}")]
    Grammar(String),
    #[error("document could not be parsed")]
    NoTree,
    #[error("syntax error near line {line}")]
    Syntax { line: usize },
    #[error("document has no root element")]
    NoRoot,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// Element name without any namespace prefix.
    pub fn local_name(&self) -> &str {
        local(&self.name)
    }

    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|child| child.local_name() == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children
            .iter()
            .filter(move |child| child.local_name() == name)
    }

    /// Every descendant element with the given local name, in document order.
    pub fn descendants_named<'a>(&'a self, name: &str) -> Vec<&'a XmlElement> {
        let mut found = Vec::new();
        let mut stack: Vec<&XmlElement> = self.children.iter().rev().collect();
        while let Some(element) = stack.pop() {
            if element.local_name() == name {
                found.push(element);
            }
            stack.extend(element.children.iter().rev());
        }
        found
    }

    /// Trimmed text of the named child; `None` when absent or blank.
    pub fn child_text(&self, name: &str) -> Option<String> {
        self.child(name)
            .map(|child| child.text.trim())
            .filter(|text| !text.is_empty())
            .map(str::to_string)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| local(key) == name)
            .map(|(_, value)| value.as_str())
    }
}

fn local(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

pub fn parse_document(source: &str) -> Result<XmlElement, MarkupError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_xml::LANGUAGE_XML.into())
        .map_err(|err| MarkupError::Grammar(err.to_string()))?;
    let tree = parser.parse(source, None).ok_or(MarkupError::NoTree)?;
    let root = tree.root_node();
    if root.has_error() {
        return Err(MarkupError::Syntax {
            line: first_error_line(root),
        });
    }

    let element = find_child_by_kind(&root, "element").ok_or(MarkupError::NoRoot)?;
    Ok(lower_element(&element, source.as_bytes()))
}

fn first_error_line(root: TSNode) -> usize {
    crate::parsers::common::preorder(root)
        .find(|node| node.is_error() || node.is_missing())
        .map(|node| node.start_position().row + 1)
        .unwrap_or(1)
}

fn lower_element(node: &TSNode, source: &[u8]) -> XmlElement {
    let mut element = XmlElement::default();
    let mut cursor = node.walk();
    for part in node.children(&mut cursor) {
        match part.kind() {
            "STag" | "EmptyElemTag" => read_tag(&part, source, &mut element),
            "content" => {
                let mut content_cursor = part.walk();
                for item in part.children(&mut content_cursor) {
                    read_content(&item, source, &mut element);
                }
            }
            _ => read_content(&part, source, &mut element),
        }
    }
    element
}

fn read_tag(tag: &TSNode, source: &[u8], element: &mut XmlElement) {
    let mut cursor = tag.walk();
    for part in tag.children(&mut cursor) {
        match part.kind() {
            "Name" => element.name = extract_text(&part, source).to_string(),
            "Attribute" => {
                let key = find_child_by_kind(&part, "Name")
                    .map(|name| extract_text(&name, source).to_string())
                    .unwrap_or_default();
                let value = find_child_by_kind(&part, "AttValue")
                    .map(|value| {
                        let raw = extract_text(&value, source);
                        let unquoted = raw
                            .strip_prefix(&['"', '\''][..])
                            .and_then(|v| v.strip_suffix(&['"', '\''][..]))
                            .unwrap_or(raw);
                        decode_entities(unquoted)
                    })
                    .unwrap_or_default();
                element.attributes.push((key, value));
            }
            _ => {}
        }
    }
}

fn read_content(part: &TSNode, source: &[u8], element: &mut XmlElement) {
    match part.kind() {
        "element" => element.children.push(lower_element(part, source)),
        "CharData" => element.text.push_str(extract_text(part, source)),
        "EntityRef" | "CharRef" | "Reference" => {
            element.text.push_str(&decode_entities(extract_text(part, source)))
        }
        "CDSect" => {
            let raw = extract_text(part, source);
            let inner = raw
                .strip_prefix("<![CDATA[")
                .and_then(|v| v.strip_suffix("]]>"))
                .unwrap_or(raw);
            element.text.push_str(inner);
        }
        _ => {}
    }
}

pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let Some(end) = after.find(';') else {
            out.push_str(&rest[start..]);
            return out;
        };
        let entity = &after[..end];
        let decoded = match entity {
            "lt" => Some('<'),
            "gt" => Some('>'),
            "amp" => Some('&'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => entity
                .strip_prefix("#x")
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                .and_then(char::from_u32),
        };
        match decoded {
            Some(c) => out.push(c),
            None => out.push_str(&rest[start..start + end + 2]),
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    out
}
