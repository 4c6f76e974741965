use tree_sitter::{Node as TSNode, Parser, Tree, TreeCursor};

use super::Language;
use crate::error::ParseError;

pub struct TreeSitterParser {
    parser: Parser,
}

impl TreeSitterParser {
    pub fn new(language: Language, grammar: &tree_sitter::Language) -> Result<Self, ParseError> {
        let mut parser = Parser::new();
        parser
            .set_language(grammar)
            .map_err(|err| ParseError::Grammar {
                language,
                reason: err.to_string(),
            })?;
        Ok(Self { parser })
    }

    pub fn parse(&mut self, source: &[u8]) -> Option<Tree> {
        self.parser.parse(source, None)
    }
}

pub fn extract_text<'a>(node: &TSNode, source: &'a [u8]) -> &'a str {
    std::str::from_utf8(&source[node.byte_range()]).unwrap_or("")
}

pub fn find_child_by_kind<'tree>(node: &TSNode<'tree>, kind: &str) -> Option<TSNode<'tree>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|child| child.kind() == kind);
    found
}

pub fn find_child_by_kinds<'tree>(node: &TSNode<'tree>, kinds: &[&str]) -> Option<TSNode<'tree>> {
    let mut cursor = node.walk();
    let found = node
        .named_children(&mut cursor)
        .find(|child| kinds.contains(&child.kind()));
    found
}

pub fn find_children_by_kinds<'tree>(node: &TSNode<'tree>, kinds: &[&str]) -> Vec<TSNode<'tree>> {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .filter(|child| kinds.contains(&child.kind()))
        .collect()
}

pub fn named_children<'tree>(node: &TSNode<'tree>) -> Vec<TSNode<'tree>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

/// Whether `node` has an anonymous (keyword) child spelled `token`.
pub fn has_token(node: &TSNode, token: &str) -> bool {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .any(|child| !child.is_named() && child.kind() == token);
    found
}

/// Depth-first, document-order walk over `root` and all of its descendants.
///
/// Driven by a [`TreeCursor`] rather than recursion, so nesting depth in the
/// source never grows the call stack.
pub struct Preorder<'tree> {
    cursor: TreeCursor<'tree>,
    done: bool,
}

impl<'tree> Preorder<'tree> {
    pub fn new(root: TSNode<'tree>) -> Self {
        Self {
            cursor: root.walk(),
            done: false,
        }
    }
}

impl<'tree> Iterator for Preorder<'tree> {
    type Item = TSNode<'tree>;

    fn next(&mut self) -> Option<TSNode<'tree>> {
        if self.done {
            return None;
        }
        let node = self.cursor.node();
        if !self.cursor.goto_first_child() {
            loop {
                if self.cursor.goto_next_sibling() {
                    break;
                }
                if !self.cursor.goto_parent() {
                    self.done = true;
                    break;
                }
            }
        }
        Some(node)
    }
}

pub fn preorder(root: TSNode<'_>) -> Preorder<'_> {
    Preorder::new(root)
}
