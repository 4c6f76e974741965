//! Per-grammar node kind tables.
//!
//! The four grammars name the same concepts differently (`package_declaration`
//! in Java, `package_header` in Kotlin, `package_clause` in Scala). Extraction
//! is written once in [`super::extractor`] and driven by one of these tables,
//! selected from the file's [`super::Language`].

use tree_sitter::Node as TSNode;

use super::common::{extract_text, find_children_by_kinds, has_token};
use super::TypeKind;

/// How a declaration spells its supertypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InheritanceStyle {
    /// Separate `extends` and `implements` clauses (Java, Groovy).
    Clauses,
    /// Kotlin `: Base(), Iface` delegation specifiers; a constructor call marks the superclass.
    DelegationSpecifiers,
    /// Scala `extends A with B`; the first type is the superclass.
    ExtendsWith,
}

pub struct GrammarKinds {
    pub package_nodes: &'static [&'static str],
    pub import_nodes: &'static [&'static str],
    /// Dotted-name nodes that carry the package text.
    pub qualified_name_nodes: &'static [&'static str],
    pub type_nodes: &'static [(&'static str, TypeKind)],
    pub name_nodes: &'static [&'static str],
    pub modifier_nodes: &'static [&'static str],
    /// Modifier-like children that sit directly on the declaration.
    pub modifier_tokens: &'static [&'static str],
    pub annotation_nodes: &'static [&'static str],
    pub superclass_nodes: &'static [&'static str],
    pub interface_nodes: &'static [&'static str],
    pub type_list_nodes: &'static [&'static str],
    pub inheritance: InheritanceStyle,
    pub inheritance_nodes: &'static [&'static str],
    pub comment_nodes: &'static [&'static str],
    pub refine_kind: fn(&TSNode, &[u8], TypeKind) -> TypeKind,
}

impl GrammarKinds {
    pub fn type_kind(&self, node_kind: &str) -> Option<TypeKind> {
        self.type_nodes
            .iter()
            .find(|(kind, _)| *kind == node_kind)
            .map(|(_, type_kind)| *type_kind)
    }

    pub fn is_annotation(&self, node_kind: &str) -> bool {
        self.annotation_nodes.contains(&node_kind)
    }

    pub fn is_comment(&self, node_kind: &str) -> bool {
        self.comment_nodes.contains(&node_kind)
    }
}

pub static JAVA: GrammarKinds = GrammarKinds {
    package_nodes: &["package_declaration"],
    import_nodes: &["import_declaration"],
    qualified_name_nodes: &["scoped_identifier", "identifier"],
    type_nodes: &[
        ("class_declaration", TypeKind::Class),
        ("record_declaration", TypeKind::Class),
        ("interface_declaration", TypeKind::Interface),
        ("enum_declaration", TypeKind::Enum),
        ("annotation_type_declaration", TypeKind::Annotation),
    ],
    name_nodes: &["identifier"],
    modifier_nodes: &["modifiers"],
    modifier_tokens: &[],
    annotation_nodes: &["marker_annotation", "annotation"],
    superclass_nodes: &["superclass"],
    interface_nodes: &["super_interfaces", "extends_interfaces"],
    type_list_nodes: &["type_list"],
    inheritance: InheritanceStyle::Clauses,
    inheritance_nodes: &[],
    comment_nodes: &["line_comment", "block_comment"],
    refine_kind: keep_kind,
};

pub static KOTLIN: GrammarKinds = GrammarKinds {
    package_nodes: &["package_header"],
    import_nodes: &["import", "import_header"],
    qualified_name_nodes: &["qualified_identifier", "identifier"],
    type_nodes: &[
        ("class_declaration", TypeKind::Class),
        ("interface_declaration", TypeKind::Interface),
        ("object_declaration", TypeKind::Object),
    ],
    name_nodes: &["identifier", "type_identifier", "simple_identifier"],
    modifier_nodes: &["modifiers"],
    modifier_tokens: &[],
    annotation_nodes: &["annotation"],
    superclass_nodes: &[],
    interface_nodes: &[],
    type_list_nodes: &[],
    inheritance: InheritanceStyle::DelegationSpecifiers,
    inheritance_nodes: &["delegation_specifiers", "delegation_specifier"],
    comment_nodes: &["line_comment", "block_comment", "multiline_comment"],
    refine_kind: refine_kotlin,
};

pub static SCALA: GrammarKinds = GrammarKinds {
    package_nodes: &["package_clause"],
    import_nodes: &["import_declaration"],
    qualified_name_nodes: &["package_identifier", "stable_identifier", "identifier"],
    type_nodes: &[
        ("class_definition", TypeKind::Class),
        ("trait_definition", TypeKind::Interface),
        ("object_definition", TypeKind::Object),
        ("enum_definition", TypeKind::Enum),
    ],
    name_nodes: &["identifier"],
    modifier_nodes: &["modifiers"],
    modifier_tokens: &["case"],
    annotation_nodes: &["annotation"],
    superclass_nodes: &[],
    interface_nodes: &[],
    type_list_nodes: &[],
    inheritance: InheritanceStyle::ExtendsWith,
    inheritance_nodes: &["extends_clause"],
    comment_nodes: &["comment", "block_comment"],
    refine_kind: keep_kind,
};

pub static GROOVY: GrammarKinds = GrammarKinds {
    package_nodes: &["package_declaration", "groovy_package"],
    import_nodes: &["import_declaration", "groovy_import"],
    qualified_name_nodes: &["scoped_identifier", "qualified_name", "identifier"],
    type_nodes: &[
        ("class_declaration", TypeKind::Class),
        ("class_definition", TypeKind::Class),
        ("interface_declaration", TypeKind::Interface),
        ("interface_definition", TypeKind::Interface),
        ("enum_declaration", TypeKind::Enum),
        ("enum_definition", TypeKind::Enum),
        ("annotation_type_declaration", TypeKind::Annotation),
    ],
    name_nodes: &["identifier", "type_identifier"],
    modifier_nodes: &["modifiers"],
    modifier_tokens: &["access_modifier", "modifier"],
    annotation_nodes: &["marker_annotation", "annotation"],
    superclass_nodes: &["superclass"],
    interface_nodes: &["super_interfaces", "extends_interfaces", "interfaces"],
    type_list_nodes: &["type_list"],
    inheritance: InheritanceStyle::Clauses,
    inheritance_nodes: &[],
    comment_nodes: &["comment", "line_comment", "block_comment", "groovydoc_comment"],
    refine_kind: refine_keyword,
};

fn keep_kind(_node: &TSNode, _source: &[u8], kind: TypeKind) -> TypeKind {
    kind
}

/// Kotlin spells interfaces, enums and annotation classes as `class_declaration`.
fn refine_kotlin(node: &TSNode, source: &[u8], kind: TypeKind) -> TypeKind {
    if kind != TypeKind::Class {
        return kind;
    }
    if has_token(node, "interface") {
        return TypeKind::Interface;
    }
    for modifiers in find_children_by_kinds(node, &["modifiers"]) {
        let mut cursor = modifiers.walk();
        for modifier in modifiers.named_children(&mut cursor) {
            match extract_text(&modifier, source).trim() {
                "enum" => return TypeKind::Enum,
                "annotation" => return TypeKind::Annotation,
                _ => {}
            }
        }
    }
    kind
}

/// Grammars that reuse one declaration node and tell kinds apart by keyword.
fn refine_keyword(node: &TSNode, _source: &[u8], kind: TypeKind) -> TypeKind {
    if kind != TypeKind::Class {
        return kind;
    }
    if has_token(node, "interface") || has_token(node, "trait") {
        TypeKind::Interface
    } else if has_token(node, "enum") {
        TypeKind::Enum
    } else if has_token(node, "@interface") {
        TypeKind::Annotation
    } else {
        kind
    }
}
