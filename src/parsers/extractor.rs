use std::path::Path;
use tree_sitter::{Node as TSNode, Tree};

use super::common::{
    extract_text, find_child_by_kinds, find_children_by_kinds, named_children, preorder,
};
use super::grammar::{GrammarKinds, InheritanceStyle};
use super::{ImportDecl, Language, ParsedFile, TypeDeclaration};

/// Walks a syntax tree and pulls out package, imports and type declarations.
pub struct ClassExtractor {
    language: Language,
    kinds: &'static GrammarKinds,
}

impl ClassExtractor {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            kinds: language.grammar(),
        }
    }

    /// Returns `None` when the file declares no types.
    pub fn extract(&self, tree: &Tree, source: &[u8], path: &Path) -> Option<ParsedFile> {
        let root = tree.root_node();
        let package = self.extract_package(root, source);
        let declarations = self.extract_declarations(root, source, &package);
        if declarations.is_empty() {
            return None;
        }

        Some(ParsedFile {
            path: path.to_path_buf(),
            language: self.language,
            package,
            imports: self.extract_imports(root, source),
            declarations,
        })
    }

    pub fn extract_package(&self, root: TSNode, source: &[u8]) -> String {
        let Some(package_node) = preorder(root)
            .find(|node| node.is_named() && self.kinds.package_nodes.contains(&node.kind()))
        else {
            return String::new();
        };

        if let Some(name) = find_child_by_kinds(&package_node, self.kinds.qualified_name_nodes) {
            return compact(extract_text(&name, source));
        }

        // Grammars without a dedicated name node: take the token after `package`.
        let text = extract_text(&package_node, source).trim_start();
        let text = text.strip_prefix("package").unwrap_or(text);
        text.split(|c: char| c == ';' || c == '{' || c == '\n')
            .next()
            .map(compact)
            .unwrap_or_default()
    }

    pub fn extract_imports(&self, root: TSNode, source: &[u8]) -> Vec<ImportDecl> {
        preorder(root)
            .filter(|node| node.is_named() && self.kinds.import_nodes.contains(&node.kind()))
            .flat_map(|node| parse_import(extract_text(&node, source)))
            .collect()
    }

    pub fn extract_declarations(
        &self,
        root: TSNode,
        source: &[u8],
        package: &str,
    ) -> Vec<TypeDeclaration> {
        preorder(root)
            .filter(|node| node.is_named())
            .filter_map(|node| {
                let kind = self.kinds.type_kind(node.kind())?;
                self.process_declaration(&node, source, package, kind)
            })
            .collect()
    }

    fn process_declaration(
        &self,
        node: &TSNode,
        source: &[u8],
        package: &str,
        kind: super::TypeKind,
    ) -> Option<TypeDeclaration> {
        let name = self.declaration_name(node, source)?;
        let kind = (self.kinds.refine_kind)(node, source, kind);
        let (superclass, interfaces) = self.supertypes(node, source);

        Some(TypeDeclaration {
            name,
            package: package.to_string(),
            kind,
            modifiers: self.modifiers(node, source),
            annotations: self.annotations(node, source),
            superclass,
            interfaces,
        })
    }

    fn declaration_name(&self, node: &TSNode, source: &[u8]) -> Option<String> {
        let name_node = node
            .child_by_field_name("name")
            .or_else(|| find_child_by_kinds(node, self.kinds.name_nodes))?;
        let name = extract_text(&name_node, source).trim().trim_matches('`');
        (!name.is_empty()).then(|| name.to_string())
    }

    /// Annotations from the siblings directly above the declaration, from the
    /// declaration's own children and from inside its modifiers block.
    fn annotations(&self, node: &TSNode, source: &[u8]) -> Vec<String> {
        let mut preceding = Vec::new();
        let mut sibling = node.prev_sibling();
        while let Some(current) = sibling {
            if self.kinds.is_annotation(current.kind()) {
                preceding.push(current);
            } else if !self.kinds.is_comment(current.kind()) {
                break;
            }
            sibling = current.prev_sibling();
        }
        preceding.reverse();

        let mut candidates = preceding;
        candidates.extend(find_children_by_kinds(node, self.kinds.annotation_nodes));
        for modifiers in find_children_by_kinds(node, self.kinds.modifier_nodes) {
            candidates.extend(find_children_by_kinds(&modifiers, self.kinds.annotation_nodes));
        }

        let mut annotations: Vec<String> = Vec::new();
        for candidate in candidates {
            if let Some(name) = annotation_name(extract_text(&candidate, source)) {
                if !annotations.contains(&name) {
                    annotations.push(name);
                }
            }
        }
        annotations
    }

    fn modifiers(&self, node: &TSNode, source: &[u8]) -> Vec<String> {
        let mut modifiers = Vec::new();
        for block in find_children_by_kinds(node, self.kinds.modifier_nodes) {
            let mut cursor = block.walk();
            for child in block.children(&mut cursor) {
                if self.kinds.is_annotation(child.kind()) || self.kinds.is_comment(child.kind()) {
                    continue;
                }
                let text = extract_text(&child, source).trim();
                if !text.is_empty() {
                    modifiers.push(text.to_string());
                }
            }
        }
        for token in find_children_by_kinds(node, self.kinds.modifier_tokens) {
            let text = extract_text(&token, source).trim();
            if !text.is_empty() {
                modifiers.push(text.to_string());
            }
        }
        modifiers
    }

    fn supertypes(&self, node: &TSNode, source: &[u8]) -> (Option<String>, Vec<String>) {
        match self.kinds.inheritance {
            InheritanceStyle::Clauses => {
                let superclass = match node.child_by_field_name("superclass") {
                    Some(field) if self.kinds.superclass_nodes.contains(&field.kind()) => {
                        self.clause_types(&field, source).into_iter().next()
                    }
                    Some(field) => type_name(extract_text(&field, source)),
                    None => find_children_by_kinds(node, self.kinds.superclass_nodes)
                        .first()
                        .and_then(|clause| self.clause_types(clause, source).into_iter().next()),
                };

                let interfaces = match node.child_by_field_name("interfaces") {
                    Some(field) => self.clause_types(&field, source),
                    None => find_children_by_kinds(node, self.kinds.interface_nodes)
                        .iter()
                        .flat_map(|clause| self.clause_types(clause, source))
                        .collect(),
                };
                (superclass, interfaces)
            }
            InheritanceStyle::DelegationSpecifiers => {
                let mut superclass = None;
                let mut interfaces = Vec::new();
                for specifier in self.inheritance_entries(node) {
                    let text = extract_text(&specifier, source);
                    let Some(name) = type_name(text) else {
                        continue;
                    };
                    let is_constructor_call = specifier.kind() == "constructor_invocation"
                        || named_children(&specifier)
                            .first()
                            .is_some_and(|child| child.kind() == "constructor_invocation")
                        || (text.trim_end().ends_with(')') && !text.contains(" by "));
                    if is_constructor_call && superclass.is_none() {
                        superclass = Some(name);
                    } else {
                        interfaces.push(name);
                    }
                }
                (superclass, interfaces)
            }
            InheritanceStyle::ExtendsWith => {
                let mut types = find_children_by_kinds(node, self.kinds.inheritance_nodes)
                    .iter()
                    .flat_map(|clause| self.clause_types(clause, source))
                    .collect::<Vec<_>>()
                    .into_iter();
                let superclass = types.next();
                (superclass, types.collect())
            }
        }
    }

    /// Kotlin specifiers, whether or not the grammar wraps them in a list node.
    fn inheritance_entries<'tree>(&self, node: &TSNode<'tree>) -> Vec<TSNode<'tree>> {
        let mut entries = Vec::new();
        for child in find_children_by_kinds(node, self.kinds.inheritance_nodes) {
            if child.kind() == "delegation_specifiers" {
                entries.extend(
                    named_children(&child)
                        .into_iter()
                        .filter(|entry| !self.kinds.is_comment(entry.kind())),
                );
            } else {
                entries.push(child);
            }
        }
        entries
    }

    /// Type names listed under an inheritance clause, in source order.
    fn clause_types(&self, clause: &TSNode, source: &[u8]) -> Vec<String> {
        let mut names = Vec::new();
        for child in named_children(clause) {
            let kind = child.kind();
            if self.kinds.is_comment(kind) || ARGUMENT_NODES.contains(&kind) {
                continue;
            }
            if self.kinds.type_list_nodes.contains(&kind) {
                names.extend(
                    named_children(&child)
                        .iter()
                        .filter(|item| !self.kinds.is_comment(item.kind()))
                        .filter_map(|item| type_name(extract_text(item, source))),
                );
            } else if let Some(name) = type_name(extract_text(&child, source)) {
                names.push(name);
            }
        }
        names
    }
}

const ARGUMENT_NODES: &[&str] = &["arguments", "value_arguments", "type_arguments"];

fn compact(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// The identifier right after `@`: `@RestController("x")` gives `RestController`.
pub fn annotation_name(text: &str) -> Option<String> {
    let rest = text.trim_start().strip_prefix('@')?.trim_start();
    let name: String = rest
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == '$')
        .collect();
    (!name.is_empty()).then_some(name)
}

/// Reduce a type expression to its (possibly qualified) name:
/// `Base<T>(arg)` gives `Base`, `a.b.Repo[Int]` gives `a.b.Repo`.
pub fn type_name(text: &str) -> Option<String> {
    let mut text = text.trim();
    // Type-use annotations such as `@NonNull Foo`.
    while text.starts_with('@') {
        text = text
            .split_once(char::is_whitespace)
            .map(|(_, rest)| rest.trim_start())
            .unwrap_or("");
    }
    let end = text
        .find(|c: char| "<([{".contains(c) || c.is_whitespace())
        .unwrap_or(text.len());
    let name = text[..end].trim_end_matches('?').trim_matches('`');
    let starts_like_identifier = name
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$');
    starts_like_identifier.then(|| name.to_string())
}

/// Normalise one import statement's text. Scala selector imports
/// (`a.b.{C, D => E}`) and comma lists expand into several entries.
pub fn parse_import(text: &str) -> Vec<ImportDecl> {
    let mut body = text.trim();
    body = body.strip_prefix("import").unwrap_or(body).trim();
    body = body.trim_end_matches(';').trim();

    let is_static = match body.strip_prefix("static") {
        Some(rest) if rest.starts_with(char::is_whitespace) => {
            body = rest.trim_start();
            true
        }
        _ => false,
    };

    let mut imports = Vec::new();
    for expression in split_top_level(body) {
        let expression = expression.trim();
        if expression.is_empty() {
            continue;
        }
        match expression.split_once('{') {
            Some((prefix, selectors)) => {
                let prefix = compact(prefix);
                let selectors = selectors.trim_end_matches('}');
                for selector in selectors.split(',') {
                    let selector = selector.trim();
                    let selected = selector
                        .split("=>")
                        .next()
                        .unwrap_or(selector)
                        .split(" as ")
                        .next()
                        .unwrap_or(selector)
                        .trim();
                    match selected {
                        "" => {}
                        "_" | "*" => {
                            imports.push(finish(prefix.trim_end_matches('.'), true, is_static))
                        }
                        s if s.starts_with("given") => {}
                        s => imports.push(finish(&format!("{prefix}{s}"), false, is_static)),
                    }
                }
            }
            None => {
                let path = expression.split(" as ").next().unwrap_or(expression);
                let path = compact(path);
                if let Some(stem) = path.strip_suffix(".*").or_else(|| path.strip_suffix("._")) {
                    imports.push(finish(stem, true, is_static));
                } else if !path.is_empty() {
                    imports.push(finish(&path, false, is_static));
                }
            }
        }
    }
    imports
}

fn finish(path: &str, wildcard: bool, is_static: bool) -> ImportDecl {
    let mut import = ImportDecl::new(path);
    if wildcard {
        import = import.wildcard();
    }
    if is_static {
        import = import.static_member();
    }
    import
}

fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (idx, c) in text.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&text[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}
