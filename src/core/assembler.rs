use chrono::Utc;
use std::collections::{BTreeSet, HashMap};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

use super::classify::{detect_layer, extract_feature};
use super::graph::{
    module_id, system_id, Edge, EdgeKind, GraphBuilder, GraphNode, GraphStats, KnowledgeGraph,
    Metadata, ModuleNode, SystemNode, TypeNode,
};
use super::resolver::NameResolver;
use crate::build::{BuildModule, Detection};
use crate::error::Diagnostics;
use crate::parsers::{ImportDecl, Language, ParsedFile, TypeDeclaration};

pub const GENERATOR: &str = concat!("jvmgraph ", env!("CARGO_PKG_VERSION"));

/// Merges module records and parsed files into one [`KnowledgeGraph`].
pub struct GraphAssembler {
    project_name: String,
    root: PathBuf,
    builder: GraphBuilder,
    /// Module name to node id, first module of a name wins.
    module_ids: HashMap<String, String>,
}

impl GraphAssembler {
    pub fn new(project_name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            project_name: project_name.into(),
            root: root.into(),
            builder: GraphBuilder::new(),
            module_ids: HashMap::new(),
        }
    }

    pub fn assemble(
        mut self,
        detection: &Detection,
        parsed_files: &[ParsedFile],
        files_discovered: usize,
        diagnostics: Diagnostics,
    ) -> KnowledgeGraph {
        let system = system_id(&self.project_name);
        self.builder.add_node(GraphNode::System(SystemNode {
            id: system.clone(),
            name: self.project_name.clone(),
        }));

        for module in &detection.modules {
            self.add_module(&system, module);
        }
        for file in parsed_files {
            let owner = self.owning_module(&detection.modules, &file.path);
            for declaration in &file.declarations {
                self.add_declaration(file, declaration, owner.as_deref());
            }
        }
        for module in &detection.modules {
            self.add_module_edges(module);
        }

        let (nodes, edges) = self.builder.build();
        let stats = GraphStats::compute(&nodes, &edges, files_discovered, parsed_files.len());
        let languages: BTreeSet<Language> = nodes
            .iter()
            .filter_map(GraphNode::as_type)
            .map(|node| node.language)
            .collect();

        info!(
            nodes = nodes.len(),
            edges = edges.len(),
            types = stats.types,
            modules = stats.modules,
            "graph assembled"
        );

        KnowledgeGraph {
            metadata: Metadata {
                project: self.project_name,
                root: self.root,
                build_system: detection.build_system,
                languages: languages.into_iter().collect(),
                generator: GENERATOR.to_string(),
                generated_at: Utc::now().to_rfc3339(),
            },
            stats,
            nodes,
            edges,
            diagnostics: diagnostics.into_vec(),
        }
    }

    fn add_module(&mut self, system: &str, module: &BuildModule) {
        let id = module_id(&module.name);
        let added = self.builder.add_node(GraphNode::Module(ModuleNode {
            id: id.clone(),
            name: module.name.clone(),
            group_id: module.group.clone(),
            version: module.version.clone(),
            path: module.path.clone(),
            build_system: module.build_system,
            properties: module.properties.clone(),
            submodules: module.submodules.clone(),
            parent: module.parent.clone(),
        }));
        if !added {
            debug!(
                module = %module.name,
                path = %module.path.display(),
                "duplicate module name, keeping first"
            );
            return;
        }
        self.module_ids.insert(module.name.clone(), id.clone());
        self.builder.add_edge(Edge::new(EdgeKind::Contains, system, id));
    }

    /// Module owning `file`: the deepest module directory containing it,
    /// else the first module whose directory name is a segment of the path.
    fn owning_module(&self, modules: &[BuildModule], file: &Path) -> Option<String> {
        let absolute = self.root.join(file);
        let known = modules
            .iter()
            .filter(|module| self.module_ids.contains_key(&module.name));

        let by_directory = known
            .clone()
            .filter(|module| {
                !module.path.as_os_str().is_empty() && absolute.starts_with(&module.path)
            })
            .max_by_key(|module| module.path.components().count());
        if let Some(module) = by_directory {
            return Some(module.name.clone());
        }

        let segments: Vec<&str> = file
            .components()
            .filter_map(|component| match component {
                Component::Normal(segment) => segment.to_str(),
                _ => None,
            })
            .collect();
        known
            .filter(|module| segments.contains(&module.directory_name().as_str()))
            .map(|module| module.name.clone())
            .next()
    }

    fn add_declaration(
        &mut self,
        file: &ParsedFile,
        declaration: &TypeDeclaration,
        owner: Option<&str>,
    ) {
        let id = declaration.qualified_name();

        if let Some(GraphNode::Type(existing)) = self.builder.node_mut(&id) {
            let merged: BTreeSet<String> = existing
                .annotations
                .drain(..)
                .chain(declaration.annotations.iter().cloned())
                .collect();
            existing.annotations = merged.into_iter().collect();
            debug!(id = %id, file = %file.path.display(), "type seen again, annotations merged");
        } else {
            let layer = detect_layer(&declaration.package, &declaration.name);
            self.builder.add_node(GraphNode::Type(TypeNode {
                id: id.clone(),
                name: declaration.name.clone(),
                package: declaration.package.clone(),
                kind: declaration.kind,
                modifiers: declaration.modifiers.clone(),
                annotations: declaration.annotations.clone(),
                superclass: declaration.superclass.clone(),
                interfaces: declaration.interfaces.clone(),
                layer: layer.to_string(),
                feature: extract_feature(&declaration.package, &declaration.name),
                module: owner.map(str::to_string),
                language: file.language,
                file: file.path.clone(),
            }));
        }

        if let Some(owner) = owner {
            self.builder.add_edge(Edge::new(EdgeKind::Contains, module_id(owner), id.clone()));
        }

        let resolver = NameResolver::for_file(file);
        if let Some(superclass) = &declaration.superclass {
            self.builder.add_edge(Edge::new(EdgeKind::Extends, &id, resolver.resolve(superclass)));
        }
        for interface in &declaration.interfaces {
            self.builder
                .add_edge(Edge::new(EdgeKind::Implements, &id, resolver.resolve(interface)));
        }
        for import in file
            .imports
            .iter()
            .filter(|import| is_dependency_import(import, file.language))
        {
            self.builder.add_edge(Edge::new(EdgeKind::Imports, &id, import.path.clone()));
        }
    }

    fn add_module_edges(&mut self, module: &BuildModule) {
        let Some(from) = self.module_ids.get(&module.name).cloned() else {
            return;
        };

        for dependency in &module.dependencies {
            if let Some(to) = self.module_ids.get(&dependency.name) {
                let edge = Edge::new(EdgeKind::DependsOn, &from, to).with_scope(&dependency.scope);
                self.builder.add_edge(edge);
            }
        }
        for submodule in &module.submodules {
            if let Some(to) = self.module_ids.get(submodule) {
                self.builder.add_edge(Edge::new(EdgeKind::Aggregates, &from, to));
            }
        }
    }
}

/// Imports that count as a type dependency: not the language's own standard
/// library, not a wildcard and not a static member.
pub fn is_dependency_import(import: &ImportDecl, language: Language) -> bool {
    !import.wildcard
        && !import.static_member
        && !import.path.is_empty()
        && !language
            .stdlib_roots()
            .iter()
            .any(|root| import.path.starts_with(root))
}
