use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;

use crate::build::{BuildSystem, ParentCoordinates};
use crate::error::Diagnostic;
use crate::parsers::{Language, TypeKind};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum EdgeKind {
    Contains,
    DependsOn,
    Aggregates,
    Extends,
    Implements,
    Imports,
}

impl EdgeKind {
    /// Edges between types, as opposed to structural or module-level edges.
    pub fn is_type_dependency(self) -> bool {
        matches!(self, Self::Extends | Self::Implements | Self::Imports)
    }
}

/// A directed edge. `to` may name an id with no node behind it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub kind: EdgeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl Edge {
    pub fn new(kind: EdgeKind, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            kind,
            scope: None,
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SystemNode {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ModuleNode {
    pub id: String,
    pub name: String,
    pub group_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub path: PathBuf,
    pub build_system: BuildSystem,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub submodules: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ParentCoordinates>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TypeNode {
    pub id: String,
    pub name: String,
    pub package: String,
    pub kind: TypeKind,
    pub modifiers: Vec<String>,
    pub annotations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superclass: Option<String>,
    pub interfaces: Vec<String>,
    pub layer: String,
    pub feature: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    pub language: Language,
    pub file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GraphNode {
    System(SystemNode),
    Module(ModuleNode),
    Type(TypeNode),
}

impl GraphNode {
    pub fn id(&self) -> &str {
        match self {
            Self::System(node) => &node.id,
            Self::Module(node) => &node.id,
            Self::Type(node) => &node.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::System(node) => &node.name,
            Self::Module(node) => &node.name,
            Self::Type(node) => &node.name,
        }
    }

    pub fn as_type(&self) -> Option<&TypeNode> {
        match self {
            Self::Type(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_module(&self) -> Option<&ModuleNode> {
        match self {
            Self::Module(node) => Some(node),
            _ => None,
        }
    }
}

pub fn system_id(name: &str) -> String {
    format!("system:{name}")
}

pub fn module_id(name: &str) -> String {
    format!("module:{name}")
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub project: String,
    pub root: PathBuf,
    pub build_system: BuildSystem,
    pub languages: Vec<Language>,
    pub generator: String,
    pub generated_at: String,
}

/// Aggregate counts over the deduplicated node set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    pub files: usize,
    pub files_parsed: usize,
    pub types: usize,
    pub classes: usize,
    pub interfaces: usize,
    pub enums: usize,
    pub annotations: usize,
    pub objects: usize,
    pub modules: usize,
    pub dependencies: usize,
    pub module_dependencies: usize,
    pub module_aggregations: usize,
    pub by_language: BTreeMap<Language, usize>,
    pub by_type: BTreeMap<TypeKind, usize>,
    pub by_module: BTreeMap<String, usize>,
    pub by_layer: BTreeMap<String, usize>,
}

impl GraphStats {
    pub fn compute(nodes: &[GraphNode], edges: &[Edge], files: usize, files_parsed: usize) -> Self {
        let mut stats = Self {
            files,
            files_parsed,
            ..Self::default()
        };

        for node in nodes {
            match node {
                GraphNode::Module(_) => stats.modules += 1,
                GraphNode::Type(node) => {
                    stats.types += 1;
                    match node.kind {
                        TypeKind::Class => stats.classes += 1,
                        TypeKind::Interface => stats.interfaces += 1,
                        TypeKind::Enum => stats.enums += 1,
                        TypeKind::Annotation => stats.annotations += 1,
                        TypeKind::Object => stats.objects += 1,
                    }
                    *stats.by_language.entry(node.language).or_default() += 1;
                    *stats.by_type.entry(node.kind).or_default() += 1;
                    *stats.by_layer.entry(node.layer.clone()).or_default() += 1;
                    if let Some(module) = &node.module {
                        *stats.by_module.entry(module.clone()).or_default() += 1;
                    }
                }
                GraphNode::System(_) => {}
            }
        }

        for edge in edges {
            match edge.kind {
                EdgeKind::DependsOn => stats.module_dependencies += 1,
                EdgeKind::Aggregates => stats.module_aggregations += 1,
                kind if kind.is_type_dependency() => stats.dependencies += 1,
                _ => {}
            }
        }
        stats
    }
}

/// The graph document handed to rendering and reporting collaborators.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeGraph {
    pub metadata: Metadata,
    pub stats: GraphStats,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<Edge>,
    pub diagnostics: Vec<Diagnostic>,
}

impl KnowledgeGraph {
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| node.id() == id)
    }

    pub fn type_nodes(&self) -> impl Iterator<Item = &TypeNode> {
        self.nodes.iter().filter_map(GraphNode::as_type)
    }

    pub fn module_nodes(&self) -> impl Iterator<Item = &ModuleNode> {
        self.nodes.iter().filter_map(GraphNode::as_module)
    }

    pub fn edges_of_kind(&self, kind: EdgeKind) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |edge| edge.kind == kind)
    }
}

/// Accumulates nodes keyed by id and edges without duplicates.
pub struct GraphBuilder {
    nodes: Vec<GraphNode>,
    node_map: HashMap<String, usize>,
    edges: Vec<Edge>,
    edge_set: HashSet<Edge>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            node_map: HashMap::new(),
            edges: Vec::new(),
            edge_set: HashSet::new(),
        }
    }

    /// Adds `node` unless its id is already taken; returns whether it was added.
    pub fn add_node(&mut self, node: GraphNode) -> bool {
        if self.node_map.contains_key(node.id()) {
            return false;
        }
        self.node_map.insert(node.id().to_string(), self.nodes.len());
        self.nodes.push(node);
        true
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut GraphNode> {
        let index = *self.node_map.get(id)?;
        self.nodes.get_mut(index)
    }

    /// Adds `edge` unless an identical one exists. The source must be a known
    /// node; the target need not be.
    pub fn add_edge(&mut self, edge: Edge) -> bool {
        if !self.node_map.contains_key(&edge.from) || self.edge_set.contains(&edge) {
            return false;
        }
        self.edge_set.insert(edge.clone());
        self.edges.push(edge);
        true
    }

    pub fn build(self) -> (Vec<GraphNode>, Vec<Edge>) {
        (self.nodes, self.edges)
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
