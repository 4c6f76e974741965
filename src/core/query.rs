//! Read-side index over a finished graph document.
//!
//! The document keeps dangling edge targets as plain ids. Here every such
//! target becomes an external node so neighbourhood queries and traversals
//! work uniformly over the whole edge list.

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{BTreeMap, HashMap};

use super::classify::library_group;
use super::graph::{EdgeKind, GraphNode, KnowledgeGraph};
use crate::error::QueryError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexNode {
    pub id: String,
    /// Referenced by an edge but absent from the document's node list.
    pub external: bool,
    pub module: bool,
}

pub struct GraphIndex {
    graph: DiGraph<IndexNode, EdgeKind>,
    node_indices: HashMap<String, NodeIndex>,
}

impl GraphIndex {
    pub fn new(document: &KnowledgeGraph) -> Self {
        let mut index = Self {
            graph: DiGraph::new(),
            node_indices: HashMap::with_capacity(document.nodes.len()),
        };

        for node in &document.nodes {
            index.insert(IndexNode {
                id: node.id().to_string(),
                external: false,
                module: matches!(node, GraphNode::Module(_)),
            });
        }
        for edge in &document.edges {
            let from = index.node_or_external(&edge.from);
            let to = index.node_or_external(&edge.to);
            index.graph.add_edge(from, to, edge.kind);
        }
        index
    }

    fn insert(&mut self, node: IndexNode) -> NodeIndex {
        let id = node.id.clone();
        let node_index = self.graph.add_node(node);
        self.node_indices.insert(id, node_index);
        node_index
    }

    fn node_or_external(&mut self, id: &str) -> NodeIndex {
        if let Some(&node_index) = self.node_indices.get(id) {
            return node_index;
        }
        self.insert(IndexNode {
            id: id.to_string(),
            external: true,
            module: false,
        })
    }

    fn lookup(&self, id: &str) -> Result<NodeIndex, QueryError> {
        self.node_indices
            .get(id)
            .copied()
            .ok_or_else(|| QueryError::UnknownNode(id.to_string()))
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.node_indices.contains_key(id)
    }

    pub fn is_external(&self, id: &str) -> bool {
        self.node_indices
            .get(id)
            .is_some_and(|&node_index| self.graph[node_index].external)
    }

    /// Ids of all edge targets with no node in the document, sorted.
    pub fn external_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .graph
            .node_weights()
            .filter(|node| node.external)
            .map(|node| node.id.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Targets of `id`'s outgoing edges, optionally of one kind, sorted.
    pub fn outgoing(&self, id: &str, kind: Option<EdgeKind>) -> Result<Vec<&str>, QueryError> {
        self.neighbours(id, kind, Direction::Outgoing)
    }

    /// Sources of `id`'s incoming edges, optionally of one kind, sorted.
    pub fn incoming(&self, id: &str, kind: Option<EdgeKind>) -> Result<Vec<&str>, QueryError> {
        self.neighbours(id, kind, Direction::Incoming)
    }

    fn neighbours(
        &self,
        id: &str,
        kind: Option<EdgeKind>,
        direction: Direction,
    ) -> Result<Vec<&str>, QueryError> {
        let node_index = self.lookup(id)?;
        let mut ids: Vec<&str> = self
            .graph
            .edges_directed(node_index, direction)
            .filter(|edge| kind.map_or(true, |kind| *edge.weight() == kind))
            .map(|edge| {
                let other = match direction {
                    Direction::Outgoing => edge.target(),
                    Direction::Incoming => edge.source(),
                };
                self.graph[other].id.as_str()
            })
            .collect();
        ids.sort_unstable();
        ids.dedup();
        Ok(ids)
    }

    /// Module ids ordered so every module comes after the modules it depends on.
    pub fn module_build_order(&self) -> Result<Vec<String>, QueryError> {
        let mut order_graph: DiGraph<NodeIndex, ()> = DiGraph::new();
        let mut positions: HashMap<NodeIndex, NodeIndex> = HashMap::new();

        for node_index in self.graph.node_indices() {
            if self.graph[node_index].module {
                positions.insert(node_index, order_graph.add_node(node_index));
            }
        }
        for edge in self.graph.edge_references() {
            if *edge.weight() != EdgeKind::DependsOn {
                continue;
            }
            if let (Some(&dependent), Some(&dependency)) =
                (positions.get(&edge.source()), positions.get(&edge.target()))
            {
                order_graph.add_edge(dependency, dependent, ());
            }
        }

        toposort(&order_graph, None)
            .map(|sorted| {
                sorted
                    .into_iter()
                    .map(|position| self.graph[order_graph[position]].id.clone())
                    .collect()
            })
            .map_err(|cycle| QueryError::Cycle {
                module: self.graph[order_graph[cycle.node_id()]].id.clone(),
            })
    }

    /// External targets grouped by canonical library key.
    pub fn external_libraries(&self) -> BTreeMap<String, Vec<String>> {
        let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for id in self.external_ids() {
            groups
                .entry(library_group(id))
                .or_default()
                .push(id.to_string());
        }
        groups
    }
}
