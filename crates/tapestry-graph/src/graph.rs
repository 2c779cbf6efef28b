//! Call graph structure with bidirectional indexing.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;
use tracing::warn;

use crate::edge::{EdgeKind, GraphEdge};
use crate::error::GraphError;
use crate::node::{GraphNode, NodeId};

/// A call graph with bidirectional indexing for efficient traversal.
///
/// Nodes live in an arena addressed by [`NodeId`] and keep their insertion
/// order, so serialised output is stable for a given source snapshot. Node
/// insertion is insert-if-absent and duplicate `(source, target, kind)` edges
/// are suppressed.
#[derive(Debug, Clone, Default)]
pub struct CallGraph {
    /// All nodes in insertion order.
    nodes: Vec<GraphNode>,
    /// Position of each node in `nodes`.
    node_index: HashMap<NodeId, usize>,
    /// All edges in insertion order.
    edges: Vec<GraphEdge>,
    /// Index of callers for each node (incoming edges).
    callers_index: HashMap<NodeId, HashSet<usize>>,
    /// Index of callees for each node (outgoing edges).
    callees_index: HashMap<NodeId, HashSet<usize>>,
    /// Usage-scoped declaration instances grouped by base identity.
    declaration_index: BTreeMap<NodeId, Vec<NodeId>>,
}

/// Incoming and outgoing edge counts for a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Degree {
    /// Number of edges targeting the node.
    pub incoming: usize,
    /// Number of edges leaving the node.
    pub outgoing: usize,
}

impl Degree {
    /// Sum of incoming and outgoing edges.
    #[must_use]
    pub const fn total(self) -> usize {
        self.incoming.saturating_add(self.outgoing)
    }
}

impl CallGraph {
    /// Creates a new empty call graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node to the graph unless one with the same ID exists.
    ///
    /// Returns `true` when the node was inserted.
    pub fn add_node(&mut self, node: GraphNode) -> bool {
        let id = node.id().clone();
        if self.node_index.contains_key(&id) {
            return false;
        }
        if let Some(base) = node.base_declaration_id() {
            self.declaration_index
                .entry(base.clone())
                .or_default()
                .push(id.clone());
        }
        self.node_index.insert(id, self.nodes.len());
        self.nodes.push(node);
        true
    }

    /// Adds an edge to the graph unless an identical triple exists.
    ///
    /// Returns `true` when the edge was inserted. Endpoints are not checked
    /// here; [`CallGraph::remove_orphan_edges`] enforces referential
    /// integrity once a construction pass completes.
    pub fn add_edge(&mut self, edge: GraphEdge) -> bool {
        if self
            .find_edge(edge.source(), edge.target(), edge.kind())
            .is_some()
        {
            return false;
        }

        let edge_index = self.edges.len();
        let from_id = edge.source().clone();
        let to_id = edge.target().clone();

        self.edges.push(edge);

        self.callees_index
            .entry(from_id)
            .or_default()
            .insert(edge_index);
        self.callers_index
            .entry(to_id)
            .or_default()
            .insert(edge_index);
        true
    }

    fn find_edge(&self, source: &NodeId, target: &NodeId, kind: EdgeKind) -> Option<usize> {
        self.callees_index
            .get(source)?
            .iter()
            .copied()
            .find(|&idx| {
                self.edges
                    .get(idx)
                    .is_some_and(|edge| edge.matches(source, target, kind))
            })
    }

    /// Returns a mutable handle to the edge with the given triple.
    pub fn edge_mut(
        &mut self,
        source: &NodeId,
        target: &NodeId,
        kind: EdgeKind,
    ) -> Option<&mut GraphEdge> {
        let idx = self.find_edge(source, target, kind)?;
        self.edges.get_mut(idx)
    }

    /// Returns the node with the given ID.
    #[must_use]
    pub fn node(&self, id: &NodeId) -> Option<&GraphNode> {
        self.node_index
            .get(id)
            .and_then(|&idx| self.nodes.get(idx))
    }

    /// Returns an iterator over all nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.iter()
    }

    /// Returns the number of nodes in the graph.
    #[must_use]
    pub const fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns an iterator over all edges in the graph.
    pub fn edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.edges.iter()
    }

    /// Returns the number of edges in the graph.
    #[must_use]
    pub const fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns the edges targeting the given node.
    pub fn incoming_edges(&self, node_id: &NodeId) -> impl Iterator<Item = &GraphEdge> {
        let mut indices: Vec<usize> = self
            .callers_index
            .get(node_id)
            .into_iter()
            .flatten()
            .copied()
            .collect();
        indices.sort_unstable();
        indices.into_iter().filter_map(|idx| self.edges.get(idx))
    }

    /// Returns the edges leaving the given node, in insertion order.
    pub fn outgoing_edges(&self, node_id: &NodeId) -> impl Iterator<Item = &GraphEdge> {
        let mut indices: Vec<usize> = self
            .callees_index
            .get(node_id)
            .into_iter()
            .flatten()
            .copied()
            .collect();
        indices.sort_unstable();
        indices.into_iter().filter_map(|idx| self.edges.get(idx))
    }

    /// Returns the nodes that call the given node.
    pub fn callers_of(&self, node_id: &NodeId) -> impl Iterator<Item = &GraphNode> {
        self.incoming_edges(node_id)
            .filter(|edge| edge.kind() == EdgeKind::Calls)
            .filter_map(|edge| self.node(edge.source()))
    }

    /// Returns the nodes that are called by the given node.
    pub fn callees_of(&self, node_id: &NodeId) -> impl Iterator<Item = &GraphNode> {
        self.outgoing_edges(node_id)
            .filter(|edge| edge.kind() == EdgeKind::Calls)
            .filter_map(|edge| self.node(edge.target()))
    }

    /// Returns whether the graph contains a node with the given ID.
    #[must_use]
    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.node_index.contains_key(id)
    }

    /// Returns whether the graph is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the usage-scoped instances derived from a declaration.
    pub fn declaration_instances(&self, base: &NodeId) -> impl Iterator<Item = &GraphNode> {
        self.declaration_index
            .get(base)
            .into_iter()
            .flatten()
            .filter_map(|id| self.node(id))
    }

    /// Merges another graph into this one.
    ///
    /// Existing nodes win over incoming nodes with the same ID and duplicate
    /// edges are dropped.
    pub fn merge(&mut self, other: Self) {
        for node in other.nodes {
            self.add_node(node);
        }
        for edge in other.edges {
            self.add_edge(edge);
        }
    }

    /// Finds a node by name.
    ///
    /// Returns the first node with a matching name. For methods, searches both
    /// the simple name and qualified name.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&GraphNode> {
        self.nodes
            .iter()
            .find(|node| node.name() == name || node.qualified_name() == name)
    }

    /// Returns the node with the given ID, or an error if not found.
    ///
    /// # Errors
    /// Returns `GraphError::NodeNotFound` if no node with the given ID exists.
    pub fn get_node(&self, id: &NodeId) -> Result<&GraphNode, GraphError> {
        self.node(id)
            .ok_or_else(|| GraphError::node_not_found(id.as_str()))
    }

    /// Returns the degree of a single node.
    #[must_use]
    pub fn degree(&self, id: &NodeId) -> Degree {
        Degree {
            incoming: self.callers_index.get(id).map_or(0, HashSet::len),
            outgoing: self.callees_index.get(id).map_or(0, HashSet::len),
        }
    }

    /// Returns the degree of every node, keyed by identity.
    #[must_use]
    pub fn degrees(&self) -> BTreeMap<NodeId, Degree> {
        self.nodes
            .iter()
            .map(|node| (node.id().clone(), self.degree(node.id())))
            .collect()
    }

    /// Removes every edge whose source or target is not a node in the graph.
    ///
    /// Each removal is logged as a warning because a dangling edge means an
    /// earlier construction pass failed to create its endpoint. Returns the
    /// number of edges removed.
    pub fn remove_orphan_edges(&mut self) -> usize {
        let before = self.edges.len();
        let node_index = &self.node_index;
        let edges = std::mem::take(&mut self.edges);
        let kept: Vec<GraphEdge> = edges
            .into_iter()
            .filter(|edge| {
                let source_known = node_index.contains_key(edge.source());
                let target_known = node_index.contains_key(edge.target());
                if !(source_known && target_known) {
                    warn!(
                        source = %edge.source(),
                        target = %edge.target(),
                        kind = %edge.kind(),
                        source_known,
                        target_known,
                        "removing edge with missing endpoint"
                    );
                }
                source_known && target_known
            })
            .collect();
        self.rebuild_edges(kept);
        before.saturating_sub(self.edges.len())
    }

    /// Truncates the graph to at most `max_nodes` nodes.
    ///
    /// Nodes are ranked with the optional `root` first, then callables before
    /// declarations, then by descending total degree, then by insertion
    /// order. Edges touching dropped nodes are discarded with them. Returns
    /// the number of nodes removed.
    pub fn limit_nodes(&mut self, max_nodes: usize, root: Option<&NodeId>) -> usize {
        if self.nodes.len() <= max_nodes {
            return 0;
        }

        let degrees = self.degrees();
        let mut ranked: Vec<(usize, &GraphNode)> = self.nodes.iter().enumerate().collect();
        ranked.sort_by_key(|(position, node)| {
            let is_root = root.is_some_and(|root_id| root_id == node.id());
            let total = degrees.get(node.id()).map_or(0, |degree| degree.total());
            (
                !is_root,
                !node.kind().is_callable(),
                std::cmp::Reverse(total),
                *position,
            )
        });
        let keep: HashSet<NodeId> = ranked
            .into_iter()
            .take(max_nodes)
            .map(|(_, node)| node.id().clone())
            .collect();

        let before = self.nodes.len();
        let nodes = std::mem::take(&mut self.nodes);
        let edges = std::mem::take(&mut self.edges);
        self.node_index.clear();
        self.declaration_index.clear();
        for node in nodes.into_iter().filter(|node| keep.contains(node.id())) {
            self.add_node(node);
        }
        let kept_edges = edges
            .into_iter()
            .filter(|edge| keep.contains(edge.source()) && keep.contains(edge.target()))
            .collect();
        self.rebuild_edges(kept_edges);
        before.saturating_sub(self.nodes.len())
    }

    fn rebuild_edges(&mut self, edges: Vec<GraphEdge>) {
        self.edges.clear();
        self.callers_index.clear();
        self.callees_index.clear();
        for edge in edges {
            self.add_edge(edge);
        }
    }

    /// Converts the graph into the exchange structure handed to renderers.
    #[must_use]
    pub fn into_graph_data(self, file_name: impl Into<String>) -> GraphData {
        GraphData {
            nodes: self.nodes,
            edges: self.edges,
            file_name: file_name.into(),
        }
    }
}

/// The unit exchanged with rendering and export collaborators.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphData {
    /// All nodes, pairwise distinct by identity.
    pub nodes: Vec<GraphNode>,
    /// All edges; every endpoint references a node in `nodes`.
    pub edges: Vec<GraphEdge>,
    /// Name of the analysed file or root file.
    pub file_name: String,
}

/// Aggregate counts describing a [`GraphData`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSummary {
    /// Name of the analysed file or root file.
    pub file_name: String,
    /// Total node count.
    pub nodes: usize,
    /// Total edge count.
    pub edges: usize,
    /// Node counts keyed by kind label.
    pub nodes_by_kind: BTreeMap<String, usize>,
    /// Edge counts keyed by relationship label.
    pub edges_by_kind: BTreeMap<String, usize>,
}

impl GraphData {
    /// Returns the node with the given identity.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| node.id().as_str() == id)
    }

    /// Returns the first edge with the given endpoints and kind.
    #[must_use]
    pub fn edge(&self, source: &str, target: &str, kind: EdgeKind) -> Option<&GraphEdge> {
        self.edges.iter().find(|edge| {
            edge.kind() == kind
                && edge.source().as_str() == source
                && edge.target().as_str() == target
        })
    }

    /// Computes aggregate counts for reporting.
    #[must_use]
    pub fn summary(&self) -> GraphSummary {
        let mut nodes_by_kind: BTreeMap<String, usize> = BTreeMap::new();
        for node in &self.nodes {
            *nodes_by_kind.entry(node.kind().as_str().to_owned()).or_default() += 1;
        }
        let mut edges_by_kind: BTreeMap<String, usize> = BTreeMap::new();
        for edge in &self.edges {
            *edges_by_kind.entry(edge.kind().to_string()).or_default() += 1;
        }
        GraphSummary {
            file_name: self.file_name.clone(),
            nodes: self.nodes.len(),
            edges: self.edges.len(),
            nodes_by_kind,
            edges_by_kind,
        }
    }

    /// Serialises the graph as JSON.
    ///
    /// # Errors
    /// Returns an error if serialisation fails.
    pub fn to_json(&self, pretty: bool) -> Result<String, serde_json::Error> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }

    /// Returns whether every node identity is unique.
    #[must_use]
    pub fn has_unique_ids(&self) -> bool {
        let mut seen = HashSet::new();
        self.nodes.iter().all(|node| seen.insert(node.id()))
    }

    /// Returns whether every edge references existing nodes.
    #[must_use]
    pub fn has_referential_integrity(&self) -> bool {
        let ids: HashSet<&NodeId> = self.nodes.iter().map(GraphNode::id).collect();
        self.edges
            .iter()
            .all(|edge| ids.contains(edge.source()) && ids.contains(edge.target()))
    }

    /// Returns whether any `(source, target, kind)` triple repeats.
    #[must_use]
    pub fn has_duplicate_edges(&self) -> bool {
        let mut seen = HashSet::new();
        !self
            .edges
            .iter()
            .all(|edge| seen.insert((edge.source(), edge.target(), edge.kind())))
    }

    /// Returns the declaration nodes sharing `base` as their declaration id.
    pub fn declaration_usages<'a>(&'a self, base: &'a str) -> impl Iterator<Item = &'a GraphNode> {
        self.nodes.iter().filter(move |node| {
            node.base_declaration_id()
                .is_some_and(|id| id.as_str() == base)
        })
    }
}
