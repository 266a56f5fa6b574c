use std::collections::{BTreeSet, HashMap};

use crate::cluster::Cluster;

pub type NodeId = String;

pub const MIN_VISUAL_SIZE: f32 = 8.0;
pub const MAX_VISUAL_SIZE: f32 = 20.0;
const WORDS_PER_SIZE_UNIT: f32 = 50.0;

/// Type given to documents that arrive without one.
pub const UNTYPED: &str = "untyped";

/// Radius used for drawing, collision and hit-testing alike.
pub fn visual_size(word_count: u64) -> f32 {
    (word_count as f32 / WORDS_PER_SIZE_UNIT).clamp(MIN_VISUAL_SIZE, MAX_VISUAL_SIZE)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GraphNode {
    pub id: NodeId,
    pub title: String,
    pub node_type: String,
    pub tags: BTreeSet<String>,
    pub concepts: Vec<String>,
    pub word_count: u64,
}

impl GraphNode {
    pub fn visual_size(&self) -> f32 {
        visual_size(self.word_count)
    }
}

/// Rendered undirected; `source` is the document whose reference was seen first.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphEdge {
    pub source: NodeId,
    pub target: NodeId,
    pub weight: f32,
}

impl GraphEdge {
    pub fn touches(&self, id: &str) -> bool {
        self.source == id || self.target == id
    }

    pub fn other(&self, id: &str) -> Option<&str> {
        if self.source == id {
            Some(self.target.as_str())
        } else if self.target == id {
            Some(self.source.as_str())
        } else {
            None
        }
    }
}

/// Immutable graph value produced by [`crate::graph::GraphBuilder`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphSnapshot {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    clusters: Vec<Cluster>,
    index_by_id: HashMap<NodeId, usize>,
}

impl GraphSnapshot {
    pub(crate) fn new(nodes: Vec<GraphNode>, edges: Vec<GraphEdge>, clusters: Vec<Cluster>) -> Self {
        let index_by_id = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id.clone(), index))
            .collect();

        Self {
            nodes,
            edges,
            clusters,
            index_by_id,
        }
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn has_connections(&self) -> bool {
        !self.edges.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index_by_id.contains_key(id)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.index_of(id).and_then(|index| self.nodes.get(index))
    }

    pub fn neighbors<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.edges.iter().filter_map(move |edge| edge.other(id))
    }

    pub fn connection_count(&self, id: &str) -> usize {
        self.edges.iter().filter(|edge| edge.touches(id)).count()
    }

    /// Distinct node types, sorted.
    pub fn node_types(&self) -> Vec<&str> {
        let mut types = self
            .nodes
            .iter()
            .map(|node| node.node_type.as_str())
            .collect::<Vec<_>>();
        types.sort_unstable();
        types.dedup();
        types
    }
}
