use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::concepts::derive_concepts;
use super::links::extract_references;
use super::model::{GraphEdge, GraphNode, GraphSnapshot, UNTYPED};
use crate::cluster::{Cluster, ClusterStrategy, derive_clusters, retain_known_clusters};
use crate::corpus::DocumentSummary;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Occurrences of a pair that saturate its weight at 1.
    pub link_normalization: f32,
    pub max_concepts: usize,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            link_normalization: 3.0,
            max_concepts: 8,
        }
    }
}

impl BuilderConfig {
    fn normalization(&self) -> f32 {
        if self.link_normalization.is_finite() && self.link_normalization > 0.0 {
            self.link_normalization
        } else {
            Self::default().link_normalization
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct GraphBuilder {
    config: BuilderConfig,
    strategy: ClusterStrategy,
}

struct PendingEdge {
    source: usize,
    target: usize,
    occurrences: u32,
}

impl GraphBuilder {
    pub fn new(config: BuilderConfig, strategy: ClusterStrategy) -> Self {
        Self { config, strategy }
    }

    pub fn build(&self, corpus: &[DocumentSummary]) -> GraphSnapshot {
        let (nodes, sources) = self.collect_nodes(corpus);
        let clusters = derive_clusters(&nodes, self.strategy);
        self.assemble(nodes, &sources, clusters)
    }

    /// Uses externally supplied clusters instead of deriving them.
    pub fn build_with_clusters(
        &self,
        corpus: &[DocumentSummary],
        clusters: Vec<Cluster>,
    ) -> GraphSnapshot {
        let (nodes, sources) = self.collect_nodes(corpus);
        let known = nodes
            .iter()
            .map(|node| node.id.as_str())
            .collect::<HashSet<_>>();
        let clusters = retain_known_clusters(clusters, |id| known.contains(id));
        self.assemble(nodes, &sources, clusters)
    }

    fn collect_nodes<'a>(
        &self,
        corpus: &'a [DocumentSummary],
    ) -> (Vec<GraphNode>, Vec<&'a DocumentSummary>) {
        let mut nodes = Vec::with_capacity(corpus.len());
        let mut sources = Vec::with_capacity(corpus.len());
        let mut seen = HashSet::with_capacity(corpus.len());

        for document in corpus {
            if !seen.insert(document.id.as_str()) {
                warn!(id = %document.id, "duplicate document id ignored");
                continue;
            }

            let tags = document
                .tags
                .iter()
                .map(|tag| tag.trim())
                .filter(|tag| !tag.is_empty())
                .map(str::to_owned)
                .collect::<BTreeSet<_>>();

            let node_type = match document.doc_type.trim() {
                "" => UNTYPED,
                doc_type => doc_type,
            };

            nodes.push(GraphNode {
                id: document.id.clone(),
                title: document.title.clone(),
                node_type: node_type.to_owned(),
                tags,
                concepts: derive_concepts(&document.content, self.config.max_concepts),
                word_count: document.word_count,
            });
            sources.push(document);
        }

        (nodes, sources)
    }

    fn assemble(
        &self,
        nodes: Vec<GraphNode>,
        sources: &[&DocumentSummary],
        clusters: Vec<Cluster>,
    ) -> GraphSnapshot {
        let edges = self.collect_edges(&nodes, sources);
        debug!(
            nodes = nodes.len(),
            edges = edges.len(),
            clusters = clusters.len(),
            "graph snapshot built"
        );
        GraphSnapshot::new(nodes, edges, clusters)
    }

    fn collect_edges(&self, nodes: &[GraphNode], sources: &[&DocumentSummary]) -> Vec<GraphEdge> {
        let mut index_by_title: HashMap<&str, usize> = HashMap::with_capacity(nodes.len());
        for (index, node) in nodes.iter().enumerate() {
            index_by_title.entry(node.title.as_str()).or_insert(index);
        }

        let mut pending: Vec<PendingEdge> = Vec::new();
        let mut slot_by_pair: HashMap<(usize, usize), usize> = HashMap::new();
        let mut unresolved = 0usize;

        for (source_index, document) in sources.iter().enumerate() {
            for title in extract_references(&document.content) {
                let Some(&target_index) = index_by_title.get(title) else {
                    unresolved += 1;
                    continue;
                };
                if target_index == source_index {
                    continue;
                }

                let pair = (
                    source_index.min(target_index),
                    source_index.max(target_index),
                );
                match slot_by_pair.entry(pair) {
                    Entry::Occupied(slot) => pending[*slot.get()].occurrences += 1,
                    Entry::Vacant(slot) => {
                        slot.insert(pending.len());
                        pending.push(PendingEdge {
                            source: source_index,
                            target: target_index,
                            occurrences: 1,
                        });
                    }
                }
            }
        }

        if unresolved > 0 {
            debug!(unresolved, "dropped references to unknown titles");
        }

        let normalization = self.config.normalization();
        pending
            .into_iter()
            .map(|edge| GraphEdge {
                source: nodes[edge.source].id.clone(),
                target: nodes[edge.target].id.clone(),
                weight: (edge.occurrences as f32 / normalization).min(1.0),
            })
            .collect()
    }
}
