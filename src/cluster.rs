use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::graph::{GraphNode, NodeId, UNTYPED};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterStrategy {
    #[default]
    ByType,
    ByPrimaryTag,
}

impl ClusterStrategy {
    pub fn label(self) -> &'static str {
        match self {
            Self::ByType => "type",
            Self::ByPrimaryTag => "tag",
        }
    }

    fn key_for(self, node: &GraphNode) -> Option<String> {
        match self {
            Self::ByType if node.node_type.trim().is_empty() => Some(UNTYPED.to_owned()),
            Self::ByType => Some(node.node_type.clone()),
            Self::ByPrimaryTag => node.tags.iter().next().cloned(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cluster {
    pub id: String,
    /// Drives colouring.
    pub cluster_type: String,
    pub member_ids: Vec<NodeId>,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.member_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.member_ids.is_empty()
    }

    /// Boundaries are only drawn around three or more members.
    pub fn is_hull_eligible(&self) -> bool {
        self.member_ids.len() > 2
    }
}

/// Groups nodes by the strategy key, clusters ordered by first appearance.
/// Small clusters are kept for colouring even though they never get a hull.
pub fn derive_clusters(nodes: &[GraphNode], strategy: ClusterStrategy) -> Vec<Cluster> {
    let mut clusters: Vec<Cluster> = Vec::new();
    let mut slot_by_key: HashMap<String, usize> = HashMap::new();

    for node in nodes {
        let Some(key) = strategy.key_for(node) else {
            continue;
        };

        let slot = *slot_by_key.entry(key.clone()).or_insert_with(|| {
            clusters.push(Cluster {
                id: format!("{}:{key}", strategy.label()),
                cluster_type: key.clone(),
                member_ids: Vec::new(),
            });
            clusters.len() - 1
        });
        clusters[slot].member_ids.push(node.id.clone());
    }

    debug!(
        strategy = strategy.label(),
        clusters = clusters.len(),
        "clusters derived"
    );
    clusters
}

/// Keeps only clusters whose members all exist; member lists become ordered sets.
pub fn retain_known_clusters(
    clusters: Vec<Cluster>,
    is_known: impl Fn(&str) -> bool,
) -> Vec<Cluster> {
    clusters
        .into_iter()
        .filter_map(|mut cluster| {
            if let Some(missing) = cluster.member_ids.iter().find(|id| !is_known(id.as_str())) {
                debug!(cluster = %cluster.id, %missing, "dropping cluster with unknown member");
                return None;
            }
            let mut seen = HashSet::new();
            cluster.member_ids.retain(|id| seen.insert(id.clone()));
            Some(cluster)
        })
        .collect()
}

/// Node → single owning cluster; the first cluster listing a node wins.
#[derive(Clone, Debug, Default)]
pub struct ClusterIndex {
    cluster_by_node: HashMap<NodeId, usize>,
}

impl ClusterIndex {
    pub fn new(clusters: &[Cluster]) -> Self {
        let mut cluster_by_node = HashMap::new();
        for (slot, cluster) in clusters.iter().enumerate() {
            for id in &cluster.member_ids {
                cluster_by_node.entry(id.clone()).or_insert(slot);
            }
        }
        Self { cluster_by_node }
    }

    pub fn cluster_of(&self, id: &str) -> Option<usize> {
        self.cluster_by_node.get(id).copied()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn node(id: &str, node_type: &str, tags: &[&str]) -> GraphNode {
        GraphNode {
            id: id.to_owned(),
            title: id.to_uppercase(),
            node_type: node_type.to_owned(),
            tags: tags.iter().map(|tag| tag.to_string()).collect::<BTreeSet<_>>(),
            concepts: Vec::new(),
            word_count: 0,
        }
    }

    #[test]
    fn groups_by_type_in_first_appearance_order() {
        let nodes = vec![
            node("1", "meeting", &[]),
            node("2", "note", &[]),
            node("3", "meeting", &[]),
            node("4", "", &[]),
        ];

        let clusters = derive_clusters(&nodes, ClusterStrategy::ByType);

        assert_eq!(clusters.len(), 3);
        assert_eq!(clusters[0].id, "type:meeting");
        assert_eq!(clusters[0].member_ids, vec!["1", "3"]);
        assert_eq!(clusters[1].cluster_type, "note");
        assert_eq!(clusters[2].cluster_type, "untyped");
        assert!(clusters.iter().all(|cluster| !cluster.is_hull_eligible()));
    }

    #[test]
    fn primary_tag_skips_untagged_nodes() {
        let nodes = vec![
            node("1", "note", &["zeta", "alpha"]),
            node("2", "note", &[]),
            node("3", "note", &["alpha"]),
        ];

        let clusters = derive_clusters(&nodes, ClusterStrategy::ByPrimaryTag);

        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].id, "tag:alpha");
        assert_eq!(clusters[0].member_ids, vec!["1", "3"]);
    }

    #[test]
    fn unknown_members_drop_the_cluster_and_duplicates_collapse() {
        let clusters = vec![
            Cluster {
                id: "a".into(),
                cluster_type: "x".into(),
                member_ids: vec!["1".into(), "2".into(), "1".into()],
            },
            Cluster {
                id: "b".into(),
                cluster_type: "x".into(),
                member_ids: vec!["1".into(), "ghost".into()],
            },
        ];

        let kept = retain_known_clusters(clusters, |id| id == "1" || id == "2");

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].member_ids, vec!["1", "2"]);
    }

    #[test]
    fn index_assigns_first_cluster() {
        let clusters = vec![
            Cluster {
                id: "a".into(),
                cluster_type: "x".into(),
                member_ids: vec!["1".into()],
            },
            Cluster {
                id: "b".into(),
                cluster_type: "y".into(),
                member_ids: vec!["1".into(), "2".into()],
            },
        ];

        let index = ClusterIndex::new(&clusters);

        assert_eq!(index.cluster_of("1"), Some(0));
        assert_eq!(index.cluster_of("2"), Some(1));
        assert_eq!(index.cluster_of("3"), None);
    }
}
