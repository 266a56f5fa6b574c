use std::fmt;

use crate::graph::{GraphEdge, GraphNode, GraphSnapshot};

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum TypeFilter {
    #[default]
    All,
    Only(String),
}

impl TypeFilter {
    /// `"all"` in any case (or blank) selects every type.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Only(value.to_owned())
        }
    }

    pub fn matches(&self, node_type: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == node_type,
        }
    }

    pub fn apply(&self, snapshot: &GraphSnapshot) -> VisibleGraph {
        let mut visible = vec![false; snapshot.node_count()];
        let node_indices = snapshot
            .nodes()
            .iter()
            .enumerate()
            .filter(|(_, node)| self.matches(&node.node_type))
            .map(|(index, _)| {
                visible[index] = true;
                index
            })
            .collect();

        let edge_indices = snapshot
            .edges()
            .iter()
            .enumerate()
            .filter(|(_, edge)| {
                let endpoint_visible =
                    |id: &str| snapshot.index_of(id).is_some_and(|index| visible[index]);
                endpoint_visible(&edge.source) && endpoint_visible(&edge.target)
            })
            .map(|(index, _)| index)
            .collect();

        VisibleGraph {
            node_indices,
            edge_indices,
        }
    }
}

impl From<&str> for TypeFilter {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl fmt::Display for TypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(node_type) => f.write_str(node_type),
        }
    }
}

/// Indices into a snapshot's node and edge lists, ascending.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VisibleGraph {
    pub node_indices: Vec<usize>,
    pub edge_indices: Vec<usize>,
}

impl VisibleGraph {
    pub fn everything(snapshot: &GraphSnapshot) -> Self {
        TypeFilter::All.apply(snapshot)
    }

    pub fn node_count(&self) -> usize {
        self.node_indices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_indices.is_empty()
    }

    pub fn contains(&self, snapshot: &GraphSnapshot, id: &str) -> bool {
        snapshot
            .index_of(id)
            .is_some_and(|index| self.node_indices.binary_search(&index).is_ok())
    }

    pub fn nodes<'a>(&'a self, snapshot: &'a GraphSnapshot) -> impl Iterator<Item = &'a GraphNode> + 'a {
        self.node_indices
            .iter()
            .filter_map(|&index| snapshot.nodes().get(index))
    }

    pub fn edges<'a>(&'a self, snapshot: &'a GraphSnapshot) -> impl Iterator<Item = &'a GraphEdge> + 'a {
        self.edge_indices
            .iter()
            .filter_map(|&index| snapshot.edges().get(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_treats_all_case_insensitively() {
        assert_eq!(TypeFilter::parse("all"), TypeFilter::All);
        assert_eq!(TypeFilter::parse(" ALL "), TypeFilter::All);
        assert_eq!(TypeFilter::parse(""), TypeFilter::All);
        assert_eq!(
            TypeFilter::parse("meeting"),
            TypeFilter::Only("meeting".to_owned())
        );
    }

    #[test]
    fn only_matches_exact_type() {
        let filter = TypeFilter::parse("meeting");
        assert!(filter.matches("meeting"));
        assert!(!filter.matches("Meeting"));
        assert!(TypeFilter::All.matches(""));
    }
}
