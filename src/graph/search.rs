use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use super::model::{GraphNode, GraphSnapshot};

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_lowercase(), &query.to_lowercase()))
}

impl GraphSnapshot {
    /// Nodes whose title fuzzy-matches `query`, best match first.
    pub fn search_titles(&self, query: &str) -> Vec<&GraphNode> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        let matcher = SkimMatcherV2::default();
        let mut scored = self
            .nodes()
            .iter()
            .filter_map(|node| {
                fuzzy_match_score(&matcher, &node.title, query).map(|score| (score, node))
            })
            .collect::<Vec<_>>();
        scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.title.cmp(&b.1.title)));
        scored.into_iter().map(|(_score, node)| node).collect()
    }
}
