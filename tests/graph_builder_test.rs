use std::collections::HashSet;
use std::io::Write;

use docgraph::cluster::{Cluster, ClusterStrategy};
use docgraph::corpus::{DocumentSummary, load_corpus, parse_corpus};
use docgraph::graph::{BuilderConfig, GraphBuilder, UNTYPED};
use docgraph::interaction::TypeFilter;
use docgraph::CorpusError;

fn sample_corpus() -> Vec<DocumentSummary> {
    parse_corpus(include_str!("../demos/sample_corpus.json")).unwrap()
}

fn builder() -> GraphBuilder {
    GraphBuilder::new(BuilderConfig::default(), ClusterStrategy::ByType)
}

#[test]
fn test_two_linked_documents() {
    let corpus = vec![
        DocumentSummary::new("1", "A", "see [[B]]"),
        DocumentSummary::new("2", "B", ""),
    ];

    let snapshot = builder().build(&corpus);

    assert_eq!(snapshot.node_count(), 2);
    assert_eq!(snapshot.edge_count(), 1);
    let edge = &snapshot.edges()[0];
    assert_eq!((edge.source.as_str(), edge.target.as_str()), ("1", "2"));
    assert!(edge.weight > 0.0);
}

#[test]
fn test_dangling_link_produces_no_edge() {
    let corpus = vec![DocumentSummary::new("1", "A", "see [[Nonexistent]]")];

    let snapshot = builder().build(&corpus);

    assert_eq!(snapshot.node_count(), 1);
    assert_eq!(snapshot.edge_count(), 0);
    assert!(!snapshot.has_connections());
}

#[test]
fn test_build_is_idempotent() {
    let corpus = sample_corpus();

    let first = builder().build(&corpus);
    let second = builder().build(&corpus);

    assert_eq!(first, second);
}

#[test]
fn test_edges_are_bounded_resolved_and_unique() {
    let snapshot = builder().build(&sample_corpus());
    assert!(snapshot.edge_count() > 0);

    let mut pairs = HashSet::new();
    for edge in snapshot.edges() {
        assert!(edge.weight > 0.0 && edge.weight <= 1.0, "{edge:?}");
        assert!(snapshot.contains(&edge.source));
        assert!(snapshot.contains(&edge.target));
        assert_ne!(edge.source, edge.target);

        let pair = if edge.source < edge.target {
            (edge.source.clone(), edge.target.clone())
        } else {
            (edge.target.clone(), edge.source.clone())
        };
        assert!(pairs.insert(pair), "duplicate edge {edge:?}");
    }
}

#[test]
fn test_repeated_links_strengthen_but_saturate() {
    let once = builder().build(&[
        DocumentSummary::new("1", "A", "[[B]]"),
        DocumentSummary::new("2", "B", ""),
    ]);
    let many = builder().build(&[
        DocumentSummary::new("1", "A", "[[B]] [[B]] [[B|bee]] [[B]] [[B]]"),
        DocumentSummary::new("2", "B", ""),
    ]);

    let weak = once.edges()[0].weight;
    let strong = many.edges()[0].weight;
    assert!((weak - 1.0 / 3.0).abs() < 1e-6);
    assert_eq!(strong, 1.0);
}

#[test]
fn test_references_in_both_directions_share_one_edge() {
    let snapshot = builder().build(&[
        DocumentSummary::new("1", "A", "[[B]]"),
        DocumentSummary::new("2", "B", "[[A]]"),
    ]);

    assert_eq!(snapshot.edge_count(), 1);
    let edge = &snapshot.edges()[0];
    assert_eq!(edge.source, "1");
    assert!((edge.weight - 2.0 / 3.0).abs() < 1e-6);
}

#[test]
fn test_self_references_are_dropped() {
    let snapshot = builder().build(&[DocumentSummary::new("1", "A", "see [[A]]")]);

    assert_eq!(snapshot.edge_count(), 0);
}

#[test]
fn test_title_resolution_is_case_sensitive() {
    let snapshot = builder().build(&[
        DocumentSummary::new("1", "A", "[[b]]"),
        DocumentSummary::new("2", "B", ""),
    ]);

    assert_eq!(snapshot.edge_count(), 0);
}

#[test]
fn test_clusters_group_by_type() {
    let snapshot = builder().build(&sample_corpus());

    let meeting = snapshot
        .clusters()
        .iter()
        .find(|cluster| cluster.id == "type:meeting")
        .unwrap();
    assert_eq!(meeting.member_ids, vec!["1", "2", "3"]);
    assert!(meeting.is_hull_eligible());

    let person = snapshot
        .clusters()
        .iter()
        .find(|cluster| cluster.id == "type:person")
        .unwrap();
    assert!(!person.is_hull_eligible());
}

#[test]
fn test_untyped_documents_share_one_type_everywhere() {
    let corpus = vec![
        DocumentSummary::new("1", "A", "[[B]]"),
        DocumentSummary::new("2", "B", "[[C]]").with_type("  "),
        DocumentSummary::new("3", "C", "").with_type("note"),
    ];

    let snapshot = builder().build(&corpus);

    assert_eq!(snapshot.node("1").unwrap().node_type, UNTYPED);
    assert_eq!(snapshot.node("2").unwrap().node_type, UNTYPED);
    assert_eq!(snapshot.node_types(), vec!["note", UNTYPED]);

    let untyped = snapshot
        .clusters()
        .iter()
        .find(|cluster| cluster.cluster_type == UNTYPED)
        .unwrap();
    assert_eq!(untyped.member_ids, vec!["1", "2"]);

    let visible = TypeFilter::parse(UNTYPED).apply(&snapshot);
    assert_eq!(visible.node_count(), 2);
    assert_eq!(visible.edge_count(), 1);
}

#[test]
fn test_supplied_clusters_with_unknown_members_are_dropped() {
    let corpus = vec![
        DocumentSummary::new("1", "A", "[[B]]"),
        DocumentSummary::new("2", "B", ""),
    ];
    let clusters = vec![
        Cluster {
            id: "custom:known".to_owned(),
            cluster_type: "known".to_owned(),
            member_ids: vec!["1".to_owned(), "2".to_owned()],
        },
        Cluster {
            id: "custom:stale".to_owned(),
            cluster_type: "stale".to_owned(),
            member_ids: vec!["1".to_owned(), "99".to_owned()],
        },
    ];

    let snapshot = builder().build_with_clusters(&corpus, clusters);

    let ids = snapshot
        .clusters()
        .iter()
        .map(|cluster| cluster.id.as_str())
        .collect::<Vec<_>>();
    assert_eq!(ids, vec!["custom:known"]);
}

#[test]
fn test_node_helpers() {
    let snapshot = builder().build(&sample_corpus());

    let node = snapshot.node("12").unwrap();
    assert_eq!(node.title, "Reading List");
    assert_eq!(snapshot.connection_count("12"), 0);
    assert!(snapshot.connection_count("5") >= 3);
    assert_eq!(
        snapshot.node_types(),
        vec!["meeting", "note", "person", "project"]
    );
}

#[test]
fn test_search_titles_ranks_matches() {
    let snapshot = builder().build(&sample_corpus());

    let results = snapshot.search_titles("search");
    assert!(!results.is_empty());
    assert!(results.iter().any(|node| node.title == "Search Redesign"));
    assert!(snapshot.search_titles("   ").is_empty());
}

#[test]
fn test_load_corpus_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[{{"id": 7, "title": "Solo", "content": "four short words here"}}]"#
    )
    .unwrap();

    let corpus = load_corpus(file.path()).unwrap();

    assert_eq!(corpus.len(), 1);
    assert_eq!(corpus[0].id, "7");
    assert_eq!(corpus[0].word_count, 4);
}

#[test]
fn test_missing_corpus_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();

    let result = load_corpus(&dir.path().join("missing.json"));

    assert!(matches!(result, Err(CorpusError::Io { .. })));
}
