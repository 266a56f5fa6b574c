use docgraph::cluster::ClusterStrategy;
use docgraph::corpus::{DocumentSummary, NodeDetail};
use docgraph::graph::{BuilderConfig, GraphBuilder};
use docgraph::interaction::{
    Effect, InteractionController, InteractionEvent, InteractionPhase, RequestToken, TypeFilter,
    ViewTransform, ZoomConfig,
};
use eframe::egui::vec2;

fn detail(reading_time: u64) -> NodeDetail {
    NodeDetail {
        reading_time,
        connection_count: 0,
        document: None,
    }
}

fn issued_token(effects: Vec<Effect>) -> RequestToken {
    effects
        .into_iter()
        .find_map(|effect| match effect {
            Effect::FetchDetail { token, .. } | Effect::FetchTooltip { token, .. } => Some(token),
            _ => None,
        })
        .unwrap()
}

#[test]
fn test_last_request_wins_regardless_of_response_order() {
    let mut controller = InteractionController::new();
    let a = issued_token(controller.handle(InteractionEvent::Click("a".into())));
    let b = issued_token(controller.handle(InteractionEvent::Click("b".into())));

    controller.handle(InteractionEvent::DetailResolved {
        node_id: "a".into(),
        token: a,
        result: Ok(detail(1)),
    });
    assert_eq!(controller.phase(), InteractionPhase::SelectedDetailLoading);

    controller.handle(InteractionEvent::DetailResolved {
        node_id: "b".into(),
        token: b,
        result: Ok(detail(2)),
    });
    assert_eq!(controller.selection().detail, Some(detail(2)));
}

#[test]
fn test_reselecting_same_node_discards_earlier_response() {
    let mut controller = InteractionController::new();
    let first = issued_token(controller.handle(InteractionEvent::Click("a".into())));
    let second = issued_token(controller.handle(InteractionEvent::Click("a".into())));

    controller.handle(InteractionEvent::DetailResolved {
        node_id: "a".into(),
        token: first,
        result: Ok(detail(1)),
    });
    assert!(controller.selection().is_loading());

    controller.handle(InteractionEvent::DetailResolved {
        node_id: "a".into(),
        token: second,
        result: Ok(detail(5)),
    });
    assert_eq!(controller.selection().detail, Some(detail(5)));
}

#[test]
fn test_clear_selection_discards_inflight_response() {
    let mut controller = InteractionController::new();
    let token = issued_token(controller.handle(InteractionEvent::Click("a".into())));

    controller.handle(InteractionEvent::BackgroundClick);
    controller.handle(InteractionEvent::DetailResolved {
        node_id: "a".into(),
        token,
        result: Ok(detail(1)),
    });

    assert_eq!(controller.phase(), InteractionPhase::Idle);
    assert!(controller.selection().detail.is_none());
}

#[test]
fn test_hover_and_selection_fetches_are_independent() {
    let mut controller = InteractionController::new();
    let selection = issued_token(controller.handle(InteractionEvent::Click("a".into())));
    let hover = issued_token(controller.handle(InteractionEvent::HoverEnter("b".into())));

    controller.handle(InteractionEvent::TooltipResolved {
        node_id: "b".into(),
        token: hover,
        result: Ok(detail(3)),
    });
    controller.handle(InteractionEvent::DetailResolved {
        node_id: "a".into(),
        token: selection,
        result: Ok(detail(4)),
    });

    assert_eq!(controller.selection().detail, Some(detail(4)));
    assert_eq!(controller.tooltip().unwrap().node_id, "b");
}

#[test]
fn test_moving_hover_to_another_node_discards_previous_tooltip() {
    let mut controller = InteractionController::new();
    let first = issued_token(controller.handle(InteractionEvent::HoverEnter("a".into())));
    controller.handle(InteractionEvent::HoverEnter("b".into()));

    controller.handle(InteractionEvent::TooltipResolved {
        node_id: "a".into(),
        token: first,
        result: Ok(detail(1)),
    });

    let tooltip = controller.tooltip().unwrap();
    assert_eq!(tooltip.node_id, "b");
}

#[test]
fn test_drag_does_not_touch_selection() {
    let mut controller = InteractionController::new();
    controller.handle(InteractionEvent::Click("a".into()));

    controller.handle(InteractionEvent::DragStart {
        node_id: "b".into(),
        position: vec2(0.0, 0.0),
    });
    assert_eq!(controller.phase(), InteractionPhase::Dragging);
    controller.handle(InteractionEvent::DragEnd);

    assert_eq!(controller.selection().selected_node_id.as_deref(), Some("a"));
}

#[test]
fn test_drag_move_without_drag_is_ignored() {
    let mut controller = InteractionController::new();

    assert!(
        controller
            .handle(InteractionEvent::DragMove(vec2(1.0, 1.0)))
            .is_empty()
    );
    assert!(controller.handle(InteractionEvent::DragEnd).is_empty());
}

#[test]
fn test_repeated_zoom_stays_within_bounds() {
    let config = ZoomConfig::default();
    let viewport = vec2(800.0, 600.0);
    let mut transform = ViewTransform::default();

    for _ in 0..100 {
        transform.zoom_in(viewport, &config);
        assert!(transform.scale <= config.max_scale);
    }
    assert_eq!(transform.scale, config.max_scale);

    for _ in 0..200 {
        transform.zoom_out(viewport, &config);
        assert!(transform.scale >= config.min_scale);
    }
    assert_eq!(transform.scale, config.min_scale);
}

#[test]
fn test_button_zoom_keeps_viewport_centre_fixed() {
    let config = ZoomConfig::default();
    let viewport = vec2(800.0, 600.0);
    let mut transform = ViewTransform::default();
    transform.pan_by(vec2(35.0, -20.0));
    let centre_world = transform.screen_to_world(viewport * 0.5);

    transform.zoom_in(viewport, &config);

    let centre = transform.world_to_screen(centre_world);
    assert!((centre - viewport * 0.5).length() < 1e-3);
}

#[test]
fn test_type_filter_keeps_edges_between_visible_nodes_only() {
    let corpus = vec![
        DocumentSummary::new("1", "A", "[[B]] [[C]]").with_type("meeting"),
        DocumentSummary::new("2", "B", "[[C]]").with_type("note"),
        DocumentSummary::new("3", "C", "").with_type("note"),
    ];
    let snapshot =
        GraphBuilder::new(BuilderConfig::default(), ClusterStrategy::ByType).build(&corpus);

    let visible = TypeFilter::parse("note").apply(&snapshot);

    assert_eq!(visible.node_count(), 2);
    assert_eq!(visible.edge_count(), 1);
    let edge = visible.edges(&snapshot).next().unwrap();
    assert_eq!((edge.source.as_str(), edge.target.as_str()), ("2", "3"));
    assert!(!visible.contains(&snapshot, "1"));

    let everything = TypeFilter::parse("All").apply(&snapshot);
    assert_eq!(everything.node_count(), 3);
    assert_eq!(everything.edge_count(), 3);
}
