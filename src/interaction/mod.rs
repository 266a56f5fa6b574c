mod filter;
mod requests;
mod tooltip;
mod transform;

use eframe::egui::Vec2;
use tracing::{debug, warn};

use crate::corpus::NodeDetail;
use crate::error::DetailError;
use crate::graph::NodeId;

pub use filter::{TypeFilter, VisibleGraph};
pub use requests::{RequestKind, RequestToken, RequestTracker};
pub use tooltip::{HoverState, Tooltip, TooltipContent, should_display};
pub use transform::{ViewTransform, ZoomConfig};

pub const DETAIL_UNAVAILABLE: &str = "no detail available";

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SelectionState {
    pub selected_node_id: Option<NodeId>,
    pub detail: Option<NodeDetail>,
    /// Set while the detail fetch for the current selection is outstanding.
    pub pending_request: Option<RequestToken>,
    pub detail_error: Option<String>,
}

impl SelectionState {
    pub fn is_loading(&self) -> bool {
        self.pending_request.is_some()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DragState {
    pub node_id: NodeId,
    pub position: Vec2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InteractionPhase {
    Idle,
    Hovering,
    Selected,
    SelectedDetailLoading,
    SelectedDetailLoaded,
    Dragging,
}

#[derive(Clone, Debug, PartialEq)]
pub enum InteractionEvent {
    Click(NodeId),
    DoubleClick(NodeId),
    BackgroundClick,
    ClearSelection,
    HoverEnter(NodeId),
    HoverLeave,
    DragStart { node_id: NodeId, position: Vec2 },
    DragMove(Vec2),
    DragEnd,
    DetailResolved {
        node_id: NodeId,
        token: RequestToken,
        result: Result<NodeDetail, DetailError>,
    },
    TooltipResolved {
        node_id: NodeId,
        token: RequestToken,
        result: Result<NodeDetail, DetailError>,
    },
}

/// Side effects for the engine to carry out.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    FetchDetail { node_id: NodeId, token: RequestToken },
    FetchTooltip { node_id: NodeId, token: RequestToken },
    OpenDocument(NodeId),
    Pin { node_id: NodeId, position: Vec2 },
    Unpin(NodeId),
    Reheat,
}

#[derive(Clone, Debug, Default)]
pub struct InteractionController {
    tracker: RequestTracker,
    selection: SelectionState,
    hover: HoverState,
    drag: Option<DragState>,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn hover(&self) -> &HoverState {
        &self.hover
    }

    pub fn drag(&self) -> Option<&DragState> {
        self.drag.as_ref()
    }

    /// Visible tooltip, if any. Gone the moment the hover ends.
    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.hover.hovered_node_id.as_ref()?;
        self.hover.tooltip.as_ref()
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.tracker.is_current(token)
    }

    pub fn phase(&self) -> InteractionPhase {
        if self.drag.is_some() {
            return InteractionPhase::Dragging;
        }
        if self.selection.selected_node_id.is_some() {
            return if self.selection.is_loading() {
                InteractionPhase::SelectedDetailLoading
            } else if self.selection.detail.is_some() {
                InteractionPhase::SelectedDetailLoaded
            } else {
                InteractionPhase::Selected
            };
        }
        if self.hover.is_hovering() {
            InteractionPhase::Hovering
        } else {
            InteractionPhase::Idle
        }
    }

    pub fn handle(&mut self, event: InteractionEvent) -> Vec<Effect> {
        match event {
            InteractionEvent::Click(node_id) => self.select(node_id),
            InteractionEvent::DoubleClick(node_id) => vec![Effect::OpenDocument(node_id)],
            InteractionEvent::BackgroundClick | InteractionEvent::ClearSelection => {
                self.clear_selection();
                Vec::new()
            }
            InteractionEvent::HoverEnter(node_id) => self.hover_enter(node_id),
            InteractionEvent::HoverLeave => {
                self.hover_leave();
                Vec::new()
            }
            InteractionEvent::DragStart { node_id, position } => {
                let mut effects = self.end_drag();
                effects.push(Effect::Pin {
                    node_id: node_id.clone(),
                    position,
                });
                effects.push(Effect::Reheat);
                self.drag = Some(DragState { node_id, position });
                effects
            }
            InteractionEvent::DragMove(position) => match self.drag.as_mut() {
                Some(drag) => {
                    drag.position = position;
                    vec![Effect::Pin {
                        node_id: drag.node_id.clone(),
                        position,
                    }]
                }
                None => Vec::new(),
            },
            InteractionEvent::DragEnd => self.end_drag(),
            InteractionEvent::DetailResolved {
                node_id,
                token,
                result,
            } => {
                self.apply_detail(&node_id, token, result);
                Vec::new()
            }
            InteractionEvent::TooltipResolved {
                node_id,
                token,
                result,
            } => {
                self.apply_tooltip(&node_id, token, result);
                Vec::new()
            }
        }
    }

    fn select(&mut self, node_id: NodeId) -> Vec<Effect> {
        let token = self.tracker.issue(RequestKind::Selection);
        debug!(node = %node_id, sequence = token.sequence(), "node selected");
        self.selection = SelectionState {
            selected_node_id: Some(node_id.clone()),
            detail: None,
            pending_request: Some(token),
            detail_error: None,
        };
        vec![Effect::FetchDetail { node_id, token }]
    }

    fn clear_selection(&mut self) {
        if self.selection.selected_node_id.is_some() || self.selection.is_loading() {
            self.tracker.invalidate(RequestKind::Selection);
        }
        self.selection = SelectionState::default();
    }

    fn hover_enter(&mut self, node_id: NodeId) -> Vec<Effect> {
        if self.hover.hovered_node_id.as_ref() == Some(&node_id) {
            return Vec::new();
        }

        let token = self.tracker.issue(RequestKind::Hover);
        self.hover = HoverState {
            hovered_node_id: Some(node_id.clone()),
            request: Some(token),
            tooltip: Some(Tooltip {
                node_id: node_id.clone(),
                content: TooltipContent::Loading,
            }),
        };
        vec![Effect::FetchTooltip { node_id, token }]
    }

    fn hover_leave(&mut self) {
        if self.hover.is_hovering() {
            self.tracker.invalidate(RequestKind::Hover);
        }
        self.hover = HoverState::default();
    }

    fn end_drag(&mut self) -> Vec<Effect> {
        match self.drag.take() {
            Some(drag) => vec![Effect::Unpin(drag.node_id)],
            None => Vec::new(),
        }
    }

    fn apply_detail(
        &mut self,
        node_id: &str,
        token: RequestToken,
        result: Result<NodeDetail, DetailError>,
    ) {
        let applies = token.kind() == RequestKind::Selection
            && self.tracker.is_current(token)
            && self.selection.pending_request == Some(token)
            && self.selection.selected_node_id.as_deref() == Some(node_id);
        if !applies {
            debug!(node = %node_id, sequence = token.sequence(), "discarding stale detail response");
            return;
        }

        self.selection.pending_request = None;
        match result {
            Ok(detail) => {
                self.selection.detail = Some(detail);
                self.selection.detail_error = None;
            }
            Err(err) => {
                warn!(node = %node_id, error = %err, "detail fetch failed");
                self.selection.detail = None;
                self.selection.detail_error = Some(DETAIL_UNAVAILABLE.to_owned());
            }
        }
    }

    fn apply_tooltip(
        &mut self,
        node_id: &str,
        token: RequestToken,
        result: Result<NodeDetail, DetailError>,
    ) {
        if !self.tracker.is_current(token) || !should_display(&self.hover, node_id, token) {
            debug!(node = %node_id, sequence = token.sequence(), "discarding stale tooltip response");
            return;
        }

        let content = match result {
            Ok(detail) => TooltipContent::Detail(detail),
            Err(err) => {
                debug!(node = %node_id, error = %err, "tooltip fetch failed");
                TooltipContent::Unavailable
            }
        };
        self.hover.tooltip = Some(Tooltip {
            node_id: node_id.to_owned(),
            content,
        });
    }

    /// Drops references to nodes that no longer exist after a reload.
    pub fn retain_known(&mut self, is_known: impl Fn(&str) -> bool) -> Vec<Effect> {
        let mut effects = Vec::new();

        let drag_vanished = self
            .drag
            .as_ref()
            .is_some_and(|drag| !is_known(&drag.node_id));
        if drag_vanished && let Some(drag) = self.drag.take() {
            debug!(node = %drag.node_id, "dragged node vanished");
            effects.push(Effect::Unpin(drag.node_id));
        }

        let hover_vanished = self
            .hover
            .hovered_node_id
            .as_deref()
            .is_some_and(|id| !is_known(id));
        if hover_vanished {
            self.hover_leave();
        }

        let selection_vanished = self
            .selection
            .selected_node_id
            .as_deref()
            .is_some_and(|id| !is_known(id));
        if selection_vanished {
            debug!("selected node vanished");
            self.clear_selection();
        }

        effects
    }

    /// Invalidates every outstanding request and forgets all state.
    pub fn reset(&mut self) {
        self.tracker.invalidate_all();
        self.selection = SelectionState::default();
        self.hover = HoverState::default();
        self.drag = None;
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;

    fn detail(reading_time: u64) -> NodeDetail {
        NodeDetail {
            reading_time,
            connection_count: 1,
            document: None,
        }
    }

    fn fetch_token(effects: &[Effect]) -> RequestToken {
        effects
            .iter()
            .find_map(|effect| match effect {
                Effect::FetchDetail { token, .. } | Effect::FetchTooltip { token, .. } => {
                    Some(*token)
                }
                _ => None,
            })
            .expect("fetch effect")
    }

    #[test]
    fn click_selects_and_fetches() {
        let mut controller = InteractionController::new();
        let effects = controller.handle(InteractionEvent::Click("a".into()));

        assert!(matches!(&effects[..], [Effect::FetchDetail { node_id, .. }] if node_id == "a"));
        assert_eq!(controller.phase(), InteractionPhase::SelectedDetailLoading);
    }

    #[test]
    fn late_first_response_loses_to_second_request() {
        let mut controller = InteractionController::new();
        let first = fetch_token(&controller.handle(InteractionEvent::Click("a".into())));
        let second = fetch_token(&controller.handle(InteractionEvent::Click("b".into())));

        controller.handle(InteractionEvent::DetailResolved {
            node_id: "b".into(),
            token: second,
            result: Ok(detail(2)),
        });
        controller.handle(InteractionEvent::DetailResolved {
            node_id: "a".into(),
            token: first,
            result: Ok(detail(9)),
        });

        let selection = controller.selection();
        assert_eq!(selection.selected_node_id.as_deref(), Some("b"));
        assert_eq!(selection.detail, Some(detail(2)));
        assert_eq!(controller.phase(), InteractionPhase::SelectedDetailLoaded);
    }

    #[test]
    fn failed_fetch_keeps_selection() {
        let mut controller = InteractionController::new();
        let token = fetch_token(&controller.handle(InteractionEvent::Click("a".into())));
        controller.handle(InteractionEvent::DetailResolved {
            node_id: "a".into(),
            token,
            result: Err(DetailError::NotFound("a".into())),
        });

        let selection = controller.selection();
        assert_eq!(selection.selected_node_id.as_deref(), Some("a"));
        assert_eq!(selection.detail_error.as_deref(), Some(DETAIL_UNAVAILABLE));
        assert_eq!(controller.phase(), InteractionPhase::Selected);
    }

    #[test]
    fn double_click_opens_without_selecting() {
        let mut controller = InteractionController::new();
        let effects = controller.handle(InteractionEvent::DoubleClick("a".into()));

        assert_eq!(effects, vec![Effect::OpenDocument("a".into())]);
        assert_eq!(controller.selection(), &SelectionState::default());
    }

    #[test]
    fn hover_out_hides_tooltip_and_ignores_late_response() {
        let mut controller = InteractionController::new();
        let token = fetch_token(&controller.handle(InteractionEvent::HoverEnter("a".into())));
        assert_eq!(controller.phase(), InteractionPhase::Hovering);

        controller.handle(InteractionEvent::HoverLeave);
        controller.handle(InteractionEvent::TooltipResolved {
            node_id: "a".into(),
            token,
            result: Ok(detail(1)),
        });

        assert!(controller.tooltip().is_none());
        assert_eq!(controller.phase(), InteractionPhase::Idle);
    }

    #[test]
    fn drag_pins_reheats_and_releases() {
        let mut controller = InteractionController::new();
        let start = controller.handle(InteractionEvent::DragStart {
            node_id: "a".into(),
            position: vec2(1.0, 2.0),
        });
        assert!(start.contains(&Effect::Reheat));
        assert_eq!(controller.phase(), InteractionPhase::Dragging);

        let moved = controller.handle(InteractionEvent::DragMove(vec2(5.0, 6.0)));
        assert_eq!(
            moved,
            vec![Effect::Pin {
                node_id: "a".into(),
                position: vec2(5.0, 6.0),
            }]
        );

        let end = controller.handle(InteractionEvent::DragEnd);
        assert_eq!(end, vec![Effect::Unpin("a".into())]);
        assert_eq!(controller.phase(), InteractionPhase::Idle);
    }

    #[test]
    fn vanished_selection_is_cleared_and_token_stale() {
        let mut controller = InteractionController::new();
        let token = fetch_token(&controller.handle(InteractionEvent::Click("gone".into())));

        controller.retain_known(|id| id != "gone");

        assert!(!controller.is_current(token));
        assert_eq!(controller.phase(), InteractionPhase::Idle);
    }
}
