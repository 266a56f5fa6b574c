use crate::corpus::NodeDetail;
use crate::graph::NodeId;

use super::requests::{RequestKind, RequestToken};

#[derive(Clone, Debug, PartialEq)]
pub enum TooltipContent {
    Loading,
    Detail(NodeDetail),
    Unavailable,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tooltip {
    pub node_id: NodeId,
    pub content: TooltipContent,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct HoverState {
    pub hovered_node_id: Option<NodeId>,
    /// Token of the tooltip fetch issued for the current hover.
    pub request: Option<RequestToken>,
    pub tooltip: Option<Tooltip>,
}

impl HoverState {
    pub fn is_hovering(&self) -> bool {
        self.hovered_node_id.is_some()
    }
}

/// Whether a tooltip response for `node_id` tagged `token` may be shown.
pub fn should_display(hover: &HoverState, node_id: &str, token: RequestToken) -> bool {
    token.kind() == RequestKind::Hover
        && hover.request == Some(token)
        && hover.hovered_node_id.as_deref() == Some(node_id)
}
