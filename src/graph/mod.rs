mod build;
mod concepts;
mod links;
mod model;
mod search;

pub use build::{BuilderConfig, GraphBuilder};
pub use concepts::derive_concepts;
pub use links::extract_references;
pub use model::{GraphEdge, GraphNode, GraphSnapshot, NodeId, UNTYPED, visual_size};
