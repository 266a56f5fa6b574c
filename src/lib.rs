//! Knowledge graph engine for cross-referenced document corpora.
//!
//! Documents become nodes and `[[Title]]` references become weighted edges.
//! [`KnowledgeGraphEngine`] lays the graph out with a force simulation and
//! applies only the latest detail fetch per interaction kind.

pub mod cluster;
pub mod config;
pub mod corpus;
pub mod engine;
pub mod error;
pub mod graph;
pub mod interaction;
pub mod layout;
pub mod telemetry;
pub mod util;

pub use crate::config::EngineConfig;
pub use crate::engine::{EngineServices, EngineStatus, KnowledgeGraphEngine};
pub use crate::error::{ConfigError, CorpusError, DetailError, EngineError};
pub use crate::graph::{GraphBuilder, GraphSnapshot};
