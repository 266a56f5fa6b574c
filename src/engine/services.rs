use std::sync::Arc;
use std::time::Duration;

use crate::config::EngineConfig;
use crate::corpus::{CorpusSource, DetailSource, DocumentOpener, LocalBackend, LoggingOpener};
use crate::graph::GraphBuilder;

/// Collaborators injected into the engine at construction.
#[derive(Clone)]
pub struct EngineServices {
    pub corpus: Arc<dyn CorpusSource>,
    pub details: Arc<dyn DetailSource>,
    pub opener: Arc<dyn DocumentOpener>,
}

impl EngineServices {
    pub fn new(
        corpus: Arc<dyn CorpusSource>,
        details: Arc<dyn DetailSource>,
        opener: Arc<dyn DocumentOpener>,
    ) -> Self {
        Self {
            corpus,
            details,
            opener,
        }
    }

    /// Serves corpus and details from one in-process backend and logs opens.
    pub fn local(corpus: impl CorpusSource + 'static, config: &EngineConfig) -> Self {
        let backend = Arc::new(LocalBackend::new(
            corpus,
            GraphBuilder::new(config.builder.clone(), config.clusters),
            Duration::from_millis(config.detail_latency_ms),
        ));

        Self {
            corpus: backend.clone(),
            details: backend,
            opener: Arc::new(LoggingOpener::default()),
        }
    }
}
