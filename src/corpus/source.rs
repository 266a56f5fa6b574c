use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError, RwLock};
use std::thread;
use std::time::Duration;

use tracing::{debug, info};

use super::document::{DocumentSummary, NodeDetail};
use super::load::load_corpus;
use crate::error::{CorpusError, DetailError};
use crate::graph::GraphBuilder;
use crate::util::reading_time_minutes;

/// Supplies the corpus snapshot; called from a background thread on refresh.
pub trait CorpusSource: Send + Sync {
    fn fetch_corpus(&self) -> Result<Vec<DocumentSummary>, CorpusError>;
}

/// May be slow or fail; no ordering guarantee relative to other calls.
pub trait DetailSource: Send + Sync {
    fn fetch_node_detail(&self, id: &str) -> Result<NodeDetail, DetailError>;
}

/// Navigation side effect; nothing is returned to the engine.
pub trait DocumentOpener: Send + Sync {
    fn open_document(&self, id: &str);
}

#[derive(Clone, Debug)]
pub struct FileCorpus {
    path: PathBuf,
}

impl FileCorpus {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CorpusSource for FileCorpus {
    fn fetch_corpus(&self) -> Result<Vec<DocumentSummary>, CorpusError> {
        load_corpus(&self.path)
    }
}

#[derive(Debug, Default)]
pub struct StaticCorpus {
    documents: RwLock<Vec<DocumentSummary>>,
}

impl StaticCorpus {
    pub fn new(documents: Vec<DocumentSummary>) -> Self {
        Self {
            documents: RwLock::new(documents),
        }
    }

    pub fn replace(&self, documents: Vec<DocumentSummary>) {
        *self
            .documents
            .write()
            .unwrap_or_else(PoisonError::into_inner) = documents;
    }
}

impl CorpusSource for StaticCorpus {
    fn fetch_corpus(&self) -> Result<Vec<DocumentSummary>, CorpusError> {
        Ok(self
            .documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }
}

/// In-process stand-in for the document backend: serves the corpus and
/// answers detail requests from the last corpus it handed out.
pub struct LocalBackend {
    corpus: Box<dyn CorpusSource>,
    builder: GraphBuilder,
    latency: Duration,
    details: RwLock<HashMap<String, NodeDetail>>,
}

impl LocalBackend {
    pub fn new(corpus: impl CorpusSource + 'static, builder: GraphBuilder, latency: Duration) -> Self {
        Self {
            corpus: Box::new(corpus),
            builder,
            latency,
            details: RwLock::new(HashMap::new()),
        }
    }

    fn reindex(&self, documents: &[DocumentSummary]) {
        let snapshot = self.builder.build(documents);
        let details = documents
            .iter()
            .map(|document| {
                (
                    document.id.clone(),
                    NodeDetail {
                        reading_time: reading_time_minutes(document.word_count),
                        connection_count: snapshot.connection_count(&document.id),
                        document: Some(document.clone()),
                    },
                )
            })
            .collect::<HashMap<_, _>>();

        debug!(documents = details.len(), "detail index rebuilt");
        *self.details.write().unwrap_or_else(PoisonError::into_inner) = details;
    }
}

impl CorpusSource for LocalBackend {
    fn fetch_corpus(&self) -> Result<Vec<DocumentSummary>, CorpusError> {
        let documents = self.corpus.fetch_corpus()?;
        self.reindex(&documents);
        Ok(documents)
    }
}

impl DetailSource for LocalBackend {
    fn fetch_node_detail(&self, id: &str) -> Result<NodeDetail, DetailError> {
        if !self.latency.is_zero() {
            thread::sleep(self.latency);
        }

        self.details
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
            .ok_or_else(|| DetailError::NotFound(id.to_owned()))
    }
}

#[derive(Debug, Default)]
pub struct LoggingOpener {
    last_opened: Mutex<Option<String>>,
}

impl LoggingOpener {
    pub fn last_opened(&self) -> Option<String> {
        self.last_opened
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl DocumentOpener for LoggingOpener {
    fn open_document(&self, id: &str) {
        info!(%id, "opening document");
        *self.last_opened.lock().unwrap_or_else(PoisonError::into_inner) = Some(id.to_owned());
    }
}
