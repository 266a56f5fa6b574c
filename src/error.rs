use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("failed to read corpus file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid corpus JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("corpus source unavailable: {0}")]
    Unavailable(String),
}

/// Failures of a single detail fetch. These never escape the fetch call site;
/// the engine turns them into "no detail available" state for the node.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DetailError {
    #[error("document {0} not found")]
    NotFound(String),
    #[error("detail request failed: {0}")]
    Transport(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Corpus(#[from] CorpusError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("engine has been disposed")]
    Disposed,
}
