mod document;
mod load;
mod source;

pub use document::{DocumentSummary, NodeDetail};
pub use load::{load_corpus, parse_corpus};
pub use source::{
    CorpusSource, DetailSource, DocumentOpener, FileCorpus, LocalBackend, LoggingOpener,
    StaticCorpus,
};
