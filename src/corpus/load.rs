use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, warn};

use super::document::DocumentSummary;
use crate::error::CorpusError;

pub fn load_corpus(path: &Path) -> Result<Vec<DocumentSummary>, CorpusError> {
    let raw = fs::read_to_string(path).map_err(|source| CorpusError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let corpus = parse_corpus(&raw)?;
    debug!(path = %path.display(), documents = corpus.len(), "corpus loaded");
    Ok(corpus)
}

/// Accepts either a bare array of documents or `{ "documents": [...] }`.
pub fn parse_corpus(raw: &str) -> Result<Vec<DocumentSummary>, CorpusError> {
    let parsed: Value = serde_json::from_str(raw)?;

    let documents = match parsed {
        Value::Object(mut object) => match object.remove("documents") {
            Some(documents) => documents,
            None => {
                return Err(CorpusError::Unavailable(
                    "corpus object has no \"documents\" array".to_owned(),
                ));
            }
        },
        other => other,
    };

    let documents = serde_json::from_value::<Vec<DocumentSummary>>(documents)?;
    Ok(normalize(documents))
}

fn normalize(documents: Vec<DocumentSummary>) -> Vec<DocumentSummary> {
    let mut seen = HashSet::with_capacity(documents.len());
    let mut normalized = Vec::with_capacity(documents.len());

    for mut document in documents {
        if document.id.trim().is_empty() {
            warn!(title = %document.title, "skipping document without id");
            continue;
        }
        if !seen.insert(document.id.clone()) {
            warn!(id = %document.id, "skipping duplicate document id");
            continue;
        }
        if document.word_count == 0 && !document.content.is_empty() {
            document.word_count = document.content.split_whitespace().count() as u64;
        }
        normalized.push(document);
    }

    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_array_with_numeric_ids() {
        let corpus = parse_corpus(
            r#"[{"id": 1, "title": "A", "content": "see [[B]]"}, {"id": "2", "title": "B"}]"#,
        )
        .unwrap();

        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus[0].id, "1");
        assert_eq!(corpus[0].word_count, 2);
        assert_eq!(corpus[1].id, "2");
    }

    #[test]
    fn parses_wrapped_documents_and_wire_names() {
        let corpus = parse_corpus(
            r#"{"documents": [{"id": "x", "title": "X", "type": "meeting", "tags": ["q3"], "wordCount": 640}]}"#,
        )
        .unwrap();

        assert_eq!(corpus[0].doc_type, "meeting");
        assert_eq!(corpus[0].tags, vec!["q3".to_owned()]);
        assert_eq!(corpus[0].word_count, 640);
    }

    #[test]
    fn drops_duplicate_and_empty_ids() {
        let corpus = parse_corpus(
            r#"[{"id": "a", "title": "first"}, {"id": "a", "title": "second"}, {"id": " ", "title": "blank"}]"#,
        )
        .unwrap();

        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus[0].title, "first");
    }

    #[test]
    fn rejects_object_without_documents() {
        assert!(matches!(
            parse_corpus(r#"{"items": []}"#),
            Err(CorpusError::Unavailable(_))
        ));
        assert!(matches!(parse_corpus("not json"), Err(CorpusError::Parse(_))));
    }
}
