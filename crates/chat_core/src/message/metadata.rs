//! ResponseMetadata - free-form metadata the backend attaches to an answer
//!
//! The object is kept verbatim; typed accessors read the keys the engine
//! cares about, accepting the legacy `pdf_*` spellings.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A document the backend reports as having been used for an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSource {
    pub id: String,
    #[serde(default)]
    pub filename: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseMetadata(pub Map<String, Value>);

impl ResponseMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Ids of the documents the request was grounded in.
    pub fn document_ids(&self) -> Vec<String> {
        self.string_list("document_ids")
            .or_else(|| self.string_list("pdf_ids"))
            .unwrap_or_default()
    }

    /// Retrieval method used by the backend (e.g. `faiss`, `mongodb`, `none`).
    pub fn search_method(&self) -> Option<&str> {
        self.0.get("search_method").and_then(Value::as_str)
    }

    pub fn similar_chunks_count(&self) -> Option<u64> {
        self.0.get("similar_chunks_count").and_then(Value::as_u64)
    }

    /// Documents actually used, with their file names.
    pub fn sources(&self) -> Vec<DocumentSource> {
        self.0
            .get("document_sources")
            .or_else(|| self.0.get("pdf_sources"))
            .cloned()
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default()
    }

    fn string_list(&self, key: &str) -> Option<Vec<String>> {
        let items = self.0.get(key)?.as_array()?;
        Some(
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
        )
    }
}
