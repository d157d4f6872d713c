//! Domain types shared by the index, the engine and its callers.

use serde::{Deserialize, Serialize};

pub type DocumentId = String;

pub const DEFAULT_TOP_K: usize = 3;

/// An indexed resume.
///
/// - `id`: assigned by the engine on insertion, unique for the corpus lifetime
/// - `filename`: original upload name, not validated
/// - `content`: decoded text the embedding was computed from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub filename: String,
    pub content: String,
}

impl Document {
    pub fn meta(&self) -> DocumentMeta {
        DocumentMeta { id: self.id.clone(), filename: self.filename.clone() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMeta {
    pub id: DocumentId,
    pub filename: String,
}

/// A ranked hit.
///
/// `score` is `1 / (1 + d)` where `d` is the squared L2 distance between the
/// query and document embeddings: higher is better, range is (0, 1], and 1.0
/// only for an identical vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(flatten)]
    pub document: Document,
    pub score: f32,
}

fn default_top_k() -> usize { DEFAULT_TOP_K }
fn default_include_answer() -> bool { true }

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub query: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_include_answer")]
    pub include_answer: bool,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self { query: query.into(), top_k: DEFAULT_TOP_K, include_answer: default_include_answer() }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self { self.top_k = top_k; self }

    pub fn with_answer(mut self, include_answer: bool) -> Self { self.include_answer = include_answer; self }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SearchResult>,
    /// `None` when no answer was requested, no LLM is configured, or the LLM failed.
    pub answer: Option<String>,
    pub total_documents: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusStats {
    pub total_documents: usize,
    pub dimension: usize,
    pub index_size: usize,
    pub metric: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub documents: usize,
    pub embedding_model: String,
    pub llm_model: Option<String>,
    pub llm_available: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_query_defaults_when_fields_missing() {
        let q: SearchQuery = serde_json::from_str(r#"{"query":"rust"}"#).expect("parse");
        assert_eq!(q.top_k, 3);
        assert!(q.include_answer);
    }

    #[test]
    fn search_result_serializes_flat() {
        let hit = SearchResult {
            document: Document { id: "a".into(), filename: "a.txt".into(), content: "c".into() },
            score: 0.5,
        };
        let v = serde_json::to_value(&hit).expect("json");
        assert_eq!(v["id"], "a");
        assert_eq!(v["filename"], "a.txt");
        assert_eq!(v["score"], 0.5);
    }
}
