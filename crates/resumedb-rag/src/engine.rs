//! The retrieval engine: one owned [`Corpus`] behind one lock, an embedder,
//! and an optional answer synthesizer.
//!
//! Every public method takes the lock for its whole duration, so a search
//! never observes a half-applied add or delete, and save/load never race a
//! mutation.

use std::path::Path;

use parking_lot::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use resumedb_core::config::Settings;
use resumedb_core::traits::Embedder;
use resumedb_core::types::{
    CorpusStats, Document, DocumentId, DocumentMeta, HealthReport, SearchQuery, SearchResponse, SearchResult,
};
use resumedb_core::{Error, ErrorKind, Result};
use resumedb_index::METRIC;

use crate::corpus::Corpus;
use crate::llm::OllamaGenerator;
use crate::snapshot;
use crate::synthesizer::AnswerSynthesizer;

pub struct RetrievalEngine {
    embedder: Box<dyn Embedder>,
    synthesizer: Option<AnswerSynthesizer>,
    corpus: Mutex<Corpus>,
}

impl RetrievalEngine {
    /// An empty engine with no answer generation.
    pub fn new(embedder: Box<dyn Embedder>) -> Self {
        let corpus = Corpus::new(embedder.dim());
        Self { embedder, synthesizer: None, corpus: Mutex::new(corpus) }
    }

    pub fn with_synthesizer(mut self, synthesizer: AnswerSynthesizer) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    /// Embedder and (if enabled) LLM built from settings.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let embedder = resumedb_embed::embedder_from_settings(&settings.embedding)?;
        if embedder.dim() != settings.embedding.dimension {
            warn!(
                configured = settings.embedding.dimension,
                actual = embedder.dim(),
                "embedding.dimension differs from the model; using the model's"
            );
        }
        let mut engine = Self::new(embedder);
        if settings.llm.enabled {
            let generator = OllamaGenerator::from_settings(&settings.llm)?;
            engine = engine.with_synthesizer(
                AnswerSynthesizer::new(Box::new(generator)).with_context_chars(settings.search.context_chars),
            );
        }
        info!(embedding_model = %engine.embedder.model_id(), llm = settings.llm.enabled, "retrieval engine ready");
        Ok(engine)
    }

    pub fn dimension(&self) -> usize { self.embedder.dim() }

    pub fn embedding_model(&self) -> &str { self.embedder.model_id() }

    pub fn len(&self) -> usize { self.corpus.lock().len() }

    pub fn is_empty(&self) -> bool { self.corpus.lock().is_empty() }

    /// Embed `text` and append it under a fresh id. Nothing is stored when
    /// the embedder fails or returns a vector of the wrong dimension.
    pub fn add(&self, text: &str, filename: &str) -> Result<DocumentId> {
        let mut corpus = self.corpus.lock();
        let embedding = self.embedder.embed(text)?;

        let mut id = Uuid::new_v4().to_string();
        while corpus.store().contains_id(&id) {
            id = Uuid::new_v4().to_string();
        }
        let document = Document { id: id.clone(), filename: filename.to_string(), content: text.to_string() };
        let position = corpus.push(document, &embedding)?;

        info!(%id, %filename, position, total = corpus.len(), "document added");
        Ok(id)
    }

    /// Rank documents against `query.query`. An empty corpus returns no
    /// results without embedding the query. Answer generation failures
    /// leave `answer` as `None`; they never fail the search.
    pub fn search(&self, query: &SearchQuery) -> Result<SearchResponse> {
        if query.top_k == 0 {
            return Err(Error::InvalidQuery("top_k must be positive".into()));
        }
        let corpus = self.corpus.lock();
        let total_documents = corpus.len();

        let results = if corpus.is_empty() {
            Vec::new()
        } else {
            let query_vector = self.embedder.embed(&query.query)?;
            corpus
                .index()
                .search(&query_vector, query.top_k)?
                .into_iter()
                .filter_map(|hit| {
                    corpus
                        .store()
                        .get(hit.position)
                        .map(|doc| SearchResult { document: doc.clone(), score: hit.similarity() })
                })
                .collect()
        };
        debug!(query = %query.query, top_k = query.top_k, hits = results.len(), "search");

        let answer = match (&self.synthesizer, query.include_answer) {
            (Some(synthesizer), true) => match synthesizer.try_generate(&query.query, &results) {
                Ok(answer) => Some(answer),
                Err(e) => {
                    warn!(error = %e, "answer generation failed; returning results without an answer");
                    None
                }
            },
            _ => None,
        };

        Ok(SearchResponse { query: query.query.clone(), results, answer, total_documents })
    }

    /// Remove the document with `id` and rebuild the index from the
    /// remaining documents. Returns the removed document.
    pub fn delete(&self, id: &str) -> Result<Document> {
        let mut corpus = self.corpus.lock();
        let position = corpus
            .store()
            .position_of(id)
            .ok_or_else(|| Error::NotFound(format!("document {}", id)))?;
        let removed = corpus.remove_and_rebuild(position, self.embedder.as_ref())?;
        info!(%id, filename = %removed.filename, remaining = corpus.len(), "document deleted; index rebuilt");
        Ok(removed)
    }

    pub fn list(&self) -> Vec<DocumentMeta> { self.corpus.lock().store().metadata() }

    pub fn documents(&self) -> Vec<Document> { self.corpus.lock().store().get_all().to_vec() }

    pub fn get(&self, id: &str) -> Result<Document> {
        self.corpus.lock().store().find_by_id(id).cloned()
    }

    pub fn stats(&self) -> CorpusStats {
        let corpus = self.corpus.lock();
        CorpusStats {
            total_documents: corpus.len(),
            dimension: corpus.dim(),
            index_size: corpus.index().len(),
            metric: METRIC.to_string(),
        }
    }

    pub fn health(&self) -> HealthReport {
        let documents = self.len();
        let (llm_model, llm_available) = match &self.synthesizer {
            Some(s) => (Some(s.generator().model().to_string()), s.generator().is_available()),
            None => (None, false),
        };
        HealthReport { documents, embedding_model: self.embedder.model_id().to_string(), llm_model, llm_available }
    }

    /// Models the configured LLM backend reports. Empty without an LLM.
    pub fn llm_models(&self) -> Result<Vec<String>> {
        match &self.synthesizer {
            Some(s) => s.generator().list_models(),
            None => Ok(Vec::new()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let corpus = self.corpus.lock();
        snapshot::write(path, &corpus, self.embedder.model_id())
    }

    /// Replace the in-memory corpus with the one stored at `path`. On any
    /// failure the current corpus is kept as it was.
    pub fn load(&self, path: &Path) -> Result<usize> {
        let mut corpus = self.corpus.lock();
        let loaded = snapshot::read(path, self.embedder.dim(), self.embedder.model_id())?;
        *corpus = loaded;
        Ok(corpus.len())
    }

    /// Startup helper: load `path` if it exists, otherwise keep the empty
    /// corpus. A present but unreadable file is still an error.
    pub fn restore_or_empty(&self, path: &Path) -> Result<usize> {
        match self.load(path) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == ErrorKind::Persistence && !path.exists() => {
                info!(path = %path.display(), "no saved state; starting empty");
                Ok(0)
            }
            Err(e) => Err(e),
        }
    }
}
