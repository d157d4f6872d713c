//! Remote embedding provider backed by an Ollama server.

use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

use resumedb_core::config::EmbeddingSettings;
use resumedb_core::traits::Embedder;
use resumedb_core::Error;

#[derive(Serialize)]
struct EmbeddingRequest<'a> { model: &'a str, prompt: &'a str }

#[derive(Deserialize)]
struct EmbeddingResponse { embedding: Vec<f32> }

pub struct OllamaEmbedder {
    client: reqwest::blocking::Client,
    endpoint: String,
    model: String,
    dim: usize,
    id: String,
}

impl OllamaEmbedder {
    pub fn new(base_url: &str, model: &str, dim: usize, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder().timeout(timeout).build()?;
        let endpoint = format!("{}/api/embeddings", base_url.trim_end_matches('/'));
        let id = format!("ollama:{}:d{}", model, dim);
        Ok(Self { client, endpoint, model: model.to_string(), dim, id })
    }

    pub fn from_settings(settings: &EmbeddingSettings) -> Result<Self> {
        Self::new(&settings.ollama_url, &settings.ollama_model, settings.dimension, Duration::from_secs(settings.timeout_secs))
    }
}

fn collaborator_error(e: reqwest::Error) -> Error {
    if e.is_timeout() { Error::CollaboratorTimeout(format!("embedding request: {e}")) }
    else { Error::CollaboratorUnavailable(format!("embedding request: {e}")) }
}

impl Embedder for OllamaEmbedder {
    fn model_id(&self) -> &str { &self.id }
    fn dim(&self) -> usize { self.dim }
    fn max_len(&self) -> usize { usize::MAX }

    fn embed(&self, text: &str) -> resumedb_core::Result<Vec<f32>> {
        debug!(model = %self.model, chars = text.len(), "requesting remote embedding");
        let response = self
            .client
            .post(&self.endpoint)
            .json(&EmbeddingRequest { model: &self.model, prompt: text })
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(collaborator_error)?;
        let body: EmbeddingResponse = response
            .json()
            .map_err(|e| Error::CollaboratorUnavailable(format!("malformed embedding response: {e}")))?;
        Ok(body.embedding)
    }
}
