//! Embedding backends for the retrieval engine.
//!
//! - [`EmbeddingModel`]: a local BERT-family sentence encoder (all-MiniLM-L6-v2
//!   by default) run with candle, mean-pooled and L2-normalized.
//! - [`FakeEmbedder`]: hashed bag-of-words vectors, deterministic and instant.
//!   Selected by `APP_USE_FAKE_EMBEDDINGS=1` for tests and development.
//! - [`remote::OllamaEmbedder`]: an Ollama server's `/api/embeddings` endpoint.

use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

use resumedb_core::config::{EmbeddingBackend, EmbeddingSettings};
use resumedb_core::traits::Embedder;
use resumedb_core::Error;

pub mod device;
pub mod pool;
pub mod remote;
pub mod tokenize;

pub use pool::masked_mean_l2;
pub use remote::OllamaEmbedder;

pub const DEFAULT_MODEL_DIR: &str = "models/all-MiniLM-L6-v2";
pub const DEFAULT_DIM: usize = 384;
pub const DEFAULT_MAX_LEN: usize = 256;

pub struct EmbeddingModel { model: BertModel, tokenizer: Tokenizer, device: Device, dim: usize, max_len: usize, id: String }

#[derive(serde::Deserialize)]
struct HiddenSize { hidden_size: usize }

impl EmbeddingModel {
    pub fn new() -> Result<Self> {
        Self::from_dir(&resolve_model_dir(None)?, DEFAULT_MAX_LEN)
    }

    /// Load `tokenizer.json`, `config.json` and `model.safetensors`
    /// (or `pytorch_model.bin`) from `model_dir`.
    pub fn from_dir(model_dir: &Path, max_len: usize) -> Result<Self> {
        let device = device::select_device();
        info!(dir = %model_dir.display(), "loading embedding model");
        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e))?;
        let config_path = model_dir.join("config.json");
        let raw_config = std::fs::read_to_string(&config_path).with_context(|| format!("reading {}", config_path.display()))?;
        let config: BertConfig = serde_json::from_str(&raw_config)?;
        let HiddenSize { hidden_size } = serde_json::from_str(&raw_config)?;
        let weights_map = load_weights(model_dir, &device)?;
        let vb = VarBuilder::from_tensors(weights_map, DType::F32, &device);
        let model = BertModel::load(vb, &config)?;
        let name = model_dir.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_else(|| "bert".to_string());
        let id = format!("local:{}:d{}", name, hidden_size);
        info!(model = %id, "embedding model loaded");
        Ok(Self { model, tokenizer, device, dim: hidden_size, max_len, id })
    }

    pub fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        let start = Instant::now();
        let enc = tokenize::tokenize_on_device(&self.tokenizer, text, self.max_len, &self.device)?;
        let hidden = self.model.forward(&enc.input_ids, &enc.token_type_ids, Some(&enc.attention_mask))?;
        let pooled = masked_mean_l2(&hidden, &enc.attention_mask)?;
        let emb: Vec<f32> = pooled.to_device(&Device::Cpu)?.squeeze(0)?.to_vec1()?;
        if emb.len() != self.dim { return Err(anyhow!("model produced {} dims, expected {}", emb.len(), self.dim)); }
        let elapsed = start.elapsed();
        if elapsed.as_millis() > 100 { warn!(ms = elapsed.as_millis() as u64, "slow embedding"); }
        Ok(emb)
    }
}

impl Embedder for EmbeddingModel {
    fn model_id(&self) -> &str { &self.id }
    fn dim(&self) -> usize { self.dim }
    fn max_len(&self) -> usize { self.max_len }
    fn embed(&self, text: &str) -> resumedb_core::Result<Vec<f32>> {
        self.embed_text(text).map_err(|e| Error::CollaboratorUnavailable(format!("local embedding failed: {e:#}")))
    }
}

fn load_weights(model_dir: &Path, device: &Device) -> Result<HashMap<String, Tensor>> {
    let safetensors = model_dir.join("model.safetensors");
    if safetensors.exists() {
        debug!(path = %safetensors.display(), "loading safetensors weights");
        return Ok(candle_core::safetensors::load(&safetensors, device)?);
    }
    let pickle = model_dir.join("pytorch_model.bin");
    debug!(path = %pickle.display(), "loading pytorch weights");
    let weights = candle_core::pickle::read_all(&pickle).with_context(|| format!("reading {}", pickle.display()))?;
    Ok(weights.into_iter().collect())
}

/// Hashed bag-of-words embedder. Each lowercase alphanumeric token lands in a
/// bucket chosen by its xxhash; the vector is then L2-normalized. Texts that
/// share tokens end up close under L2.
pub struct FakeEmbedder { dim: usize, id: String }

impl FakeEmbedder {
    pub fn new(dim: usize) -> Self { Self { dim, id: format!("fake:xxhash:d{}", dim) } }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        use std::hash::{Hash, Hasher}; use twox_hash::XxHash64;
        let mut v = vec![0f32; self.dim];
        for token in text.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()) {
            let mut hasher = XxHash64::with_seed(0); token.to_lowercase().hash(&mut hasher); let h = hasher.finish();
            let idx = (h as usize) % self.dim; let val = 0.5 + (((h >> 32) as u32) as f32) / (u32::MAX as f32) * 0.5;
            v[idx] += val;
        }
        let norm = (v.iter().map(|x| x * x).sum::<f32>()).sqrt().max(1e-6); for x in &mut v { *x /= norm; } v
    }
}

impl Embedder for FakeEmbedder {
    fn model_id(&self) -> &str { &self.id }
    fn dim(&self) -> usize { self.dim }
    fn max_len(&self) -> usize { usize::MAX }
    fn embed(&self, text: &str) -> resumedb_core::Result<Vec<f32>> { Ok(self.vectorize(text)) }
}

fn use_fake_from_env() -> bool {
    std::env::var("APP_USE_FAKE_EMBEDDINGS").ok().map(|v| v == "1" || v.eq_ignore_ascii_case("true")).unwrap_or(false)
}

/// Default embedder: fake when `APP_USE_FAKE_EMBEDDINGS` is set, else the local model.
pub fn get_default_embedder() -> Result<Box<dyn Embedder>> {
    embedder_from_settings(&EmbeddingSettings::default())
}

pub fn embedder_from_settings(settings: &EmbeddingSettings) -> Result<Box<dyn Embedder>> {
    let backend = if use_fake_from_env() { EmbeddingBackend::Fake } else { settings.backend };
    match backend {
        EmbeddingBackend::Fake => { info!(dim = settings.dimension, "using FakeEmbedder"); Ok(Box::new(FakeEmbedder::new(settings.dimension))) }
        EmbeddingBackend::Local => {
            let dir = resolve_model_dir(settings.model_dir.as_deref())?;
            Ok(Box::new(EmbeddingModel::from_dir(&dir, settings.max_len)?))
        }
        EmbeddingBackend::Ollama => Ok(Box::new(OllamaEmbedder::from_settings(settings)?)),
    }
}

fn resolve_model_dir(configured: Option<&str>) -> Result<PathBuf> {
    if let Some(dir) = configured { let p = resumedb_core::config::expand_path(dir); if p.exists() { return Ok(p); } warn!(dir = %p.display(), "configured model_dir does not exist"); }
    if let Ok(dir) = std::env::var("APP_MODEL_DIR") { let p = PathBuf::from(&dir); if p.exists() { info!(dir = %p.display(), "using APP_MODEL_DIR"); return Ok(p); } }
    if let Ok(dir) = std::env::var("MODEL_DIR") { let p = PathBuf::from(&dir); if p.exists() { info!(dir = %p.display(), "using MODEL_DIR"); return Ok(p); } }
    let root = Path::new("..").join(DEFAULT_MODEL_DIR); if root.exists() { return Ok(root); }
    let local = Path::new(DEFAULT_MODEL_DIR); if local.exists() { return Ok(local.to_path_buf()); }
    Err(anyhow!("Could not locate embedding model directory (set embedding.model_dir or APP_MODEL_DIR)"))
}
