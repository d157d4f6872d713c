use crate::error::Result;

/// Maps text to a fixed-dimension vector. Must be deterministic for a given
/// `model_id`.
pub trait Embedder: Send + Sync {
    /// Stable identifier for the backend/model (e.g. `local:all-MiniLM-L6-v2:d384`).
    fn model_id(&self) -> &str;
    fn dim(&self) -> usize;
    fn max_len(&self) -> usize;
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

/// Turns a system instruction plus a user prompt into generated text.
pub trait Generator: Send + Sync {
    fn model(&self) -> &str;
    fn generate(&self, system_instruction: &str, user_prompt: &str) -> Result<String>;

    /// Cheap reachability probe.
    fn is_available(&self) -> bool { true }

    /// Models the backend can serve, if it can tell.
    fn list_models(&self) -> Result<Vec<String>> { Ok(Vec::new()) }
}
