//! Blocking client for an Ollama server's chat API.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use resumedb_core::config::LlmSettings;
use resumedb_core::traits::Generator;
use resumedb_core::{Error, Result};

#[derive(Serialize)]
struct ChatMessage<'a> { role: &'a str, content: &'a str }

#[derive(Serialize)]
struct ChatOptions { temperature: f32, num_predict: u32 }

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    stream: bool,
    options: ChatOptions,
}

#[derive(Deserialize)]
struct ChatResponse { message: ChatReply }

#[derive(Deserialize)]
struct ChatReply { content: String }

#[derive(Deserialize)]
struct TagsResponse { #[serde(default)] models: Vec<ModelTag> }

#[derive(Deserialize)]
struct ModelTag { name: Option<String>, model: Option<String> }

pub struct OllamaGenerator {
    client: reqwest::blocking::Client,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

fn collaborator_error(e: reqwest::Error) -> Error {
    if e.is_timeout() { Error::CollaboratorTimeout(format!("LLM request: {e}")) }
    else { Error::CollaboratorUnavailable(format!("LLM request: {e}")) }
}

impl OllamaGenerator {
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::CollaboratorUnavailable(format!("building HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            temperature: 0.7,
            max_tokens: 200,
        })
    }

    pub fn from_settings(settings: &LlmSettings) -> Result<Self> {
        let mut generator = Self::new(&settings.base_url, &settings.model, Duration::from_secs(settings.timeout_secs))?;
        generator.temperature = settings.temperature;
        generator.max_tokens = settings.max_tokens;
        Ok(generator)
    }

    fn tags(&self) -> Result<TagsResponse> {
        self.client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(collaborator_error)?
            .json()
            .map_err(|e| Error::CollaboratorUnavailable(format!("malformed tags response: {e}")))
    }
}

impl Generator for OllamaGenerator {
    fn model(&self) -> &str { &self.model }

    fn generate(&self, system_instruction: &str, user_prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage { role: "system", content: system_instruction },
                ChatMessage { role: "user", content: user_prompt },
            ],
            stream: false,
            options: ChatOptions { temperature: self.temperature, num_predict: self.max_tokens },
        };
        debug!(model = %self.model, prompt_chars = user_prompt.len(), "chat request");
        let response: ChatResponse = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&request)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(collaborator_error)?
            .json()
            .map_err(|e| Error::CollaboratorUnavailable(format!("malformed chat response: {e}")))?;
        Ok(response.message.content)
    }

    fn is_available(&self) -> bool {
        match self.tags() {
            Ok(_) => true,
            Err(e) => { warn!(error = %e, "LLM backend unreachable"); false }
        }
    }

    fn list_models(&self) -> Result<Vec<String>> {
        Ok(self.tags()?.models.into_iter().filter_map(|m| m.name.or(m.model)).collect())
    }
}
