//! Grounded answers over retrieved resumes.

use tracing::{info, warn};

use resumedb_core::traits::Generator;
use resumedb_core::types::SearchResult;
use resumedb_core::Result;

pub const NO_RESULTS_ANSWER: &str = "No relevant documents found.";
pub const DEFAULT_CONTEXT_CHARS: usize = 500;
pub const CONTEXT_DELIMITER: &str = "\n\n---\n\n";
pub const SYSTEM_INSTRUCTION: &str = "You are an HR assistant analyzing resumes. \
Answer only from the resumes supplied in the prompt. If they do not contain the answer, say so. \
Be concise and factual.";

pub struct AnswerSynthesizer {
    generator: Box<dyn Generator>,
    context_chars: usize,
}

/// The first `max_chars` characters of `s`, cut on a char boundary.
fn prefix_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((byte, _)) => &s[..byte],
        None => s,
    }
}

impl AnswerSynthesizer {
    pub fn new(generator: Box<dyn Generator>) -> Self {
        Self { generator, context_chars: DEFAULT_CONTEXT_CHARS }
    }

    pub fn with_context_chars(mut self, context_chars: usize) -> Self {
        self.context_chars = context_chars;
        self
    }

    pub fn generator(&self) -> &dyn Generator { self.generator.as_ref() }

    /// Filename plus a bounded content prefix per result, delimiter-separated.
    pub fn build_context(&self, results: &[SearchResult]) -> String {
        results
            .iter()
            .map(|r| format!("Resume: {}\n{}", r.document.filename, prefix_chars(&r.document.content, self.context_chars)))
            .collect::<Vec<_>>()
            .join(CONTEXT_DELIMITER)
    }

    pub fn build_prompt(&self, query: &str, results: &[SearchResult]) -> String {
        format!(
            "Based on the following resumes, answer this question: {query}\n\n\
             Resumes:\n{context}\n\n\
             Provide a clear, concise answer based only on the information in these resumes.",
            query = query,
            context = self.build_context(results),
        )
    }

    /// One generation call; collaborator errors are returned, not swallowed.
    /// An empty result list yields [`NO_RESULTS_ANSWER`] without calling the LLM.
    pub fn try_generate(&self, query: &str, results: &[SearchResult]) -> Result<String> {
        if results.is_empty() {
            return Ok(NO_RESULTS_ANSWER.to_string());
        }
        let prompt = self.build_prompt(query, results);
        info!(model = %self.generator.model(), documents = results.len(), "generating answer");
        self.generator.generate(SYSTEM_INSTRUCTION, &prompt)
    }

    /// Like [`Self::try_generate`], but a failed call becomes a message
    /// describing the failure.
    pub fn generate(&self, query: &str, results: &[SearchResult]) -> String {
        match self.try_generate(query, results) {
            Ok(answer) => answer,
            Err(e) => {
                warn!(error = %e, "answer generation failed");
                format!("Error generating answer: {e}")
            }
        }
    }
}
