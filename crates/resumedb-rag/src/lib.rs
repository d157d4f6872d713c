//! resumedb-rag
//!
//! Retrieval-augmented search over a resume corpus: [`RetrievalEngine`] owns
//! the documents and their embeddings, persists them as one snapshot, and
//! optionally asks an LLM for an answer grounded in the top hits.

pub mod corpus;
pub mod engine;
pub mod llm;
pub mod snapshot;
pub mod synthesizer;

pub use corpus::Corpus;
pub use engine::RetrievalEngine;
pub use llm::OllamaGenerator;
pub use synthesizer::{AnswerSynthesizer, NO_RESULTS_ANSWER};
