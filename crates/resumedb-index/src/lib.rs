//! resumedb-index
//!
//! In-memory storage for the retrieval engine: an exact L2 [`VectorIndex`]
//! and a [`DocumentStore`] whose positions mirror the index one-to-one.
//! Keeping the two aligned is the caller's job (see `resumedb-rag`).

pub mod document_store;
pub mod vector_index;

pub use document_store::DocumentStore;
pub use vector_index::{distance_to_similarity, squared_l2, Neighbor, VectorIndex, METRIC};
