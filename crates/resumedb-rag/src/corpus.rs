//! The indexed documents and their embeddings, kept position-aligned.

use resumedb_core::traits::Embedder;
use resumedb_core::types::Document;
use resumedb_core::{Error, Result};
use resumedb_index::{DocumentStore, VectorIndex};

/// `store.len() == index.len()` after every method returns, whether it
/// succeeded or not.
#[derive(Debug, Clone, PartialEq)]
pub struct Corpus {
    store: DocumentStore,
    index: VectorIndex,
}

impl Corpus {
    pub fn new(dim: usize) -> Self {
        Self { store: DocumentStore::new(), index: VectorIndex::new(dim) }
    }

    /// Rebuild from persisted parts. Lengths, dimensions and id uniqueness
    /// are checked; nothing is returned unless all of them hold.
    pub fn from_parts(dim: usize, documents: Vec<Document>, embeddings: Vec<Vec<f32>>) -> Result<Self> {
        if documents.len() != embeddings.len() {
            return Err(Error::Persistence(format!(
                "{} documents but {} embeddings",
                documents.len(),
                embeddings.len()
            )));
        }
        {
            let mut seen = std::collections::HashSet::with_capacity(documents.len());
            if let Some(dup) = documents.iter().find(|d| !seen.insert(d.id.as_str())) {
                return Err(Error::Persistence(format!("duplicate document id {}", dup.id)));
            }
        }
        let index = VectorIndex::from_vectors(dim, &embeddings)
            .map_err(|e| Error::Persistence(format!("stored embedding rejected: {e}")))?;
        Ok(Self { store: DocumentStore::from_documents(documents), index })
    }

    pub fn len(&self) -> usize { self.store.len() }

    pub fn is_empty(&self) -> bool { self.store.is_empty() }

    pub fn dim(&self) -> usize { self.index.dim() }

    pub fn store(&self) -> &DocumentStore { &self.store }

    pub fn index(&self) -> &VectorIndex { &self.index }

    /// Insert the vector, then the document. A rejected vector leaves both untouched.
    pub fn push(&mut self, document: Document, embedding: &[f32]) -> Result<usize> {
        let position = self.index.insert(embedding)?;
        let stored_at = self.store.append(document);
        debug_assert_eq!(position, stored_at);
        Ok(position)
    }

    /// Remove the document at `position` and replace the index with one built
    /// from fresh embeddings of the remaining documents.
    ///
    /// The new index is computed before anything is removed, so a failing
    /// embedder leaves the corpus as it was.
    pub fn remove_and_rebuild(&mut self, position: usize, embedder: &dyn Embedder) -> Result<Document> {
        if position >= self.store.len() {
            return Err(Error::NotFound(format!("document position {}", position)));
        }
        let mut rebuilt = VectorIndex::with_capacity(self.index.dim(), self.store.len() - 1);
        for (p, doc) in self.store.iter().enumerate() {
            if p == position { continue; }
            rebuilt.insert(&embedder.embed(&doc.content)?)?;
        }
        let removed = self.store.remove_at(position)?;
        self.index = rebuilt;
        Ok(removed)
    }
}
