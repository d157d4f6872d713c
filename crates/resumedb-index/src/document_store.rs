//! Ordered document storage, positionally aligned with [`crate::VectorIndex`].

use resumedb_core::types::{Document, DocumentMeta};
use resumedb_core::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentStore {
    docs: Vec<Document>,
}

impl DocumentStore {
    pub fn new() -> Self { Self::default() }

    pub fn from_documents(docs: Vec<Document>) -> Self { Self { docs } }

    pub fn len(&self) -> usize { self.docs.len() }

    pub fn is_empty(&self) -> bool { self.docs.is_empty() }

    /// Append at the end; returns the position it was stored at.
    pub fn append(&mut self, document: Document) -> usize {
        self.docs.push(document);
        self.docs.len() - 1
    }

    /// Delete at `position`; later entries shift down by one.
    pub fn remove_at(&mut self, position: usize) -> Result<Document> {
        if position >= self.docs.len() {
            return Err(Error::NotFound(format!("document position {} (store holds {})", position, self.docs.len())));
        }
        Ok(self.docs.remove(position))
    }

    pub fn get(&self, position: usize) -> Option<&Document> { self.docs.get(position) }

    pub fn get_all(&self) -> &[Document] { &self.docs }

    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.docs.iter().position(|d| d.id == id)
    }

    pub fn find_by_id(&self, id: &str) -> Result<&Document> {
        self.docs.iter().find(|d| d.id == id).ok_or_else(|| Error::NotFound(format!("document {}", id)))
    }

    pub fn contains_id(&self, id: &str) -> bool { self.position_of(id).is_some() }

    pub fn metadata(&self) -> Vec<DocumentMeta> { self.docs.iter().map(Document::meta).collect() }

    pub fn iter(&self) -> impl Iterator<Item = &Document> + '_ { self.docs.iter() }

    pub fn into_documents(self) -> Vec<Document> { self.docs }
}
