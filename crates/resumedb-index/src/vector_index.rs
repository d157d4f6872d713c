//! Exact k-nearest-neighbor index over fixed-dimension vectors.
//!
//! Vectors are stored contiguously in insertion order; a vector's position is
//! its insertion rank among the live vectors. Search is a full scan under
//! squared Euclidean distance, which is fine for thousands of documents.

use std::cmp::Ordering;

use resumedb_core::{Error, Result};
use tracing::trace;

pub const METRIC: &str = "l2";

/// A search hit: position in the index plus squared L2 distance to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub position: usize,
    pub distance: f32,
}

impl Neighbor {
    pub fn similarity(&self) -> f32 { distance_to_similarity(self.distance) }
}

/// `1 / (1 + d)`: monotonically decreasing, in (0, 1], 1.0 only at d = 0.
pub fn distance_to_similarity(distance: f32) -> f32 { 1.0 / (1.0 + distance) }

pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| { let d = x - y; d * d }).sum()
}

/// Ascending distance, ties by ascending position.
fn nearest_first(a: &Neighbor, b: &Neighbor) -> Ordering {
    a.distance.total_cmp(&b.distance).then(a.position.cmp(&b.position))
}

#[derive(Debug, Clone, PartialEq)]
pub struct VectorIndex {
    dim: usize,
    data: Vec<f32>,
}

impl VectorIndex {
    pub fn new(dim: usize) -> Self { Self { dim, data: Vec::new() } }

    pub fn with_capacity(dim: usize, vectors: usize) -> Self {
        Self { dim, data: Vec::with_capacity(dim * vectors) }
    }

    /// Build an index from vectors in order. Fails on the first wrong-sized vector.
    pub fn from_vectors<I, V>(dim: usize, vectors: I) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: AsRef<[f32]>,
    {
        let mut index = Self::new(dim);
        for v in vectors { index.insert(v.as_ref())?; }
        Ok(index)
    }

    pub fn dim(&self) -> usize { self.dim }

    pub fn len(&self) -> usize {
        if self.dim == 0 { 0 } else { self.data.len() / self.dim }
    }

    pub fn is_empty(&self) -> bool { self.data.is_empty() }

    fn check_dim(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dim {
            return Err(Error::DimensionMismatch { expected: self.dim, actual: vector.len() });
        }
        Ok(())
    }

    /// Append a vector; returns its position.
    pub fn insert(&mut self, vector: &[f32]) -> Result<usize> {
        self.check_dim(vector)?;
        if self.dim == 0 { return Err(Error::InvalidConfig("vector index dimension is zero".into())); }
        let position = self.len();
        self.data.extend_from_slice(vector);
        Ok(position)
    }

    pub fn get(&self, position: usize) -> Option<&[f32]> {
        if position >= self.len() { return None; }
        let start = position * self.dim;
        Some(&self.data[start..start + self.dim])
    }

    pub fn iter(&self) -> impl Iterator<Item = &[f32]> + '_ {
        self.data.chunks_exact(self.dim.max(1))
    }

    /// Delete the vector at `position`; later positions shift down by one.
    pub fn remove(&mut self, position: usize) -> Result<Vec<f32>> {
        if position >= self.len() {
            return Err(Error::NotFound(format!("vector position {} (index holds {})", position, self.len())));
        }
        let start = position * self.dim;
        Ok(self.data.drain(start..start + self.dim).collect())
    }

    /// The `min(k, len)` nearest vectors to `query`, ascending by distance,
    /// ties broken by ascending position. Empty index yields no hits.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        self.check_dim(query)?;
        let k = k.min(self.len());
        if k == 0 { return Ok(Vec::new()); }
        let mut hits: Vec<Neighbor> = self
            .iter()
            .enumerate()
            .map(|(position, v)| Neighbor { position, distance: squared_l2(query, v) })
            .collect();
        trace!(k, scanned = hits.len(), "knn scan");
        if k < hits.len() {
            hits.select_nth_unstable_by(k - 1, nearest_first);
            hits.truncate(k);
        }
        hits.sort_by(nearest_first);
        Ok(hits)
    }
}
