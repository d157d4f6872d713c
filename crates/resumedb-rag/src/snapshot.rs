//! On-disk corpus format: one JSON file holding every document and its
//! embedding in position order, plus enough metadata to reject a file written
//! for a different embedder.
//!
//! Writes go to a temp file in the destination directory, are fsynced, then
//! renamed over the target, so readers see either the old or the new file.

use std::fmt::Display;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{info, warn};

use resumedb_core::types::Document;
use resumedb_core::{Error, Result};
use resumedb_index::METRIC;

use crate::corpus::Corpus;

pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    dimension: usize,
    metric: &'a str,
    embedding_model: &'a str,
    saved_at: DateTime<Utc>,
    documents: &'a [Document],
    embeddings: Vec<&'a [f32]>,
}

#[derive(Deserialize)]
struct Snapshot {
    version: u32,
    dimension: usize,
    metric: String,
    embedding_model: String,
    documents: Vec<Document>,
    embeddings: Vec<Vec<f32>>,
}

fn persistence(path: &Path, e: impl Display) -> Error {
    Error::Persistence(format!("{}: {}", path.display(), e))
}

/// Serialize `corpus` to `path`, replacing any existing file atomically.
pub fn write(path: &Path, corpus: &Corpus, embedding_model: &str) -> Result<()> {
    let snapshot = SnapshotRef {
        version: FORMAT_VERSION,
        dimension: corpus.dim(),
        metric: METRIC,
        embedding_model,
        saved_at: Utc::now(),
        documents: corpus.store().get_all(),
        embeddings: corpus.index().iter().collect(),
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| persistence(dir, e))?;
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| persistence(dir, e))?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        serde_json::to_writer(&mut writer, &snapshot).map_err(|e| persistence(path, e))?;
        writer.flush().map_err(|e| persistence(path, e))?;
    }
    tmp.as_file().sync_all().map_err(|e| persistence(path, e))?;
    tmp.persist(path).map_err(|e| persistence(path, e.error))?;

    info!(path = %path.display(), documents = corpus.len(), "saved corpus");
    Ok(())
}

/// Deserialize a corpus for an embedder of dimension `dim`.
///
/// Missing files, malformed JSON, version or dimension mismatches and
/// inconsistent contents are all `Error::Persistence`.
pub fn read(path: &Path, dim: usize, embedding_model: &str) -> Result<Corpus> {
    let file = File::open(path).map_err(|e| persistence(path, e))?;
    let snapshot: Snapshot = serde_json::from_reader(BufReader::new(file)).map_err(|e| persistence(path, e))?;

    if snapshot.version != FORMAT_VERSION {
        return Err(persistence(path, format!("unsupported snapshot version {}", snapshot.version)));
    }
    if snapshot.metric != METRIC {
        return Err(persistence(path, format!("snapshot metric {} is not {}", snapshot.metric, METRIC)));
    }
    if snapshot.dimension != dim {
        return Err(persistence(
            path,
            format!("snapshot dimension {} does not match embedder dimension {}", snapshot.dimension, dim),
        ));
    }
    if snapshot.embedding_model != embedding_model {
        warn!(
            stored = %snapshot.embedding_model,
            current = %embedding_model,
            "snapshot was written by a different embedding model; rankings may drift"
        );
    }

    let corpus = Corpus::from_parts(dim, snapshot.documents, snapshot.embeddings).map_err(|e| persistence(path, e))?;
    info!(path = %path.display(), documents = corpus.len(), "loaded corpus");
    Ok(corpus)
}
