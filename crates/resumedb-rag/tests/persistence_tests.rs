use std::fs;

use resumedb_core::traits::Embedder;
use resumedb_core::types::{Document, SearchQuery};
use resumedb_core::ErrorKind;
use resumedb_embed::FakeEmbedder;
use resumedb_rag::{snapshot, Corpus, RetrievalEngine};
use tempfile::TempDir;

fn engine(dim: usize) -> RetrievalEngine { RetrievalEngine::new(Box::new(FakeEmbedder::new(dim))) }

fn fill(engine: &RetrievalEngine) {
    engine.add("Kubernetes operator, Go, site reliability", "ops.txt").unwrap();
    engine.add("Data scientist, Python, statistics, A/B testing", "ds.txt").unwrap();
    engine.add("Frontend developer, TypeScript, React", "fe.txt").unwrap();
}

#[test]
fn snapshot_round_trip_preserves_documents_and_embeddings() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state.json");
    let embedder = FakeEmbedder::new(64);

    let mut corpus = Corpus::new(embedder.dim());
    for (i, text) in ["alpha résumé", "beta", "gamma delta"].iter().enumerate() {
        let doc = Document { id: format!("id-{i}"), filename: format!("{i}.txt"), content: text.to_string() };
        corpus.push(doc, &embedder.embed(text).unwrap()).unwrap();
    }
    snapshot::write(&path, &corpus, embedder.model_id()).unwrap();
    let loaded = snapshot::read(&path, embedder.dim(), embedder.model_id()).unwrap();

    assert_eq!(loaded.store(), corpus.store());
    assert_eq!(loaded.index().len(), corpus.index().len());
    for (a, b) in loaded.index().iter().zip(corpus.index().iter()) {
        for (x, y) in a.iter().zip(b) {
            assert!((x - y).abs() <= 1e-6);
        }
    }
}

#[test]
fn engine_save_and_load_restore_search_behavior() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("rag_state.json");

    let original = engine(128);
    fill(&original);
    original.save(&path).unwrap();

    let restored = engine(128);
    assert_eq!(restored.load(&path).unwrap(), 3);
    assert_eq!(restored.documents(), original.documents());

    let query = SearchQuery::new("python statistics").with_top_k(3).with_answer(false);
    let a = original.search(&query).unwrap();
    let b = restored.search(&query).unwrap();
    let ids = |r: &resumedb_core::types::SearchResponse| r.results.iter().map(|h| h.document.id.clone()).collect::<Vec<_>>();
    assert_eq!(ids(&a), ids(&b));
}

#[test]
fn snapshot_file_carries_metadata() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state.json");
    let engine = engine(32);
    fill(&engine);
    engine.save(&path).unwrap();

    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["version"], 1);
    assert_eq!(raw["dimension"], 32);
    assert_eq!(raw["metric"], "l2");
    assert_eq!(raw["embedding_model"], "fake:xxhash:d32");
    assert!(raw["saved_at"].is_string());
    assert_eq!(raw["documents"].as_array().unwrap().len(), 3);
    assert_eq!(raw["embeddings"][0].as_array().unwrap().len(), 32);
}

#[test]
fn save_replaces_previous_file_and_leaves_no_temp_files() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state.json");
    let engine = engine(32);
    fill(&engine);
    engine.save(&path).unwrap();
    let id = engine.list()[0].id.clone();
    engine.delete(&id).unwrap();
    engine.save(&path).unwrap();

    let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);

    let reloaded = self::engine(32);
    assert_eq!(reloaded.load(&path).unwrap(), 2);
    assert!(reloaded.get(&id).is_err());
}

#[test]
fn loading_a_missing_file_keeps_current_state() {
    let dir = TempDir::new().unwrap();
    let engine = engine(32);
    fill(&engine);
    let before = engine.documents();

    let err = engine.load(&dir.path().join("absent.json")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Persistence);
    assert_eq!(engine.documents(), before);
}

#[test]
fn loading_a_corrupt_file_keeps_current_state() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state.json");
    fs::write(&path, b"{\"version\": 1, \"documents\": [").unwrap();

    let engine = engine(32);
    fill(&engine);
    let before = engine.documents();
    assert_eq!(engine.load(&path).unwrap_err().kind(), ErrorKind::Persistence);
    assert_eq!(engine.documents(), before);
    assert_eq!(engine.stats().index_size, before.len());
}

#[test]
fn loading_a_snapshot_of_another_dimension_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state.json");
    let small = engine(16);
    fill(&small);
    small.save(&path).unwrap();

    let large = engine(64);
    assert_eq!(large.load(&path).unwrap_err().kind(), ErrorKind::Persistence);
    assert!(large.is_empty());
}

#[test]
fn loading_inconsistent_snapshots_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state.json");
    let doc = |id: &str| serde_json::json!({"id": id, "filename": "f.txt", "content": "c"});

    let mismatched = serde_json::json!({
        "version": 1, "dimension": 2, "metric": "l2", "embedding_model": "m",
        "documents": [doc("a"), doc("b")], "embeddings": [[0.0, 1.0]]
    });
    fs::write(&path, mismatched.to_string()).unwrap();
    assert_eq!(snapshot::read(&path, 2, "m").unwrap_err().kind(), ErrorKind::Persistence);

    let duplicate = serde_json::json!({
        "version": 1, "dimension": 2, "metric": "l2", "embedding_model": "m",
        "documents": [doc("a"), doc("a")], "embeddings": [[0.0, 1.0], [1.0, 0.0]]
    });
    fs::write(&path, duplicate.to_string()).unwrap();
    assert_eq!(snapshot::read(&path, 2, "m").unwrap_err().kind(), ErrorKind::Persistence);

    let future = serde_json::json!({
        "version": 99, "dimension": 2, "metric": "l2", "embedding_model": "m",
        "documents": [], "embeddings": []
    });
    fs::write(&path, future.to_string()).unwrap();
    assert_eq!(snapshot::read(&path, 2, "m").unwrap_err().kind(), ErrorKind::Persistence);
}

#[test]
fn load_replaces_rather_than_merges() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state.json");
    let saved = engine(32);
    saved.add("only document", "only.txt").unwrap();
    saved.save(&path).unwrap();

    let engine = engine(32);
    fill(&engine);
    assert_eq!(engine.load(&path).unwrap(), 1);
    assert_eq!(engine.list()[0].filename, "only.txt");
}

#[test]
fn restore_or_empty_tolerates_a_missing_file_only() {
    let dir = TempDir::new().unwrap();
    let engine = engine(32);
    assert_eq!(engine.restore_or_empty(&dir.path().join("none.json")).unwrap(), 0);

    let corrupt = dir.path().join("bad.json");
    fs::write(&corrupt, "not json").unwrap();
    assert_eq!(engine.restore_or_empty(&corrupt).unwrap_err().kind(), ErrorKind::Persistence);
}
