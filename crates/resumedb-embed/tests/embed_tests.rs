use std::time::Duration;

use resumedb_core::traits::Embedder;
use resumedb_core::ErrorKind;
use resumedb_embed::{get_default_embedder, EmbeddingModel, FakeEmbedder, OllamaEmbedder, DEFAULT_DIM};

fn l2(a: &[f32], b: &[f32]) -> f32 { a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum() }

#[test]
fn fake_embedder_shapes_and_determinism() {
    // Force fake embedder to avoid loading the model
    std::env::set_var("APP_USE_FAKE_EMBEDDINGS", "1");

    let embedder = get_default_embedder().expect("embedder");
    let texts = vec!["Python developer".to_string(), "Python developer".to_string()];
    let embs = embedder.embed_batch(&texts).expect("embed_batch");
    let v1 = &embs[0];
    let v2 = &embs[1];

    assert_eq!(v1.len(), DEFAULT_DIM, "embedding dim is 384");
    assert_eq!(embedder.dim(), DEFAULT_DIM);
    assert!(embedder.model_id().starts_with("fake:"));

    // Norm approximately 1.0
    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");

    // Deterministic for same input
    for (a, b) in v1.iter().zip(v2.iter()) { assert!((a - b).abs() <= 1e-6); }
}

#[test]
fn fake_embedder_shared_tokens_are_closer() {
    let e = FakeEmbedder::new(4096);
    let query = e.embed("python").unwrap();
    let near = e.embed("Python developer with 5 years experience").unwrap();
    let far = e.embed("Chef, pastry, bakery management").unwrap();
    assert!(l2(&query, &near) < l2(&query, &far));
}

#[test]
fn fake_embedder_is_case_and_punctuation_insensitive() {
    let e = FakeEmbedder::new(32);
    assert_eq!(e.embed("Rust, Go!").unwrap(), e.embed("rust go").unwrap());
}

#[test]
fn ollama_embedder_unreachable_is_collaborator_error() {
    // Nothing listens on the discard port in test environments.
    let e = OllamaEmbedder::new("http://127.0.0.1:9", "all-minilm", 384, Duration::from_secs(2)).expect("client");
    let err = e.embed("hello").unwrap_err();
    assert!(err.is_collaborator(), "got {err:?}");
    assert!(matches!(err.kind(), ErrorKind::CollaboratorUnavailable | ErrorKind::CollaboratorTimeout));
}

/// Needs real weights under `models/all-MiniLM-L6-v2` (or `APP_MODEL_DIR`).
/// `cargo test -p resumedb-embed -- --ignored`
#[ignore]
#[test]
fn local_model_embeds_normalized_vectors() {
    let model = EmbeddingModel::new().expect("model");
    let v = model.embed_text("Senior Rust engineer").expect("embed");
    assert_eq!(v.len(), model.dim());
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3);
}
