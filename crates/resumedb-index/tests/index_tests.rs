use resumedb_core::traits::Embedder;
use resumedb_core::types::Document;
use resumedb_core::ErrorKind;
use resumedb_embed::FakeEmbedder;
use resumedb_index::{DocumentStore, VectorIndex};

fn doc(id: &str, content: &str) -> Document {
    Document { id: id.to_string(), filename: format!("{id}.txt"), content: content.to_string() }
}

#[test]
fn document_store_positions_follow_append_and_remove() {
    let mut store = DocumentStore::new();
    assert_eq!(store.append(doc("a", "alpha")), 0);
    assert_eq!(store.append(doc("b", "bravo")), 1);
    assert_eq!(store.append(doc("c", "charlie")), 2);

    let removed = store.remove_at(1).expect("remove");
    assert_eq!(removed.id, "b");
    assert_eq!(store.get(1).map(|d| d.id.as_str()), Some("c"));
    assert_eq!(store.position_of("c"), Some(1));
    assert!(!store.contains_id("b"));
    assert_eq!(store.find_by_id("b").unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(store.remove_at(9).unwrap_err().kind(), ErrorKind::NotFound);

    let ids: Vec<String> = store.metadata().into_iter().map(|m| m.id).collect();
    assert_eq!(ids, vec!["a", "c"]);
}

#[test]
fn store_and_index_stay_aligned_under_mirrored_mutations() {
    let embedder = FakeEmbedder::new(32);
    let mut store = DocumentStore::new();
    let mut index = VectorIndex::new(embedder.dim());
    let texts = ["rust systems", "python data", "go services", "java backend", "kotlin android"];

    for (i, text) in texts.iter().enumerate() {
        let v = embedder.embed(text).unwrap();
        let p = index.insert(&v).unwrap();
        assert_eq!(store.append(doc(&format!("d{i}"), text)), p);
    }
    for position in [3, 0, 1] {
        index.remove(position).unwrap();
        store.remove_at(position).unwrap();
        assert_eq!(store.len(), index.len());
    }

    // Each remaining vector still belongs to the document at its position.
    for (position, d) in store.iter().enumerate() {
        let expected = embedder.embed(&d.content).unwrap();
        assert_eq!(index.get(position), Some(expected.as_slice()));
    }
}

#[test]
fn nearest_document_is_the_one_sharing_tokens() {
    let embedder = FakeEmbedder::new(4096);
    let docs = [doc("a", "Python developer with 5 years experience"), doc("b", "Pastry chef and bakery manager")];
    let index = VectorIndex::from_vectors(embedder.dim(), docs.iter().map(|d| embedder.embed(&d.content).unwrap())).unwrap();

    let hits = index.search(&embedder.embed("python").unwrap(), 1).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(docs[hits[0].position].id, "a");
    assert!(hits[0].similarity() > 0.0 && hits[0].similarity() <= 1.0);
}
