mod common;

use std::fs;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use tempfile::tempdir;

use docqa_ai::embeddings::Embedder;
use docqa_ai::index::{read_manifest, IndexCache, VectorIndex, INDEX_NOT_FOUND_MESSAGE};
use docqa_core::error::codes;

use common::{chunk, keyword_vector, FailingEmbedder, FixedEmbedder, KeywordEmbedder};

const BUILT_AT: &str = "2026-02-10T00:00:00Z";

fn sample_chunks() -> Vec<docqa_core::domain::Chunk> {
    vec![
        chunk("The sky is blue.", "sky.txt", 0),
        chunk("Grass is green in spring.", "seasons.txt", 0),
        chunk("In autumn the leaves turn orange.", "seasons.txt", 1),
    ]
}

#[test]
fn saved_index_answers_searches_like_the_original() {
    let tmp = tempdir().unwrap();
    let dir = tmp.path().join("index");

    let built = VectorIndex::build(sample_chunks(), &KeywordEmbedder, 2, BUILT_AT).expect("build");
    assert_eq!(built.len(), 3);
    assert_eq!(built.manifest().model, "keyword-test");
    assert_eq!(built.manifest().dims, 8);
    built.save(&dir).expect("save");

    for f in ["manifest.json", "chunks.json", "vectors.json"] {
        assert!(dir.join(f).exists(), "missing {f}");
    }

    let loaded = VectorIndex::load(&dir).expect("load");
    assert_eq!(loaded.etag(), built.etag());
    assert_eq!(loaded.chunks(), built.chunks());

    for q in ["blue sky", "green grass", "orange leaves in autumn"] {
        let qv = keyword_vector(q);
        let a = built.search(&qv, 3).expect("search built");
        let b = loaded.search(&qv, 3).expect("search loaded");
        assert_eq!(a, b);
    }

    let top = loaded.search(&keyword_vector("what color is the sky"), 1).unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].chunk.text, "The sky is blue.");
}

#[test]
fn search_is_bounded_sorted_and_keeps_insertion_order_on_ties() {
    let chunks = vec![
        chunk("first", "a.txt", 0),
        chunk("second", "a.txt", 1),
        chunk("third", "a.txt", 2),
        chunk("fourth", "a.txt", 3),
    ];
    let emb = FixedEmbedder(vec![
        vec![1.0, 0.0],
        vec![0.0, 1.0],
        vec![1.0, 0.0],
        vec![0.0, 0.0],
    ]);
    let index = VectorIndex::build(chunks, &emb, 64, BUILT_AT).expect("build");

    let hits = index.search(&[1.0, 0.0], 10).unwrap();
    let texts = hits.iter().map(|h| h.chunk.text.as_str()).collect::<Vec<_>>();
    assert_eq!(texts, vec!["first", "third", "second", "fourth"]);
    assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
    assert_eq!(hits[3].score, 0.0);

    assert_eq!(index.search(&[1.0, 0.0], 2).unwrap().len(), 2);
    assert!(index.search(&[1.0, 0.0], 0).unwrap().is_empty());

    let err = index.search(&[1.0, 0.0, 0.0], 2).unwrap_err();
    assert_eq!(err.code, codes::RETRIEVAL_FAILED);
}

#[test]
fn build_rejects_empty_input_and_provider_failures() {
    let err = VectorIndex::build(Vec::new(), &KeywordEmbedder, 8, BUILT_AT).unwrap_err();
    assert_eq!(err.code, codes::EMPTY_INPUT);

    let err = VectorIndex::build(sample_chunks(), &FailingEmbedder, 8, BUILT_AT).unwrap_err();
    assert_eq!(err.code, codes::EMBEDDING_PROVIDER_FAILED);
    assert!(err.retryable);

    let ragged = FixedEmbedder(vec![vec![1.0, 0.0], vec![1.0], vec![0.5, 0.5]]);
    let err = VectorIndex::build(sample_chunks(), &ragged, 8, BUILT_AT).unwrap_err();
    assert_eq!(err.code, codes::EMBEDDING_PROVIDER_FAILED);

    let short = FixedEmbedder(vec![vec![1.0, 0.0]]);
    let err = VectorIndex::build(sample_chunks(), &short, 8, BUILT_AT).unwrap_err();
    assert_eq!(err.code, codes::EMBEDDING_PROVIDER_FAILED);
}

#[test]
fn missing_or_tampered_index_is_not_found() {
    let tmp = tempdir().unwrap();
    let dir = tmp.path().join("index");

    let err = VectorIndex::load(&dir).unwrap_err();
    assert_eq!(err.code, codes::INDEX_NOT_FOUND);
    assert_eq!(err.message, INDEX_NOT_FOUND_MESSAGE);
    assert_eq!(read_manifest(&dir).unwrap(), None);

    let index = VectorIndex::build(sample_chunks(), &KeywordEmbedder, 8, BUILT_AT).unwrap();
    index.save(&dir).unwrap();

    fs::write(dir.join("chunks.json"), "[]").unwrap();
    let err = VectorIndex::load(&dir).unwrap_err();
    assert_eq!(err.code, codes::INDEX_NOT_FOUND);

    index.save(&dir).unwrap();
    fs::remove_file(dir.join("vectors.json")).unwrap();
    assert_eq!(VectorIndex::load(&dir).unwrap_err().code, codes::INDEX_NOT_FOUND);

    fs::write(dir.join("manifest.json"), "{not json").unwrap();
    assert_eq!(VectorIndex::load(&dir).unwrap_err().code, codes::INDEX_NOT_FOUND);
}

#[test]
fn cache_reloads_only_when_the_etag_changes() {
    let tmp = tempdir().unwrap();
    let dir = tmp.path().join("index");
    let cache = IndexCache::new(dir.clone());

    assert_eq!(cache.get().unwrap_err().code, codes::INDEX_NOT_FOUND);

    let first = VectorIndex::build(sample_chunks(), &KeywordEmbedder, 8, BUILT_AT).unwrap();
    first.save(&dir).unwrap();

    let a = cache.get().expect("first get");
    let b = cache.get().expect("second get");
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(cache.load_count(), 1);

    let mut more = sample_chunks();
    more.push(chunk("Blue grass grows in Kentucky.", "extra.txt", 0));
    let second = VectorIndex::build(more, &KeywordEmbedder, 8, BUILT_AT).unwrap();
    assert_ne!(second.etag(), first.etag());
    second.save(&dir).unwrap();

    let c = cache.get().expect("after rebuild");
    assert_eq!(c.etag(), second.etag());
    assert_eq!(c.len(), 4);
    assert_eq!(cache.load_count(), 2);

    cache.invalidate();
    cache.get().unwrap();
    assert_eq!(cache.load_count(), 3);
}

#[test]
fn embed_query_uses_batch_embedding() {
    let v = KeywordEmbedder.embed_query("sky sky blue").unwrap();
    assert_eq!(v[0], 2.0);
    assert_eq!(v[1], 1.0);
}
