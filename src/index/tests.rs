use super::*;
use crate::embeddings::testing::{FailingEmbedder, HashingEmbedder};
use crate::embeddings::{ChunkingConfig, SourceDocument, chunk_documents};
use std::fs;
use tempfile::TempDir;

fn passage(text: &str, url: &str) -> Passage {
    Passage {
        text: text.to_string(),
        source_url: url.to_string(),
        offset: 0,
    }
}

fn sample_passages() -> Vec<Passage> {
    vec![
        passage(
            "Python for Data Science teaches pandas and numpy",
            "https://www.atomcamp.com/courses",
        ),
        passage(
            "Career services include resume reviews and mock interviews",
            "https://www.atomcamp.com/careers",
        ),
        passage(
            "Deep learning with TensorFlow covers neural networks",
            "https://www.atomcamp.com/courses",
        ),
        passage(
            "The beginner track lasts three months",
            "https://www.atomcamp.com/learning-paths",
        ),
    ]
}

fn sample_index() -> (VectorIndex, HashingEmbedder) {
    let embedder = HashingEmbedder::new(64);
    let index = VectorIndex::build(sample_passages(), &embedder).expect("index should build");
    (index, embedder)
}

#[test]
fn build_embeds_every_passage() {
    let (index, _) = sample_index();

    assert_eq!(index.len(), 4);
    assert_eq!(index.dimension(), 64);
    assert_eq!(index.embedding_model(), "hashing-test");
    assert_eq!(
        index.passages().cloned().collect::<Vec<_>>(),
        sample_passages()
    );
}

#[test]
fn query_returns_most_similar_first() {
    let (index, embedder) = sample_index();

    let results = index
        .query(&embedder, "mock interviews and resume", 2)
        .expect("query should succeed");

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].source_url, "https://www.atomcamp.com/careers");
}

#[test]
fn query_results_are_bounded_and_ordered() {
    let documents = vec![
        SourceDocument::new(
            "Atomcamp runs a Python course. ".repeat(40),
            "https://www.atomcamp.com/courses",
        ),
        SourceDocument::new(
            "Graduates get job placement help. ".repeat(40),
            "https://www.atomcamp.com/careers",
        ),
    ];
    let passages = chunk_documents(&documents, &ChunkingConfig::default());
    let embedder = HashingEmbedder::new(32);
    let index = VectorIndex::build(passages.clone(), &embedder).expect("index should build");

    for k in [1, 3, 100] {
        let results = index
            .query_scored(&embedder, "python job", k)
            .expect("query should succeed");

        assert!(results.len() <= k);
        assert!(results.iter().all(|r| passages.contains(&r.passage)));
        assert!(results.windows(2).all(|pair| pair[0].score >= pair[1].score));
    }
}

#[test]
fn ties_keep_insertion_order() {
    let embedder = HashingEmbedder::new(16);
    let passages = vec![
        passage("same words here", "https://example.com/first"),
        passage("same words here", "https://example.com/second"),
        passage("same words here", "https://example.com/third"),
    ];
    let index = VectorIndex::build(passages, &embedder).expect("index should build");

    let results = index
        .query(&embedder, "same words here", 3)
        .expect("query should succeed");

    let urls: Vec<&str> = results.iter().map(|p| p.source_url.as_str()).collect();
    assert_eq!(
        urls,
        [
            "https://example.com/first",
            "https://example.com/second",
            "https://example.com/third"
        ]
    );
}

#[test]
fn zero_k_returns_nothing_without_embedding() {
    let (index, _) = sample_index();
    let failing = FailingEmbedder { dimension: 64 };

    let results = index
        .query(&failing, "anything", 0)
        .expect("k of zero should not embed");

    assert!(results.is_empty());
}

#[test]
fn empty_index_returns_nothing() {
    let embedder = HashingEmbedder::new(8);
    let index = VectorIndex::build(Vec::new(), &embedder).expect("empty build should succeed");

    assert!(index.is_empty());
    assert_eq!(index.dimension(), 8);
    assert!(
        index
            .query(&embedder, "courses", 3)
            .expect("query should succeed")
            .is_empty()
    );
    assert!(
        index
            .query(&FailingEmbedder { dimension: 8 }, "courses", 3)
            .expect("empty index should not embed")
            .is_empty()
    );
}

#[test]
fn build_propagates_embedding_failure() {
    let result = VectorIndex::build(sample_passages(), &FailingEmbedder { dimension: 8 });
    assert!(matches!(result, Err(IndexError::Embedding(_))));
}

#[test]
fn query_propagates_embedding_failure() {
    let (index, _) = sample_index();
    let result = index.query(&FailingEmbedder { dimension: 64 }, "courses", 3);
    assert!(matches!(result, Err(IndexError::Embedding(_))));
}

#[test]
fn query_rejects_dimension_change() {
    let (index, _) = sample_index();
    let result = index.query(&HashingEmbedder::new(32), "courses", 3);
    assert!(matches!(
        result,
        Err(IndexError::Embedding(EmbeddingError::DimensionMismatch {
            expected: 64,
            actual: 32
        }))
    ));
}

#[test]
fn cosine_similarity_handles_zero_vectors() {
    assert!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]).abs() < f32::EPSILON);
    assert!((cosine_similarity(&[2.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
    assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
}

#[test]
fn save_then_load_round_trip() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let snapshot_dir = temp_dir.path().join("atomcamp_vector_db");
    let (index, embedder) = sample_index();

    index.save(&snapshot_dir).expect("save should succeed");
    assert!(VectorIndex::snapshot_exists(&snapshot_dir));

    let loaded = VectorIndex::load(&snapshot_dir, 64).expect("load should succeed");
    assert_eq!(loaded, index);

    for question in ["python course", "career help", "how long is the beginner track"] {
        assert_eq!(
            loaded
                .query(&embedder, question, 3)
                .expect("query should succeed"),
            index
                .query(&embedder, question, 3)
                .expect("query should succeed")
        );
    }
}

#[test]
fn save_overwrites_without_leftovers() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let (index, embedder) = sample_index();
    index.save(temp_dir.path()).expect("first save should succeed");

    let replacement = VectorIndex::build(
        vec![passage("only passage", "https://example.com")],
        &embedder,
    )
    .expect("index should build");
    replacement
        .save(temp_dir.path())
        .expect("second save should succeed");

    let loaded = VectorIndex::load(temp_dir.path(), 64).expect("load should succeed");
    assert_eq!(loaded.len(), 1);

    let files: Vec<_> = fs::read_dir(temp_dir.path())
        .expect("should list snapshot dir")
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(files, [SNAPSHOT_FILE]);
}

#[test]
fn load_missing_snapshot_is_not_found() {
    let temp_dir = TempDir::new().expect("should create temp dir");

    assert!(!VectorIndex::snapshot_exists(temp_dir.path()));
    assert!(matches!(
        VectorIndex::load(&temp_dir.path().join("missing"), 64),
        Err(IndexError::NotFound { .. })
    ));
}

#[test]
fn load_malformed_snapshot_is_corrupt() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    fs::write(temp_dir.path().join(SNAPSHOT_FILE), "{ truncated").expect("should write");

    assert!(matches!(
        VectorIndex::load(temp_dir.path(), 64),
        Err(IndexError::Corrupt { .. })
    ));
}

#[test]
fn load_detects_dimension_mismatch() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let (index, _) = sample_index();
    index.save(temp_dir.path()).expect("save should succeed");

    let result = VectorIndex::load(temp_dir.path(), 384);

    match result {
        Err(IndexError::Corrupt { reason, .. }) => assert!(reason.contains("dimension")),
        other => panic!("expected corrupt snapshot, got {:?}", other),
    }
}

#[test]
fn load_rejects_unknown_format_version() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let (index, _) = sample_index();
    index.save(temp_dir.path()).expect("save should succeed");

    let path = VectorIndex::snapshot_file(temp_dir.path());
    let mut snapshot: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).expect("should read snapshot"))
            .expect("snapshot should be json");
    snapshot["format_version"] = serde_json::json!(SNAPSHOT_FORMAT_VERSION + 1);
    fs::write(&path, snapshot.to_string()).expect("should rewrite snapshot");

    assert!(matches!(
        VectorIndex::load(temp_dir.path(), 64),
        Err(IndexError::Corrupt { .. })
    ));
}

#[test]
fn load_rejects_short_vectors() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let (index, _) = sample_index();
    index.save(temp_dir.path()).expect("save should succeed");

    let path = VectorIndex::snapshot_file(temp_dir.path());
    let mut snapshot: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).expect("should read snapshot"))
            .expect("snapshot should be json");
    snapshot["entries"][1]["vector"] = serde_json::json!([0.5, 0.5]);
    fs::write(&path, snapshot.to_string()).expect("should rewrite snapshot");

    assert!(matches!(
        VectorIndex::load(temp_dir.path(), 64),
        Err(IndexError::Corrupt { .. })
    ));
}

#[test]
fn bootstrap_builds_and_persists_seed_corpus() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let snapshot_dir = temp_dir.path().join("atomcamp_vector_db");
    let embedder = HashingEmbedder::new(64);

    let outcome = bootstrap_index(&snapshot_dir, &embedder, &ChunkingConfig::default());

    match &outcome {
        Bootstrapped::Built { index, persisted } => {
            assert!(*persisted);
            assert_eq!(index.len(), seed_documents().len());
        }
        other => panic!("expected a freshly built index, got {:?}", other),
    }
    assert!(VectorIndex::snapshot_exists(&snapshot_dir));

    let second = bootstrap_index(&snapshot_dir, &embedder, &ChunkingConfig::default());
    assert!(matches!(second, Bootstrapped::Loaded(_)));
    assert_eq!(second.index(), outcome.index());
}

#[test]
fn bootstrap_replaces_corrupt_snapshot() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    fs::write(temp_dir.path().join(SNAPSHOT_FILE), "garbage").expect("should write");
    let embedder = HashingEmbedder::new(64);

    let outcome = bootstrap_index(temp_dir.path(), &embedder, &ChunkingConfig::default());

    assert!(matches!(
        outcome,
        Bootstrapped::Built {
            persisted: true,
            ..
        }
    ));
    assert!(VectorIndex::load(temp_dir.path(), 64).is_ok());
}

#[test]
fn bootstrap_rebuilds_on_dimension_change() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    bootstrap_index(
        temp_dir.path(),
        &HashingEmbedder::new(32),
        &ChunkingConfig::default(),
    );

    let outcome = bootstrap_index(
        temp_dir.path(),
        &HashingEmbedder::new(64),
        &ChunkingConfig::default(),
    );

    let index = outcome.into_index().expect("index should be built");
    assert_eq!(index.dimension(), 64);
}

#[test]
fn bootstrap_without_embedder_is_unavailable() {
    let temp_dir = TempDir::new().expect("should create temp dir");

    let outcome = bootstrap_index(
        temp_dir.path(),
        &FailingEmbedder { dimension: 64 },
        &ChunkingConfig::default(),
    );

    assert!(matches!(outcome, Bootstrapped::Unavailable));
    assert!(!VectorIndex::snapshot_exists(temp_dir.path()));
}

#[test]
fn bootstrap_keeps_index_when_save_fails() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let blocked = temp_dir.path().join("blocked");
    fs::write(&blocked, "a file where the snapshot dir should be").expect("should write");

    let outcome = bootstrap_index(
        &blocked,
        &HashingEmbedder::new(64),
        &ChunkingConfig::default(),
    );

    assert!(matches!(
        outcome,
        Bootstrapped::Built {
            persisted: false,
            ..
        }
    ));
}
