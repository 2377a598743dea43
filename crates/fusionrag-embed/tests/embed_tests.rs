use std::path::Path;

use fusionrag_core::config::EmbeddingSettings;
use fusionrag_core::traits::Embedder;
use fusionrag_embed::{get_default_embedder, FakeEmbedder, MiniLmEmbedder, MINILM_DIM};

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[test]
fn fake_embedder_shapes_and_determinism() {
    let embedder = FakeEmbedder::new(MINILM_DIM);
    let texts = vec!["hello world".to_string(), "hello world".to_string()];
    let embs = embedder.embed_batch(&texts).expect("embed_batch");
    let v1 = &embs[0];
    let v2 = &embs[1];

    assert_eq!(v1.len(), MINILM_DIM);

    // Norm approximately 1.0
    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");

    for (a, b) in v1.iter().zip(v2.iter()) { assert!((a - b).abs() <= 1e-6); }
}

#[test]
fn fake_embedder_prefers_shared_words() {
    let embedder = FakeEmbedder::new(64);
    let texts: Vec<String> = ["fire starting kit", "starting a fire", "ocean tides"].iter().map(|s| s.to_string()).collect();
    let embs = embedder.embed_batch(&texts).expect("embed");
    assert!(cosine(&embs[0], &embs[1]) > cosine(&embs[0], &embs[2]));
}

#[test]
fn env_switch_selects_fake_embedder() {
    std::env::set_var("APP_USE_FAKE_EMBEDDINGS", "1");
    let embedder = get_default_embedder(&EmbeddingSettings::default()).expect("embedder");
    assert_eq!(embedder.dim(), MINILM_DIM);
    assert_eq!(embedder.embed_batch(&["x".to_string()]).expect("embed")[0].len(), MINILM_DIM);
}

#[test]
fn missing_model_files_are_an_error() {
    assert!(MiniLmEmbedder::new(Path::new("/nonexistent/minilm"), 256).is_err());
}
