use std::sync::Arc;

use fusionrag_core::splitter::TextSplitter;
use fusionrag_core::traits::{ChunkSearcher, Embedder};
use fusionrag_core::types::{Document, TextChunk};
use fusionrag_embed::FakeEmbedder;
use fusionrag_vector::{LanceDbIndexer, LanceSearchEngine};
use tempfile::TempDir;

fn corpus() -> Vec<TextChunk> {
    let docs = vec![
        Document::new("Keep the fire starting kit dry. Tinder catches fire quickly.", "camp.pdf", Some(1)),
        Document::new("Ocean tides follow the moon.", "sea.docx", None),
        Document::new("Water filters remove bacteria from creek water.", "water.png", None),
    ];
    TextSplitter::new(200, 20).expect("splitter").split_documents(&docs)
}

#[tokio::test]
async fn lancedb_full_flow() {
    let embedder: Arc<dyn Embedder> = Arc::new(FakeEmbedder::new(64));
    let chunks = corpus();
    assert_eq!(chunks.len(), 3);
    let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
    let embeddings = embedder.embed_batch(&texts).expect("embed");

    let tmp = TempDir::new().expect("tmp"); let table = "chunks_test_tmp";
    let indexer = LanceDbIndexer::new(tmp.path(), table).await.expect("indexer");
    indexer.index(&chunks, &embeddings).await.expect("index chunks");

    let engine = LanceSearchEngine::new(tmp.path(), table, embedder).await.expect("engine");
    let results = engine.search("Ocean tides follow the moon.", 2).await.expect("search");
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].content, "Ocean tides follow the moon.");
    assert_eq!(results.iter().map(|r| r.rank).collect::<Vec<_>>(), vec![0, 1]);

    let all = ChunkSearcher::search(&engine, "fire", 10).await.expect("search via trait");
    assert_eq!(all.len(), 3, "limit above corpus size returns every chunk");
}

#[tokio::test]
async fn searching_an_unwritten_table_is_empty() {
    let tmp = TempDir::new().expect("tmp");
    let engine = LanceSearchEngine::new(tmp.path(), "never_written", Arc::new(FakeEmbedder::new(8))).await.expect("engine");
    assert!(engine.search("anything", 4).await.expect("search").is_empty());
}

#[tokio::test]
async fn mismatched_embeddings_are_rejected() {
    let tmp = TempDir::new().expect("tmp");
    let indexer = LanceDbIndexer::new(tmp.path(), "bad").await.expect("indexer");
    let chunks = corpus();
    assert!(indexer.index(&chunks, &[vec![0.1; 4]]).await.is_err());
    let ragged = vec![vec![0.1; 4], vec![0.1; 4], vec![0.1; 3]];
    assert!(indexer.index(&chunks, &ragged).await.is_err());
    indexer.index(&[], &[]).await.expect("empty input is a no-op");
}
