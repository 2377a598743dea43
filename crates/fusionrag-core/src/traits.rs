use std::future::Future;

use crate::types::RetrievedChunk;

pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn max_len(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// Similarity search over an already built index.
///
/// Results are ordered by descending similarity with `rank` set to the
/// position in the returned list. At most `limit` chunks are returned.
pub trait ChunkSearcher: Send + Sync {
    fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> impl Future<Output = anyhow::Result<Vec<RetrievedChunk>>> + Send;
}
