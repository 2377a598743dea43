use anyhow::{anyhow, Result};
use arrow_array::{Array, Float32Array, RecordBatch, StringArray};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{connect, Connection};
use std::path::Path;
use std::sync::Arc;

use fusionrag_core::traits::{ChunkSearcher, Embedder};
use fusionrag_core::types::RetrievedChunk;

pub struct LanceSearchEngine { pub(crate) db: Connection, pub(crate) table_name: String, pub(crate) embedder: Arc<dyn Embedder> }

impl LanceSearchEngine {
	pub async fn new(db_path: &Path, table_name: &str, embedder: Arc<dyn Embedder>) -> Result<Self> {
		let db = connect(db_path.to_string_lossy().as_ref()).execute().await?;
		Ok(Self { db, table_name: table_name.to_string(), embedder })
	}

	/// Nearest chunks to `query_text`, closest first. An index that was never
	/// written to yields no results.
	pub async fn search(&self, query_text: &str, limit: usize) -> Result<Vec<RetrievedChunk>> {
		if limit == 0 { return Ok(Vec::new()); }
		if !self.db.table_names().execute().await?.contains(&self.table_name) {
			tracing::warn!(table = %self.table_name, "search on missing table");
			return Ok(Vec::new());
		}
		let query_embedding = self.embedder.embed_batch(&[query_text.to_string()])?
			.into_iter().next().ok_or_else(|| anyhow!("embedder returned no vector for the query"))?;
		let table = self.db.open_table(&self.table_name).execute().await?;
		let mut results = table.vector_search(query_embedding)?.limit(limit).execute().await?;

		let mut hits: Vec<(f32, String)> = Vec::new();
		while let Some(batch) = TryStreamExt::try_next(&mut results).await? {
			let content = string_column(&batch, "content")?;
			let distance = batch.column_by_name("_distance").and_then(|c| c.as_any().downcast_ref::<Float32Array>());
			for i in 0..batch.num_rows() {
				let d = distance.filter(|col| !col.is_null(i)).map_or(f32::MAX, |col| col.value(i));
				hits.push((d, content.value(i).to_string()));
			}
		}
		hits.sort_by(|a, b| a.0.total_cmp(&b.0));
		hits.truncate(limit);
		tracing::debug!(hits = hits.len(), limit, "vector search");
		Ok(hits.into_iter().enumerate().map(|(rank, (_, content))| RetrievedChunk::new(content, rank)).collect())
	}
}

impl ChunkSearcher for LanceSearchEngine {
	async fn search(&self, query: &str, limit: usize) -> Result<Vec<RetrievedChunk>> {
		Self::search(self, query, limit).await
	}
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
	batch.column_by_name(name)
		.and_then(|c| c.as_any().downcast_ref::<StringArray>())
		.ok_or_else(|| anyhow!("search result is missing the '{}' column", name))
}
