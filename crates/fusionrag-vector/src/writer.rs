use anyhow::{anyhow, bail, Result};
use arrow_array::{FixedSizeListArray, Int32Array, RecordBatch, RecordBatchIterator, StringArray};
use indicatif::{ProgressBar, ProgressStyle};
use lancedb::{connect, Connection};
use std::path::Path;
use std::sync::Arc;

use fusionrag_core::types::TextChunk;
use crate::schema::build_arrow_schema;

const BATCH_SIZE: usize = 1000;

pub struct LanceDbIndexer { pub(crate) db: Connection, pub(crate) table_name: String }

impl LanceDbIndexer {
	pub async fn new(db_path: &Path, table_name: &str) -> Result<Self> {
		let db = connect(db_path.to_string_lossy().as_ref()).execute().await?;
		Ok(Self { db, table_name: table_name.to_string() })
	}

	/// Appends `chunks` to the table, creating it on first use. `embeddings[i]`
	/// belongs to `chunks[i]` and all vectors share one dimension.
	pub async fn index(&self, chunks: &[TextChunk], embeddings: &[Vec<f32>]) -> Result<()> {
		if chunks.is_empty() { tracing::info!("no chunks to index"); return Ok(()); }
		if chunks.len() != embeddings.len() {
			bail!("chunks and embeddings length must match ({} vs {})", chunks.len(), embeddings.len());
		}
		let dim = embeddings[0].len();
		if dim == 0 { bail!("embeddings must not be empty"); }
		if let Some(bad) = embeddings.iter().position(|e| e.len() != dim) {
			bail!("embedding {} has dimension {}, expected {}", bad, embeddings[bad].len(), dim);
		}
		let dim = i32::try_from(dim).map_err(|_| anyhow!("embedding dimension {} is too large", dim))?;

		tracing::info!(chunks = chunks.len(), table = %self.table_name, "indexing chunks into LanceDB");
		let pb = ProgressBar::new(chunks.len() as u64);
		pb.set_style(ProgressStyle::default_bar().template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%) {msg}")?.progress_chars("#>-"));
		for (chunk_batch, emb_batch) in chunks.chunks(BATCH_SIZE).zip(embeddings.chunks(BATCH_SIZE)) {
			self.insert_batch(chunk_batch, emb_batch, dim).await?;
			pb.inc(chunk_batch.len() as u64);
		}
		pb.finish_and_clear();
		tracing::info!(chunks = chunks.len(), "indexing completed");
		Ok(())
	}

	async fn insert_batch(&self, chunks: &[TextChunk], embeddings: &[Vec<f32>], dim: i32) -> Result<()> {
		let record_batch = to_record_batch(chunks, embeddings, dim)?; let schema = record_batch.schema();
		let reader = Box::new(RecordBatchIterator::new(vec![Ok(record_batch)].into_iter(), schema));
		if self.db.table_names().execute().await?.contains(&self.table_name) {
			self.db.open_table(&self.table_name).execute().await?.add(reader).execute().await?;
		} else {
			self.db.create_table(&self.table_name, reader).execute().await?;
		}
		Ok(())
	}
}

fn to_record_batch(chunks: &[TextChunk], embeddings: &[Vec<f32>], dim: i32) -> Result<RecordBatch> {
	let mut ids = Vec::new(); let mut sources = Vec::new(); let mut pages = Vec::new(); let mut chunk_indices = Vec::new(); let mut contents = Vec::new();
	for chunk in chunks {
		ids.push(chunk.id.clone()); sources.push(chunk.source.clone()); contents.push(chunk.content.clone());
		pages.push(chunk.page.and_then(|p| i32::try_from(p).ok()));
		chunk_indices.push(i32::try_from(chunk.chunk_index)?);
	}
	let vectors = embeddings.iter().map(|e| Some(e.iter().map(|&x| Some(x)).collect::<Vec<_>>()));
	let record_batch = RecordBatch::try_new(build_arrow_schema(dim), vec![
		Arc::new(StringArray::from(ids)),
		Arc::new(StringArray::from(sources)),
		Arc::new(Int32Array::from(pages)),
		Arc::new(Int32Array::from(chunk_indices)),
		Arc::new(StringArray::from(contents)),
		Arc::new(FixedSizeListArray::from_iter_primitive::<arrow_array::types::Float32Type, _, _>(vectors, dim)),
	])?;
	Ok(record_batch)
}
