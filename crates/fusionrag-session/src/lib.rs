//! A question-answering session over one upload batch.
//!
//! The vector index is built once in [`Session::build`] and reused by every
//! [`Session::ask`]. It lives in a temporary directory owned by the session
//! and disappears with it.

use anyhow::Result;
use std::sync::Arc;
use std::time::Instant;
use tempfile::TempDir;

use fusionrag_core::config::Settings;
use fusionrag_core::error::Error;
use fusionrag_core::traits::{ChunkSearcher, Embedder};
use fusionrag_core::types::{AnswerPassage, Document, Query, RetrievedChunk, TopK};
use fusionrag_core::{AnswerAssembler, Marker, TextSplitter};
use fusionrag_ingest::{Ingestor, UploadedFile};
use fusionrag_vector::{LanceDbIndexer, LanceSearchEngine};

/// LanceDB index in a private temporary directory.
pub struct SessionIndex {
    engine: LanceSearchEngine,
    _dir: TempDir,
}

impl ChunkSearcher for SessionIndex {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<RetrievedChunk>> {
        self.engine.search(query, limit).await
    }
}

pub struct Session<S = SessionIndex> {
    searcher: S,
    assembler: AnswerAssembler,
    documents: Vec<Document>,
    chunk_count: usize,
}

impl Session<SessionIndex> {
    /// Ingest `files` and index them. Fails with [`Error::EmptyCorpus`] when
    /// no file yields any text.
    pub async fn build(files: &[UploadedFile], settings: &Settings, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let documents = Ingestor::from_settings(&settings.ocr).load_files(files);
        Self::from_documents(documents, settings, embedder).await
    }

    pub async fn from_documents(documents: Vec<Document>, settings: &Settings, embedder: Arc<dyn Embedder>) -> Result<Self> {
        if documents.is_empty() {
            return Err(Error::EmptyCorpus.into());
        }
        let start = Instant::now();
        let chunks = TextSplitter::from_settings(&settings.splitter)?.split_documents(&documents);
        if chunks.is_empty() {
            return Err(Error::EmptyCorpus.into());
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = embedder.embed_batch(&texts)?;
        if embeddings.len() != chunks.len() {
            return Err(Error::Operation(format!(
                "embedder returned {} vectors for {} chunks",
                embeddings.len(),
                chunks.len()
            ))
            .into());
        }

        let dir = TempDir::new()?;
        let table = settings.index.table.as_str();
        LanceDbIndexer::new(dir.path(), table).await?.index(&chunks, &embeddings).await?;
        let engine = LanceSearchEngine::new(dir.path(), table, embedder).await?;
        tracing::info!(
            documents = documents.len(),
            chunks = chunks.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "session index built"
        );

        Ok(Self {
            searcher: SessionIndex { engine, _dir: dir },
            assembler: AnswerAssembler::from_settings(&settings.answer),
            documents,
            chunk_count: chunks.len(),
        })
    }
}

impl<S: ChunkSearcher> Session<S> {
    /// A session over an index built elsewhere.
    pub fn with_searcher(searcher: S, assembler: AnswerAssembler, documents: Vec<Document>, chunk_count: usize) -> Self {
        Self { searcher, assembler, documents, chunk_count }
    }

    /// Retrieve `2 * top_k` chunks for `query_text` and assemble at most
    /// `top_k` passages. No match gives an empty list.
    pub async fn ask(&self, query_text: &str, top_k: TopK) -> Result<Vec<AnswerPassage>> {
        let query = Query::parse(query_text)?;
        let ranked = self.searcher.search(query.text(), top_k.search_limit()).await?;
        tracing::debug!(query = query.text(), retrieved = ranked.len(), "search finished");
        Ok(self.assembler.assemble(&ranked, &query, top_k))
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn chunk_count(&self) -> usize {
        self.chunk_count
    }

    /// Emphasis markup used in every passage this session returns.
    pub fn marker(&self) -> &Marker {
        self.assembler.marker()
    }

    pub fn searcher(&self) -> &S {
        &self.searcher
    }
}
