use std::io::Cursor;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use docx_rs::{Docx, Paragraph, Run};
use fusionrag_core::config::Settings;
use fusionrag_core::error::Error;
use fusionrag_core::traits::{ChunkSearcher, Embedder};
use fusionrag_core::types::{Document, RetrievedChunk, TopK};
use fusionrag_core::{AnswerAssembler, Marker};
use fusionrag_embed::FakeEmbedder;
use fusionrag_ingest::UploadedFile;
use fusionrag_session::Session;

#[derive(Default)]
struct StubSearcher {
    results: Vec<String>,
    limits: Mutex<Vec<usize>>,
}

impl ChunkSearcher for StubSearcher {
    async fn search(&self, _query: &str, limit: usize) -> Result<Vec<RetrievedChunk>> {
        self.limits.lock().expect("lock").push(limit);
        Ok(self.results.iter().take(limit).enumerate().map(|(rank, c)| RetrievedChunk::new(c.clone(), rank)).collect())
    }
}

fn embedder() -> Arc<dyn Embedder> {
    Arc::new(FakeEmbedder::new(64))
}

fn docx(paragraphs: &[&str]) -> Vec<u8> {
    let mut docx = Docx::new();
    for text in paragraphs {
        docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*text)));
    }
    let mut out = Cursor::new(Vec::new());
    docx.build().pack(&mut out).expect("pack docx");
    out.into_inner()
}

#[tokio::test]
async fn ask_requests_twice_top_k_and_merges() {
    let results = ["A0.", "A1.", "A2.", "A3."].iter().map(|s| s.to_string()).collect();
    let session = Session::with_searcher(StubSearcher { results, ..Default::default() }, AnswerAssembler::default(), Vec::new(), 4);
    let answers = session.ask("a1", TopK::new(2).expect("k")).await.expect("ask");
    assert_eq!(*session.searcher().limits.lock().expect("lock"), vec![4]);
    let texts: Vec<&str> = answers.iter().map(|a| a.marked_text.as_str()).collect();
    assert_eq!(texts, vec!["A0. A2.", r#"<span class="highlight">A1</span>. A3."#]);
    assert_eq!(answers[1].index, 2);
    assert_eq!(session.marker(), &Marker::default());
}

#[tokio::test]
async fn blank_query_is_rejected_before_search() {
    let session = Session::with_searcher(StubSearcher::default(), AnswerAssembler::default(), Vec::new(), 0);
    let err = session.ask("   ", TopK::default()).await.expect_err("blank query");
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::EmptyQuery)));
    assert!(session.searcher().limits.lock().expect("lock").is_empty());
}

#[tokio::test]
async fn no_matches_gives_no_answers() {
    let session = Session::with_searcher(StubSearcher::default(), AnswerAssembler::default(), Vec::new(), 0);
    assert!(session.ask("anything", TopK::default()).await.expect("ask").is_empty());
}

#[tokio::test]
async fn unreadable_batch_is_an_empty_corpus() {
    let files = vec![
        UploadedFile::new("notes.txt", b"plain text is not a supported upload".to_vec()),
        UploadedFile::new("broken.docx", b"not a zip".to_vec()),
        UploadedFile::new("blank.docx", docx(&["  ", "\t"])),
    ];
    let err = Session::build(&files, &Settings::default(), embedder()).await.err().expect("empty corpus");
    let core = err.downcast_ref::<Error>().expect("core error");
    assert!(matches!(core, Error::EmptyCorpus));
    assert_eq!(core.to_string(), "No readable text found.");
}

#[tokio::test]
async fn uploaded_docx_is_answerable() {
    let files = vec![
        UploadedFile::new("camp.docx", docx(&["Keep the fire starting kit dry.", "Tinder catches a spark."])),
        UploadedFile::new("sea.docx", docx(&["Ocean tides follow the moon."])),
    ];
    let session = Session::build(&files, &Settings::default(), embedder()).await.expect("build");
    assert_eq!(session.documents().len(), 2);
    assert_eq!(session.chunk_count(), 2);

    let answers = session.ask("ocean", TopK::new(1).expect("k")).await.expect("ask");
    assert_eq!(answers.len(), 1);
    assert!(answers[0].marked_text.contains(r#"<span class="highlight">Ocean</span>"#));
}

#[tokio::test]
async fn index_is_reused_across_queries() {
    let docs = (0..6).map(|i| Document::new(format!("Fact number {i} about rivers."), format!("d{i}.pdf"), Some(1))).collect();
    let session = Session::from_documents(docs, &Settings::default(), embedder()).await.expect("build");
    for k in 1..=4 {
        let answers = session.ask("rivers", TopK::new(k).expect("k")).await.expect("ask");
        assert_eq!(answers.len(), k);
        let indices: Vec<usize> = answers.iter().map(|a| a.index).collect();
        assert_eq!(indices, (1..=k).collect::<Vec<_>>());
    }
    let answers = session.ask("rivers", TopK::new(10).expect("k")).await.expect("ask");
    assert_eq!(answers.len(), 6, "only six chunks exist");
}
