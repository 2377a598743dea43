//! Domain types shared by ingestion, indexing and answer assembly.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Plain text extracted from one uploaded file (or one PDF page).
///
/// - `source`: uploaded file name the text came from
/// - `page`: 1-based page number for paginated formats
/// - `content`: extracted text, never whitespace-only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub content: String,
    pub source: String,
    pub page: Option<u32>,
}

impl Document {
    pub fn new(content: impl Into<String>, source: impl Into<String>, page: Option<u32>) -> Self {
        Self { content: content.into(), source: source.into(), page }
    }
}

/// A bounded span of a [`Document`] that is embedded and indexed on its own.
///
/// `id` is `"<document index>:<chunk index>"` and unique within one index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextChunk {
    pub id: String,
    pub source: String,
    pub page: Option<u32>,
    pub chunk_index: usize,
    pub content: String,
}

/// A chunk returned by similarity search. `rank` 0 is the closest match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub content: String,
    pub rank: usize,
}

impl RetrievedChunk {
    pub fn new(content: impl Into<String>, rank: usize) -> Self {
        Self { content: content.into(), rank }
    }
}

/// A user question. The terms are derived from the text once and never
/// change independently of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    text: String,
    terms: Vec<String>,
}

impl Query {
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::EmptyQuery);
        }
        let terms = text.split_whitespace().map(str::to_string).collect();
        Ok(Self { text: text.to_string(), terms })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }
}

/// Number of answer passages requested per query, `1..=10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct TopK(usize);

impl TopK {
    pub const MIN: usize = 1;
    pub const MAX: usize = 10;
    pub const DEFAULT: usize = 3;

    pub fn new(value: usize) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(Error::InvalidTopK { value, min: Self::MIN, max: Self::MAX })
        }
    }

    pub fn get(self) -> usize {
        self.0
    }

    /// How many chunks to request from search: one primary and one
    /// secondary chunk per answer.
    pub fn search_limit(self) -> usize {
        self.0 * 2
    }
}

impl Default for TopK {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl TryFrom<usize> for TopK {
    type Error = Error;

    fn try_from(value: usize) -> Result<Self> {
        Self::new(value)
    }
}

impl From<TopK> for usize {
    fn from(k: TopK) -> Self {
        k.0
    }
}

/// One rendered answer. `marked_text` carries inline emphasis markers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerPassage {
    pub index: usize,
    pub marked_text: String,
}
