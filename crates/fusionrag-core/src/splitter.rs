use std::collections::VecDeque;

use crate::config::SplitterSettings;
use crate::error::{Error, Result};
use crate::types::{Document, TextChunk};

pub const DEFAULT_SEPARATORS: [&str; 5] = ["\n\n", "\n", ". ", "? ", "! "];

/// Recursive character splitter.
///
/// Text is cut on the first separator it contains (the separator stays at
/// the end of the preceding piece), oversized pieces are cut again with the
/// remaining separators, and the pieces are merged back into chunks of at
/// most `chunk_size` characters. Up to `chunk_overlap` characters of trailing
/// pieces are repeated at the start of the next chunk.
#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl TextSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 || chunk_overlap >= chunk_size {
            return Err(Error::InvalidConfig(format!(
                "chunk overlap ({chunk_overlap}) must be smaller than chunk size ({chunk_size})"
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        })
    }

    pub fn from_settings(settings: &SplitterSettings) -> Result<Self> {
        Self::new(settings.chunk_size, settings.chunk_overlap)
    }

    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.separators)
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect()
    }

    /// Chunk ids are `"<document index>:<chunk index>"`.
    pub fn split_documents(&self, documents: &[Document]) -> Vec<TextChunk> {
        let mut chunks = Vec::new();
        for (doc_index, doc) in documents.iter().enumerate() {
            for (chunk_index, content) in self.split_text(&doc.content).into_iter().enumerate() {
                chunks.push(TextChunk {
                    id: format!("{doc_index}:{chunk_index}"),
                    source: doc.source.clone(),
                    page: doc.page,
                    chunk_index,
                    content,
                });
            }
        }
        tracing::debug!(documents = documents.len(), chunks = chunks.len(), "split documents");
        chunks
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let Some(pos) = separators.iter().position(|s| text.contains(s.as_str())) else {
            return self.hard_split(text);
        };
        let separator = separators[pos].as_str();
        let remaining = &separators[pos + 1..];

        let mut chunks = Vec::new();
        let mut pending: Vec<&str> = Vec::new();
        for piece in text.split_inclusive(separator) {
            if char_len(piece) <= self.chunk_size {
                pending.push(piece);
                continue;
            }
            if !pending.is_empty() {
                chunks.extend(self.merge_pieces(&pending));
                pending.clear();
            }
            chunks.extend(self.split_recursive(piece, remaining));
        }
        if !pending.is_empty() {
            chunks.extend(self.merge_pieces(&pending));
        }
        chunks
    }

    fn merge_pieces(&self, pieces: &[&str]) -> Vec<String> {
        let mut out = Vec::new();
        let mut window: VecDeque<(&str, usize)> = VecDeque::new();
        let mut total = 0usize;

        for &piece in pieces {
            let len = char_len(piece);
            if total + len > self.chunk_size && !window.is_empty() {
                out.push(window.iter().map(|(p, _)| *p).collect::<String>());
                while total > self.chunk_overlap || (total > 0 && total + len > self.chunk_size) {
                    let Some((_, dropped)) = window.pop_front() else { break };
                    total -= dropped;
                }
            }
            window.push_back((piece, len));
            total += len;
        }
        if !window.is_empty() {
            out.push(window.iter().map(|(p, _)| *p).collect::<String>());
        }
        out
    }

    // Last resort for text with no separator at all: fixed windows.
    fn hard_split(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        if chars.len() <= self.chunk_size {
            return vec![text.to_string()];
        }
        let step = self.chunk_size - self.chunk_overlap;
        let mut out = Vec::new();
        let mut start = 0;
        loop {
            let end = (start + self.chunk_size).min(chars.len());
            out.push(chars[start..end].iter().collect());
            if end == chars.len() {
                break;
            }
            start += step;
        }
        out
    }
}

impl Default for TextSplitter {
    fn default() -> Self {
        let settings = SplitterSettings::default();
        Self {
            chunk_size: settings.chunk_size,
            chunk_overlap: settings.chunk_overlap,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
