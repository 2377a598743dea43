//! Answer assembly: turns ranked search results into short passages with
//! the query terms marked for emphasis.
//!
//! For output position `i` the `i`-th chunk is the primary text and the
//! chunk `top_k` positions further down (if any) is appended to it. The
//! combined text is cut to the first few sentences and every
//! case-insensitive occurrence of a query term is wrapped in a [`Marker`].
//! Assembly is a pure function of its inputs.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::config::AnswerSettings;
use crate::types::{AnswerPassage, Query, RetrievedChunk, TopK};

pub const DEFAULT_MAX_SENTENCES: usize = 5;

/// Opening and closing emphasis markup inserted around matched terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    pub open: String,
    pub close: String,
}

impl Marker {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self { open: open.into(), close: close.into() }
    }
}

impl Default for Marker {
    fn default() -> Self {
        Self::new(r#"<span class="highlight">"#, "</span>")
    }
}

/// How marks from different query terms interact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HighlightMode {
    /// Terms are applied one after another in query order. Each pass only
    /// scans text outside markup inserted so far, so a term that matches
    /// already marked text nests another marker inside it.
    #[default]
    Sequential,
    /// All matches are located on the unmarked text, overlapping spans are
    /// merged and each merged span is wrapped once.
    Merged,
}

#[derive(Debug, Clone)]
pub struct AnswerAssembler {
    max_sentences: usize,
    marker: Marker,
    mode: HighlightMode,
}

impl Default for AnswerAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SENTENCES, Marker::default(), HighlightMode::default())
    }
}

impl AnswerAssembler {
    pub fn new(max_sentences: usize, marker: Marker, mode: HighlightMode) -> Self {
        Self { max_sentences: max_sentences.max(1), marker, mode }
    }

    pub fn from_settings(settings: &AnswerSettings) -> Self {
        Self::new(settings.max_sentences, settings.marker(), settings.highlight)
    }

    pub fn marker(&self) -> &Marker {
        &self.marker
    }

    /// `ranked` is expected to hold up to `2 * top_k` chunks, best first.
    /// Returns one passage per primary chunk (at most `top_k`), numbered by
    /// position. A position whose chunks are all empty gets empty text.
    pub fn assemble(&self, ranked: &[RetrievedChunk], query: &Query, top_k: TopK) -> Vec<AnswerPassage> {
        let k = top_k.get();
        let patterns = term_patterns(query);
        let mut passages = Vec::with_capacity(k.min(ranked.len()));

        for (i, primary) in ranked.iter().take(k).enumerate() {
            let combined = combine(primary, ranked.get(i + k));
            if combined.is_empty() {
                passages.push(AnswerPassage { index: i + 1, marked_text: String::new() });
                continue;
            }
            let truncated = truncate_sentences(&combined, self.max_sentences);
            let marked_text = match self.mode {
                HighlightMode::Sequential => highlight_sequential(&truncated, &patterns, &self.marker),
                HighlightMode::Merged => highlight_merged(&truncated, &patterns, &self.marker),
            };
            passages.push(AnswerPassage { index: i + 1, marked_text });
        }

        tracing::debug!(chunks = ranked.len(), top_k = k, passages = passages.len(), "assembled answers");
        passages
    }
}

/// Assemble with the default sentence cap, marker and highlight mode.
pub fn assemble_answers(ranked: &[RetrievedChunk], query: &Query, top_k: TopK) -> Vec<AnswerPassage> {
    AnswerAssembler::default().assemble(ranked, query, top_k)
}

fn combine(primary: &RetrievedChunk, secondary: Option<&RetrievedChunk>) -> String {
    std::iter::once(primary)
        .chain(secondary)
        .map(|c| c.content.as_str())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split after every `.`, `!` or `?` that is followed by whitespace. The
/// terminator stays with its sentence; the whitespace run is dropped.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        let end = i + c.len_utf8();
        let mut resume = end;
        while let Some(&(j, w)) = chars.peek() {
            if !w.is_whitespace() {
                break;
            }
            resume = j + w.len_utf8();
            chars.next();
        }
        if resume > end {
            sentences.push(&text[start..end]);
            start = resume;
        }
    }
    if start < text.len() {
        sentences.push(&text[start..]);
    }
    sentences
}

/// Keep the first `max` sentences joined by single spaces. Text without a
/// sentence boundary is only trimmed.
pub fn truncate_sentences(text: &str, max: usize) -> String {
    let sentences = split_sentences(text);
    if sentences.len() <= 1 {
        return text.trim().to_string();
    }
    sentences.into_iter().take(max).collect::<Vec<_>>().join(" ")
}

fn term_patterns(query: &Query) -> Vec<Regex> {
    query
        .terms()
        .iter()
        .filter_map(|term| {
            RegexBuilder::new(&regex::escape(term))
                .case_insensitive(true)
                .build()
                .map_err(|e| tracing::warn!(term = %term, error = %e, "skipping unhighlightable term"))
                .ok()
        })
        .collect()
}

enum Segment {
    Text(String),
    Open,
    Close,
}

fn highlight_sequential(text: &str, patterns: &[Regex], marker: &Marker) -> String {
    let mut segments = vec![Segment::Text(text.to_string())];
    for re in patterns {
        let mut next = Vec::with_capacity(segments.len());
        for segment in segments {
            match segment {
                Segment::Text(s) => split_on_matches(&s, re, &mut next),
                other => next.push(other),
            }
        }
        segments = next;
    }

    let mut out = String::with_capacity(text.len());
    for segment in &segments {
        match segment {
            Segment::Text(s) => out.push_str(s),
            Segment::Open => out.push_str(&marker.open),
            Segment::Close => out.push_str(&marker.close),
        }
    }
    out
}

fn split_on_matches(s: &str, re: &Regex, out: &mut Vec<Segment>) {
    let mut last = 0;
    for m in re.find_iter(s) {
        if m.start() > last {
            out.push(Segment::Text(s[last..m.start()].to_string()));
        }
        out.push(Segment::Open);
        out.push(Segment::Text(m.as_str().to_string()));
        out.push(Segment::Close);
        last = m.end();
    }
    if last < s.len() {
        out.push(Segment::Text(s[last..].to_string()));
    }
}

fn highlight_merged(text: &str, patterns: &[Regex], marker: &Marker) -> String {
    let mut spans: Vec<(usize, usize)> = patterns
        .iter()
        .flat_map(|re| re.find_iter(text).map(|m| (m.start(), m.end())))
        .collect();
    spans.sort_unstable();

    let mut merged: Vec<(usize, usize)> = Vec::with_capacity(spans.len());
    for (start, end) in spans {
        match merged.last_mut() {
            Some(last) if start < last.1 => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for (start, end) in merged {
        out.push_str(&text[last..start]);
        out.push_str(&marker.open);
        out.push_str(&text[start..end]);
        out.push_str(&marker.close);
        last = end;
    }
    out.push_str(&text[last..]);
    out
}
