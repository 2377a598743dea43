//! Answer cards for the terminal and for a standalone HTML page.

use fusionrag_core::answer::Marker;
use fusionrag_core::types::AnswerPassage;

const ANSI_HIGHLIGHT: &str = "\x1b[1;35m";
const ANSI_RESET: &str = "\x1b[0m";
const NO_TEXT: &str = "(no text)";

const PAGE_STYLE: &str = r#"body{font-family:sans-serif;background:#0b0618;color:#f1e9ff;max-width:60rem;margin:2rem auto;}
h2{color:#e0aaff;text-shadow:0 0 15px #c77dff;}
.answer-card{padding:25px;border-radius:20px;margin:20px 0;background:rgba(20,10,50,0.9);border:1px solid #7b2cbf;box-shadow:0 0 25px #7b2cbf;}
.answer-card p{font-size:18px;line-height:1.8;text-align:justify;}
.highlight{background:linear-gradient(90deg,#ff00ff,#9d4edd);padding:4px 8px;border-radius:6px;font-weight:bold;}"#;

pub fn terminal(passages: &[AnswerPassage], marker: &Marker, top_k: usize) -> String {
    if passages.is_empty() {
        return "No matching passages.\n".to_string();
    }
    let mut out = format!("Top {top_k} Answers\n");
    for passage in passages {
        let text = rewrite_markers(&passage.marked_text, marker, ANSI_HIGHLIGHT, ANSI_RESET, |out, ch| out.push(ch));
        let text = if text.is_empty() { NO_TEXT.to_string() } else { text };
        out.push_str(&format!("\n── Answer {} ──\n{}\n", passage.index, text));
    }
    out
}

/// A complete HTML document. Passage text is escaped; marker markup is kept.
pub fn html_page(query: &str, passages: &[AnswerPassage], marker: &Marker, top_k: usize) -> String {
    let mut body = String::new();
    for passage in passages {
        body.push_str(&format!(
            "<div class=\"answer-card\">\n<h3>Answer {}</h3>\n<p>{}</p>\n</div>\n",
            passage.index,
            if passage.marked_text.is_empty() { NO_TEXT.to_string() } else { escape_outside_markers(&passage.marked_text, marker) }
        ));
    }
    if passages.is_empty() {
        body.push_str("<p>No matching passages.</p>\n");
    }
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>\n{}\n</style>\n</head>\n<body>\n<h2>Top {} Answers</h2>\n{}</body>\n</html>\n",
        escape(query),
        PAGE_STYLE,
        top_k,
        body
    )
}

/// Replace marker markup with `open`/`close` and pass the remaining text
/// through `text_fn`. Empty marker parts never match. When both parts are
/// the same string they alternate.
fn rewrite_markers(text: &str, marker: &Marker, open: &str, close: &str, text_fn: fn(&mut String, char)) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    let mut depth = 0usize;
    while let Some(ch) = rest.chars().next() {
        let same = marker.open == marker.close;
        if !marker.close.is_empty() && rest.starts_with(&marker.close) && (!same || depth > 0) {
            out.push_str(close);
            rest = &rest[marker.close.len()..];
            depth = depth.saturating_sub(1);
        } else if !marker.open.is_empty() && rest.starts_with(&marker.open) {
            out.push_str(open);
            rest = &rest[marker.open.len()..];
            depth += 1;
        } else {
            text_fn(&mut out, ch);
            rest = &rest[ch.len_utf8()..];
        }
    }
    out
}

fn escape_outside_markers(text: &str, marker: &Marker) -> String {
    rewrite_markers(text, marker, &marker.open, &marker.close, push_escaped)
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        push_escaped(&mut out, ch);
    }
    out
}

fn push_escaped(out: &mut String, ch: char) {
    match ch {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '"' => out.push_str("&quot;"),
        _ => out.push(ch),
    }
}
