#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod answer;
pub mod config;
pub mod error;
pub mod splitter;
pub mod traits;
pub mod types;

pub use answer::{assemble_answers, AnswerAssembler, HighlightMode, Marker};
pub use error::{Error, Result};
pub use splitter::TextSplitter;
pub use types::{AnswerPassage, Document, Query, RetrievedChunk, TextChunk, TopK};
