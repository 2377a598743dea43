use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("top-k must be between {min} and {max}, got {value}")]
    InvalidTopK { value: usize, min: usize, max: usize },

    #[error("Query is empty")]
    EmptyQuery,

    #[error("No readable text found.")]
    EmptyCorpus,

    #[error("Could not extract text from '{file}': {reason}")]
    Extraction { file: String, reason: String },

    #[error("Operation failed: {0}")]
    Operation(String),
}

impl Error {
    pub fn extraction(file: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Extraction { file: file.into(), reason: reason.to_string() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
