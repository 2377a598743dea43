//! Lightweight configuration loader and typed settings.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars
//! (nested keys separated by `__`, e.g. `APP_ANSWER__TOP_K=5`). Every section
//! has defaults, so an empty configuration is valid.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::answer::{HighlightMode, Marker};
use crate::error::Error;
use crate::types::TopK;

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            other => tracing::warn!(env = other, "unknown RUST_ENV, using config.toml only"),
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.settings()?;
        Ok(config)
    }

    /// Build a configuration from an inline TOML document, without touching
    /// files or the environment.
    pub fn from_toml_str(toml: &str) -> anyhow::Result<Self> {
        let config = Self { figment: Figment::new().merge(Toml::string(toml)) };
        config.settings()?;
        Ok(config)
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    pub fn settings(&self) -> Result<Settings, Error> {
        let settings: Settings = self
            .figment
            .extract()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub answer: AnswerSettings,
    pub splitter: SplitterSettings,
    pub embedding: EmbeddingSettings,
    pub ocr: OcrSettings,
    pub index: IndexSettings,
}

impl Settings {
    pub fn validate(&self) -> Result<(), Error> {
        if self.answer.max_sentences == 0 {
            return Err(Error::InvalidConfig("answer.max_sentences must be at least 1".into()));
        }
        if self.answer.marker_open.is_empty() || self.answer.marker_close.is_empty() {
            return Err(Error::InvalidConfig("answer.marker_open and answer.marker_close must not be empty".into()));
        }
        if self.splitter.chunk_size == 0 {
            return Err(Error::InvalidConfig("splitter.chunk_size must be at least 1".into()));
        }
        if self.splitter.chunk_overlap >= self.splitter.chunk_size {
            return Err(Error::InvalidConfig(format!(
                "splitter.chunk_overlap ({}) must be smaller than splitter.chunk_size ({})",
                self.splitter.chunk_overlap, self.splitter.chunk_size
            )));
        }
        if self.index.table.trim().is_empty() {
            return Err(Error::InvalidConfig("index.table must not be empty".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerSettings {
    pub top_k: TopK,
    pub max_sentences: usize,
    pub marker_open: String,
    pub marker_close: String,
    pub highlight: HighlightMode,
}

impl AnswerSettings {
    pub fn marker(&self) -> Marker {
        Marker::new(self.marker_open.clone(), self.marker_close.clone())
    }
}

impl Default for AnswerSettings {
    fn default() -> Self {
        let marker = Marker::default();
        Self {
            top_k: TopK::default(),
            max_sentences: 5,
            marker_open: marker.open,
            marker_close: marker.close,
            highlight: HighlightMode::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitterSettings {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for SplitterSettings {
    fn default() -> Self {
        Self { chunk_size: 1200, chunk_overlap: 250 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub model_dir: Option<String>,
    pub max_len: usize,
}

impl EmbeddingSettings {
    pub fn model_dir(&self) -> Option<PathBuf> {
        self.model_dir.as_deref().map(expand_path)
    }
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self { model_dir: None, max_len: 256 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    pub tesseract_cmd: String,
    pub language: String,
}

impl OcrSettings {
    pub fn tesseract_path(&self) -> PathBuf {
        expand_path(&self.tesseract_cmd)
    }
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self { tesseract_cmd: "tesseract".to_string(), language: "eng".to_string() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    pub table: String,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self { table: "chunks".to_string() }
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}
