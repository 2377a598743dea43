//! Optical character recognition through the `tesseract` executable.
//!
//! The image bytes are written to a temporary file and tesseract prints the
//! recognised text to stdout.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use fusionrag_core::config::OcrSettings;
use fusionrag_core::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct TesseractOcr {
    command: PathBuf,
    language: String,
}

impl TesseractOcr {
    pub fn new(command: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self { command: command.into(), language: language.into() }
    }

    pub fn from_settings(settings: &OcrSettings) -> Self {
        Self::new(settings.tesseract_path(), settings.language.clone())
    }

    pub fn is_available(&self) -> bool {
        Command::new(&self.command)
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    pub fn image_to_string(&self, name: &str, bytes: &[u8]) -> Result<String> {
        let suffix = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{e}"))
            .unwrap_or_default();
        let mut image = tempfile::Builder::new()
            .prefix("fusionrag-ocr-")
            .suffix(&suffix)
            .tempfile()
            .map_err(|e| Error::extraction(name, format!("temp file: {e}")))?;
        image
            .write_all(bytes)
            .and_then(|()| image.flush())
            .map_err(|e| Error::extraction(name, format!("temp file: {e}")))?;

        let output = Command::new(&self.command)
            .arg(image.path())
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .output()
            .map_err(|e| Error::extraction(name, format!("could not run {}: {e}", self.command.display())))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::extraction(name, format!("tesseract failed: {}", stderr.trim())));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
