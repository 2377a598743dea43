//! fusionrag-ingest
//!
//! Turns uploaded files into plain-text [`Document`]s. The format is picked
//! from the file extension; PDFs yield one document per non-blank page,
//! DOCX and images yield at most one document. A file that fails to parse
//! contributes nothing and does not stop the batch.

pub mod docx;
pub mod format;
pub mod ocr;
pub mod pdf;
pub mod upload;

pub use format::Format;
pub use ocr::TesseractOcr;
pub use upload::{collect_uploads, UploadedFile};

use fusionrag_core::config::OcrSettings;
use fusionrag_core::error::Result;
use fusionrag_core::Document;

pub struct Ingestor {
    ocr: TesseractOcr,
}

impl Ingestor {
    pub fn new(ocr: TesseractOcr) -> Self {
        Self { ocr }
    }

    pub fn from_settings(settings: &OcrSettings) -> Self {
        Self::new(TesseractOcr::from_settings(settings))
    }

    /// Extract every file in order. Unsupported extensions are skipped
    /// silently; unreadable files are logged and skipped.
    pub fn load_files(&self, files: &[UploadedFile]) -> Vec<Document> {
        if files.iter().any(|f| Format::from_filename(&f.name) == Format::Image) && !self.ocr.is_available() {
            tracing::warn!("tesseract is not available, image uploads will be skipped");
        }
        let mut docs = Vec::new();
        for file in files {
            match self.extract(file) {
                Ok(extracted) => {
                    tracing::debug!(file = %file.name, documents = extracted.len(), "extracted");
                    docs.extend(extracted);
                }
                Err(e) => tracing::warn!(file = %file.name, error = %e, "skipping file"),
            }
        }
        tracing::info!(files = files.len(), documents = docs.len(), "ingestion finished");
        docs
    }

    pub fn extract(&self, file: &UploadedFile) -> Result<Vec<Document>> {
        let texts = match Format::from_filename(&file.name) {
            Format::Pdf => pdf::extract_pages(&file.name, &file.bytes)?
                .into_iter()
                .map(|(page, text)| (Some(page), text))
                .collect(),
            Format::Docx => vec![(None, docx::extract_text(&file.name, &file.bytes)?)],
            Format::Image => vec![(None, self.ocr.image_to_string(&file.name, &file.bytes)?)],
            Format::Unsupported => Vec::new(),
        };
        Ok(texts
            .into_iter()
            .filter(|(_, text)| !text.trim().is_empty())
            .map(|(page, text)| Document::new(text, file.name.clone(), page))
            .collect())
    }
}

impl Default for Ingestor {
    fn default() -> Self {
        Self::from_settings(&OcrSettings::default())
    }
}
