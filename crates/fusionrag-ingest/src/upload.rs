use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::format::Format;

/// A file handed to the ingestion step: its name (for format dispatch) and
/// raw bytes.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { name: name.into(), bytes }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let name = path
            .file_name()
            .map_or_else(|| path.to_string_lossy(), |n| n.to_string_lossy())
            .to_string();
        Ok(Self { name, bytes })
    }
}

/// Load uploads from the given paths in order. Directories are walked
/// recursively (sorted) and only files with a supported extension are kept;
/// explicitly named files are always loaded.
pub fn collect_uploads(paths: &[PathBuf]) -> Result<Vec<UploadedFile>> {
    let mut uploads = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut files: Vec<PathBuf> = walkdir::WalkDir::new(path)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .map(|e| e.into_path())
                .filter(|p| Format::from_filename(&p.to_string_lossy()).is_supported())
                .collect();
            files.sort();
            for file in files {
                uploads.push(UploadedFile::from_path(&file)?);
            }
        } else {
            uploads.push(UploadedFile::from_path(path)?);
        }
    }
    Ok(uploads)
}
