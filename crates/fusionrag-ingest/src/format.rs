use std::path::Path;

/// Supported upload formats, selected by lowercase file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Pdf,
    Docx,
    Image,
    Unsupported,
}

impl Format {
    pub const EXTENSIONS: [&'static str; 5] = ["pdf", "docx", "png", "jpg", "jpeg"];

    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "docx" => Self::Docx,
            "png" | "jpg" | "jpeg" => Self::Image,
            _ => Self::Unsupported,
        }
    }

    pub fn from_filename(name: &str) -> Self {
        Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map_or(Self::Unsupported, Self::from_extension)
    }

    pub fn is_supported(self) -> bool {
        self != Self::Unsupported
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_is_case_insensitive() {
        assert_eq!(Format::from_filename("Report.PDF"), Format::Pdf);
        assert_eq!(Format::from_filename("notes.docx"), Format::Docx);
        assert_eq!(Format::from_filename("scan.JPeG"), Format::Image);
        assert_eq!(Format::from_filename("a/b/photo.png"), Format::Image);
    }

    #[test]
    fn other_names_are_unsupported() {
        for name in ["notes.txt", "archive.tar.gz", "README", "old.doc", ".pdf"] {
            assert!(!Format::from_filename(name).is_supported(), "{name}");
        }
        assert!(Format::EXTENSIONS.iter().all(|e| Format::from_extension(e).is_supported()));
    }
}
