use lopdf::Document as PdfDocument;

use fusionrag_core::error::{Error, Result};

/// Text of every page as `(page number, text)`, page numbers 1-based.
/// Any page that fails to decode fails the whole file.
pub fn extract_pages(name: &str, bytes: &[u8]) -> Result<Vec<(u32, String)>> {
    let doc = PdfDocument::load_mem(bytes).map_err(|e| Error::extraction(name, e))?;
    doc.get_pages()
        .keys()
        .map(|&page| {
            doc.extract_text(&[page])
                .map(|text| (page, text))
                .map_err(|e| Error::extraction(name, format!("page {page}: {e}")))
        })
        .collect()
}
