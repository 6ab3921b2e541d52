//! Plain-text extraction for ingestible documents.
//!
//! Dispatch is by file extension: PDFs go through `pdf-extract`'s text
//! layer, everything else is read as UTF-8. A failed extraction is an
//! error for that document only; the ingest pipeline reports it and moves
//! on.

use anyhow::{Context, Result};
use std::path::Path;

/// File extensions picked up by docs-directory discovery.
pub const DISCOVER_GLOBS: &[&str] = &["*.pdf", "*.md", "*.txt"];

/// Extract the text content of `path`.
///
/// `use_ocr` is accepted for config compatibility; scanned PDFs still go
/// through text-layer extraction, with a note on stderr.
pub fn extract_text(path: &Path, use_ocr: bool) -> Result<String> {
    let is_pdf = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);

    if is_pdf {
        if use_ocr {
            eprintln!(
                "note: use_ocr is set for {} but OCR is not performed; using the PDF text layer",
                path.display()
            );
        }
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        pdf_extract::extract_text_from_mem(&bytes)
            .with_context(|| format!("PDF text extraction failed for {}", path.display()))
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_plain_text_files() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("notes.md");
        std::fs::write(&path, "# Notes\n\nSome content.").unwrap();
        assert_eq!(extract_text(&path, false).unwrap(), "# Notes\n\nSome content.");
    }

    #[test]
    fn missing_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(extract_text(&tmp.path().join("absent.txt"), false).is_err());
    }
}
