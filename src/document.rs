//! Source document ingestion.
//!
//! Reads a source document into plain UTF-8 text. `.pdf` sources go
//! through PDF text extraction; everything else is read as UTF-8.

use std::path::Path;

use tracing::debug;

use crate::error::IndexError;

/// Reads the source document at `path` into plain text.
///
/// # Errors
///
/// Returns [`IndexError::SourceNotFound`] if the path does not exist,
/// [`IndexError::Extraction`] if PDF text extraction fails, or
/// [`IndexError::Io`] for other read failures.
pub fn read_document(path: &Path) -> Result<String, IndexError> {
    if !path.exists() {
        return Err(IndexError::SourceNotFound {
            path: path.to_path_buf(),
        });
    }

    let is_pdf = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));

    let text = if is_pdf {
        debug!(path = %path.display(), "extracting text from PDF source");
        pdf_extract::extract_text(path).map_err(|e| IndexError::Extraction {
            message: e.to_string(),
        })?
    } else {
        std::fs::read_to_string(path)?
    };

    debug!(
        path = %path.display(),
        bytes = text.len(),
        "source document read"
    );
    Ok(text)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_path_is_source_not_found() {
        let result = read_document(Path::new("/nonexistent/document.txt"));
        assert!(matches!(result, Err(IndexError::SourceNotFound { .. })));
    }

    #[test]
    fn test_reads_plain_text() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir failed: {e}"));
        let path = dir.path().join("doc.txt");
        std::fs::write(&path, "Alice: score 92\n").unwrap_or_else(|e| panic!("write failed: {e}"));

        let text = read_document(&path).unwrap_or_else(|e| panic!("read failed: {e}"));
        assert_eq!(text, "Alice: score 92\n");
    }

    #[test]
    fn test_extension_case_insensitive() {
        // A .PDF path with non-PDF bytes must go through the extractor
        // and fail there, not be read as plain text.
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir failed: {e}"));
        let path = dir.path().join("doc.PDF");
        std::fs::write(&path, "not a pdf").unwrap_or_else(|e| panic!("write failed: {e}"));

        let result = read_document(&path);
        assert!(matches!(result, Err(IndexError::Extraction { .. })));
    }
}
