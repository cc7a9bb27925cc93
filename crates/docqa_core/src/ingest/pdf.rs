use std::path::Path;

use crate::error::{codes, AppError};

/// Extract page text in page order. Pages without extractable text contribute nothing.
pub(crate) fn extract_pdf_text(path: &Path) -> Result<String, AppError> {
    let doc = lopdf::Document::load(path).map_err(|e| {
        AppError::new(codes::LOADER_PDF_FAILED, "Failed to parse PDF")
            .with_details(format!("path={}; err={}", path.display(), e))
    })?;

    let mut text = String::new();
    let mut empty_pages = 0u32;
    for page_no in doc.get_pages().keys() {
        match doc.extract_text(&[*page_no]) {
            Ok(page_text) if !page_text.trim().is_empty() => {
                // extract_text already terminates pages; keep exactly one newline.
                text.push_str(page_text.trim_end_matches(|c: char| c == '\r' || c == '\n'));
                text.push('\n');
            }
            Ok(_) => empty_pages += 1,
            Err(e) => {
                // Image-only or oddly encoded pages are skipped, not fatal.
                tracing::warn!(path = %path.display(), page = page_no, error = %e, "pdf page text extraction failed");
                empty_pages += 1;
            }
        }
    }
    if empty_pages > 0 {
        tracing::debug!(path = %path.display(), empty_pages, "pdf pages without extractable text");
    }
    Ok(text)
}
