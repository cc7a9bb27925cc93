use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::RawDocument;
use crate::error::{codes, AppError};
use crate::normalize::normalize_text;

use super::pdf::extract_pdf_text;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Pdf,
    Text,
}

/// Classify by extension (case-insensitive). Anything but `.pdf`/`.txt` is rejected.
pub fn detect_file_kind(path: &Path) -> Result<FileKind, AppError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("pdf") => Ok(FileKind::Pdf),
        Some("txt") => Ok(FileKind::Text),
        _ => Err(AppError::new(codes::UNSUPPORTED_FILE_TYPE, "Unsupported file type")
            .with_details(format!("path={}", path.display()))),
    }
}

/// Load every path into one `RawDocument`, preserving order.
///
/// The whole batch is rejected before any file is read if one extension is unsupported, and any
/// read/parse failure aborts the batch. Nothing is written; see `write_combined_text`.
pub fn load_files(paths: &[PathBuf]) -> Result<Vec<RawDocument>, AppError> {
    let kinds = paths
        .iter()
        .map(|p| detect_file_kind(p))
        .collect::<Result<Vec<_>, _>>()?;

    let mut docs = Vec::with_capacity(paths.len());
    for (path, kind) in paths.iter().zip(kinds) {
        let text = match kind {
            FileKind::Pdf => extract_pdf_text(path)?,
            FileKind::Text => read_text_file(path)?,
        };
        tracing::debug!(path = %path.display(), chars = text.chars().count(), "loaded file");
        docs.push(RawDocument {
            source_id: source_id_for(path),
            text: normalize_text(&text),
        });
    }

    Ok(docs)
}

/// Overwrite `path` with all document texts joined by a blank line.
pub fn write_combined_text(docs: &[RawDocument], path: &Path) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            AppError::new(codes::LOADER_READ_FAILED, "Failed to create ingested text directory")
                .with_details(format!("path={}; err={}", parent.display(), e))
        })?;
    }
    let combined = docs
        .iter()
        .map(|d| d.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    fs::write(path, combined.as_bytes()).map_err(|e| {
        AppError::new(codes::LOADER_READ_FAILED, "Failed to write combined ingested text")
            .with_details(format!("path={}; err={}", path.display(), e))
    })?;
    tracing::info!(path = %path.display(), "saved combined ingested text");
    Ok(())
}

fn read_text_file(path: &Path) -> Result<String, AppError> {
    let bytes = fs::read(path).map_err(|e| {
        AppError::new(codes::LOADER_READ_FAILED, "Failed to read text file")
            .with_details(format!("path={}; err={}", path.display(), e))
    })?;
    let text = String::from_utf8(bytes).map_err(|e| {
        AppError::new(codes::LOADER_READ_FAILED, "Text file is not valid UTF-8")
            .with_details(format!("path={}; err={}", path.display(), e))
    })?;
    Ok(text.strip_prefix('\u{feff}').map(str::to_string).unwrap_or(text))
}

fn source_id_for(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
