use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{codes, AppError};
use crate::ingest::detect_file_kind;
use crate::normalize::sha256_hex;

/// One uploaded file as received by the transport layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }
}

/// Reduce a client-supplied name to its final path component.
fn sanitize_upload_name(index: usize, raw: &str) -> Result<String, AppError> {
    let name = raw.rsplit(&['/', '\\'][..]).next().unwrap_or("").trim();
    if name.is_empty() || name == "." || name == ".." {
        return Err(AppError::new(codes::UPLOAD_INVALID, "No filename provided for uploaded file")
            .with_details(format!("index={index}; filename={raw:?}")));
    }
    Ok(name.to_string())
}

/// Write uploads under `dir`, returning their paths in upload order.
///
/// Every name and extension is validated before anything is written. Two uploads that reduce
/// to the same file name are rejected.
pub fn stage_uploads(dir: &Path, files: &[UploadedFile]) -> Result<Vec<PathBuf>, AppError> {
    if files.is_empty() {
        return Err(AppError::new(codes::EMPTY_INPUT, "No files provided for ingestion"));
    }

    let mut names = Vec::with_capacity(files.len());
    let mut seen = HashSet::with_capacity(files.len());
    for (i, f) in files.iter().enumerate() {
        let name = sanitize_upload_name(i, &f.filename)?;
        detect_file_kind(Path::new(&name))?;
        if !seen.insert(name.clone()) {
            return Err(AppError::new(codes::UPLOAD_INVALID, "Duplicate filename in upload batch")
                .with_details(format!("index={i}; filename={:?}", f.filename)));
        }
        names.push(name);
    }

    fs::create_dir_all(dir).map_err(|e| {
        AppError::new(codes::UPLOAD_INVALID, "Failed to create uploads directory")
            .with_details(format!("path={}; err={}", dir.display(), e))
    })?;

    let mut paths = Vec::with_capacity(files.len());
    for (name, f) in names.into_iter().zip(files) {
        let path = dir.join(&name);
        let tmp = dir.join(format!(".{name}.tmp"));
        fs::write(&tmp, &f.bytes).map_err(|e| {
            AppError::new(codes::UPLOAD_INVALID, "Failed to write uploaded file")
                .with_details(format!("path={}; err={}", tmp.display(), e))
        })?;
        fs::rename(&tmp, &path).map_err(|e| {
            AppError::new(codes::UPLOAD_INVALID, "Failed to finalize uploaded file")
                .with_details(format!("tmp={}; dest={}; err={}", tmp.display(), path.display(), e))
        })?;
        tracing::debug!(
            path = %path.display(),
            bytes = f.bytes.len(),
            sha256 = %sha256_hex(&f.bytes),
            "staged upload"
        );
        paths.push(path);
    }
    Ok(paths)
}
