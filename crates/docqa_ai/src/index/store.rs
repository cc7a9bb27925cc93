use std::fs;
use std::path::{Path, PathBuf};

use docqa_core::domain::Chunk;
use docqa_core::error::{codes, AppError};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use super::model::{IndexManifest, VectorPayload, INDEX_FORMAT_VERSION};
use super::VectorIndex;

pub(crate) const MANIFEST_FILE: &str = "manifest.json";
pub(crate) const CHUNKS_FILE: &str = "chunks.json";
pub(crate) const VECTORS_FILE: &str = "vectors.json";

pub const INDEX_NOT_FOUND_MESSAGE: &str = "No document index found. Please ingest documents first.";

fn not_found(details: String) -> AppError {
    AppError::new(codes::INDEX_NOT_FOUND, INDEX_NOT_FOUND_MESSAGE).with_details(details)
}

pub(crate) fn encode_payload<T: Serialize>(value: &T, what: &str) -> Result<Vec<u8>, AppError> {
    serde_json::to_vec(value).map_err(|e| {
        AppError::new(codes::INDEX_WRITE_FAILED, format!("Failed to encode index {what}"))
            .with_details(e.to_string())
    })
}

/// SHA-256 over the chunk payload followed by the vector payload, exactly as stored.
pub(crate) fn payload_etag(chunks_json: &[u8], vectors_json: &[u8]) -> String {
    let mut h = Sha256::new();
    h.update(chunks_json);
    h.update(vectors_json);
    hex::encode(h.finalize())
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), AppError> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes).map_err(|e| {
        AppError::new(codes::INDEX_WRITE_FAILED, "Failed to write index file")
            .with_details(format!("path={}; err={}", tmp.display(), e))
    })?;
    fs::rename(&tmp, path).map_err(|e| {
        AppError::new(codes::INDEX_WRITE_FAILED, "Failed to finalize index file write")
            .with_details(format!("tmp={}; dest={}; err={}", tmp.display(), path.display(), e))
    })
}

impl VectorIndex {
    /// Persist to `dir`, replacing whatever was there. The manifest goes last.
    pub fn save(&self, dir: &Path) -> Result<(), AppError> {
        fs::create_dir_all(dir).map_err(|e| {
            AppError::new(codes::INDEX_WRITE_FAILED, "Failed to create index directory")
                .with_details(format!("path={}; err={}", dir.display(), e))
        })?;

        let manifest_path = dir.join(MANIFEST_FILE);
        if manifest_path.exists() {
            fs::remove_file(&manifest_path).map_err(|e| {
                AppError::new(codes::INDEX_WRITE_FAILED, "Failed to remove previous index manifest")
                    .with_details(format!("path={}; err={}", manifest_path.display(), e))
            })?;
        }

        let (chunks_json, vectors_json) = self.encode_payloads()?;
        write_atomic(&dir.join(CHUNKS_FILE), &chunks_json)?;
        write_atomic(&dir.join(VECTORS_FILE), &vectors_json)?;

        let manifest_json = serde_json::to_vec_pretty(&self.manifest).map_err(|e| {
            AppError::new(codes::INDEX_WRITE_FAILED, "Failed to encode index manifest")
                .with_details(e.to_string())
        })?;
        write_atomic(&manifest_path, &manifest_json)?;

        info!(
            dir = %dir.display(),
            chunks = self.manifest.chunk_count,
            etag = %self.manifest.etag,
            "index saved"
        );
        Ok(())
    }

    /// Restore an index from `dir`. Anything missing or inconsistent is `INDEX_NOT_FOUND`.
    pub fn load(dir: &Path) -> Result<Self, AppError> {
        let manifest = read_manifest(dir)?
            .ok_or_else(|| not_found(format!("path={}", dir.join(MANIFEST_FILE).display())))?;
        if manifest.format_version != INDEX_FORMAT_VERSION {
            return Err(not_found(format!(
                "unsupported format_version={}",
                manifest.format_version
            )));
        }

        let chunks_json = read_required(&dir.join(CHUNKS_FILE))?;
        let vectors_json = read_required(&dir.join(VECTORS_FILE))?;

        let etag = payload_etag(&chunks_json, &vectors_json);
        if etag != manifest.etag {
            return Err(not_found(format!(
                "etag mismatch; manifest={}; payload={}",
                manifest.etag, etag
            )));
        }

        let chunks: Vec<Chunk> = serde_json::from_slice(&chunks_json)
            .map_err(|e| not_found(format!("chunks decode failed: {e}")))?;
        let payload: VectorPayload = serde_json::from_slice(&vectors_json)
            .map_err(|e| not_found(format!("vectors decode failed: {e}")))?;

        let count = manifest.chunk_count as usize;
        if chunks.len() != count || payload.vectors.len() != count || payload.norms.len() != count {
            return Err(not_found(format!(
                "count mismatch; manifest={}; chunks={}; vectors={}; norms={}",
                count,
                chunks.len(),
                payload.vectors.len(),
                payload.norms.len()
            )));
        }
        if payload.dims != manifest.dims
            || payload.vectors.iter().any(|v| v.len() != manifest.dims as usize)
        {
            return Err(not_found(format!("dims mismatch; manifest={}", manifest.dims)));
        }

        debug!(dir = %dir.display(), chunks = count, "index loaded");
        Ok(Self {
            manifest,
            chunks,
            vectors: payload.vectors,
            norms: payload.norms,
        })
    }
}

/// `Ok(None)` when no manifest exists at `dir`.
pub fn read_manifest(dir: &Path) -> Result<Option<IndexManifest>, AppError> {
    let path: PathBuf = dir.join(MANIFEST_FILE);
    if !path.exists() {
        return Ok(None);
    }
    let bytes = fs::read(&path).map_err(|e| not_found(format!("path={}; err={}", path.display(), e)))?;
    let manifest = serde_json::from_slice(&bytes)
        .map_err(|e| not_found(format!("path={}; err={}", path.display(), e)))?;
    Ok(Some(manifest))
}

fn read_required(path: &Path) -> Result<Vec<u8>, AppError> {
    fs::read(path).map_err(|e| not_found(format!("path={}; err={}", path.display(), e)))
}
