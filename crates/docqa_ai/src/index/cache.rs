use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use docqa_core::error::{codes, AppError};
use parking_lot::Mutex;
use tracing::{debug, info};

use super::store::{read_manifest, INDEX_NOT_FOUND_MESSAGE};
use super::VectorIndex;

/// Last loaded index for one directory.
///
/// `get` reads only the manifest to learn the on-disk etag and reloads the
/// payload when it differs from the cached copy.
pub struct IndexCache {
    dir: PathBuf,
    slot: Mutex<Option<Arc<VectorIndex>>>,
    loads: AtomicU64,
}

impl IndexCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            slot: Mutex::new(None),
            loads: AtomicU64::new(0),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn get(&self) -> Result<Arc<VectorIndex>, AppError> {
        let manifest = read_manifest(&self.dir)?.ok_or_else(|| {
            AppError::new(codes::INDEX_NOT_FOUND, INDEX_NOT_FOUND_MESSAGE)
                .with_details(format!("path={}", self.dir.display()))
        })?;

        let mut slot = self.slot.lock();
        if let Some(cached) = slot.as_ref() {
            if cached.etag() == manifest.etag {
                debug!(etag = %manifest.etag, "index cache hit");
                return Ok(Arc::clone(cached));
            }
        }

        let loaded = Arc::new(VectorIndex::load(&self.dir)?);
        self.loads.fetch_add(1, Ordering::Relaxed);
        info!(dir = %self.dir.display(), etag = %loaded.etag(), "index loaded into cache");
        *slot = Some(Arc::clone(&loaded));
        Ok(loaded)
    }

    /// Seed the cache with an index that was just built and saved.
    pub fn store(&self, index: Arc<VectorIndex>) {
        *self.slot.lock() = Some(index);
    }

    pub fn invalidate(&self) {
        *self.slot.lock() = None;
    }

    /// Number of payload loads from disk so far.
    pub fn load_count(&self) -> u64 {
        self.loads.load(Ordering::Relaxed)
    }
}
