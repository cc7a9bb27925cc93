use docqa_core::domain::Chunk;
use serde::{Deserialize, Serialize};

pub const INDEX_FORMAT_VERSION: u32 = 1;

/// Small descriptor written last during a save. Readers compare `etag` to
/// decide whether a cached index is still current.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexManifest {
    pub format_version: u32,
    pub model: String,
    pub dims: u32,
    pub chunk_count: u32,
    pub built_at: String,
    pub etag: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub(crate) struct VectorPayload {
    pub dims: u32,
    pub vectors: Vec<Vec<f32>>,
    pub norms: Vec<f32>,
}
