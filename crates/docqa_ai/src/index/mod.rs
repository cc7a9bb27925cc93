use std::cmp::Ordering;

use docqa_core::domain::Chunk;
use docqa_core::error::{codes, AppError};
use tracing::{debug, info};

use crate::embeddings::Embedder;

mod cache;
mod model;
mod similarity;
mod store;

pub use cache::IndexCache;
pub use model::{IndexManifest, ScoredChunk, INDEX_FORMAT_VERSION};
pub use similarity::{cosine_similarity, l2_norm};
pub use store::{read_manifest, INDEX_NOT_FOUND_MESSAGE};

use model::VectorPayload;
use store::{encode_payload, payload_etag};

/// In-memory embedded chunks plus their norms. Built once, then read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorIndex {
    manifest: IndexManifest,
    chunks: Vec<Chunk>,
    vectors: Vec<Vec<f32>>,
    norms: Vec<f32>,
}

impl VectorIndex {
    /// Embed `chunks` in batches of `batch_size` and assemble a fresh index.
    pub fn build(
        chunks: Vec<Chunk>,
        embedder: &dyn Embedder,
        batch_size: usize,
        built_at: &str,
    ) -> Result<Self, AppError> {
        if chunks.is_empty() {
            return Err(AppError::new(
                codes::EMPTY_INPUT,
                "No chunks to index; the documents contained no text",
            ));
        }
        let batch_size = batch_size.max(1);

        let mut vectors: Vec<Vec<f32>> = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(batch_size) {
            let texts = batch.iter().map(|c| c.text.clone()).collect::<Vec<_>>();
            let out = embedder.embed(&texts)?;
            if out.len() != texts.len() {
                return Err(AppError::new(
                    codes::EMBEDDING_PROVIDER_FAILED,
                    "Embedding provider returned an unexpected number of vectors",
                )
                .with_details(format!("expected={}; got={}", texts.len(), out.len())));
            }
            vectors.extend(out);
            debug!(done = vectors.len(), total = chunks.len(), "embedded batch");
        }

        let dims = vectors.first().map(|v| v.len()).unwrap_or(0);
        if dims == 0 {
            return Err(AppError::new(
                codes::EMBEDDING_PROVIDER_FAILED,
                "Embedding provider returned empty vectors",
            ));
        }
        if let Some((i, v)) = vectors.iter().enumerate().find(|(_, v)| v.len() != dims) {
            return Err(AppError::new(
                codes::EMBEDDING_PROVIDER_FAILED,
                "Embedding dimension mismatch across chunks",
            )
            .with_details(format!("chunk={i}; expected={dims}; got={}", v.len())));
        }

        let norms = vectors.iter().map(|v| l2_norm(v)).collect::<Vec<_>>();
        let mut index = Self {
            manifest: IndexManifest {
                format_version: INDEX_FORMAT_VERSION,
                model: embedder.model_id().to_string(),
                dims: dims as u32,
                chunk_count: chunks.len() as u32,
                built_at: built_at.to_string(),
                etag: String::new(),
            },
            chunks,
            vectors,
            norms,
        };
        let (chunks_json, vectors_json) = index.encode_payloads()?;
        index.manifest.etag = payload_etag(&chunks_json, &vectors_json);

        info!(
            chunks = index.manifest.chunk_count,
            dims = index.manifest.dims,
            model = %index.manifest.model,
            "index built"
        );
        Ok(index)
    }

    pub(crate) fn encode_payloads(&self) -> Result<(Vec<u8>, Vec<u8>), AppError> {
        let chunks_json = encode_payload(&self.chunks, "chunks")?;
        let vectors_json = encode_payload(
            &VectorPayload {
                dims: self.manifest.dims,
                vectors: self.vectors.clone(),
                norms: self.norms.clone(),
            },
            "vectors",
        )?;
        Ok((chunks_json, vectors_json))
    }

    pub fn manifest(&self) -> &IndexManifest {
        &self.manifest
    }

    pub fn etag(&self) -> &str {
        &self.manifest.etag
    }

    pub fn dims(&self) -> usize {
        self.manifest.dims as usize
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Up to `k` chunks by descending cosine similarity; equal scores keep insertion order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredChunk>, AppError> {
        if query.len() != self.dims() {
            return Err(AppError::new(
                codes::RETRIEVAL_FAILED,
                "Query embedding dims do not match index dims",
            )
            .with_details(format!("index_dims={}; query_dims={}", self.dims(), query.len())));
        }
        if k == 0 {
            return Ok(Vec::new());
        }

        let qnorm = l2_norm(query);
        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .zip(self.norms.iter())
            .enumerate()
            .map(|(i, (v, n))| {
                let s = cosine_similarity(query, v, qnorm, *n);
                (i, if s.is_nan() { f32::NEG_INFINITY } else { s })
            })
            .collect();

        // Stable sort: ties stay in insertion order.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(i, score)| ScoredChunk {
                chunk: self.chunks[i].clone(),
                score,
            })
            .collect())
    }
}
