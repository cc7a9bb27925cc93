use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Raw text extracted from one uploaded file, before chunking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawDocument {
    /// File name of the originating file.
    pub source_id: String,
    pub text: String,
}

/// Unit of retrieval.
///
/// Notes:
/// - `text` is at most `chunk_size` characters, except possibly the final chunk of a source.
/// - Consecutive chunks of the same source share exactly `chunk_overlap` characters.
/// - Chunks are never mutated once produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    pub text: String,
    pub source_id: String,
    pub sequence_index: u32,
}

/// Output of one answered question. Transient; never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryResult {
    pub answer: String,
    /// Retrieved chunk texts in retrieval order.
    pub sources: Vec<String>,
    /// The query actually searched (rewritten when history was available).
    pub standalone_question: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngestSummary {
    pub message: String,
    pub files_ingested: u32,
    pub chunks_indexed: u32,
    pub index_etag: String,
}

/// Response handed back to the calling layer. Transport mapping is the caller's job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum QueryResponse {
    Answer { answer: String, sources: Vec<String> },
    Error { error: String, code: String },
}

impl QueryResponse {
    pub fn answer(answer: impl Into<String>) -> Self {
        QueryResponse::Answer {
            answer: answer.into(),
            sources: Vec::new(),
        }
    }

    pub fn from_result(result: QueryResult) -> Self {
        QueryResponse::Answer {
            answer: result.answer,
            sources: result.sources,
        }
    }

    pub fn from_error(err: &AppError) -> Self {
        QueryResponse::Error {
            error: err.message.clone(),
            code: err.code.clone(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, QueryResponse::Error { .. })
    }
}
