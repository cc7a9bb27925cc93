use serde::{Deserialize, Serialize};
use std::fmt;

/// Error codes shared by every pipeline stage. Callers match on these to pick
/// a user-facing message (e.g. "ingest first" for `INDEX_NOT_FOUND`).
pub mod codes {
    pub const UNSUPPORTED_FILE_TYPE: &str = "UNSUPPORTED_FILE_TYPE";
    pub const EMPTY_INPUT: &str = "EMPTY_INPUT";
    pub const EMBEDDING_PROVIDER_FAILED: &str = "EMBEDDING_PROVIDER_FAILED";
    pub const INDEX_NOT_FOUND: &str = "INDEX_NOT_FOUND";
    pub const CHAIN_NOT_READY: &str = "CHAIN_NOT_READY";
    pub const GENERATION_FAILED: &str = "GENERATION_FAILED";

    pub const CONFIG_INVALID: &str = "CONFIG_INVALID";
    pub const LOADER_READ_FAILED: &str = "LOADER_READ_FAILED";
    pub const LOADER_PDF_FAILED: &str = "LOADER_PDF_FAILED";
    pub const INDEX_WRITE_FAILED: &str = "INDEX_WRITE_FAILED";
    pub const RETRIEVAL_FAILED: &str = "RETRIEVAL_FAILED";
    pub const UPLOAD_INVALID: &str = "UPLOAD_INVALID";
    pub const PROVIDER_UNREACHABLE: &str = "PROVIDER_UNREACHABLE";
    pub const PROVIDER_REMOTE_NOT_ALLOWED: &str = "PROVIDER_REMOTE_NOT_ALLOWED";
    pub const CLOCK_FORMAT_FAILED: &str = "CLOCK_FORMAT_FAILED";
}

/// Single structured error shape used across the pipeline and returned at the
/// ingestion/query boundary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppError {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
    pub retryable: bool,
}

impl AppError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            retryable: false,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    pub fn is(&self, code: &str) -> bool {
        self.code == code
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}
