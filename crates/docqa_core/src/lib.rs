pub mod chunking;
pub mod config;
pub mod domain;
pub mod error;
pub mod ingest;
pub mod memory;
pub mod normalize;
pub mod workspace;

#[cfg(test)]
mod tests {
    use super::error::{codes, AppError};

    #[test]
    fn app_error_is_structured() {
        let err = AppError::new(codes::INDEX_NOT_FOUND, "no index").with_retryable(false);
        assert_eq!(err.code, "INDEX_NOT_FOUND");
        assert_eq!(err.message, "no index");
        assert!(!err.retryable);
        assert!(err.is(codes::INDEX_NOT_FOUND));
        assert_eq!(err.to_string(), "[INDEX_NOT_FOUND] no index");

        let clock = AppError::new(codes::CLOCK_FORMAT_FAILED, "Failed to format time");
        assert_eq!(clock.code, "CLOCK_FORMAT_FAILED");
    }
}
