use docqa_core::error::{codes, AppError};

use crate::http::{build_agent, HttpTimeouts};

#[derive(Debug, Clone)]
pub struct OllamaClient {
    base_url: String,
    timeouts: HttpTimeouts,
    agent: ureq::Agent,
}

impl OllamaClient {
    /// Create a client for Ollama. This is strictly limited to `127.0.0.1`.
    pub fn new(base_url: &str) -> Result<Self, AppError> {
        Self::with_timeouts(base_url, HttpTimeouts::default())
    }

    pub fn with_timeouts(base_url: &str, timeouts: HttpTimeouts) -> Result<Self, AppError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        validate_local_base_url(&base_url)?;
        Ok(Self {
            agent: build_agent(&timeouts),
            base_url,
            timeouts,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn agent(&self) -> &ureq::Agent {
        &self.agent
    }

    pub(crate) fn timeouts(&self) -> &HttpTimeouts {
        &self.timeouts
    }

    pub fn health_check(&self) -> Result<(), AppError> {
        let url = format!("{}/api/tags", self.base_url);
        match self.agent.get(&url).timeout(self.timeouts.connect).call() {
            Ok(_) => Ok(()),
            Err(ureq::Error::Status(status, _)) => Err(
                AppError::new(codes::PROVIDER_UNREACHABLE, "Ollama health check failed")
                    .with_details(format!("status={status}")),
            ),
            Err(e) => Err(AppError::new(codes::PROVIDER_UNREACHABLE, "Failed to reach Ollama on 127.0.0.1")
                .with_details(e.to_string())
                .with_retryable(true)),
        }
    }
}

/// Accept only `http://127.0.0.1` with an optional explicit port in 1..=65535.
fn validate_local_base_url(base_url: &str) -> Result<(), AppError> {
    let rejected = || {
        AppError::new(codes::PROVIDER_REMOTE_NOT_ALLOWED, "Ollama base URL must be localhost (127.0.0.1)")
            .with_details(format!("base_url={base_url}"))
    };

    let rest = base_url.strip_prefix("http://127.0.0.1").ok_or_else(rejected)?;
    if rest.is_empty() {
        return Ok(());
    }
    let port = rest.strip_prefix(':').ok_or_else(rejected)?;
    if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
        return Err(rejected());
    }
    match port.parse::<u32>() {
        Ok(p) if (1..=65_535).contains(&p) => Ok(()),
        _ => Err(rejected()),
    }
}
