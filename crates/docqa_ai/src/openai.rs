use docqa_core::error::{codes, AppError};

use crate::http::{build_agent, HttpTimeouts};

/// Client for an OpenAI-compatible API (`/v1/embeddings`, `/v1/chat/completions`).
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    timeouts: HttpTimeouts,
    agent: ureq::Agent,
}

impl OpenAiClient {
    pub fn new(base_url: &str, api_key: &str, timeouts: HttpTimeouts) -> Result<Self, AppError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
            return Err(AppError::new(codes::CONFIG_INVALID, "OpenAI base URL must be http(s)")
                .with_details(format!("base_url={base_url}")));
        }
        if api_key.trim().is_empty() {
            return Err(AppError::new(codes::CONFIG_INVALID, "OpenAI API key is missing"));
        }
        Ok(Self {
            agent: build_agent(&timeouts),
            base_url,
            api_key: api_key.trim().to_string(),
            timeouts,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/v1/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub(crate) fn api_key(&self) -> &str {
        &self.api_key
    }

    pub(crate) fn agent(&self) -> &ureq::Agent {
        &self.agent
    }

    pub(crate) fn timeouts(&self) -> &HttpTimeouts {
        &self.timeouts
    }

    pub fn health_check(&self) -> Result<(), AppError> {
        let url = self.endpoint("models");
        let resp = self
            .agent
            .get(&url)
            .timeout(self.timeouts.connect)
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .call();
        match resp {
            Ok(_) => Ok(()),
            Err(ureq::Error::Status(status, _)) => Err(
                AppError::new(codes::PROVIDER_UNREACHABLE, "OpenAI health check failed")
                    .with_details(format!("status={status}"))
                    .with_retryable(status == 429 || status >= 500),
            ),
            Err(e) => Err(AppError::new(codes::PROVIDER_UNREACHABLE, "Failed to reach OpenAI endpoint")
                .with_details(e.to_string())
                .with_retryable(true)),
        }
    }
}
