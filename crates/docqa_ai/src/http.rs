use std::time::Duration;

use docqa_core::config::ProviderConfig;
use docqa_core::error::AppError;
use serde::de::DeserializeOwned;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub connect: Duration,
    pub embed: Duration,
    pub generate: Duration,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(2),
            embed: Duration::from_secs(30),
            generate: Duration::from_secs(120),
        }
    }
}

impl HttpTimeouts {
    pub fn from_config(cfg: &ProviderConfig) -> Self {
        Self {
            connect: Duration::from_millis(cfg.connect_timeout_ms),
            embed: Duration::from_millis(cfg.embed_timeout_ms),
            generate: Duration::from_millis(cfg.generate_timeout_ms),
        }
    }
}

pub(crate) fn build_agent(timeouts: &HttpTimeouts) -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout_connect(timeouts.connect)
        .build()
}

/// POST a JSON body and decode a JSON reply. Every failure maps to `code`.
pub(crate) fn post_json<T: DeserializeOwned>(
    agent: &ureq::Agent,
    url: &str,
    bearer: Option<&str>,
    body: serde_json::Value,
    timeout: Duration,
    code: &str,
    what: &str,
) -> Result<T, AppError> {
    let mut req = agent.post(url).timeout(timeout);
    if let Some(token) = bearer {
        req = req.set("Authorization", &format!("Bearer {token}"));
    }

    match req.send_json(body) {
        Ok(resp) => resp.into_json::<T>().map_err(|e| {
            AppError::new(code, format!("Failed to decode {what} response")).with_details(e.to_string())
        }),
        Err(ureq::Error::Status(status, resp)) => {
            let body = resp.into_string().unwrap_or_default();
            Err(AppError::new(code, format!("{what} request failed"))
                .with_details(format!("status={status}; body={}", truncate_chars(&body, 500)))
                .with_retryable(status == 429 || status >= 500))
        }
        Err(e) => Err(AppError::new(code, format!("Failed to call {what} endpoint"))
            .with_details(e.to_string())
            .with_retryable(true)),
    }
}

pub(crate) fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}
