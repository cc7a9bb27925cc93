use std::sync::Arc;

use docqa_core::config::{ProviderConfig, ProviderKind};
use docqa_core::error::{codes, AppError};
use tracing::info;

use crate::embeddings::ollama_embed::OllamaEmbedder;
use crate::embeddings::openai_embed::OpenAiEmbedder;
use crate::embeddings::Embedder;
use crate::http::HttpTimeouts;
use crate::llm::ollama_llm::OllamaLlm;
use crate::llm::openai_llm::OpenAiLlm;
use crate::llm::Llm;
use crate::ollama::OllamaClient;
use crate::openai::OpenAiClient;

/// The embedding and language model pair a session talks to.
#[derive(Clone)]
pub struct Providers {
    pub embedder: Arc<dyn Embedder>,
    pub llm: Arc<dyn Llm>,
}

pub fn build_providers(cfg: &ProviderConfig) -> Result<Providers, AppError> {
    build_providers_with_env(cfg, |k: &str| std::env::var(k).ok())
}

pub fn build_providers_with_env<F>(cfg: &ProviderConfig, lookup: F) -> Result<Providers, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    let timeouts = HttpTimeouts::from_config(cfg);
    let providers = match cfg.kind {
        ProviderKind::Ollama => {
            let client = OllamaClient::with_timeouts(&cfg.base_url, timeouts)?;
            Providers {
                embedder: Arc::new(OllamaEmbedder::new(client.clone(), cfg.embedding_model.clone())),
                llm: Arc::new(OllamaLlm::new(client, cfg.chat_model.clone(), cfg.temperature)),
            }
        }
        ProviderKind::OpenAi => {
            let client = openai_client(cfg, timeouts, &lookup)?;
            Providers {
                embedder: Arc::new(OpenAiEmbedder::new(client.clone(), cfg.embedding_model.clone())),
                llm: Arc::new(OpenAiLlm::new(client, cfg.chat_model.clone(), cfg.temperature)),
            }
        }
    };
    info!(
        provider = ?cfg.kind,
        embedding_model = %cfg.embedding_model,
        chat_model = %cfg.chat_model,
        "providers ready"
    );
    Ok(providers)
}

fn openai_client<F>(cfg: &ProviderConfig, timeouts: HttpTimeouts, lookup: &F) -> Result<OpenAiClient, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    let key = lookup(&cfg.api_key_env).unwrap_or_default();
    if key.trim().is_empty() {
        return Err(AppError::new(codes::CONFIG_INVALID, "OpenAI API key is missing")
            .with_details(format!("env={}", cfg.api_key_env)));
    }
    OpenAiClient::new(&cfg.base_url, &key, timeouts)
}

/// Probe the configured provider and describe it on success.
pub fn health_check(cfg: &ProviderConfig) -> Result<String, AppError> {
    let timeouts = HttpTimeouts::from_config(cfg);
    match cfg.kind {
        ProviderKind::Ollama => {
            let client = OllamaClient::with_timeouts(&cfg.base_url, timeouts)?;
            client.health_check()?;
            Ok(format!("ollama reachable at {}", client.base_url()))
        }
        ProviderKind::OpenAi => {
            let client = openai_client(cfg, timeouts, &|k: &str| std::env::var(k).ok())?;
            client.health_check()?;
            Ok(format!("openai reachable at {}", client.base_url()))
        }
    }
}
