use docqa_core::error::{codes, AppError};
use serde::{Deserialize, Serialize};

use super::{Embedder, MAX_EMBED_INPUT_CHARS};
use crate::http::{post_json, truncate_chars};
use crate::ollama::OllamaClient;

#[derive(Debug, Clone)]
pub struct OllamaEmbedder {
    client: OllamaClient,
    model: String,
}

impl OllamaEmbedder {
    pub fn new(client: OllamaClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
struct EmbeddingsResponse {
    embedding: Vec<f32>,
}

impl Embedder for OllamaEmbedder {
    fn model_id(&self) -> &str {
        &self.model
    }

    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AppError> {
        let url = format!("{}/api/embeddings", self.client.base_url());
        let mut out = Vec::with_capacity(texts.len());
        for input in texts {
            let req = EmbeddingsRequest {
                model: &self.model,
                prompt: truncate_chars(input, MAX_EMBED_INPUT_CHARS),
            };
            let body = serde_json::to_value(req).map_err(|e| {
                AppError::new(codes::EMBEDDING_PROVIDER_FAILED, "Failed to encode embeddings request")
                    .with_details(e.to_string())
            })?;
            let v: EmbeddingsResponse = post_json(
                self.client.agent(),
                &url,
                None,
                body,
                self.client.timeouts().embed,
                codes::EMBEDDING_PROVIDER_FAILED,
                "embeddings",
            )?;
            if v.embedding.is_empty() {
                return Err(AppError::new(
                    codes::EMBEDDING_PROVIDER_FAILED,
                    "Embeddings response was empty",
                ));
            }
            out.push(v.embedding);
        }
        Ok(out)
    }
}
