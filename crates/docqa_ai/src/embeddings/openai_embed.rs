use docqa_core::error::{codes, AppError};
use serde::{Deserialize, Serialize};

use super::{Embedder, MAX_EMBED_INPUT_CHARS};
use crate::http::{post_json, truncate_chars};
use crate::openai::OpenAiClient;

#[derive(Debug, Clone)]
pub struct OpenAiEmbedder {
    client: OpenAiClient,
    model: String,
}

impl OpenAiEmbedder {
    pub fn new(client: OpenAiClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Debug, Clone, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Clone, Deserialize)]
struct EmbeddingItem {
    index: usize,
    embedding: Vec<f32>,
}

impl Embedder for OpenAiEmbedder {
    fn model_id(&self) -> &str {
        &self.model
    }

    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AppError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let req = EmbeddingsRequest {
            model: &self.model,
            input: texts
                .iter()
                .map(|t| truncate_chars(t, MAX_EMBED_INPUT_CHARS))
                .collect(),
        };
        let body = serde_json::to_value(req).map_err(|e| {
            AppError::new(codes::EMBEDDING_PROVIDER_FAILED, "Failed to encode embeddings request")
                .with_details(e.to_string())
        })?;
        let mut resp: EmbeddingsResponse = post_json(
            self.client.agent(),
            &self.client.endpoint("embeddings"),
            Some(self.client.api_key()),
            body,
            self.client.timeouts().embed,
            codes::EMBEDDING_PROVIDER_FAILED,
            "embeddings",
        )?;

        if resp.data.len() != texts.len() {
            return Err(AppError::new(
                codes::EMBEDDING_PROVIDER_FAILED,
                "Embeddings response count did not match request",
            )
            .with_details(format!("expected={}; got={}", texts.len(), resp.data.len())));
        }
        resp.data.sort_by_key(|item| item.index);
        if resp.data.iter().any(|item| item.embedding.is_empty()) {
            return Err(AppError::new(
                codes::EMBEDDING_PROVIDER_FAILED,
                "Embeddings response was empty",
            ));
        }
        Ok(resp.data.into_iter().map(|item| item.embedding).collect())
    }
}
