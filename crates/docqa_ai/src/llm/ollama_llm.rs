use docqa_core::error::{codes, AppError};
use serde::{Deserialize, Serialize};

use super::Llm;
use crate::http::post_json;
use crate::ollama::OllamaClient;

#[derive(Debug, Clone)]
pub struct OllamaLlm {
    client: OllamaClient,
    model: String,
    temperature: f32,
}

impl OllamaLlm {
    pub fn new(client: OllamaClient, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            client,
            model: model.into(),
            temperature,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Debug, Clone, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Clone, Deserialize)]
struct GenerateResponse {
    response: String,
}

impl Llm for OllamaLlm {
    fn model_id(&self) -> &str {
        &self.model
    }

    fn generate(&self, prompt: &str) -> Result<String, AppError> {
        let url = format!("{}/api/generate", self.client.base_url());
        let req = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: self.temperature,
            },
        };
        let body = serde_json::to_value(req).map_err(|e| {
            AppError::new(codes::GENERATION_FAILED, "Failed to encode generate request")
                .with_details(e.to_string())
        })?;
        let v: GenerateResponse = post_json(
            self.client.agent(),
            &url,
            None,
            body,
            self.client.timeouts().generate,
            codes::GENERATION_FAILED,
            "generate",
        )?;
        if v.response.trim().is_empty() {
            return Err(AppError::new(codes::GENERATION_FAILED, "Generate response was empty"));
        }
        Ok(v.response)
    }
}
