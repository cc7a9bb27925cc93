use docqa_core::error::{codes, AppError};

pub trait Embedder: Send + Sync {
    fn model_id(&self) -> &str;

    /// One vector per input text, in input order.
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AppError>;

    fn embed_query(&self, text: &str) -> Result<Vec<f32>, AppError> {
        let mut out = self.embed(&[text.to_string()])?;
        match out.pop() {
            Some(v) if out.is_empty() => Ok(v),
            _ => Err(AppError::new(
                codes::EMBEDDING_PROVIDER_FAILED,
                "Embedding provider returned an unexpected number of vectors",
            )),
        }
    }
}

pub mod ollama_embed;
pub mod openai_embed;

// Requests stay bounded. Chunking enforces reasonable sizes, but guard anyway.
pub(crate) const MAX_EMBED_INPUT_CHARS: usize = 12_000;
