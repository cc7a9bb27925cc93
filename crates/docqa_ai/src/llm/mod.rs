use docqa_core::error::AppError;

pub trait Llm: Send + Sync {
    fn model_id(&self) -> &str;
    fn generate(&self, prompt: &str) -> Result<String, AppError>;
}

pub mod ollama_llm;
pub mod openai_llm;
