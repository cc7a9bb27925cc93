#![allow(dead_code)]

use std::sync::Mutex;

use docqa_ai::embeddings::Embedder;
use docqa_ai::llm::Llm;
use docqa_core::domain::Chunk;
use docqa_core::error::{codes, AppError};

pub const VOCAB: [&str; 8] = ["sky", "blue", "grass", "green", "autumn", "leaves", "orange", "spring"];

/// One dimension per vocabulary word, valued by occurrence count.
pub struct KeywordEmbedder;

impl Embedder for KeywordEmbedder {
    fn model_id(&self) -> &str {
        "keyword-test"
    }

    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AppError> {
        Ok(texts.iter().map(|t| keyword_vector(t)).collect())
    }
}

pub fn keyword_vector(text: &str) -> Vec<f32> {
    let lower = text.to_lowercase();
    let words = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>();
    VOCAB
        .iter()
        .map(|v| words.iter().filter(|w| *w == v).count() as f32)
        .collect()
}

/// Returns fixed vectors in order, regardless of input.
pub struct FixedEmbedder(pub Vec<Vec<f32>>);

impl Embedder for FixedEmbedder {
    fn model_id(&self) -> &str {
        "fixed-test"
    }

    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AppError> {
        Ok(self.0.iter().take(texts.len()).cloned().collect())
    }
}

pub struct FailingEmbedder;

impl Embedder for FailingEmbedder {
    fn model_id(&self) -> &str {
        "failing-test"
    }

    fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, AppError> {
        Err(AppError::new(codes::EMBEDDING_PROVIDER_FAILED, "provider down").with_retryable(true))
    }
}

pub enum Rewrite {
    Echo,
    Fixed(String),
    Fail,
}

/// Answers with the first context passage; rewrites follow-ups per `rewrite`.
pub struct ScriptedLlm {
    pub rewrite: Rewrite,
    pub fail_answer: bool,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    pub fn new() -> Self {
        Self {
            rewrite: Rewrite::Echo,
            fail_answer: false,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_rewrite(rewrite: Rewrite) -> Self {
        Self {
            rewrite,
            ..Self::new()
        }
    }

    pub fn failing_answers() -> Self {
        Self {
            fail_answer: true,
            ..Self::new()
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl Llm for ScriptedLlm {
    fn model_id(&self) -> &str {
        "scripted-test"
    }

    fn generate(&self, prompt: &str) -> Result<String, AppError> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        if prompt.trim_end().ends_with("Standalone question:") {
            return match &self.rewrite {
                Rewrite::Echo => {
                    let q = prompt
                        .lines()
                        .find_map(|l| l.strip_prefix("Follow Up Input: "))
                        .unwrap_or("");
                    Ok(q.to_string())
                }
                Rewrite::Fixed(s) => Ok(s.clone()),
                Rewrite::Fail => Err(AppError::new(codes::GENERATION_FAILED, "rewrite unavailable")),
            };
        }

        if self.fail_answer {
            return Err(AppError::new("UPSTREAM_TIMEOUT", "model timed out")
                .with_details("elapsed=120s")
                .with_retryable(true));
        }
        Ok(first_passage(prompt).unwrap_or_else(|| "I don't know.".to_string()))
    }
}

fn first_passage(prompt: &str) -> Option<String> {
    let start = prompt.find("[1] (source:")?;
    prompt[start..].lines().nth(1).map(|l| l.trim().to_string())
}

pub fn chunk(text: &str, source_id: &str, sequence_index: u32) -> Chunk {
    Chunk {
        text: text.to_string(),
        source_id: source_id.to_string(),
        sequence_index,
    }
}
