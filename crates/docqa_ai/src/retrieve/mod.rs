use docqa_core::error::{codes, AppError};
use docqa_core::memory::ConversationTurn;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::embeddings::Embedder;
use crate::index::{ScoredChunk, VectorIndex};
use crate::llm::Llm;

pub mod prompts;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Retrieval {
    /// Query actually embedded and searched.
    pub standalone_query: String,
    /// True when the LLM rewrite was used.
    pub rewritten: bool,
    pub hits: Vec<ScoredChunk>,
}

pub struct Retriever<'a> {
    index: &'a VectorIndex,
    embedder: &'a dyn Embedder,
}

impl<'a> Retriever<'a> {
    pub fn new(index: &'a VectorIndex, embedder: &'a dyn Embedder) -> Self {
        Self { index, embedder }
    }

    pub fn retrieve(&self, query: &str, k: usize) -> Result<Vec<ScoredChunk>, AppError> {
        let q = query.trim();
        if q.is_empty() {
            return Err(AppError::new(codes::RETRIEVAL_FAILED, "Query must not be empty"));
        }
        let qv = self.embedder.embed_query(q)?;
        let hits = self.index.search(&qv, k)?;
        debug!(k, hits = hits.len(), "retrieved");
        Ok(hits)
    }

    /// Rewrite `query` against prior turns, then retrieve.
    ///
    /// A failed or empty rewrite falls back to the original query.
    pub fn retrieve_with_history(
        &self,
        query: &str,
        history: &[ConversationTurn],
        llm: &dyn Llm,
        k: usize,
    ) -> Result<Retrieval, AppError> {
        let original = query.trim();
        if original.is_empty() {
            return Err(AppError::new(codes::RETRIEVAL_FAILED, "Query must not be empty"));
        }

        let (standalone_query, rewritten) = if history.is_empty() {
            (original.to_string(), false)
        } else {
            rewrite_query(original, history, llm)
        };

        let hits = self.retrieve(&standalone_query, k)?;
        Ok(Retrieval {
            standalone_query,
            rewritten,
            hits,
        })
    }
}

fn rewrite_query(original: &str, history: &[ConversationTurn], llm: &dyn Llm) -> (String, bool) {
    let prompt = prompts::standalone_question_prompt(history, original);
    match llm.generate(&prompt) {
        Ok(raw) => {
            let cleaned = prompts::clean_standalone(&raw);
            if cleaned.is_empty() {
                warn!("standalone rewrite was empty; using original query");
                (original.to_string(), false)
            } else {
                debug!(standalone = %cleaned, "rewrote follow-up question");
                (cleaned, true)
            }
        }
        Err(e) => {
            warn!(code = %e.code, error = %e.message, "standalone rewrite failed; using original query");
            (original.to_string(), false)
        }
    }
}
