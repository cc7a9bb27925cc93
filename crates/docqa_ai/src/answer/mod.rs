use std::sync::Arc;

use docqa_core::domain::QueryResult;
use docqa_core::error::{codes, AppError};
use docqa_core::memory::Conversation;
use tracing::{debug, info};

use crate::embeddings::Embedder;
use crate::index::{IndexManifest, VectorIndex};
use crate::llm::Llm;
use crate::retrieve::Retriever;

pub mod prompts;

/// Conversational answer chain bound to one index snapshot.
#[derive(Debug, Clone)]
pub struct AnswerChain {
    index: Option<Arc<VectorIndex>>,
    top_k: usize,
}

impl AnswerChain {
    /// A chain with no index attached; `answer` fails with `CHAIN_NOT_READY`.
    pub fn new(top_k: usize) -> Self {
        Self { index: None, top_k }
    }

    pub fn for_index(index: Arc<VectorIndex>, top_k: usize) -> Self {
        Self {
            index: Some(index),
            top_k,
        }
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Etag of the index this chain was built for.
    pub fn index_etag(&self) -> Option<&str> {
        self.index.as_deref().map(|i| i.etag())
    }

    pub fn index_manifest(&self) -> Option<IndexManifest> {
        self.index.as_deref().map(|i| i.manifest().clone())
    }

    pub fn is_ready(&self) -> bool {
        self.index.is_some()
    }

    /// Retrieve, prompt, generate. The exchange is appended to `conversation`
    /// only when generation succeeds.
    pub fn answer(
        &self,
        embedder: &dyn Embedder,
        llm: &dyn Llm,
        question: &str,
        conversation: &mut Conversation,
    ) -> Result<QueryResult, AppError> {
        let index = self.index.as_deref().ok_or_else(|| {
            AppError::new(codes::CHAIN_NOT_READY, "Answer chain has no index attached")
        })?;

        let retrieval = Retriever::new(index, embedder).retrieve_with_history(
            question,
            conversation.all(),
            llm,
            self.top_k,
        )?;

        let prompt = prompts::grounded_answer_prompt(&retrieval.hits, conversation.all(), &retrieval.standalone_query);
        debug!(
            hits = retrieval.hits.len(),
            rewritten = retrieval.rewritten,
            prompt_chars = prompt.chars().count(),
            "generating answer"
        );

        let answer = llm.generate(&prompt).map_err(|e| {
            let mut err = AppError::new(codes::GENERATION_FAILED, "Failed to generate an answer")
                .with_retryable(e.retryable);
            err.details = Some(match e.details {
                Some(d) => format!("{}: {}; {}", e.code, e.message, d),
                None => format!("{}: {}", e.code, e.message),
            });
            err
        })?;
        let answer = answer.trim().to_string();

        conversation.append_exchange(question.trim(), answer.clone());
        info!(sources = retrieval.hits.len(), "answered question");

        Ok(QueryResult {
            answer,
            sources: retrieval.hits.into_iter().map(|h| h.chunk.text).collect(),
            standalone_question: retrieval.standalone_query,
        })
    }
}
