use docqa_core::memory::ConversationTurn;

use crate::index::ScoredChunk;
use crate::retrieve::prompts::render_history;

pub(crate) fn context_blocks(hits: &[ScoredChunk]) -> String {
    hits.iter()
        .enumerate()
        .map(|(i, h)| format!("[{}] (source: {})\n{}", i + 1, h.chunk.source_id, h.chunk.text.trim()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn grounded_answer_prompt(hits: &[ScoredChunk], history: &[ConversationTurn], question: &str) -> String {
    // Contract:
    // - answer from the context only
    // - say "I don't know" rather than guess
    let context = if hits.is_empty() {
        "(no matching passages)".to_string()
    } else {
        context_blocks(hits)
    };
    let history = if history.is_empty() {
        "(none)".to_string()
    } else {
        render_history(history)
    };
    format!(
        r#"Use the following pieces of context to answer the question at the end.
Answer ONLY from the context. If the context does not contain the answer, just say that you don't know; do not try to make up an answer.

Context:
{context}

Conversation so far:
{history}

Question: {question}
Helpful Answer:"#
    )
}
