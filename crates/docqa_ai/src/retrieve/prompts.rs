use docqa_core::memory::ConversationTurn;

pub(crate) const STANDALONE_MARKER: &str = "Standalone question:";

pub(crate) fn render_history(turns: &[ConversationTurn]) -> String {
    turns
        .iter()
        .map(|t| format!("{}: {}", t.role.prompt_label(), t.content.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn standalone_question_prompt(history: &[ConversationTurn], question: &str) -> String {
    let history = render_history(history);
    format!(
        r#"Given the following conversation and a follow up question, rephrase the follow up question to be a standalone question that can be understood without the conversation.
Do NOT answer the question. Return only the rephrased question; if it is already standalone, return it unchanged.

Chat History:
{history}

Follow Up Input: {question}
{STANDALONE_MARKER}"#
    )
}

/// Strip the echo of the marker and wrapping quotes some models add.
pub(crate) fn clean_standalone(raw: &str) -> String {
    let mut s = raw.trim();
    if let Some(rest) = s.strip_prefix(STANDALONE_MARKER) {
        s = rest.trim();
    }
    s.trim_matches(|c| c == '"' || c == '\'' || c == '`').trim().to_string()
}
