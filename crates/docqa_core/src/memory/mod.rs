use serde::{Deserialize, Serialize};

pub const EMPTY_HISTORY_MESSAGE: &str = "No conversation history yet.";
pub const DEFAULT_PREVIEW_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Human,
    Assistant,
}

impl Role {
    /// Label shown to the user in history summaries.
    pub fn label(&self) -> &'static str {
        match self {
            Role::Human => "Me",
            Role::Assistant => "Documents",
        }
    }

    /// Label used when turns are rendered into model prompts.
    pub fn prompt_label(&self) -> &'static str {
        match self {
            Role::Human => "Human",
            Role::Assistant => "Assistant",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

/// Append-only, in-process record of one session's turns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    turns: Vec<ConversationTurn>,
    preview_chars: usize,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new(DEFAULT_PREVIEW_CHARS)
    }
}

impl Conversation {
    pub fn new(preview_chars: usize) -> Self {
        Self {
            turns: Vec::new(),
            preview_chars: preview_chars.max(1),
        }
    }

    pub fn append(&mut self, role: Role, content: impl Into<String>) {
        self.turns.push(ConversationTurn {
            role,
            content: content.into(),
        });
    }

    /// Record a completed question/answer pair.
    pub fn append_exchange(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.turns.reserve(2);
        self.append(Role::Human, question);
        self.append(Role::Assistant, answer);
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn all(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// One numbered line per turn: `"{n}. {label}: {preview}"`.
    pub fn summarize(&self) -> String {
        if self.turns.is_empty() {
            return EMPTY_HISTORY_MESSAGE.to_string();
        }
        self.turns
            .iter()
            .enumerate()
            .map(|(i, t)| format!("{}. {}: {}", i + 1, t.role.label(), preview(&t.content, self.preview_chars)))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn preview(content: &str, max_chars: usize) -> String {
    let t = content.trim();
    if t.chars().count() <= max_chars {
        return t.to_string();
    }
    let mut s: String = t.chars().take(max_chars).collect();
    s.push_str("...");
    s
}
