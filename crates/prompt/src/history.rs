//! Conversation history rendering and truncation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder rendered when the conversation has no prior turns.
pub const NO_HISTORY_PLACEHOLDER: &str = "(no previous messages)";

/// Who produced a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Spanish label used when rendering history into the prompt.
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "Usuario",
            Role::Assistant => "Asistente",
        }
    }
}

/// One turn of a conversation, as read from the history store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl ConversationTurn {
    /// Convenience constructor stamping the current time.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// Keep at most the first `limit` characters of a text.
pub fn truncate_head(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    text.chars().take(limit).collect()
}

/// Keep at most the last `limit` characters of a text.
pub fn truncate_tail(text: &str, limit: usize) -> String {
    let count = text.chars().count();
    if count <= limit {
        return text.to_string();
    }
    text.chars().skip(count - limit).collect()
}

/// Render conversation history for the prompt.
///
/// Takes the last `max_turns` turns (oldest first), renders each as
/// `Usuario: …` / `Asistente: …`, then tail-truncates to `max_chars` so the
/// most recent exchange survives even when earlier ones are cut. Also
/// returns the content of the most recent assistant turn anywhere in the
/// history, which drives the anti-repetition block.
pub fn format_history(
    history: &[ConversationTurn],
    max_turns: usize,
    max_chars: usize,
) -> (String, Option<String>) {
    let start = history.len().saturating_sub(max_turns);
    let lines: Vec<String> = history[start..]
        .iter()
        .map(|turn| format!("{}: {}", turn.role.label(), turn.content.trim()))
        .collect();

    let last_assistant_reply = history
        .iter()
        .rev()
        .find(|turn| turn.role == Role::Assistant)
        .map(|turn| turn.content.clone());

    let history_text = if lines.is_empty() {
        NO_HISTORY_PLACEHOLDER.to_string()
    } else {
        lines.join("\n")
    };

    (truncate_tail(&history_text, max_chars), last_assistant_reply)
}
