//! History and persistence collaborator contracts.
//!
//! The orchestrator reads recent turns through [`HistoryStore`] and writes
//! finished exchanges through [`ConversationSink`]. Writes are
//! fire-and-forget from the pipeline's perspective: failures are logged and
//! discarded because the user-visible answer is already determined by the
//! time persistence runs. The production store lives with the HTTP layer,
//! which also runs its idempotent schema setup at service startup.

use charla_core::AppResult;
use charla_prompt::{ConversationTurn, Role};
use std::collections::HashMap;
use std::sync::Mutex;

/// Read access to conversation history.
#[async_trait::async_trait]
pub trait HistoryStore: Send + Sync {
    /// The most recent `limit` turns of a conversation, oldest first.
    async fn recent_turns(
        &self,
        conversation_id: &str,
        limit: usize,
    ) -> AppResult<Vec<ConversationTurn>>;
}

/// Write access for finished turns.
#[async_trait::async_trait]
pub trait ConversationSink: Send + Sync {
    /// Persist one turn of a conversation.
    async fn save_turn(
        &self,
        conversation_id: &str,
        role: Role,
        content: &str,
        ip: Option<&str>,
    ) -> AppResult<()>;
}

/// In-memory conversation store for tests and single-process deployments.
///
/// Stores turns per conversation id; the caller IP is accepted per the
/// contract but not retained.
#[derive(Debug, Default)]
pub struct MemoryConversationStore {
    turns: Mutex<HashMap<String, Vec<ConversationTurn>>>,
}

impl MemoryConversationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// All turns saved for a conversation, oldest first.
    pub fn turns_for(&self, conversation_id: &str) -> Vec<ConversationTurn> {
        self.turns
            .lock()
            .expect("store lock")
            .get(conversation_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl HistoryStore for MemoryConversationStore {
    async fn recent_turns(
        &self,
        conversation_id: &str,
        limit: usize,
    ) -> AppResult<Vec<ConversationTurn>> {
        let turns = self.turns_for(conversation_id);
        let start = turns.len().saturating_sub(limit);
        Ok(turns[start..].to_vec())
    }
}

#[async_trait::async_trait]
impl ConversationSink for MemoryConversationStore {
    async fn save_turn(
        &self,
        conversation_id: &str,
        role: Role,
        content: &str,
        _ip: Option<&str>,
    ) -> AppResult<()> {
        self.turns
            .lock()
            .expect("store lock")
            .entry(conversation_id.to_string())
            .or_default()
            .push(ConversationTurn::new(role, content));
        Ok(())
    }
}
