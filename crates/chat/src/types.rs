//! Conversation types exchanged with the embedding application.

use serde::{Deserialize, Serialize};

/// One inbound user message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingMessage {
    /// Raw message text
    pub text: String,

    /// Caller IP, forwarded to persistence as-is
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
}

impl IncomingMessage {
    /// Create a message without caller metadata.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ip: None,
        }
    }

    /// Attach the caller IP.
    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }
}

/// The reply produced for one message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatOutcome {
    /// Final answer text, contact suffix included where applicable
    pub response_text: String,

    /// Conversation id, freshly generated when the caller supplied none
    pub conversation_id: String,
}
