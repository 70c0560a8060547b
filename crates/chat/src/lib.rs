//! Conversation orchestration for the Charla chat core.
//!
//! Per inbound message, this crate classifies intent (contact share, social
//! courtesy, or a real question), short-circuits the cheap paths with canned
//! replies, and otherwise drives retrieval, prompt assembly, and generation.
//! It is a library: the HTTP layer constructs a [`ChatPipeline`] at startup
//! and calls [`ChatPipeline::handle`] per request.
//!
//! # Example
//! ```no_run
//! use charla_chat::{ChatPipeline, IncomingMessage, MemoryConversationStore};
//! use charla_core::AppConfig;
//! use charla_llm::create_client;
//! use charla_retrieval::{
//!     create_provider, ContextRetrievalEngine, EmbeddingEngine, MemoryStore, RetrievalConfig,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load()?;
//! let llm = create_client("ollama", Some(&config.ollama_endpoint))?;
//! let embeddings = EmbeddingEngine::new(create_provider(&config)?, config.embedding_cache_size);
//! let store = Arc::new(MemoryStore::new());
//! let engine = ContextRetrievalEngine::new(embeddings, store, RetrievalConfig::from_app(&config));
//! let conversations = Arc::new(MemoryConversationStore::new());
//!
//! let pipeline = ChatPipeline::new(
//!     config,
//!     llm,
//!     engine,
//!     conversations.clone(),
//!     conversations,
//! );
//! let outcome = pipeline.handle(&IncomingMessage::new("Hola"), None).await?;
//! println!("{}", outcome.response_text);
//! # Ok(())
//! # }
//! ```

pub mod classifier;
pub mod orchestrator;
pub mod responses;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use classifier::{classify, looks_like_contact, Intent, SocialReply};
pub use orchestrator::ChatPipeline;
pub use responses::{append_contact_prompt, CONTACT_ACK, CONTACT_PROMPT, FALLBACK_RESPONSE};
pub use store::{ConversationSink, HistoryStore, MemoryConversationStore};
pub use types::{ChatOutcome, IncomingMessage};
