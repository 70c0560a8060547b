//! Prompt assembly for the Charla chat core.
//!
//! This crate renders conversation history and assembles the grounded
//! generation prompt:
//! - Bounded history rendering (tail-truncated, most recent kept)
//! - Anti-repetition block built from the last assistant reply
//! - Fixed-order section assembly with Handlebars templates

pub mod builder;
pub mod history;

// Re-export main types
pub use builder::{
    build_previous_answer_block, build_prompt, COURSE_RESPONSE_GUIDELINES, SYSTEM_INSTRUCTIONS,
};
pub use history::{
    format_history, truncate_head, truncate_tail, ConversationTurn, Role, NO_HISTORY_PLACEHOLDER,
};
