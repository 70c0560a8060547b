//! Configuration for the Charla chat core.
//!
//! This module handles loading and merging configuration from multiple
//! sources:
//! - Built-in defaults
//! - Config file (YAML, path from `CHARLA_CONFIG`)
//! - Environment variables (`CHARLA_*`)
//!
//! The embedding application (the HTTP layer) loads one `AppConfig` at
//! startup and hands it to the pipeline; nothing here is mutated at runtime.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the Ollama server
    pub ollama_endpoint: String,

    /// Model used for answer generation
    pub chat_model: String,

    /// Embedding provider ("ollama" in production, "mock" in tests)
    pub embedding_provider: String,

    /// Model used for query embeddings
    pub embedding_model: String,

    /// Expected embedding vector dimension
    pub embedding_dimension: usize,

    /// Bounded size of the query-embedding memoization cache
    pub embedding_cache_size: usize,

    /// Sampling temperature for generation
    pub temperature: f32,

    /// Nucleus sampling parameter for generation
    pub top_p: f32,

    /// Minimum cosine similarity for a chunk to count as evidence
    pub min_context_similarity: f32,

    /// Retrieval and prompt size budgets
    pub budgets: Budgets,

    /// Simulated "thinking" delay for the contact-acknowledgement path, in ms
    pub contact_ack_delay_ms: u64,

    /// Simulated "thinking" delay for the social short-circuit path, in ms
    pub social_delay_ms: u64,
}

/// Size budgets for retrieval and prompt assembly.
///
/// These are deliberate caps, not tuning knobs: history keeps its tail,
/// evidence context keeps its head, and both are enforced deterministically.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Budgets {
    /// Number of conversation turns rendered into the prompt
    pub max_history_turns: usize,

    /// Character budget for the rendered history (tail-truncated)
    pub max_history_chars: usize,

    /// Character budget for the evidence context (head-truncated)
    pub max_context_chars: usize,

    /// Top-k requested from the vector search collaborator
    pub search_top_k: usize,

    /// Maximum evidence chunks handed to the prompt assembler
    pub max_context_chunks: usize,

    /// Maximum candidates requested from the keyword fallback search
    pub keyword_match_chunks: usize,
}

impl Default for Budgets {
    fn default() -> Self {
        Self {
            max_history_turns: 4,
            max_history_chars: 800,
            max_context_chars: 2200,
            search_top_k: 8,
            max_context_chunks: 5,
            keyword_match_chunks: 2,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ollama_endpoint: "http://localhost:11434".to_string(),
            chat_model: "llama3".to_string(),
            embedding_provider: "ollama".to_string(),
            embedding_model: "nomic-embed-text".to_string(),
            embedding_dimension: 768,
            embedding_cache_size: 256,
            temperature: 0.0,
            top_p: 1.0,
            min_context_similarity: 0.6,
            budgets: Budgets::default(),
            contact_ack_delay_ms: 1500,
            social_delay_ms: 7000,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, an optional YAML file, and
    /// environment variables.
    ///
    /// Environment variables:
    /// - `CHARLA_CONFIG`: path to a YAML config file
    /// - `CHARLA_OLLAMA_ENDPOINT`: Ollama base URL
    /// - `CHARLA_CHAT_MODEL`: generation model
    /// - `CHARLA_EMBEDDING_PROVIDER`: embedding provider name
    /// - `CHARLA_EMBEDDING_MODEL`: embedding model
    /// - `CHARLA_MIN_SIMILARITY`: minimum context similarity
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("CHARLA_CONFIG") {
            config = Self::from_file(&PathBuf::from(path))?;
        }

        // Environment variables override file values
        if let Ok(endpoint) = std::env::var("CHARLA_OLLAMA_ENDPOINT") {
            config.ollama_endpoint = endpoint;
        }
        if let Ok(model) = std::env::var("CHARLA_CHAT_MODEL") {
            config.chat_model = model;
        }
        if let Ok(provider) = std::env::var("CHARLA_EMBEDDING_PROVIDER") {
            config.embedding_provider = provider;
        }
        if let Ok(model) = std::env::var("CHARLA_EMBEDDING_MODEL") {
            config.embedding_model = model;
        }
        if let Ok(min) = std::env::var("CHARLA_MIN_SIMILARITY") {
            config.min_context_similarity = min.parse().map_err(|_| {
                AppError::Config(format!("CHARLA_MIN_SIMILARITY is not a number: {}", min))
            })?;
        }

        config.validate()?;
        tracing::debug!(
            provider = %config.embedding_provider,
            model = %config.chat_model,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Parse a YAML config file.
    pub fn from_file(path: &PathBuf) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })
    }

    /// Validate configuration invariants.
    pub fn validate(&self) -> AppResult<()> {
        if self.embedding_dimension == 0 {
            return Err(AppError::Config(
                "embedding_dimension must be greater than zero".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.min_context_similarity) {
            return Err(AppError::Config(format!(
                "min_context_similarity must be within [0, 1], got {}",
                self.min_context_similarity
            )));
        }
        if self.budgets.max_context_chunks == 0 {
            return Err(AppError::Config(
                "budgets.max_context_chunks must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.chat_model, "llama3");
        assert_eq!(config.embedding_dimension, 768);
        assert_eq!(config.min_context_similarity, 0.6);
        assert_eq!(config.budgets.max_context_chunks, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_dimension() {
        let mut config = AppConfig::default();
        config.embedding_dimension = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range_similarity() {
        let mut config = AppConfig::default();
        config.min_context_similarity = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file_partial_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "chat_model: phi3").unwrap();
        writeln!(file, "budgets:").unwrap();
        writeln!(file, "  search_top_k: 12").unwrap();

        let config = AppConfig::from_file(&file.path().to_path_buf()).unwrap();
        assert_eq!(config.chat_model, "phi3");
        assert_eq!(config.budgets.search_top_k, 12);
        // untouched fields keep their defaults
        assert_eq!(config.embedding_dimension, 768);
        assert_eq!(config.budgets.max_history_chars, 800);
    }

    #[test]
    fn test_from_file_missing_path() {
        let result = AppConfig::from_file(&PathBuf::from("/nonexistent/charla.yaml"));
        assert!(result.is_err());
    }
}
