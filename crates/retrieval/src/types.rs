//! Retrieval type definitions.

use charla_core::AppConfig;
use serde::{Deserialize, Serialize};

/// A knowledge snippet returned by the vector search collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceChunk {
    /// Text content
    pub text: String,

    /// Relative source path (e.g., "cursos/overview_cursos.md")
    pub source: String,

    /// Similarity to the query, `max(0, 1 - cosine_distance)`
    pub similarity: f32,
}

/// Settings for one retrieval engine instance.
#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    /// Minimum similarity for a chunk to count as evidence
    pub min_similarity: f32,

    /// Top-k requested from the vector search collaborator
    pub search_top_k: usize,

    /// Maximum chunks assembled into the evidence context
    pub max_context_chunks: usize,

    /// Maximum candidates requested from the keyword fallback search
    pub keyword_match_chunks: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            min_similarity: 0.6,
            search_top_k: 8,
            max_context_chunks: 5,
            keyword_match_chunks: 2,
        }
    }
}

impl RetrievalConfig {
    /// Derive retrieval settings from the application configuration.
    pub fn from_app(config: &AppConfig) -> Self {
        Self {
            min_similarity: config.min_context_similarity,
            search_top_k: config.budgets.search_top_k,
            max_context_chunks: config.budgets.max_context_chunks,
            keyword_match_chunks: config.budgets.keyword_match_chunks,
        }
    }
}

/// Chunk counters carried for logging and debugging.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RetrievalCounts {
    /// Chunks that survived similarity-threshold filtering
    pub similar: usize,

    /// Chunks contributed by the keyword fallback search
    pub keyword: usize,

    /// Chunks assembled into the final context
    pub used: usize,
}

/// The outcome of one retrieval call.
///
/// Owned exclusively by that call; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalResult {
    /// Evidence texts in final order: forced overview first (when present),
    /// then ranked similarity chunks, then validated keyword chunks
    pub context_chunks: Vec<String>,

    /// Source-prefix filters applied to the similarity search
    pub source_filters: Vec<String>,

    /// Highest similarity among threshold survivors (0.0 when none)
    pub best_similarity: f32,

    /// Chunk counters for observability
    pub counts: RetrievalCounts,
}

impl RetrievalResult {
    /// Whether any evidence was assembled.
    pub fn is_empty(&self) -> bool {
        self.context_chunks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retrieval_result_is_empty() {
        let result = RetrievalResult {
            context_chunks: Vec::new(),
            source_filters: Vec::new(),
            best_similarity: 0.0,
            counts: RetrievalCounts::default(),
        };
        assert!(result.is_empty());
    }

    #[test]
    fn test_default_config_matches_production_budgets() {
        let config = RetrievalConfig::default();
        assert_eq!(config.min_similarity, 0.6);
        assert_eq!(config.search_top_k, 8);
        assert_eq!(config.max_context_chunks, 5);
        assert_eq!(config.keyword_match_chunks, 2);
    }
}
