//! Knowledge store collaborator contract.
//!
//! The retrieval engine issues similarity queries, keyword searches, and
//! document fetches against this trait; it never manages the index's
//! storage engine. Production backends live with the HTTP layer.

use crate::types::EvidenceChunk;
use charla_core::AppResult;

/// Trait for knowledge store backends.
///
/// Implementations must return search results ordered by descending
/// similarity and treat an empty `source_prefixes` slice as "no filter".
#[async_trait::async_trait]
pub trait KnowledgeStore: Send + Sync {
    /// Top-k most similar chunks to the query vector, optionally restricted
    /// to sources whose path starts with one of the given prefixes.
    async fn search_similar(
        &self,
        query: &[f32],
        top_k: usize,
        source_prefixes: &[String],
    ) -> AppResult<Vec<EvidenceChunk>>;

    /// Texts of documents whose normalized content contains any of the
    /// keywords (case-insensitive substring match), deduplicated.
    async fn find_by_keywords(
        &self,
        keywords: &[String],
        max_results: usize,
    ) -> AppResult<Vec<String>>;

    /// Chunks stored under the given file paths.
    async fn get_by_paths(&self, paths: &[String]) -> AppResult<Vec<EvidenceChunk>>;
}
