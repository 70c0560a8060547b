//! Context retrieval orchestration.
//!
//! Runs the hybrid retrieval flow for one message: embed the query, narrow
//! the similarity search by inferred source filters, threshold and rank the
//! results, optionally force-include the course overview document, then top
//! up from the keyword fallback search with similarity re-validation.

use crate::embeddings::{dot_product, EmbeddingEngine};
use crate::intent;
use crate::ranking::select_context_chunks;
use crate::store::KnowledgeStore;
use crate::types::{RetrievalConfig, RetrievalCounts, RetrievalResult};
use charla_core::text::normalize;
use charla_core::AppResult;
use std::collections::HashSet;
use std::sync::Arc;

/// Document fetched by path and prepended when the message asks about courses.
const COURSE_OVERVIEW_FILE: &str = "overview_cursos.md";

/// Hybrid retrieval over one knowledge store.
pub struct ContextRetrievalEngine {
    embeddings: EmbeddingEngine,
    store: Arc<dyn KnowledgeStore>,
    config: RetrievalConfig,
}

impl ContextRetrievalEngine {
    /// Create an engine over the given embedding engine and knowledge store.
    pub fn new(
        embeddings: EmbeddingEngine,
        store: Arc<dyn KnowledgeStore>,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            embeddings,
            store,
            config,
        }
    }

    /// Retrieve evidence context for a user message.
    ///
    /// Fails only when the embedding collaborator or the knowledge store
    /// fails; an empty result is a valid outcome the caller must handle.
    ///
    /// The narrowed search result is accepted even when a source filter
    /// yields nothing; there is no unfiltered re-query.
    pub async fn retrieve(
        &self,
        message: &str,
        keywords: &[String],
        normalized_message: &str,
        course_intent: bool,
    ) -> AppResult<RetrievalResult> {
        let query_embedding = self.embeddings.embed_query(message).await?;

        let source_filters = intent::infer_source_filters(normalized_message);
        let similar = self
            .store
            .search_similar(&query_embedding, self.config.search_top_k, &source_filters)
            .await?;

        let valid: Vec<_> = similar
            .into_iter()
            .filter(|chunk| chunk.similarity >= self.config.min_similarity)
            .collect();
        let best_similarity = valid.iter().map(|c| c.similarity).fold(0.0, f32::max);
        let similar_count = valid.len();

        let selected = select_context_chunks(&valid, self.config.max_context_chunks);

        let mut context_chunks: Vec<String> = Vec::new();
        let mut seen_texts: HashSet<String> = HashSet::new();

        if course_intent {
            self.prepend_course_overview(&mut context_chunks, &mut seen_texts)
                .await;
        }

        for chunk in selected {
            if context_chunks.len() >= self.config.max_context_chunks {
                break;
            }
            let normalized_chunk = normalize(&chunk.text);
            if normalized_chunk.is_empty() || seen_texts.contains(&normalized_chunk) {
                continue;
            }
            seen_texts.insert(normalized_chunk);
            context_chunks.push(chunk.text);
        }

        let keyword_chunks = self
            .validate_keyword_chunks(&query_embedding, keywords, &mut seen_texts)
            .await?;
        let keyword_count = keyword_chunks.len();
        for keyword_chunk in keyword_chunks {
            if context_chunks.len() >= self.config.max_context_chunks {
                break;
            }
            context_chunks.push(keyword_chunk);
        }

        tracing::debug!(
            filters = ?source_filters,
            similar = similar_count,
            keyword = keyword_count,
            used = context_chunks.len(),
            best_similarity,
            "Retrieval completed"
        );

        Ok(RetrievalResult {
            counts: RetrievalCounts {
                similar: similar_count,
                keyword: keyword_count,
                used: context_chunks.len(),
            },
            context_chunks,
            source_filters,
            best_similarity,
        })
    }

    /// Fetch the course overview document and make it the first chunk.
    ///
    /// A missing or failing fetch is tolerated: the overview enriches the
    /// context, it does not gate it.
    async fn prepend_course_overview(
        &self,
        context_chunks: &mut Vec<String>,
        seen_texts: &mut HashSet<String>,
    ) {
        let paths = vec![COURSE_OVERVIEW_FILE.to_string()];
        let overview_chunks = match self.store.get_by_paths(&paths).await {
            Ok(chunks) => chunks,
            Err(e) => {
                tracing::warn!("Failed to fetch course overview: {}", e);
                return;
            }
        };

        for chunk in overview_chunks {
            let text = chunk.text.trim();
            if text.is_empty() {
                continue;
            }
            let normalized = normalize(text);
            if seen_texts.contains(&normalized) {
                continue;
            }
            seen_texts.insert(normalized);
            context_chunks.push(text.to_string());
            break;
        }
    }

    /// Keyword fallback: fetch substring-matched candidates and keep only
    /// those whose re-embedded similarity against the original query vector
    /// meets the threshold.
    async fn validate_keyword_chunks(
        &self,
        query_embedding: &[f32],
        keywords: &[String],
        seen_texts: &mut HashSet<String>,
    ) -> AppResult<Vec<String>> {
        if keywords.is_empty() {
            return Ok(Vec::new());
        }

        let candidates = self
            .store
            .find_by_keywords(keywords, self.config.keyword_match_chunks)
            .await?;

        let mut validated = Vec::new();
        for candidate in candidates {
            let trimmed = candidate.trim();
            if trimmed.is_empty() {
                continue;
            }
            let normalized = normalize(trimmed);
            if normalized.is_empty() || seen_texts.contains(&normalized) {
                continue;
            }

            // A candidate that cannot be embedded is skipped, not fatal
            let chunk_embedding = match self.embeddings.embed_query(trimmed).await {
                Ok(embedding) => embedding,
                Err(e) => {
                    tracing::warn!("Error embedding keyword chunk: {}", e);
                    continue;
                }
            };

            let similarity = dot_product(query_embedding, &chunk_embedding);
            if similarity >= self.config.min_similarity {
                seen_texts.insert(normalized);
                validated.push(trimmed.to_string());
            }
        }
        Ok(validated)
    }
}
