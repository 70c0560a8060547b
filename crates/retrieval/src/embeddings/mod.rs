//! Query embedding with memoization.
//!
//! Wraps an [`EmbeddingProvider`] with input cleaning, unit normalization,
//! and a bounded LRU cache keyed by the cleaned text so repeated prompts do
//! not hit the embedding service again.

pub mod provider;
pub mod providers;
pub mod vector;

pub use provider::{create_provider, EmbeddingProvider};
pub use vector::{dot_product, normalize_embedding};

use charla_core::text::clean;
use charla_core::{AppError, AppResult};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

/// Embedding engine shared by one retrieval pipeline.
///
/// The cache is the only state shared between invocations; everything else
/// in a retrieval call is owned by that call.
pub struct EmbeddingEngine {
    provider: Arc<dyn EmbeddingProvider>,
    cache: Mutex<LruCache<String, Vec<f32>>>,
}

impl EmbeddingEngine {
    /// Create an engine over the given provider with a bounded cache.
    pub fn new(provider: Arc<dyn EmbeddingProvider>, cache_size: usize) -> Self {
        let capacity = NonZeroUsize::new(cache_size.max(1)).expect("capacity is at least 1");
        Self {
            provider,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Return a unit-length embedding vector for the given text.
    ///
    /// The text is cleaned (whitespace, control characters, NFC) before
    /// embedding; the cleaned form is also the cache key, so trivially
    /// reformatted repeats of a question reuse the same vector.
    pub async fn embed_query(&self, text: &str) -> AppResult<Vec<f32>> {
        let cleaned = clean(text);
        if cleaned.is_empty() {
            return Err(AppError::Input(
                "Input text must contain readable characters".to_string(),
            ));
        }

        if let Some(hit) = self.cache.lock().expect("cache lock").get(&cleaned) {
            tracing::debug!("Embedding cache hit");
            return Ok(hit.clone());
        }

        let raw = self.provider.embed(&cleaned).await?;
        let (normalized, _) = normalize_embedding(&raw, self.provider.dimensions())?;

        self.cache
            .lock()
            .expect("cache lock")
            .put(cleaned, normalized.clone());

        Ok(normalized)
    }

    /// Expected embedding dimension of the underlying provider.
    pub fn dimensions(&self) -> usize {
        self.provider.dimensions()
    }
}
