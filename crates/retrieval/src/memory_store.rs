//! In-memory knowledge store.
//!
//! Backs pipeline tests and small deployments that load their knowledge base
//! at startup. Documents are held with pre-computed unit embeddings, so
//! similarity is a dot product.

use crate::store::KnowledgeStore;
use crate::types::EvidenceChunk;
use charla_core::text::normalize;
use charla_core::AppResult;
use std::cmp::Ordering;

/// One stored document chunk.
#[derive(Debug, Clone)]
struct StoredDocument {
    text: String,
    source: String,
    normalized_text: String,
    embedding: Vec<f32>,
}

/// In-memory store over unit-normalized embeddings.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Vec<StoredDocument>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document chunk with its unit-normalized embedding.
    pub fn insert(&mut self, text: impl Into<String>, source: impl Into<String>, embedding: Vec<f32>) {
        let text = text.into();
        let normalized_text = normalize(&text);
        self.documents.push(StoredDocument {
            text,
            source: source.into(),
            normalized_text,
            embedding,
        });
    }

    /// Number of stored chunks.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the store holds no chunks.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn matches_prefix(source: &str, prefixes: &[String]) -> bool {
        if prefixes.is_empty() {
            return true;
        }
        prefixes.iter().any(|prefix| {
            if prefix.ends_with('/') {
                source.starts_with(prefix.as_str())
            } else {
                source.starts_with(&format!("{}/", prefix))
            }
        })
    }
}

#[async_trait::async_trait]
impl KnowledgeStore for MemoryStore {
    async fn search_similar(
        &self,
        query: &[f32],
        top_k: usize,
        source_prefixes: &[String],
    ) -> AppResult<Vec<EvidenceChunk>> {
        let mut scored: Vec<EvidenceChunk> = self
            .documents
            .iter()
            .filter(|doc| Self::matches_prefix(&doc.source, source_prefixes))
            .map(|doc| {
                let dot: f32 = doc
                    .embedding
                    .iter()
                    .zip(query.iter())
                    .map(|(a, b)| a * b)
                    .sum();
                EvidenceChunk {
                    text: doc.text.clone(),
                    source: doc.source.clone(),
                    similarity: dot.max(0.0),
                }
            })
            .collect();

        scored.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(Ordering::Equal)
        });
        scored.truncate(top_k);
        Ok(scored)
    }

    async fn find_by_keywords(
        &self,
        keywords: &[String],
        max_results: usize,
    ) -> AppResult<Vec<String>> {
        let lowered: Vec<String> = keywords
            .iter()
            .map(|kw| kw.trim().to_lowercase())
            .filter(|kw| !kw.is_empty())
            .collect();
        if lowered.is_empty() {
            return Ok(Vec::new());
        }

        let mut matches = Vec::new();
        for doc in &self.documents {
            if matches.len() >= max_results {
                break;
            }
            if lowered.iter().any(|kw| doc.normalized_text.contains(kw))
                && !matches.contains(&doc.text)
            {
                matches.push(doc.text.clone());
            }
        }
        Ok(matches)
    }

    async fn get_by_paths(&self, paths: &[String]) -> AppResult<Vec<EvidenceChunk>> {
        let chunks = self
            .documents
            .iter()
            .filter(|doc| {
                paths.iter().any(|path| {
                    doc.source == *path || doc.source.ends_with(&format!("/{}", path))
                })
            })
            .map(|doc| EvidenceChunk {
                text: doc.text.clone(),
                source: doc.source.clone(),
                similarity: 1.0,
            })
            .collect();
        Ok(chunks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::normalize_embedding;

    fn unit(v: &[f32]) -> Vec<f32> {
        normalize_embedding(v, v.len()).unwrap().0
    }

    #[tokio::test]
    async fn test_search_orders_by_similarity() {
        let mut store = MemoryStore::new();
        store.insert("texto a", "a.md", unit(&[1.0, 0.0, 0.0]));
        store.insert("texto b", "b.md", unit(&[0.7, 0.7, 0.0]));
        store.insert("texto c", "c.md", unit(&[0.0, 1.0, 0.0]));

        let results = store
            .search_similar(&unit(&[1.0, 0.0, 0.0]), 5, &[])
            .await
            .unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].source, "a.md");
        assert!(results[0].similarity > results[1].similarity);
        assert!(results[1].similarity >= results[2].similarity);
    }

    #[tokio::test]
    async fn test_search_clamps_negative_similarity() {
        let mut store = MemoryStore::new();
        store.insert("opuesto", "a.md", unit(&[-1.0, 0.0]));

        let results = store.search_similar(&unit(&[1.0, 0.0]), 5, &[]).await.unwrap();
        assert_eq!(results[0].similarity, 0.0);
    }

    #[tokio::test]
    async fn test_search_respects_prefix_filter() {
        let mut store = MemoryStore::new();
        store.insert("curso", "cursos/intro.md", unit(&[1.0, 0.0]));
        store.insert("servicio", "servicios/calculo.md", unit(&[1.0, 0.0]));

        let filters = vec!["cursos/".to_string()];
        let results = store.search_similar(&unit(&[1.0, 0.0]), 5, &filters).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].source, "cursos/intro.md");
    }

    #[tokio::test]
    async fn test_prefix_without_trailing_slash_is_normalized() {
        let mut store = MemoryStore::new();
        store.insert("curso", "cursos/intro.md", unit(&[1.0, 0.0]));
        store.insert("trampa", "cursosx/otro.md", unit(&[1.0, 0.0]));

        let filters = vec!["cursos".to_string()];
        let results = store.search_similar(&unit(&[1.0, 0.0]), 5, &filters).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].source, "cursos/intro.md");
    }

    #[tokio::test]
    async fn test_find_by_keywords_substring_insensitive() {
        let mut store = MemoryStore::new();
        store.insert("Curso de CYPE avanzado", "cursos/cype.md", unit(&[1.0, 0.0]));
        store.insert("Recetas de cocina", "otros/cocina.md", unit(&[0.0, 1.0]));

        let found = store
            .find_by_keywords(&["cype".to_string()], 2)
            .await
            .unwrap();

        assert_eq!(found, vec!["Curso de CYPE avanzado"]);
    }

    #[tokio::test]
    async fn test_find_by_keywords_limit_and_dedup() {
        let mut store = MemoryStore::new();
        store.insert("Curso uno", "a.md", unit(&[1.0, 0.0]));
        store.insert("Curso uno", "b.md", unit(&[1.0, 0.0]));
        store.insert("Curso dos", "c.md", unit(&[1.0, 0.0]));
        store.insert("Curso tres", "d.md", unit(&[1.0, 0.0]));

        let found = store
            .find_by_keywords(&["curso".to_string()], 2)
            .await
            .unwrap();

        assert_eq!(found, vec!["Curso uno", "Curso dos"]);
    }

    #[tokio::test]
    async fn test_get_by_paths_matches_basename() {
        let mut store = MemoryStore::new();
        store.insert("panorama", "cursos/overview_cursos.md", unit(&[1.0, 0.0]));

        let chunks = store
            .get_by_paths(&["overview_cursos.md".to_string()])
            .await
            .unwrap();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].similarity, 1.0);
    }
}
