//! Priority ranking, deduplication, and selection of evidence chunks.

use crate::types::EvidenceChunk;
use charla_core::text::normalize;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Ranking priority for a chunk, derived from its source file name.
///
/// Lower sorts first: the routing overview outranks summaries and FAQ files,
/// which outrank everything else. Chunks with no source path sort last.
pub fn chunk_priority(source: &str) -> u8 {
    if source.is_empty() {
        return 3;
    }
    let basename = source.rsplit('/').next().unwrap_or(source).to_lowercase();
    if basename == "routing.md" {
        return 0;
    }
    if basename.ends_with("_summary.md") || basename == "faq.md" {
        return 1;
    }
    if basename.starts_with("faq_") && basename.ends_with(".md") {
        return 1;
    }
    2
}

/// Select up to `limit` chunks by (priority, descending similarity),
/// skipping any chunk whose source path or normalized text duplicates one
/// already selected.
pub fn select_context_chunks(chunks: &[EvidenceChunk], limit: usize) -> Vec<EvidenceChunk> {
    let mut candidates: Vec<&EvidenceChunk> =
        chunks.iter().filter(|c| !c.text.trim().is_empty()).collect();

    candidates.sort_by(|a, b| {
        chunk_priority(&a.source)
            .cmp(&chunk_priority(&b.source))
            .then(
                b.similarity
                    .partial_cmp(&a.similarity)
                    .unwrap_or(Ordering::Equal),
            )
    });

    let mut selected = Vec::new();
    let mut seen_sources: HashSet<String> = HashSet::new();
    let mut seen_texts: HashSet<String> = HashSet::new();

    for chunk in candidates {
        if selected.len() >= limit {
            break;
        }
        let text = chunk.text.trim();
        let normalized_text = normalize(text);
        if seen_sources.contains(&chunk.source) || seen_texts.contains(&normalized_text) {
            continue;
        }
        seen_sources.insert(chunk.source.clone());
        seen_texts.insert(normalized_text);
        selected.push(EvidenceChunk {
            text: text.to_string(),
            source: chunk.source.clone(),
            similarity: chunk.similarity,
        });
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(text: &str, source: &str, similarity: f32) -> EvidenceChunk {
        EvidenceChunk {
            text: text.to_string(),
            source: source.to_string(),
            similarity,
        }
    }

    #[test]
    fn test_chunk_priority_tiers() {
        assert_eq!(chunk_priority("routing.md"), 0);
        assert_eq!(chunk_priority("cursos/routing.md"), 0);
        assert_eq!(chunk_priority("cursos/cursos_summary.md"), 1);
        assert_eq!(chunk_priority("faq.md"), 1);
        assert_eq!(chunk_priority("faq/faq_pagos.md"), 1);
        assert_eq!(chunk_priority("servicios/calculo.md"), 2);
        assert_eq!(chunk_priority(""), 3);
    }

    #[test]
    fn test_routing_outranks_higher_similarity() {
        let chunks = vec![
            chunk("sobre otros temas", "other.md", 0.99),
            chunk("mapa de contenidos", "routing.md", 0.61),
        ];
        let selected = select_context_chunks(&chunks, 5);
        assert_eq!(selected[0].source, "routing.md");
        assert_eq!(selected[1].source, "other.md");
    }

    #[test]
    fn test_same_priority_sorted_by_similarity() {
        let chunks = vec![
            chunk("texto a", "a.md", 0.7),
            chunk("texto b", "b.md", 0.9),
            chunk("texto c", "c.md", 0.8),
        ];
        let selected = select_context_chunks(&chunks, 5);
        let sources: Vec<&str> = selected.iter().map(|c| c.source.as_str()).collect();
        assert_eq!(sources, vec!["b.md", "c.md", "a.md"]);
    }

    #[test]
    fn test_dedup_by_source() {
        let chunks = vec![
            chunk("primer fragmento", "faq.md", 0.9),
            chunk("segundo fragmento", "faq.md", 0.8),
        ];
        let selected = select_context_chunks(&chunks, 5);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].text, "primer fragmento");
    }

    #[test]
    fn test_dedup_by_normalized_text() {
        // Same content up to accents and elongation is a duplicate
        let chunks = vec![
            chunk("Cursos de diseño estructural", "a.md", 0.9),
            chunk("cursos de disenoo estructural!!", "b.md", 0.8),
        ];
        let selected = select_context_chunks(&chunks, 5);
        assert_eq!(selected.len(), 1);
    }

    #[test]
    fn test_limit_enforced() {
        let chunks: Vec<EvidenceChunk> = (0..10)
            .map(|i| chunk(&format!("texto {}", i), &format!("doc{}.md", i), 0.9))
            .collect();
        assert_eq!(select_context_chunks(&chunks, 5).len(), 5);
    }

    #[test]
    fn test_blank_chunks_skipped() {
        let chunks = vec![chunk("   ", "a.md", 0.9), chunk("util", "b.md", 0.7)];
        let selected = select_context_chunks(&chunks, 5);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].source, "b.md");
    }
}
