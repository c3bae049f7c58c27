//! Top-k similarity retrieval over the vector index.
//!
//! The retriever embeds the query through the same [`Embedder`] instance
//! used at index build time, scores every chunk by cosine similarity,
//! and returns the best `k` in descending score order. Ties are broken
//! by original chunk order (earlier offset wins).

use std::cmp::Ordering;
use std::sync::Arc;

use tracing::debug;

use crate::embedding::Embedder;
use crate::error::AgentError;
use crate::index::{DocumentChunk, VectorIndex};

/// A retrieved chunk with its similarity score.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    /// The retrieved chunk.
    pub chunk: DocumentChunk,
    /// Cosine similarity of the chunk to the query, in `[-1.0, 1.0]`.
    pub score: f32,
}

/// Retrieves the most similar chunks for a query.
///
/// Holds the shared read-only index and the embedder; safe to use from
/// multiple sessions concurrently.
pub struct Retriever {
    index: Arc<VectorIndex>,
    embedder: Arc<dyn Embedder>,
}

impl Retriever {
    /// Creates a retriever over the given index and embedder.
    ///
    /// Embedding-space consistency is enforced by construction: the
    /// caller hands in the same embedder instance that built the index.
    #[must_use]
    pub fn new(index: Arc<VectorIndex>, embedder: Arc<dyn Embedder>) -> Self {
        Self { index, embedder }
    }

    /// Returns the top-`k` chunks most similar to `query_text`, ordered
    /// by descending similarity.
    ///
    /// Returns fewer than `k` chunks if the index holds fewer, and an
    /// empty vector (never an error) if the index is empty.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiRequest`] if the query embedding fails.
    pub async fn retrieve(&self, query_text: &str, k: usize) -> Result<Vec<ScoredChunk>, AgentError> {
        if self.index.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let query = self.embedder.embed(query_text).await?;

        let mut scored: Vec<ScoredChunk> = self
            .index
            .entries()
            .map(|(chunk, vector)| ScoredChunk {
                chunk: chunk.clone(),
                score: cosine_similarity(&query, vector),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.chunk.start.cmp(&b.chunk.start))
        });
        scored.truncate(k);

        debug!(
            k,
            returned = scored.len(),
            top_score = scored.first().map_or(0.0, |s| s.score),
            "retrieval complete"
        );
        Ok(scored)
    }
}

/// Computes cosine similarity between two embedding vectors.
///
/// Returns `0.0` for empty vectors or vectors of different lengths.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::index::tests::MockEmbedder;
    use crate::index::DocumentIndexer;

    use std::path::Path;

    async fn build_test_index(dir: &Path) -> (Arc<VectorIndex>, Arc<MockEmbedder>) {
        let source = dir.join("scores.txt");
        // Two chunks: geometry 20/0 splits at the sentence boundary.
        std::fs::write(&source, "Alice: score 92.    Bob: score 85.      ")
            .unwrap_or_else(|e| panic!("write failed: {e}"));

        let embedder = Arc::new(MockEmbedder::new());
        let indexer =
            DocumentIndexer::new(Arc::clone(&embedder) as Arc<dyn Embedder>, 20, 0);
        let index = indexer
            .build_or_load(&source, &dir.join("idx"))
            .await
            .unwrap_or_else(|e| panic!("build failed: {e}"));
        (Arc::new(index), embedder)
    }

    #[tokio::test]
    async fn test_retrieve_orders_by_similarity() {
        let tmp = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir failed: {e}"));
        let (index, embedder) = build_test_index(tmp.path()).await;
        let retriever = Retriever::new(index, embedder);

        let results = retriever
            .retrieve("What is Alice's score?", 2)
            .await
            .unwrap_or_else(|e| panic!("retrieve failed: {e}"));

        assert_eq!(results.len(), 2);
        assert!(results[0].chunk.text.contains("Alice"));
        assert!(results[1].chunk.text.contains("Bob"));
        // Non-increasing similarity.
        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[tokio::test]
    async fn test_retrieve_clamps_k_to_corpus() {
        let tmp = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir failed: {e}"));
        let (index, embedder) = build_test_index(tmp.path()).await;
        let corpus_size = index.len();
        let retriever = Retriever::new(index, embedder);

        let results = retriever
            .retrieve("scores", 100)
            .await
            .unwrap_or_else(|e| panic!("retrieve failed: {e}"));
        assert_eq!(results.len(), corpus_size);
    }

    #[tokio::test]
    async fn test_tie_broken_by_chunk_order() {
        let tmp = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir failed: {e}"));
        let source = tmp.path().join("flat.txt");
        // Identical chunks embed identically: pure tie.
        std::fs::write(&source, "same text..!same text..!")
            .unwrap_or_else(|e| panic!("write failed: {e}"));

        let embedder = Arc::new(MockEmbedder::new());
        let indexer =
            DocumentIndexer::new(Arc::clone(&embedder) as Arc<dyn Embedder>, 12, 0);
        let index = indexer
            .build_or_load(&source, &tmp.path().join("idx"))
            .await
            .unwrap_or_else(|e| panic!("build failed: {e}"));

        let retriever = Retriever::new(Arc::new(index), embedder);
        let results = retriever
            .retrieve("anything", 2)
            .await
            .unwrap_or_else(|e| panic!("retrieve failed: {e}"));
        assert_eq!(results.len(), 2);
        assert!(results[0].chunk.start < results[1].chunk.start);
    }

    #[test]
    fn test_cosine_similarity_basics() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_degenerate_inputs() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }
}
