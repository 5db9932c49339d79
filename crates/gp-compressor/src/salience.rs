//! Stage 2a: per-sentence salience scoring.

use gp_embed::{Embedder, Result};
use std::sync::Arc;

/// Scores each sentence by semantic centrality: similarity between the
/// sentence embedding and the whole-document embedding. Higher means more
/// representative of the overall meaning.
pub struct SalienceScorer {
    embedder: Arc<dyn Embedder>,
}

impl SalienceScorer {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self { embedder }
    }

    /// One score per sentence, in input order.
    ///
    /// A single sentence is trivially maximally central and scores 1.0
    /// without touching the provider.
    pub async fn score(&self, sentences: &[String], document: &str) -> Result<Vec<f32>> {
        match sentences.len() {
            0 => return Ok(Vec::new()),
            1 => return Ok(vec![1.0]),
            _ => {}
        }

        let doc_embedding = self.embedder.embed(document).await?;
        let sentence_embeddings = self.embedder.embed_batch(sentences).await?;
        Ok(sentence_embeddings
            .iter()
            .map(|e| self.embedder.similarity(e, &doc_embedding))
            .collect())
    }
}
