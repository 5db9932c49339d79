use crate::distance;
use crate::error::{EmbedError, Result};
use async_trait::async_trait;

/// An embedding/similarity provider.
///
/// `embed` may block on model inference or network I/O; everything else is
/// pure math. Implementations must be safe to share across worker tasks.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a text into a fixed-dimension vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of texts. Default: sequential single embeds.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    /// Similarity of two embeddings in [0, 1]. Default: clamped cosine.
    fn similarity(&self, a: &[f32], b: &[f32]) -> f32 {
        distance::cosine_similarity(a, b).clamp(0.0, 1.0)
    }

    /// Embedding dimension.
    fn dimension(&self) -> usize;
}

/// Provider that always reports an outage. Lets tests and callers exercise
/// the graceful-degradation path.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(EmbedError::Unavailable("provider offline".into()))
    }

    fn dimension(&self) -> usize {
        0
    }
}
