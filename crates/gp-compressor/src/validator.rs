//! Stage 3: semantic equivalence gate.

use gp_embed::{Embedder, Result};
use std::sync::Arc;

/// Validator outcome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    pub accepted: bool,
    pub similarity: f32,
}

/// Compares original and candidate text by embedding similarity and accepts
/// iff `similarity >= threshold`. This is the safety gate against meaning
/// loss; nothing overrides it.
pub struct EquivalenceValidator {
    embedder: Arc<dyn Embedder>,
    threshold: f32,
}

impl EquivalenceValidator {
    pub fn new(embedder: Arc<dyn Embedder>, threshold: f32) -> Self {
        Self {
            embedder,
            threshold,
        }
    }

    pub async fn validate(&self, original: &str, candidate: &str) -> Result<Verdict> {
        let original = original.trim();
        let candidate = candidate.trim();

        // Identical text needs no provider round-trip.
        if original.eq_ignore_ascii_case(candidate) {
            return Ok(Verdict {
                accepted: true,
                similarity: 1.0,
            });
        }
        if original.is_empty() || candidate.is_empty() {
            return Ok(Verdict {
                accepted: false,
                similarity: 0.0,
            });
        }

        let a = self.embedder.embed(original).await?;
        let b = self.embedder.embed(candidate).await?;
        let similarity = self.embedder.similarity(&a, &b);
        Ok(Verdict {
            accepted: similarity >= self.threshold,
            similarity,
        })
    }
}
