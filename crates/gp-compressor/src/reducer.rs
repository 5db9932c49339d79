//! Stage 2b: extractive sentence selection.

use crate::salience::SalienceScorer;
use crate::segment::SentenceSegmenter;
use gp_core::estimate_tokens;
use gp_embed::{Embedder, Result};
use std::cmp::Ordering;
use std::sync::Arc;

/// Cleaned texts at or above this many estimated tokens keep two sentences
/// by default, shorter ones keep one.
const ADAPTIVE_TOKEN_CUTOFF: usize = 60;

/// Selects the minimal set of highest-salience sentences from cleaned text,
/// re-emitted in original order.
pub struct ExtractiveReducer {
    scorer: SalienceScorer,
    segmenter: Arc<dyn SentenceSegmenter>,
    max_sentences: Option<usize>,
    min_keep_ratio: Option<f32>,
}

impl ExtractiveReducer {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        segmenter: Arc<dyn SentenceSegmenter>,
        max_sentences: Option<usize>,
        min_keep_ratio: Option<f32>,
    ) -> Self {
        Self {
            scorer: SalienceScorer::new(embedder),
            segmenter,
            max_sentences,
            min_keep_ratio,
        }
    }

    /// Reduce cleaned text to its most salient sentences.
    ///
    /// Ranks by descending salience (ties broken toward the earlier
    /// sentence) and keeps adding sentences until the count bound or the
    /// retained-token ratio bound is hit, whichever comes first. At least
    /// one sentence is always kept. Zero- or one-sentence input is returned
    /// unchanged.
    pub async fn reduce(&self, cleaned: &str) -> Result<String> {
        let sentences = self.segmenter.segment(cleaned);
        if sentences.len() <= 1 {
            return Ok(cleaned.to_string());
        }

        let scores = self.scorer.score(&sentences, cleaned).await?;
        let cleaned_tokens = estimate_tokens(cleaned).max(1);
        let limit = self.max_sentences.unwrap_or(if cleaned_tokens >= ADAPTIVE_TOKEN_CUTOFF {
            2
        } else {
            1
        });

        let mut ranked: Vec<usize> = (0..sentences.len()).collect();
        ranked.sort_by(|&a, &b| {
            scores[b]
                .partial_cmp(&scores[a])
                .unwrap_or(Ordering::Equal)
                .then(a.cmp(&b))
        });

        let mut selected = Vec::new();
        let mut kept_tokens = 0;
        for &idx in &ranked {
            selected.push(idx);
            kept_tokens += estimate_tokens(&sentences[idx]);
            if selected.len() >= limit {
                break;
            }
            if let Some(ratio) = self.min_keep_ratio {
                if kept_tokens as f32 / cleaned_tokens as f32 >= ratio {
                    break;
                }
            }
        }

        tracing::debug!(
            total = sentences.len(),
            kept = selected.len(),
            "extractive reduction"
        );

        // Re-emit in original order to preserve narrative flow.
        selected.sort_unstable();
        Ok(selected
            .iter()
            .map(|&i| sentences[i].as_str())
            .collect::<Vec<_>>()
            .join(" "))
    }
}
