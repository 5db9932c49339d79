//! Compression pipeline — orchestrates cleaning, reduction, validation.

use crate::filler::{tidy, FillerRuleEngine};
use crate::reducer::ExtractiveReducer;
use crate::segment::{RuleSegmenter, SentenceSegmenter};
use crate::validator::EquivalenceValidator;
use gp_core::{estimate_tokens, CompressorConfig, FillerRule, GpError, Result};
use gp_embed::Embedder;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};

/// Last-resort trim tried when extraction failed to shrink the cleaned
/// text: drop a trailing subordinate clause.
static RE_TRAILING_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(r"[,;:\-]\s*(and|for|that|which|please|include)\b.*$")
        .case_insensitive(true)
        .build()
        .unwrap()
});

/// Compression outcome with token statistics. Immutable once returned; the
/// pipeline is the sole writer of its fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionResult {
    pub original_text: String,
    pub cleaned_text: String,
    pub compressed_text: String,
    pub accepted: bool,
    pub similarity: f32,
    pub original_tokens: usize,
    pub compressed_tokens: usize,
    pub stages: Vec<String>,
}

impl CompressionResult {
    pub fn tokens_saved(&self) -> usize {
        self.original_tokens.saturating_sub(self.compressed_tokens)
    }

    pub fn ratio(&self) -> f64 {
        if self.original_tokens == 0 {
            return 1.0;
        }
        self.compressed_tokens as f64 / self.original_tokens as f64
    }

    pub fn reduction_pct(&self) -> f64 {
        (1.0 - self.ratio()) * 100.0
    }
}

/// The main compression pipeline: filler removal, extractive reduction,
/// equivalence validation with safe fallback.
///
/// Construction is fallible (configuration errors surface here, never
/// mid-run); `compress` itself always returns a usable result.
pub struct CompressionPipeline {
    filler: FillerRuleEngine,
    reducer: ExtractiveReducer,
    validator: EquivalenceValidator,
    aggressive: Vec<Regex>,
}

impl CompressionPipeline {
    pub fn new(
        config: &CompressorConfig,
        rules: &[FillerRule],
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self> {
        Self::with_segmenter(config, rules, embedder, Arc::new(RuleSegmenter))
    }

    /// Build with an injected sentence segmentation strategy.
    pub fn with_segmenter(
        config: &CompressorConfig,
        rules: &[FillerRule],
        embedder: Arc<dyn Embedder>,
        segmenter: Arc<dyn SentenceSegmenter>,
    ) -> Result<Self> {
        config.validate()?;
        let filler = FillerRuleEngine::new(rules)?;
        let aggressive = config
            .aggressive_patterns
            .iter()
            .map(|p| {
                RegexBuilder::new(p)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| {
                        GpError::Configuration(format!("bad aggressive pattern {p:?}: {e}"))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            filler,
            reducer: ExtractiveReducer::new(
                embedder.clone(),
                segmenter,
                config.max_sentences,
                config.min_keep_ratio,
            ),
            validator: EquivalenceValidator::new(embedder, config.similarity_threshold),
            aggressive,
        })
    }

    /// Default configuration and built-in filler rules.
    pub fn with_defaults(embedder: Arc<dyn Embedder>) -> Result<Self> {
        Self::new(
            &CompressorConfig::default(),
            &FillerRuleEngine::default_rules(),
            embedder,
        )
    }

    /// Compress a prompt.
    ///
    /// Never fails: an embedding provider outage degrades to the
    /// rule-cleaned text with `accepted = false`. A candidate that fails
    /// the equivalence gate is likewise replaced by the cleaned text, never
    /// emitted.
    pub async fn compress(&self, text: &str) -> CompressionResult {
        let original = text.trim();
        if original.is_empty() {
            return CompressionResult {
                original_text: String::new(),
                cleaned_text: String::new(),
                compressed_text: String::new(),
                accepted: true,
                similarity: 1.0,
                original_tokens: 0,
                compressed_tokens: 0,
                stages: Vec::new(),
            };
        }

        let original_tokens = estimate_tokens(original);
        let cleaned = self.filler.clean(original);
        let cleaned_tokens = estimate_tokens(&cleaned);
        let mut stages = vec!["cleaned".to_string()];

        let mut candidate = match self.reducer.reduce(&cleaned).await {
            Ok(reduced) => reduced,
            Err(e) => {
                tracing::warn!(error = %e, "salience scoring unavailable, returning cleaned text");
                stages.push("fallback".into());
                return self.fallback_result(original, &cleaned, original_tokens, 0.0, stages);
            }
        };
        stages.push("reduced".into());

        // Extraction that did not shrink the cleaned text is pointless;
        // try the configured aggressive patterns, then a trailing-clause
        // trim, keeping only a strictly smaller candidate.
        if estimate_tokens(&candidate) >= cleaned_tokens {
            if let Some(smaller) = self.aggressive_trim(&cleaned, estimate_tokens(&candidate)) {
                candidate = smaller;
                stages.push("aggressive".into());
            }
        }

        match self.validator.validate(original, &candidate).await {
            Ok(verdict) => {
                stages.push("validated".into());
                if verdict.accepted {
                    let compressed_tokens = estimate_tokens(&candidate);
                    CompressionResult {
                        original_text: original.to_string(),
                        cleaned_text: cleaned,
                        compressed_text: candidate,
                        accepted: true,
                        similarity: verdict.similarity,
                        original_tokens,
                        compressed_tokens,
                        stages,
                    }
                } else {
                    tracing::debug!(
                        similarity = verdict.similarity,
                        "candidate rejected by equivalence gate"
                    );
                    stages.push("fallback".into());
                    self.fallback_result(
                        original,
                        &cleaned,
                        original_tokens,
                        verdict.similarity,
                        stages,
                    )
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "validation unavailable, returning cleaned text");
                stages.push("fallback".into());
                self.fallback_result(original, &cleaned, original_tokens, 0.0, stages)
            }
        }
    }

    fn fallback_result(
        &self,
        original: &str,
        cleaned: &str,
        original_tokens: usize,
        similarity: f32,
        stages: Vec<String>,
    ) -> CompressionResult {
        CompressionResult {
            original_text: original.to_string(),
            cleaned_text: cleaned.to_string(),
            compressed_text: cleaned.to_string(),
            accepted: false,
            similarity,
            original_tokens,
            compressed_tokens: estimate_tokens(cleaned),
            stages,
        }
    }

    fn aggressive_trim(&self, cleaned: &str, budget_tokens: usize) -> Option<String> {
        for re in &self.aggressive {
            let candidate = tidy(&re.replace_all(cleaned, ""));
            if !candidate.is_empty() && estimate_tokens(&candidate) < budget_tokens {
                return Some(candidate);
            }
        }
        let candidate = tidy(&RE_TRAILING_CLAUSE.replace(cleaned, ""));
        if !candidate.is_empty() && estimate_tokens(&candidate) < budget_tokens {
            return Some(candidate);
        }
        None
    }
}
