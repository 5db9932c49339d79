//! Pipeline configuration and filler rule loading.

use crate::error::{GpError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A single pattern/replacement pair for filler removal.
///
/// Rules are applied in listed order. The replacement is usually empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FillerRule {
    pub pattern: String,
    #[serde(default)]
    pub replacement: String,
}

impl FillerRule {
    pub fn remove(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: String::new(),
        }
    }
}

/// Load an ordered filler rule list from a JSON file.
///
/// Schema: `[{"pattern": "...", "replacement": "..."}, ...]`. Malformed
/// entries fail fast with a descriptive error; entries are never skipped
/// silently. Pattern compilation happens when the rule engine is built, so
/// a bad regex also surfaces before the first `compress` call.
pub fn load_filler_rules(path: impl AsRef<Path>) -> Result<Vec<FillerRule>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        GpError::Configuration(format!("cannot read filler rules {}: {}", path.display(), e))
    })?;
    let rules: Vec<FillerRule> = serde_json::from_str(&content).map_err(|e| {
        GpError::Configuration(format!("malformed filler rules {}: {}", path.display(), e))
    })?;
    Ok(rules)
}

/// Pipeline tuning knobs. Loaded once, immutable for the process lifetime,
/// passed explicitly into each pipeline instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressorConfig {
    /// Equivalence gate threshold in [0, 1].
    pub similarity_threshold: f32,
    /// Count bound for the reducer. `None` picks an adaptive count from the
    /// cleaned text length.
    pub max_sentences: Option<usize>,
    /// Optional retained-token ratio bound relative to the cleaned text.
    pub min_keep_ratio: Option<f32>,
    /// Extra removal patterns tried only when extraction failed to shrink
    /// the cleaned text.
    #[serde(default)]
    pub aggressive_patterns: Vec<String>,
}

impl CompressorConfig {
    /// Reject out-of-range knobs before any pipeline is built.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(GpError::Configuration(format!(
                "similarity_threshold must be in [0, 1], got {}",
                self.similarity_threshold
            )));
        }
        if let Some(ratio) = self.min_keep_ratio {
            if !(0.0..=1.0).contains(&ratio) {
                return Err(GpError::Configuration(format!(
                    "min_keep_ratio must be in [0, 1], got {ratio}"
                )));
            }
        }
        if self.max_sentences == Some(0) {
            return Err(GpError::Configuration(
                "max_sentences must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

impl Default for CompressorConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.80,
            max_sentences: None,
            min_keep_ratio: None,
            aggressive_patterns: Vec::new(),
        }
    }
}
