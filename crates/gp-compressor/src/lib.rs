//! Greenprompt compressor — 3-stage prompt compression pipeline.
//!
//! Stages:
//! 1. Filler removal — ordered pattern-based deletion of politeness/filler
//! 2. Extractive reduction — keep only the most salient sentences
//! 3. Equivalence validation — semantic-similarity gate with safe fallback
//!
//! The compressed output is only emitted when it stays semantically
//! equivalent to the input; otherwise the rule-cleaned text is returned.

pub mod filler;
pub mod pipeline;
pub mod reducer;
pub mod salience;
pub mod segment;
pub mod validator;

pub use filler::FillerRuleEngine;
pub use pipeline::{CompressionPipeline, CompressionResult};
pub use reducer::ExtractiveReducer;
pub use salience::SalienceScorer;
pub use segment::{RuleSegmenter, SentenceSegmenter};
pub use validator::{EquivalenceValidator, Verdict};

#[cfg(test)]
mod tests;
