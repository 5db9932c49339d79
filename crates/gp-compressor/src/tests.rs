use crate::filler::{tidy, FillerRuleEngine};
use crate::pipeline::CompressionPipeline;
use crate::reducer::ExtractiveReducer;
use crate::salience::SalienceScorer;
use crate::segment::{RuleSegmenter, SentenceSegmenter};
use crate::validator::EquivalenceValidator;
use async_trait::async_trait;
use gp_core::{CompressorConfig, FillerRule};
use gp_embed::{EmbedError, Embedder, FailingEmbedder, HashEmbedder};
use std::collections::HashMap;
use std::sync::Arc;

/// Embedder with hand-picked vectors per text; unknown text embeds to the
/// zero vector (similarity 0).
#[derive(Default)]
struct StubEmbedder {
    vectors: HashMap<String, Vec<f32>>,
}

impl StubEmbedder {
    fn with(mut self, text: &str, v: &[f32]) -> Self {
        self.vectors.insert(text.trim().to_string(), v.to_vec());
        self
    }
}

#[async_trait]
impl Embedder for StubEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        Ok(self
            .vectors
            .get(text.trim())
            .cloned()
            .unwrap_or_else(|| vec![0.0; 4]))
    }

    fn dimension(&self) -> usize {
        4
    }
}

/// Segmenter returning a fixed, pre-decided split.
struct FixedSegmenter(Vec<String>);

impl SentenceSegmenter for FixedSegmenter {
    fn segment(&self, _text: &str) -> Vec<String> {
        self.0.clone()
    }
}

fn rules(patterns: &[&str]) -> Vec<FillerRule> {
    patterns.iter().map(|p| FillerRule::remove(*p)).collect()
}

// ========== Filler rule engine ==========

#[test]
fn test_clean_please_kindly() {
    let engine = FillerRuleEngine::new(&rules(&["please", "kindly"])).unwrap();
    let cleaned = engine.clean("Could you please kindly summarize this document for me?");
    assert_eq!(cleaned, "Could you summarize this document for me?");
}

#[test]
fn test_clean_empty_input() {
    let engine = FillerRuleEngine::new(&[]).unwrap();
    assert_eq!(engine.clean(""), "");
    assert_eq!(engine.clean("   \n "), "");
}

#[test]
fn test_clean_no_rules_is_identity() {
    let engine = FillerRuleEngine::new(&[]).unwrap();
    assert_eq!(engine.clean("Summarize the report."), "Summarize the report.");
}

#[test]
fn test_clean_case_insensitive() {
    let engine = FillerRuleEngine::new(&rules(&[r"\bplease\b"])).unwrap();
    assert_eq!(engine.clean("PLEASE review the code."), "Review the code.");
}

#[test]
fn test_clean_never_grows_text() {
    let engine = FillerRuleEngine::new(&[FillerRule {
        pattern: "hi".into(),
        replacement: "hello there".into(),
    }])
    .unwrap();
    let input = "hi world";
    let cleaned = engine.clean(input);
    assert!(cleaned.len() <= input.len());
    assert_eq!(cleaned, "Hi world");
}

#[test]
fn test_clean_applies_rules_in_order() {
    // First rule rewrites, second rule deletes what the first produced.
    let engine = FillerRuleEngine::new(&[
        FillerRule {
            pattern: "foobar".into(),
            replacement: "x".into(),
        },
        FillerRule::remove("x "),
    ])
    .unwrap();
    assert_eq!(engine.clean("foobar check the logs"), "Check the logs");
}

#[test]
fn test_default_rules_strip_leading_politeness() {
    let engine = FillerRuleEngine::new(&FillerRuleEngine::default_rules()).unwrap();
    let cleaned = engine.clean("Could you please summarize the findings?");
    assert_eq!(cleaned, "Summarize the findings?");
}

#[test]
fn test_malformed_pattern_fails_at_build() {
    let err = FillerRuleEngine::new(&rules(&["(unclosed"])).err().unwrap();
    assert!(err.to_string().contains("Configuration"));
}

#[test]
fn test_tidy_whitespace_and_punctuation() {
    assert_eq!(tidy("hello ,  world !!"), "Hello, world!");
    assert_eq!(tidy("  spaced   out  "), "Spaced out");
}

#[test]
fn test_tidy_preserves_decimals() {
    assert_eq!(tidy("The rate is 3.14 percent."), "The rate is 3.14 percent.");
}

// ========== Sentence segmentation ==========

#[test]
fn test_segment_three_sentences() {
    let s = RuleSegmenter.segment("First point. Second point! Third point?");
    assert_eq!(s, vec!["First point.", "Second point!", "Third point?"]);
}

#[test]
fn test_segment_empty() {
    assert!(RuleSegmenter.segment("").is_empty());
    assert!(RuleSegmenter.segment("   ").is_empty());
}

#[test]
fn test_segment_single_sentence() {
    let s = RuleSegmenter.segment("Just one sentence here.");
    assert_eq!(s.len(), 1);
}

#[test]
fn test_segment_abbreviation_guard() {
    let s = RuleSegmenter.segment("Use fruit, e.g. apples and pears. Then eat them.");
    assert_eq!(s.len(), 2);
    assert!(s[0].contains("e.g. apples"));
}

#[test]
fn test_segment_initial_guard() {
    let s = RuleSegmenter.segment("Ask J. Smith about it. He knows.");
    assert_eq!(s.len(), 2);
    assert!(s[0].contains("J. Smith"));
}

#[test]
fn test_segment_decimal_number() {
    let s = RuleSegmenter.segment("Pi is 3.14 roughly. Use it.");
    assert_eq!(s.len(), 2);
    assert!(s[0].contains("3.14"));
}

#[test]
fn test_segment_newline_fallback() {
    let s = RuleSegmenter.segment("first item\nsecond item\nthird item");
    assert_eq!(s.len(), 3);
}

// ========== Salience scorer ==========

#[tokio::test]
async fn test_salience_single_sentence_skips_provider() {
    // A failing provider proves no embed call happens.
    let scorer = SalienceScorer::new(Arc::new(FailingEmbedder));
    let scores = scorer.score(&["Only one.".into()], "Only one.").await.unwrap();
    assert_eq!(scores, vec![1.0]);
}

#[tokio::test]
async fn test_salience_empty() {
    let scorer = SalienceScorer::new(Arc::new(FailingEmbedder));
    assert!(scorer.score(&[], "").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_salience_centrality_ordering() {
    let doc = "alpha one. beta two.";
    let embedder = StubEmbedder::default()
        .with(doc, &[1.0, 0.0, 0.0, 0.0])
        .with("alpha one.", &[1.0, 0.0, 0.0, 0.0])
        .with("beta two.", &[0.0, 1.0, 0.0, 0.0]);
    let scorer = SalienceScorer::new(Arc::new(embedder));
    let scores = scorer
        .score(&["alpha one.".into(), "beta two.".into()], doc)
        .await
        .unwrap();
    assert!(scores[0] > scores[1]);
    assert!((scores[0] - 1.0).abs() < 1e-5);
}

#[tokio::test]
async fn test_salience_provider_outage() {
    let scorer = SalienceScorer::new(Arc::new(FailingEmbedder));
    let err = scorer
        .score(&["a.".into(), "b.".into()], "a. b.")
        .await
        .unwrap_err();
    assert!(matches!(err, EmbedError::Unavailable(_)));
}

// ========== Extractive reducer ==========

fn reducer_with(
    embedder: Arc<dyn Embedder>,
    max_sentences: Option<usize>,
    min_keep_ratio: Option<f32>,
) -> ExtractiveReducer {
    ExtractiveReducer::new(embedder, Arc::new(RuleSegmenter), max_sentences, min_keep_ratio)
}

#[tokio::test]
async fn test_reduce_single_sentence_unchanged() {
    // One sentence short-circuits before any scoring.
    let reducer = reducer_with(Arc::new(FailingEmbedder), Some(1), None);
    let text = "Summarize the quarterly revenue report.";
    assert_eq!(reducer.reduce(text).await.unwrap(), text);
}

#[tokio::test]
async fn test_reduce_empty_unchanged() {
    let reducer = reducer_with(Arc::new(FailingEmbedder), Some(1), None);
    assert_eq!(reducer.reduce("").await.unwrap(), "");
}

#[tokio::test]
async fn test_reduce_picks_highest_salience_regardless_of_position() {
    let doc = "One here. Two here. Three here.";
    let embedder = StubEmbedder::default()
        .with(doc, &[1.0, 0.0, 0.0, 0.0])
        .with("One here.", &[0.2, 1.0, 0.0, 0.0])
        .with("Two here.", &[1.0, 0.1, 0.0, 0.0])
        .with("Three here.", &[0.5, 1.0, 0.0, 0.0]);
    let reducer = reducer_with(Arc::new(embedder), Some(1), None);
    assert_eq!(reducer.reduce(doc).await.unwrap(), "Two here.");
}

#[tokio::test]
async fn test_reduce_preserves_original_order() {
    let doc = "One here. Two here. Three here.";
    // Ranking: third, then first; output must come back first-then-third.
    let embedder = StubEmbedder::default()
        .with(doc, &[1.0, 0.0, 0.0, 0.0])
        .with("One here.", &[0.8, 0.6, 0.0, 0.0])
        .with("Two here.", &[0.1, 1.0, 0.0, 0.0])
        .with("Three here.", &[1.0, 0.05, 0.0, 0.0]);
    let reducer = reducer_with(Arc::new(embedder), Some(2), None);
    assert_eq!(reducer.reduce(doc).await.unwrap(), "One here. Three here.");
}

#[tokio::test]
async fn test_reduce_tie_break_prefers_earlier_sentence() {
    let doc = "One here. Two here. Three here.";
    let v = [0.7, 0.3, 0.0, 0.0];
    let embedder = StubEmbedder::default()
        .with(doc, &[1.0, 0.0, 0.0, 0.0])
        .with("One here.", &v)
        .with("Two here.", &v)
        .with("Three here.", &v);
    let reducer = reducer_with(Arc::new(embedder), Some(1), None);
    assert_eq!(reducer.reduce(doc).await.unwrap(), "One here.");
}

#[tokio::test]
async fn test_reduce_ratio_bound_stops_before_count_bound() {
    let doc = "One here. Two here. Three here.";
    let embedder = StubEmbedder::default()
        .with(doc, &[1.0, 0.0, 0.0, 0.0])
        .with("One here.", &[1.0, 0.0, 0.0, 0.0])
        .with("Two here.", &[0.5, 0.5, 0.0, 0.0])
        .with("Three here.", &[0.2, 0.8, 0.0, 0.0]);
    // Each sentence is ~1/3 of the tokens; a 0.2 ratio is satisfied by one.
    let reducer = reducer_with(Arc::new(embedder), Some(3), Some(0.2));
    assert_eq!(reducer.reduce(doc).await.unwrap(), "One here.");
}

#[tokio::test]
async fn test_reduce_provider_outage_propagates() {
    let reducer = reducer_with(Arc::new(FailingEmbedder), Some(1), None);
    let err = reducer.reduce("First part. Second part.").await.unwrap_err();
    assert!(matches!(err, EmbedError::Unavailable(_)));
}

// ========== Equivalence validator ==========

#[tokio::test]
async fn test_validate_identical_accepts_without_provider() {
    let validator = EquivalenceValidator::new(Arc::new(FailingEmbedder), 0.80);
    let v = validator.validate("Same text.", "Same text.").await.unwrap();
    assert!(v.accepted);
    assert_eq!(v.similarity, 1.0);
}

#[tokio::test]
async fn test_validate_empty_candidate_rejected() {
    let validator = EquivalenceValidator::new(Arc::new(FailingEmbedder), 0.80);
    let v = validator.validate("Some text.", "").await.unwrap();
    assert!(!v.accepted);
    assert_eq!(v.similarity, 0.0);
}

#[tokio::test]
async fn test_validate_threshold_gate() {
    let embedder = StubEmbedder::default()
        .with("original thing", &[1.0, 0.0, 0.0, 0.0])
        .with("unrelated thing", &[0.0, 1.0, 0.0, 0.0])
        .with("near thing", &[1.0, 0.2, 0.0, 0.0]);
    let validator = EquivalenceValidator::new(Arc::new(embedder), 0.80);

    let rejected = validator
        .validate("original thing", "unrelated thing")
        .await
        .unwrap();
    assert!(!rejected.accepted);
    assert_eq!(rejected.similarity, 0.0);

    let accepted = validator.validate("original thing", "near thing").await.unwrap();
    assert!(accepted.accepted);
    assert!(accepted.similarity > 0.9);
}

#[tokio::test]
async fn test_validate_provider_outage_propagates() {
    let validator = EquivalenceValidator::new(Arc::new(FailingEmbedder), 0.80);
    let err = validator.validate("one text", "other text").await.unwrap_err();
    assert!(matches!(err, EmbedError::Unavailable(_)));
}

// ========== Pipeline ==========

fn hash_pipeline(config: &CompressorConfig, patterns: &[&str]) -> CompressionPipeline {
    // Large dimension keeps bucket collisions out of similarity margins.
    CompressionPipeline::new(config, &rules(patterns), Arc::new(HashEmbedder::new(4096))).unwrap()
}

#[tokio::test]
async fn test_pipeline_empty_input_accepted() {
    let pipeline = hash_pipeline(&CompressorConfig::default(), &[]);
    let result = pipeline.compress("").await;
    assert!(result.accepted);
    assert_eq!(result.original_text, "");
    assert_eq!(result.cleaned_text, "");
    assert_eq!(result.compressed_text, "");
    assert_eq!(result.original_tokens, 0);
    assert_eq!(result.compressed_tokens, 0);
}

#[tokio::test]
async fn test_pipeline_filler_removal_accepted() {
    let pipeline = hash_pipeline(&CompressorConfig::default(), &["please", "kindly"]);
    let result = pipeline
        .compress("Could you please kindly summarize this document for me?")
        .await;
    assert_eq!(result.cleaned_text, "Could you summarize this document for me?");
    assert!(result.accepted, "similarity was {}", result.similarity);
    assert!(result.similarity >= 0.80);
    assert!(result.compressed_tokens <= result.original_tokens);
}

#[tokio::test]
async fn test_pipeline_length_monotonicity() {
    let pipeline = hash_pipeline(&CompressorConfig::default(), &["please"]);
    let inputs = [
        "Please summarize this. It matters a lot. Thanks for everything you do.",
        "Short one.",
        "No fillers at all in this sentence about databases.",
    ];
    for input in inputs {
        let result = pipeline.compress(input).await;
        let cleaned = gp_core::estimate_tokens(&result.cleaned_text);
        assert!(result.compressed_tokens <= cleaned);
        assert!(cleaned <= result.original_tokens);
    }
}

#[tokio::test]
async fn test_pipeline_rejection_falls_back_to_cleaned() {
    // Sentence one is most central to the (stubbed) document embedding but
    // far from the original text, so the gate must reject it.
    let text = "One here. Two here.";
    let mut v1 = vec![0.7, 0.0, 0.0, 0.0];
    v1[1] = (1.0f32 - 0.49).sqrt();
    let embedder = StubEmbedder::default()
        .with(text, &[1.0, 0.0, 0.0, 0.0])
        .with("One here.", &v1)
        .with("Two here.", &[0.2, 0.9, 0.0, 0.0]);
    let config = CompressorConfig {
        max_sentences: Some(1),
        ..Default::default()
    };
    let pipeline = CompressionPipeline::new(&config, &[], Arc::new(embedder)).unwrap();

    let result = pipeline.compress(text).await;
    assert!(!result.accepted);
    // Never the rejected candidate, always the cleaned text.
    assert_eq!(result.compressed_text, result.cleaned_text);
    assert!((result.similarity - 0.7).abs() < 1e-3);
    assert!(result.stages.contains(&"fallback".to_string()));
}

#[tokio::test]
async fn test_pipeline_scorer_outage_degrades_gracefully() {
    let pipeline =
        CompressionPipeline::new(&CompressorConfig::default(), &[], Arc::new(FailingEmbedder))
            .unwrap();
    let result = pipeline.compress("First sentence. Second sentence.").await;
    assert!(!result.accepted);
    assert_eq!(result.compressed_text, result.cleaned_text);
    assert!(result.stages.contains(&"fallback".to_string()));
    assert!(!result.stages.contains(&"reduced".to_string()));
}

#[tokio::test]
async fn test_pipeline_single_sentence_fixed_point() {
    let pipeline = hash_pipeline(&CompressorConfig::default(), &[]);
    let first = pipeline.compress("Summarize the quarterly revenue report.").await;
    assert!(first.accepted);

    let second = pipeline.compress(&first.compressed_text).await;
    assert!(second.accepted);
    assert_eq!(second.compressed_text, first.compressed_text);
    assert_eq!(second.similarity, 1.0);
}

#[tokio::test]
async fn test_pipeline_aggressive_trim_when_extraction_stalls() {
    let config = CompressorConfig {
        max_sentences: Some(5),
        aggressive_patterns: vec![r"\s*\(see appendix\)".into()],
        ..Default::default()
    };
    let pipeline = hash_pipeline(&config, &[]);
    let result = pipeline
        .compress("Review the budget (see appendix). Approve the plan.")
        .await;
    assert!(result.stages.contains(&"aggressive".to_string()));
    assert!(result.accepted, "similarity was {}", result.similarity);
    assert_eq!(result.compressed_text, "Review the budget. Approve the plan.");
}

#[tokio::test]
async fn test_pipeline_injected_segmenter() {
    let pieces = vec!["part one ||".to_string(), "part two ||".to_string()];
    let embedder = StubEmbedder::default()
        .with("part one || part two ||", &[1.0, 0.0, 0.0, 0.0])
        // Cleaning capitalizes the first letter.
        .with("Part one || part two ||", &[1.0, 0.0, 0.0, 0.0])
        .with("part one ||", &[1.0, 0.1, 0.0, 0.0])
        .with("part two ||", &[0.3, 1.0, 0.0, 0.0]);
    let config = CompressorConfig {
        max_sentences: Some(1),
        // The stub only knows the exact candidate, so accept anything
        // non-orthogonal.
        similarity_threshold: 0.5,
        ..Default::default()
    };
    let pipeline = CompressionPipeline::with_segmenter(
        &config,
        &[],
        Arc::new(embedder),
        Arc::new(FixedSegmenter(pieces)),
    )
    .unwrap();
    let result = pipeline.compress("part one || part two ||").await;
    assert_eq!(result.compressed_text, "part one ||");
}

#[test]
fn test_pipeline_invalid_threshold_fails_at_build() {
    let config = CompressorConfig {
        similarity_threshold: 2.0,
        ..Default::default()
    };
    let err = CompressionPipeline::new(&config, &[], Arc::new(HashEmbedder::default()))
        .err()
        .unwrap();
    assert!(err.to_string().contains("similarity_threshold"));
}

#[test]
fn test_pipeline_bad_aggressive_pattern_fails_at_build() {
    let config = CompressorConfig {
        aggressive_patterns: vec!["(broken".into()],
        ..Default::default()
    };
    assert!(CompressionPipeline::new(&config, &[], Arc::new(HashEmbedder::default())).is_err());
}

#[tokio::test]
async fn test_result_helpers() {
    let pipeline = hash_pipeline(&CompressorConfig::default(), &["please"]);
    let result = pipeline
        .compress("Please summarize the entire document carefully.")
        .await;
    assert_eq!(
        result.tokens_saved(),
        result.original_tokens - result.compressed_tokens
    );
    assert!(result.ratio() <= 1.0);
    assert!(result.reduction_pct() >= 0.0);
}
