//! Stage 1: rule-based filler and politeness removal.

use gp_core::{FillerRule, GpError, Result};
use regex::{Captures, Regex, RegexBuilder};
use std::sync::LazyLock;

static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static RE_REPEATED_TERMINATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]{2,}").unwrap());
static RE_LEADING_NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[^\w]+").unwrap());
static RE_SPACE_BEFORE_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+([.,!?;:])").unwrap());
static RE_PUNCT_NO_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([.,!?:;])([^\s\d.,!?:;])").unwrap());

struct CompiledRule {
    regex: Regex,
    replacement: String,
}

/// Applies an ordered filler rule list to raw text.
///
/// Patterns compile case-insensitively when the engine is built; a bad
/// pattern is a configuration error and never surfaces at call time.
pub struct FillerRuleEngine {
    rules: Vec<CompiledRule>,
}

impl FillerRuleEngine {
    pub fn new(rules: &[FillerRule]) -> Result<Self> {
        let mut compiled = Vec::with_capacity(rules.len());
        for rule in rules {
            let regex = RegexBuilder::new(&rule.pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| {
                    GpError::Configuration(format!("bad filler pattern {:?}: {}", rule.pattern, e))
                })?;
            compiled.push(CompiledRule {
                regex,
                replacement: rule.replacement.clone(),
            });
        }
        Ok(Self { rules: compiled })
    }

    /// Built-in rule set: leading politeness strip plus common hedging and
    /// filler words.
    pub fn default_rules() -> Vec<FillerRule> {
        [
            r"^(can you|could you|would you|please|kindly)[:,\s]+",
            r"\bplease\b",
            r"\bkindly\b",
            r"\bjust\b",
            r"\breally\b",
            r"\bvery\b",
            r"\bactually\b",
            r"\bbasically\b",
            r"\bliterally\b",
            r"\bi would like you to\b",
            r"\bi want you to\b",
            r"\bif you don't mind\b",
            r"\bthank you in advance\b",
            r"\bthanks in advance\b",
        ]
        .iter()
        .map(|p| FillerRule::remove(*p))
        .collect()
    }

    /// Apply every rule in order, then normalize whitespace once.
    ///
    /// Invariant: the cleaned text is never longer than the trimmed input.
    /// A rule whose application would grow the text is discarded for that
    /// call.
    pub fn clean(&self, text: &str) -> String {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return String::new();
        }

        let mut s = trimmed.to_string();
        for rule in &self.rules {
            let candidate = rule
                .regex
                .replace_all(&s, rule.replacement.as_str())
                .into_owned();
            if candidate.len() <= s.len() {
                s = candidate;
            }
        }

        let tidied = tidy(&s);
        if tidied.len() > trimmed.len() {
            // The punctuation-spacing fixups can insert characters on
            // pathological input; fall back to plain whitespace collapse.
            RE_WHITESPACE.replace_all(trimmed, " ").into_owned()
        } else {
            tidied
        }
    }
}

/// One-shot cleanup after all rule passes: collapse whitespace runs, fix
/// punctuation spacing, collapse repeated terminators, capitalize the first
/// letter.
pub fn tidy(text: &str) -> String {
    let mut s = RE_WHITESPACE.replace_all(text.trim(), " ").into_owned();
    s = RE_REPEATED_TERMINATOR
        .replace_all(&s, |caps: &Captures| caps[0][..1].to_string())
        .into_owned();
    s = RE_LEADING_NON_WORD.replace(&s, "").into_owned();
    s = RE_SPACE_BEFORE_PUNCT.replace_all(&s, "$1").into_owned();
    s = RE_PUNCT_NO_SPACE.replace_all(&s, "$1 $2").into_owned();
    s = s.trim_matches(|c: char| c.is_whitespace() || c == '"').to_string();

    if let Some(first) = s.chars().next() {
        if first.is_lowercase() {
            return format!("{}{}", first.to_uppercase(), &s[first.len_utf8()..]);
        }
    }
    s
}
