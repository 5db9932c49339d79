//! Sentence boundary detection.
//!
//! Boundary detection is a replaceable strategy so tests can inject a
//! deterministic segmenter.

/// Splits text into sentences.
pub trait SentenceSegmenter: Send + Sync {
    fn segment(&self, text: &str) -> Vec<String>;
}

/// Common abbreviations that end in a period without ending a sentence.
const ABBREVIATIONS: &[&str] = &[
    "e.g", "i.e", "etc", "vs", "cf", "dr", "mr", "mrs", "ms", "prof", "st", "no", "fig", "al",
    "approx",
];

/// Default heuristic segmenter: splits on `.` `?` `!` followed by
/// whitespace, guarding abbreviations, single-letter initials, and decimal
/// numbers.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleSegmenter;

impl RuleSegmenter {
    fn is_guarded(current: &str, terminator: char) -> bool {
        if terminator != '.' {
            return false;
        }
        let last_word = current
            .trim_end_matches('.')
            .rsplit(char::is_whitespace)
            .next()
            .unwrap_or("");
        if last_word.is_empty() {
            return false;
        }
        // "J. Smith" style initials
        if last_word.chars().count() == 1 && last_word.chars().all(char::is_alphabetic) {
            return true;
        }
        ABBREVIATIONS.contains(&last_word.to_lowercase().as_str())
    }
}

impl SentenceSegmenter for RuleSegmenter {
    fn segment(&self, text: &str) -> Vec<String> {
        let text = text.trim();
        if text.is_empty() {
            return Vec::new();
        }

        let chars: Vec<char> = text.chars().collect();
        let mut sentences = Vec::new();
        let mut current = String::new();

        for (i, &c) in chars.iter().enumerate() {
            current.push(c);
            if matches!(c, '.' | '!' | '?') {
                let at_end = i + 1 == chars.len();
                let next_is_space = chars.get(i + 1).is_some_and(|n| n.is_whitespace());
                if (at_end || next_is_space) && !Self::is_guarded(&current, c) {
                    let sentence = current.trim();
                    if !sentence.is_empty() {
                        sentences.push(sentence.to_string());
                    }
                    current.clear();
                }
            }
        }
        let tail = current.trim();
        if !tail.is_empty() {
            sentences.push(tail.to_string());
        }

        // No terminator found: fall back to line splitting.
        if sentences.len() == 1 && text.contains('\n') {
            let lines: Vec<String> = text
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(String::from)
                .collect();
            if lines.len() > 1 {
                return lines;
            }
        }

        sentences
    }
}
