//! Lexicon-based sentiment scoring for free text. Pure: no I/O, no state.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::sentiment::lexicon;

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\W+").expect("static regex"));

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SentimentAnalysis {
    /// (positive - negative) / (positive + negative), 0 when neither occurs. In [-1, 1].
    pub score: f64,
    /// Share of emotional plus intensifier tokens, capped at 1.
    pub intensity: f64,
    pub positive_count: usize,
    pub negative_count: usize,
    pub total_words: usize,
    /// Emotional tokens in the order they appear (repeats kept).
    pub keywords: Vec<String>,
}

impl SentimentAnalysis {
    fn neutral() -> Self {
        Self {
            score: 0.0,
            intensity: 0.0,
            positive_count: 0,
            negative_count: 0,
            total_words: 0,
            keywords: Vec::new(),
        }
    }
}

fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    NON_WORD
        .split(&lowered)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn analyze_text(text: &str) -> SentimentAnalysis {
    let tokens = tokenize(text);
    if tokens.is_empty() {
        return SentimentAnalysis::neutral();
    }

    let mut positive_count = 0;
    let mut negative_count = 0;
    let mut intensity_count = 0;
    let mut keywords = Vec::new();

    for token in &tokens {
        if lexicon::is_positive(token) {
            positive_count += 1;
            keywords.push(token.clone());
        } else if lexicon::is_negative(token) {
            negative_count += 1;
            keywords.push(token.clone());
        }
        if lexicon::is_intensifier(token) {
            intensity_count += 1;
        }
    }

    let emotional = positive_count + negative_count;
    let total = tokens.len() as f64;
    let score = if emotional == 0 {
        0.0
    } else {
        (positive_count as f64 - negative_count as f64) / emotional as f64
    };
    let intensity = (emotional as f64 / total + intensity_count as f64 / total).min(1.0);

    SentimentAnalysis {
        score,
        intensity,
        positive_count,
        negative_count,
        total_words: tokens.len(),
        keywords,
    }
}

/// Strongly negative, or names any distress word.
pub fn is_distressed(text: &str) -> bool {
    let analysis = analyze_text(text);
    analysis.score < -0.5 || analysis.keywords.iter().any(|k| lexicon::is_distress(k))
}

/// Strongly positive and names at least one uplift word.
pub fn is_positive(text: &str) -> bool {
    let analysis = analyze_text(text);
    analysis.score > 0.5 && analysis.keywords.iter().any(|k| lexicon::is_uplift(k))
}
