// 🎯 Keyword Overlap Scorer
// Deterministic fallback classifier: counts how many of an intent's keyword
// tokens appear in the utterance and returns the best-scoring intent.
//
// Order-sensitive (ties keep the earliest-registered intent) and
// duplicate-sensitive (a keyword word listed twice counts twice).

use crate::keywords::{KeywordMapping, KeywordRegistry};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordMatch {
    pub intent_id: String,
    /// Always > 0
    pub score: usize,
}

/// Lowercase alphanumeric words of an utterance
pub fn tokenize_utterance(utterance: &str) -> HashSet<String> {
    utterance
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .collect()
}

/// Words of a keyword phrase, split on spaces, duplicates kept
fn keyword_tokens(keyword: &str) -> impl Iterator<Item = String> + '_ {
    keyword
        .split(' ')
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
}

/// Overlap score of one candidate against an utterance's word set
pub fn score(words: &HashSet<String>, candidate: &KeywordMapping) -> usize {
    candidate
        .keywords
        .iter()
        .flat_map(|keyword| keyword_tokens(keyword))
        .filter(|token| words.contains(token))
        .count()
}

/// Best candidate for an utterance, or `None` when nothing overlaps
pub fn classify(utterance: &str, candidates: &[KeywordMapping]) -> Option<KeywordMatch> {
    let words = tokenize_utterance(utterance);
    let mut best: Option<(&KeywordMapping, usize)> = None;

    for candidate in candidates {
        let overlap = score(&words, candidate);
        // Strictly greater: ties keep the earlier candidate
        if overlap > best.map_or(0, |(_, s)| s) {
            best = Some((candidate, overlap));
        }
    }

    best.map(|(candidate, score)| KeywordMatch {
        intent_id: candidate.intent_id.clone(),
        score,
    })
}

// ============================================================================
// SCORER
// ============================================================================

/// KeywordOverlapScorer - `classify` bound to an injected registry
#[derive(Debug, Clone)]
pub struct KeywordOverlapScorer {
    registry: Arc<KeywordRegistry>,
}

impl KeywordOverlapScorer {
    pub fn new(registry: Arc<KeywordRegistry>) -> Self {
        KeywordOverlapScorer { registry }
    }

    pub fn registry(&self) -> &KeywordRegistry {
        &self.registry
    }

    pub fn classify(&self, utterance: &str) -> Option<KeywordMatch> {
        let result = classify(utterance, self.registry.mappings());
        match &result {
            Some(m) => debug!(intent = %m.intent_id, score = m.score, "keyword match"),
            None => debug!(utterance, "no keyword match"),
        }
        result
    }

    /// Tool-style text output
    pub fn describe(&self, utterance: &str) -> String {
        match self.classify(utterance) {
            Some(m) => format!("Matched intent: {}", m.intent_id),
            None => format!("No matching intent found for: '{}'", utterance),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
