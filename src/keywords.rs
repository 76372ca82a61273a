// 🗂️ Keyword Registry - Intents as Data
// Ordered intent -> keyword mappings, decoded once at startup and shared
// read-only afterwards.

use anyhow::{Context as AnyhowContext, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

// ============================================================================
// KEYWORD MAPPING
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordMapping {
    /// Intent identifier (e.g. "cardManagement")
    #[serde(rename = "intent")]
    pub intent_id: String,

    /// Keyword phrases, in the order they were declared
    pub keywords: Vec<String>,

    /// Sample utterances for this intent
    #[serde(default)]
    pub examples: Vec<String>,
}

impl KeywordMapping {
    pub fn new<I, S>(intent_id: impl Into<String>, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        KeywordMapping {
            intent_id: intent_id.into(),
            keywords: keywords.into_iter().map(Into::into).collect(),
            examples: Vec::new(),
        }
    }

    /// Builder: add example utterance
    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.examples.push(example.into());
        self
    }
}

// ============================================================================
// KEYWORD REGISTRY
// ============================================================================

/// KeywordRegistry - Immutable, ordered catalog of intents
///
/// Registry order matters: the scorer breaks ties in favour of the
/// earlier mapping. There are no mutating methods; share it with `Arc`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordRegistry {
    mappings: Vec<KeywordMapping>,
}

impl KeywordRegistry {
    pub fn from_mappings(mappings: Vec<KeywordMapping>) -> Self {
        KeywordRegistry { mappings }
    }

    /// Decode the `[{intent, keywords, examples?}]` resource format
    pub fn from_json(json: &str) -> Result<Self> {
        let mappings: Vec<KeywordMapping> =
            serde_json::from_str(json).context("Failed to parse keyword mapping JSON")?;

        info!(intents = mappings.len(), "keyword registry loaded");
        Ok(KeywordRegistry::from_mappings(mappings))
    }

    /// Load registry from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read keyword mapping file: {:?}", path.as_ref()))?;

        Self::from_json(&content)
    }

    pub fn mappings(&self) -> &[KeywordMapping] {
        &self.mappings
    }

    pub fn get(&self, intent_id: &str) -> Option<&KeywordMapping> {
        self.mappings.iter().find(|m| m.intent_id == intent_id)
    }

    pub fn contains(&self, intent_id: &str) -> bool {
        self.get(intent_id).is_some()
    }

    /// Intent ids in registry order
    pub fn intents(&self) -> Vec<&str> {
        self.mappings.iter().map(|m| m.intent_id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// One line per intent: `- cardManagement: freeze, card, debit`
    pub fn keyword_listing(&self) -> String {
        self.mappings
            .iter()
            .map(|m| format!("- {}: {}", m.intent_id, m.keywords.join(", ")))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// One line per example: `- Input: 'Freeze my card' -> Output: intent = 'cardManagement'`
    pub fn example_listing(&self) -> String {
        self.mappings
            .iter()
            .flat_map(|m| {
                m.examples.iter().map(move |example| {
                    format!("- Input: '{}' -> Output: intent = '{}'", example, m.intent_id)
                })
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// ============================================================================
// TESTS
// ============================================================================
