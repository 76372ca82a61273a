// ⚙️ Configuration
// JSON file and environment overrides for the normalization pipeline

use crate::keywords::KeywordRegistry;
use crate::temporal::{TemporalResolver, TimeZonePolicy};
use anyhow::{anyhow, Context as AnyhowContext, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_REGISTRY: &str = "BANKING_INTENT_REGISTRY";
pub const ENV_FALLBACK: &str = "BANKING_INTENT_FALLBACK";
pub const ENV_TIME_ZONE: &str = "BANKING_INTENT_TZ";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Keyword mapping JSON file
    pub registry_path: Option<PathBuf>,

    /// Whether the embedded-date fallback detector runs last in the chain
    pub use_fallback_detector: bool,

    /// Clock used for "now"
    pub time_zone: TimeZonePolicy,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        NormalizerConfig {
            registry_path: None,
            use_fallback_detector: true,
            time_zone: TimeZonePolicy::Local,
        }
    }
}

impl NormalizerConfig {
    /// Load config from JSON file; missing keys keep their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        serde_json::from_str(&content).context("Failed to parse config JSON")
    }

    /// Defaults plus environment overrides
    pub fn from_env() -> Result<Self> {
        Self::default().with_overrides(|key| env::var(key).ok())
    }

    /// Apply overrides from any key/value source
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_REGISTRY).filter(|p| !p.trim().is_empty()) {
            self.registry_path = Some(PathBuf::from(path));
        }

        if let Some(flag) = lookup(ENV_FALLBACK) {
            self.use_fallback_detector = parse_flag(&flag)
                .ok_or_else(|| anyhow!("{} must be a boolean, got {:?}", ENV_FALLBACK, flag))?;
        }

        if let Some(zone) = lookup(ENV_TIME_ZONE) {
            self.time_zone = TimeZonePolicy::parse(&zone)
                .ok_or_else(|| anyhow!("{} must be 'local' or 'utc', got {:?}", ENV_TIME_ZONE, zone))?;
        }

        Ok(self)
    }

    pub fn resolver(&self) -> TemporalResolver {
        let resolver = if self.use_fallback_detector {
            TemporalResolver::new()
        } else {
            TemporalResolver::without_fallback()
        };
        resolver.with_time_zone(self.time_zone)
    }

    /// Registry from `registry_path`, or an empty registry when none is configured
    pub fn load_registry(&self) -> Result<KeywordRegistry> {
        match &self.registry_path {
            Some(path) => KeywordRegistry::from_file(path),
            None => Ok(KeywordRegistry::default()),
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

// ============================================================================
// TESTS
// ============================================================================
