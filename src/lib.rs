// Banking Intent Normalizer - Core Library
// Deterministic post-processing for model-extracted banking intents:
// date phrases, amounts, keyword fallback classification.

pub mod error;
pub mod currency;
pub mod temporal;
pub mod keywords;
pub mod scorer;
pub mod intent;
pub mod config;

// Re-export commonly used types
pub use error::{NormalizeError, NormalizeResult};
pub use currency::{normalize, MoneyAmount, RawAmount};
pub use temporal::{
    DateDetector, DateMatcher, EmbeddedDateDetector, Phrase, Resolution,
    ResolvedDate, TemporalResolver, TimeZonePolicy, CANONICAL_DATE_FORMAT,
};
pub use keywords::{KeywordMapping, KeywordRegistry};
pub use scorer::{classify, KeywordMatch, KeywordOverlapScorer};
pub use intent::{
    AccountType, IntentDetail, IntentDetailNormalizer, PaymentType,
    RawIntentFields, UserIntent, UserIntentId,
};
pub use config::NormalizerConfig;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
