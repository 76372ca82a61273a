// ⚠️ Error Taxonomy
// Only amount validation can fail a normalization. Unresolved dates and
// missing keyword matches are absences, not errors.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    /// Dollars below zero or cents outside 0..=99
    #[error("invalid currency amount: {dollars} dollars, {cents} cents")]
    InvalidCurrency { dollars: i64, cents: i64 },
}

pub type NormalizeResult<T> = Result<T, NormalizeError>;
