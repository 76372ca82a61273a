// 💵 Currency Normalizer
// Validates a raw (dollars, cents) pair and formats it as "$D.CC"

use crate::error::{NormalizeError, NormalizeResult};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// RAW AMOUNT
// ============================================================================

/// RawAmount - Dollar and cent integers exactly as the extraction layer produced them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAmount {
    pub dollars: i64,
    pub cents: i64,
}

impl RawAmount {
    pub fn new(dollars: i64, cents: i64) -> Self {
        RawAmount { dollars, cents }
    }
}

// ============================================================================
// MONEY AMOUNT
// ============================================================================

/// MoneyAmount - A validated amount
///
/// Invariant: dollars >= 0 and cents in 0..=99. Fields are private so
/// `MoneyAmount::new` is the only way to build one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct MoneyAmount {
    dollars: u64,
    cents: u8,
}

impl MoneyAmount {
    /// Validate and build an amount
    ///
    /// # Returns
    /// * `Ok(MoneyAmount)` - when both bounds hold
    /// * `Err(NormalizeError::InvalidCurrency)` - otherwise
    pub fn new(dollars: i64, cents: i64) -> NormalizeResult<Self> {
        if dollars < 0 || !(0..=99).contains(&cents) {
            return Err(NormalizeError::InvalidCurrency { dollars, cents });
        }

        Ok(MoneyAmount {
            dollars: dollars as u64,
            cents: cents as u8,
        })
    }

    pub fn dollars(&self) -> u64 {
        self.dollars
    }

    pub fn cents(&self) -> u8 {
        self.cents
    }

    /// Total value in cents (saturates on absurdly large dollar values)
    pub fn total_cents(&self) -> u64 {
        self.dollars
            .saturating_mul(100)
            .saturating_add(self.cents as u64)
    }

    /// "$42.15"
    pub fn formatted(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for MoneyAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.dollars, self.cents)
    }
}

impl TryFrom<RawAmount> for MoneyAmount {
    type Error = NormalizeError;

    fn try_from(raw: RawAmount) -> NormalizeResult<Self> {
        MoneyAmount::new(raw.dollars, raw.cents)
    }
}

/// CurrencyNormalizer entry point
pub fn normalize(dollars: i64, cents: i64) -> NormalizeResult<MoneyAmount> {
    MoneyAmount::new(dollars, cents)
}

// ============================================================================
// TESTS
// ============================================================================
