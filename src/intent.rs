// 🧾 Intent Detail Normalizer
// Turns raw extracted fields into a validated IntentDetail, and a
// classified intent id into a UserIntent.
//
// Composition policy:
// - Unknown type / account type strings degrade to `Unknown` (never fail)
// - An invalid amount fails the whole build (no partial record)
// - An unresolved date just leaves `date` empty

use crate::currency::{MoneyAmount, RawAmount};
use crate::error::NormalizeResult;
use crate::keywords::KeywordRegistry;
use crate::temporal::{ResolvedDate, TemporalResolver};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

// ============================================================================
// CLOSED VALUE SETS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PaymentType {
    Send,
    Receive,
    BillPayment,
    Unknown,
}

impl PaymentType {
    /// Map a raw extracted value; anything unrecognized is `Unknown`
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            "send" => PaymentType::Send,
            // "recevie" is the spelling older extraction prompts asked for
            "receive" | "recevie" => PaymentType::Receive,
            "billPayment" => PaymentType::BillPayment,
            _ => PaymentType::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Send => "send",
            PaymentType::Receive => "receive",
            PaymentType::BillPayment => "billPayment",
            PaymentType::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AccountType {
    CreditCard,
    Saving,
    Checking,
    Unknown,
}

impl AccountType {
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            Some("creditCard") => AccountType::CreditCard,
            Some("saving") => AccountType::Saving,
            Some("checking") => AccountType::Checking,
            _ => AccountType::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::CreditCard => "creditCard",
            AccountType::Saving => "saving",
            AccountType::Checking => "checking",
            AccountType::Unknown => "unknown",
        }
    }
}

// ============================================================================
// RAW FIELDS
// ============================================================================

/// RawIntentFields - Exactly what the extraction layer handed over
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawIntentFields {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub recipient: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub amount: Option<RawAmount>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub account_type: Option<String>,
    #[serde(default)]
    pub account_number: Option<String>,
}

impl RawIntentFields {
    pub fn new(kind: impl Into<String>) -> Self {
        RawIntentFields {
            kind: kind.into(),
            ..Default::default()
        }
    }

    pub fn with_recipient(mut self, recipient: impl Into<String>) -> Self {
        self.recipient = Some(recipient.into());
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_amount(mut self, dollars: i64, cents: i64) -> Self {
        self.amount = Some(RawAmount::new(dollars, cents));
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn with_account_type(mut self, account_type: impl Into<String>) -> Self {
        self.account_type = Some(account_type.into());
        self
    }

    pub fn with_account_number(mut self, account_number: impl Into<String>) -> Self {
        self.account_number = Some(account_number.into());
        self
    }
}

// ============================================================================
// INTENT DETAIL
// ============================================================================

/// IntentDetail - Normalized, validated record
///
/// Only `IntentDetailNormalizer` builds one; fields are read through accessors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentDetail {
    #[serde(rename = "type")]
    kind: PaymentType,
    recipient: Option<String>,
    reason: Option<String>,
    amount: Option<MoneyAmount>,
    date: Option<ResolvedDate>,
    account_type: AccountType,
    account_number: Option<String>,
}

impl IntentDetail {
    pub fn kind(&self) -> PaymentType {
        self.kind
    }

    pub fn recipient(&self) -> Option<&str> {
        self.recipient.as_deref()
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    pub fn amount(&self) -> Option<MoneyAmount> {
        self.amount
    }

    pub fn date(&self) -> Option<ResolvedDate> {
        self.date
    }

    pub fn account_type(&self) -> AccountType {
        self.account_type
    }

    pub fn account_number(&self) -> Option<&str> {
        self.account_number.as_deref()
    }

    /// One-line tool output: "Payment of $42.15 to Mom for rent on 04/07/2024, using checking"
    pub fn summary(&self) -> String {
        let mut value = String::from("Payment");
        if let Some(amount) = &self.amount {
            value.push_str(&format!(" of {}", amount));
        }
        if let Some(recipient) = &self.recipient {
            value.push_str(&format!(" to {}", recipient));
        }
        if let Some(reason) = &self.reason {
            value.push_str(&format!(" for {}", reason));
        }
        if let Some(date) = &self.date {
            value.push_str(&format!(" on {}", date));
        }
        if self.account_type != AccountType::Unknown {
            value.push_str(&format!(", using {}", self.account_type.as_str()));
        }
        value
    }
}

fn or_none<T: fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "none".to_string(), |v| v.to_string())
}

impl fmt::Display for IntentDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "IntentDetail(")?;
        writeln!(f, "    type: {}", self.kind.as_str())?;
        writeln!(f, "    recipient: {}", or_none(self.recipient()))?;
        writeln!(f, "    reason: {}", or_none(self.reason()))?;
        writeln!(f, "    amount: {}", or_none(self.amount))?;
        writeln!(f, "    accountType: {}", self.account_type.as_str())?;
        writeln!(f, "    accountNumber: {}", or_none(self.account_number()))?;
        writeln!(f, "    date: {}", or_none(self.date))?;
        write!(f, ")")
    }
}

// ============================================================================
// USER INTENT
// ============================================================================

/// Identifiers the registry can name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UserIntentId {
    #[serde(rename = "payment")]
    Payment,
    #[serde(rename = "scheduleAppointment")]
    ScheduleAppointment,
    #[serde(rename = "checkFICO")]
    CheckFico,
    #[serde(rename = "findATM")]
    FindAtm,
    #[serde(rename = "cardManagement")]
    CardManagement,
    #[serde(rename = "accountQuery")]
    AccountQuery,
    #[serde(rename = "unknown")]
    Unknown,
}

impl UserIntentId {
    pub const ALL: [UserIntentId; 7] = [
        UserIntentId::Payment,
        UserIntentId::ScheduleAppointment,
        UserIntentId::CheckFico,
        UserIntentId::FindAtm,
        UserIntentId::CardManagement,
        UserIntentId::AccountQuery,
        UserIntentId::Unknown,
    ];

    pub fn parse(raw: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == raw)
            .unwrap_or(UserIntentId::Unknown)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserIntentId::Payment => "payment",
            UserIntentId::ScheduleAppointment => "scheduleAppointment",
            UserIntentId::CheckFico => "checkFICO",
            UserIntentId::FindAtm => "findATM",
            UserIntentId::CardManagement => "cardManagement",
            UserIntentId::AccountQuery => "accountQuery",
            UserIntentId::Unknown => "unknown",
        }
    }
}

/// UserIntent - One case per intent; only payments carry a detail record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "intent", content = "details", rename_all = "camelCase")]
pub enum UserIntent {
    Payment(IntentDetail),
    ScheduleAppointment,
    #[serde(rename = "checkFICO")]
    CheckFico,
    #[serde(rename = "findATM")]
    FindAtm,
    CardManagement,
    AccountQuery,
    Unknown,
}

impl UserIntent {
    pub fn id(&self) -> UserIntentId {
        match self {
            UserIntent::Payment(_) => UserIntentId::Payment,
            UserIntent::ScheduleAppointment => UserIntentId::ScheduleAppointment,
            UserIntent::CheckFico => UserIntentId::CheckFico,
            UserIntent::FindAtm => UserIntentId::FindAtm,
            UserIntent::CardManagement => UserIntentId::CardManagement,
            UserIntent::AccountQuery => UserIntentId::AccountQuery,
            UserIntent::Unknown => UserIntentId::Unknown,
        }
    }

    pub fn detail(&self) -> Option<&IntentDetail> {
        match self {
            UserIntent::Payment(detail) => Some(detail),
            _ => None,
        }
    }
}

// ============================================================================
// NORMALIZER
// ============================================================================

/// IntentDetailNormalizer - Composes currency validation and date resolution
#[derive(Debug, Clone)]
pub struct IntentDetailNormalizer {
    registry: Arc<KeywordRegistry>,
    resolver: TemporalResolver,
}

impl IntentDetailNormalizer {
    pub fn new(registry: Arc<KeywordRegistry>, resolver: TemporalResolver) -> Self {
        IntentDetailNormalizer { registry, resolver }
    }

    pub fn registry(&self) -> &KeywordRegistry {
        &self.registry
    }

    pub fn resolver(&self) -> &TemporalResolver {
        &self.resolver
    }

    /// Build a detail record, reading the clock once for the date field
    pub fn build(&self, fields: RawIntentFields) -> NormalizeResult<IntentDetail> {
        self.build_at(fields, self.resolver.time_zone().now())
    }

    /// Build a detail record against a fixed "now"
    ///
    /// # Returns
    /// * `Ok(IntentDetail)` - every field normalized; `date` may be empty
    /// * `Err(NormalizeError::InvalidCurrency)` - the amount was out of bounds
    pub fn build_at(&self, fields: RawIntentFields, now: NaiveDateTime) -> NormalizeResult<IntentDetail> {
        let amount = match fields.amount {
            Some(raw) => Some(MoneyAmount::try_from(raw).map_err(|err| {
                warn!(dollars = raw.dollars, cents = raw.cents, "rejecting intent with invalid amount");
                err
            })?),
            None => None,
        };

        let date = fields
            .date
            .as_deref()
            .and_then(|text| self.resolver.resolve_at(Some(text), now));

        let detail = IntentDetail {
            kind: PaymentType::from_raw(&fields.kind),
            recipient: fields.recipient,
            reason: fields.reason,
            amount,
            date,
            account_type: AccountType::from_raw(fields.account_type.as_deref()),
            account_number: fields.account_number,
        };

        debug!(summary = %detail.summary(), "intent detail built");
        Ok(detail)
    }

    /// Turn a classified intent id plus optional fields into a UserIntent
    ///
    /// Ids the registry doesn't list become `Unknown`. A payment without
    /// fields is also `Unknown`; a payment with an invalid amount is an error.
    pub fn assemble(&self, intent_id: &str, fields: Option<RawIntentFields>) -> NormalizeResult<UserIntent> {
        self.assemble_at(intent_id, fields, self.resolver.time_zone().now())
    }

    pub fn assemble_at(
        &self,
        intent_id: &str,
        fields: Option<RawIntentFields>,
        now: NaiveDateTime,
    ) -> NormalizeResult<UserIntent> {
        if !self.registry.contains(intent_id) {
            debug!(intent_id, "intent id not in registry");
            return Ok(UserIntent::Unknown);
        }

        let intent = match UserIntentId::parse(intent_id) {
            UserIntentId::Payment => match fields {
                Some(fields) => UserIntent::Payment(self.build_at(fields, now)?),
                None => UserIntent::Unknown,
            },
            UserIntentId::ScheduleAppointment => UserIntent::ScheduleAppointment,
            UserIntentId::CheckFico => UserIntent::CheckFico,
            UserIntentId::FindAtm => UserIntent::FindAtm,
            UserIntentId::CardManagement => UserIntent::CardManagement,
            UserIntentId::AccountQuery => UserIntent::AccountQuery,
            UserIntentId::Unknown => UserIntent::Unknown,
        };

        Ok(intent)
    }
}

// ============================================================================
// TESTS
// ============================================================================
