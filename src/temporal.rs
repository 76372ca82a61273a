// ⏰ Temporal Resolver
// Maps free-form date phrases ("tomorrow", "in 2 weeks", "July 4, 2024",
// "fri") to a canonical dd/MM/yyyy calendar date.
//
// Resolution is a chain of independent matchers tried in a fixed order;
// the first one that answers wins:
// 1. Explicit formats      - "2024-07-04", "July 4", "8:30 PM"
// 2. Relative offsets      - "in 10 days", "after 2 weeks", "3 months from now"
// 3. Next unit             - "next week|month|year"
// 4. Keyword table         - "tomorrow", "asap", "whenever" (never resolves)
// 5. Weekday names         - "monday", "fri", "next Mon"
// 6. Fallback detector     - dates embedded in longer phrases
//
// Everything is computed from a single clock reading per call.

use chrono::{Datelike, Days, Local, Months, NaiveDate, NaiveDateTime, Utc, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Canonical output format (dd/MM/yyyy)
pub const CANONICAL_DATE_FORMAT: &str = "%d/%m/%Y";

// ============================================================================
// RESOLVED DATE
// ============================================================================

/// ResolvedDate - A calendar date with no time-of-day component
///
/// Displays and serializes as `dd/MM/yyyy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResolvedDate(NaiveDate);

impl ResolvedDate {
    pub fn new(date: NaiveDate) -> Self {
        ResolvedDate(date)
    }

    /// Parse a canonical `dd/MM/yyyy` string back into a date
    pub fn parse(text: &str) -> Option<Self> {
        NaiveDate::parse_from_str(text.trim(), CANONICAL_DATE_FORMAT)
            .ok()
            .map(ResolvedDate)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn formatted(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ResolvedDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(CANONICAL_DATE_FORMAT))
    }
}

impl Serialize for ResolvedDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ============================================================================
// CLOCK
// ============================================================================

/// Which wall clock "now" is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeZonePolicy {
    #[default]
    Local,
    Utc,
}

impl TimeZonePolicy {
    pub fn now(&self) -> NaiveDateTime {
        match self {
            TimeZonePolicy::Local => Local::now().naive_local(),
            TimeZonePolicy::Utc => Utc::now().naive_utc(),
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_lowercase().as_str() {
            "local" => Some(TimeZonePolicy::Local),
            "utc" => Some(TimeZonePolicy::Utc),
            _ => None,
        }
    }
}

// ============================================================================
// MATCHER CONTRACT
// ============================================================================

/// Phrase - The input as seen by matchers
///
/// `raw` is the trimmed input text, `normalized` is the same text lowercased.
#[derive(Debug, Clone)]
pub struct Phrase<'a> {
    pub raw: &'a str,
    pub normalized: String,
}

impl<'a> Phrase<'a> {
    pub fn new(text: &'a str) -> Self {
        let raw = text.trim();
        Phrase {
            raw,
            normalized: raw.to_lowercase(),
        }
    }
}

/// Resolution - What a matcher concluded about a phrase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The phrase names this date
    Date(NaiveDate),
    /// The phrase is recognized and deliberately has no date ("whenever").
    /// Stops the chain.
    Unresolvable,
}

/// DateMatcher - One strategy in the resolution chain
///
/// Returns `None` when the strategy does not recognize the phrase, letting the
/// next matcher try.
pub trait DateMatcher: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    fn try_match(&self, phrase: &Phrase<'_>, now: NaiveDateTime) -> Option<Resolution>;
}

// ============================================================================
// DATE ARITHMETIC
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OffsetUnit {
    Day,
    Week,
    Month,
    Year,
}

impl OffsetUnit {
    fn parse(text: &str) -> Option<Self> {
        match text {
            "day" | "days" => Some(OffsetUnit::Day),
            "week" | "weeks" => Some(OffsetUnit::Week),
            "month" | "months" => Some(OffsetUnit::Month),
            "year" | "years" => Some(OffsetUnit::Year),
            _ => None,
        }
    }

    /// Add `count` units to `date`; month and year steps clamp to the
    /// last valid day of the target month
    fn add_to(self, date: NaiveDate, count: u32) -> Option<NaiveDate> {
        match self {
            OffsetUnit::Day => date.checked_add_days(Days::new(count as u64)),
            OffsetUnit::Week => date.checked_add_days(Days::new(count as u64 * 7)),
            OffsetUnit::Month => date.checked_add_months(Months::new(count)),
            OffsetUnit::Year => date.checked_add_months(Months::new(count.checked_mul(12)?)),
        }
    }
}

fn shift_days(date: NaiveDate, offset: i64) -> Option<NaiveDate> {
    if offset >= 0 {
        date.checked_add_days(Days::new(offset as u64))
    } else {
        date.checked_sub_days(Days::new(offset.unsigned_abs()))
    }
}

/// Weekday names in canonical Sunday-first order
const WEEKDAY_NAMES: [(&str, Weekday); 7] = [
    ("sunday", Weekday::Sun),
    ("monday", Weekday::Mon),
    ("tuesday", Weekday::Tue),
    ("wednesday", Weekday::Wed),
    ("thursday", Weekday::Thu),
    ("friday", Weekday::Fri),
    ("saturday", Weekday::Sat),
];

fn weekday_by_full_name(name: &str) -> Option<Weekday> {
    WEEKDAY_NAMES
        .iter()
        .find(|(full, _)| *full == name)
        .map(|(_, weekday)| *weekday)
}

/// Full name or a prefix of at least 3 characters; first hit in Sunday-first order
fn weekday_by_prefix(text: &str) -> Option<Weekday> {
    if text.chars().count() < 3 {
        return None;
    }
    WEEKDAY_NAMES
        .iter()
        .find(|(full, _)| full.starts_with(text))
        .map(|(_, weekday)| *weekday)
}

/// Next occurrence of `target` strictly after `date` (1..=7 days ahead)
pub fn next_weekday(date: NaiveDate, target: Weekday) -> Option<NaiveDate> {
    let current = date.weekday().num_days_from_sunday() as i64;
    let mut days_to_add = target.num_days_from_sunday() as i64 - current;
    if days_to_add <= 0 {
        days_to_add += 7;
    }
    shift_days(date, days_to_add)
}

fn parse_meridiem_hour(hour: &str, meridiem: &str) -> Option<u32> {
    let hour: u32 = hour.parse().ok()?;
    if !(1..=12).contains(&hour) {
        return None;
    }
    match meridiem {
        "am" => Some(hour % 12),
        "pm" => Some(hour % 12 + 12),
        _ => None,
    }
}

// ============================================================================
// 1. EXPLICIT FORMATS
// ============================================================================

static US_SLASH_FULL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{1,2}/\d{1,2}/\d{4}$").unwrap());
static US_SLASH_SHORT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{2}/\d{2}/\d{2}$").unwrap());
static WEEKDAY_HOUR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([a-z]+)\s+(\d{1,2})\s*(am|pm)$").unwrap());
static HOUR_MINUTE_MERIDIEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2}):(\d{2})\s*(am|pm)$").unwrap());
static HOUR_MERIDIEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{1,2})\s*(am|pm)$").unwrap());

/// ExplicitFormat - Absolute or partial date-time shapes, tried in declaration order
///
/// Fields a shape leaves out (year, or the whole date for time-only shapes)
/// come from the current moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplicitFormat {
    /// "July 4", "Jul 4"
    MonthDay,
    /// "7/4/2024"
    UsSlash,
    /// "2024-07-04"
    Iso,
    /// "July 4, 2024"
    MonthDayCommaYear,
    /// "July 4 2024"
    MonthDayYear,
    /// "Monday"
    WeekdayName,
    /// "Monday 8 AM"
    WeekdayHour,
    /// "8:30 PM"
    HourMinuteMeridiem,
    /// "8 PM"
    HourMeridiem,
    /// "4 Jul 2024"
    DayMonthYear,
    /// "07/04/24"
    UsShortYear,
    /// "2024-07-04 13:45:00"
    IsoDateTime,
    /// "07/04/2024 13:45:00"
    UsDateTime,
    /// "2024-07-04 13:45"
    IsoDateMinute,
}

pub const EXPLICIT_FORMATS: [ExplicitFormat; 14] = [
    ExplicitFormat::MonthDay,
    ExplicitFormat::UsSlash,
    ExplicitFormat::Iso,
    ExplicitFormat::MonthDayCommaYear,
    ExplicitFormat::MonthDayYear,
    ExplicitFormat::WeekdayName,
    ExplicitFormat::WeekdayHour,
    ExplicitFormat::HourMinuteMeridiem,
    ExplicitFormat::HourMeridiem,
    ExplicitFormat::DayMonthYear,
    ExplicitFormat::UsShortYear,
    ExplicitFormat::IsoDateTime,
    ExplicitFormat::UsDateTime,
    ExplicitFormat::IsoDateMinute,
];

impl ExplicitFormat {
    /// Parse the whole phrase with this shape
    pub fn parse(self, phrase: &Phrase<'_>, now: NaiveDateTime) -> Option<NaiveDate> {
        let raw = phrase.raw;
        let lower = phrase.normalized.as_str();
        let today = now.date();

        match self {
            ExplicitFormat::MonthDay => {
                // Month names only; a bare number must not pick up the current year
                if !raw.starts_with(|c: char| c.is_ascii_alphabetic()) {
                    return None;
                }
                let with_year = format!("{} {}", raw, today.year());
                NaiveDate::parse_from_str(&with_year, "%B %d %Y").ok()
            }
            ExplicitFormat::UsSlash => {
                if !US_SLASH_FULL.is_match(raw) {
                    return None;
                }
                NaiveDate::parse_from_str(raw, "%m/%d/%Y").ok()
            }
            ExplicitFormat::Iso => NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok(),
            ExplicitFormat::MonthDayCommaYear => NaiveDate::parse_from_str(raw, "%B %d, %Y").ok(),
            ExplicitFormat::MonthDayYear => NaiveDate::parse_from_str(raw, "%B %d %Y").ok(),
            ExplicitFormat::WeekdayName => {
                weekday_by_full_name(lower).and_then(|weekday| next_weekday(today, weekday))
            }
            ExplicitFormat::WeekdayHour => {
                let caps = WEEKDAY_HOUR.captures(lower)?;
                let weekday = weekday_by_full_name(&caps[1])?;
                parse_meridiem_hour(&caps[2], &caps[3])?;
                next_weekday(today, weekday)
            }
            ExplicitFormat::HourMinuteMeridiem => {
                let caps = HOUR_MINUTE_MERIDIEM.captures(lower)?;
                let minute: u32 = caps[2].parse().ok()?;
                parse_meridiem_hour(&caps[1], &caps[3])?;
                (minute < 60).then_some(today)
            }
            ExplicitFormat::HourMeridiem => {
                let caps = HOUR_MERIDIEM.captures(lower)?;
                parse_meridiem_hour(&caps[1], &caps[2]).map(|_| today)
            }
            ExplicitFormat::DayMonthYear => NaiveDate::parse_from_str(raw, "%d %b %Y").ok(),
            ExplicitFormat::UsShortYear => {
                if !US_SLASH_SHORT.is_match(raw) {
                    return None;
                }
                NaiveDate::parse_from_str(raw, "%m/%d/%y").ok()
            }
            ExplicitFormat::IsoDateTime => NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date()),
            ExplicitFormat::UsDateTime => NaiveDateTime::parse_from_str(raw, "%m/%d/%Y %H:%M:%S")
                .ok()
                .map(|dt| dt.date()),
            ExplicitFormat::IsoDateMinute => NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M")
                .ok()
                .map(|dt| dt.date()),
        }
    }
}

pub struct ExplicitFormatMatcher;

impl DateMatcher for ExplicitFormatMatcher {
    fn name(&self) -> &'static str {
        "explicit_format"
    }

    fn try_match(&self, phrase: &Phrase<'_>, now: NaiveDateTime) -> Option<Resolution> {
        EXPLICIT_FORMATS
            .iter()
            .find_map(|format| format.parse(phrase, now))
            .map(Resolution::Date)
    }
}

// ============================================================================
// 2. RELATIVE NUMERIC OFFSETS
// ============================================================================

// "[in] N unit", "after N unit", "N unit from now"
static RELATIVE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?:in\s+)?(\d+)\s+(days?|weeks?|months?|years?)\b").unwrap(),
        Regex::new(r"after\s+(\d+)\s+(days?|weeks?|months?|years?)\b").unwrap(),
        Regex::new(r"(\d+)\s+(days?|weeks?|months?|years?)\s+from\s+now").unwrap(),
    ]
});

pub struct RelativeOffsetMatcher;

impl DateMatcher for RelativeOffsetMatcher {
    fn name(&self) -> &'static str {
        "relative_offset"
    }

    fn try_match(&self, phrase: &Phrase<'_>, now: NaiveDateTime) -> Option<Resolution> {
        RELATIVE_PATTERNS.iter().find_map(|pattern| {
            let caps = pattern.captures(&phrase.normalized)?;
            let count: u32 = caps[1].parse().ok()?;
            let unit = OffsetUnit::parse(&caps[2])?;
            unit.add_to(now.date(), count).map(Resolution::Date)
        })
    }
}

// ============================================================================
// 3. NEXT <UNIT>
// ============================================================================

static NEXT_UNIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"next\s+(week|month|year)\b").unwrap());

pub struct NextUnitMatcher;

impl DateMatcher for NextUnitMatcher {
    fn name(&self) -> &'static str {
        "next_unit"
    }

    fn try_match(&self, phrase: &Phrase<'_>, now: NaiveDateTime) -> Option<Resolution> {
        let caps = NEXT_UNIT.captures(&phrase.normalized)?;
        let unit = OffsetUnit::parse(&caps[1])?;
        unit.add_to(now.date(), 1).map(Resolution::Date)
    }
}

// ============================================================================
// 4. KEYWORD TABLE
// ============================================================================

/// Exact phrases and their day offsets
const KEYWORD_OFFSETS: [(&str, i64); 9] = [
    ("tomorrow", 1),
    ("yesterday", -1),
    ("today", 0),
    ("now", 0),
    ("asap", 0),
    ("as soon as possible", 0),
    ("immediately", 0),
    ("the day after tomorrow", 2),
    ("the day before yesterday", -2),
];

/// Phrases that never resolve, whatever later strategies could infer
const NEVER_RESOLVED: [&str; 1] = ["whenever"];

pub struct KeywordMatcher;

impl DateMatcher for KeywordMatcher {
    fn name(&self) -> &'static str {
        "keyword"
    }

    fn try_match(&self, phrase: &Phrase<'_>, now: NaiveDateTime) -> Option<Resolution> {
        let text = phrase.normalized.as_str();
        if NEVER_RESOLVED.contains(&text) {
            return Some(Resolution::Unresolvable);
        }

        let (_, offset) = KEYWORD_OFFSETS.iter().find(|(keyword, _)| *keyword == text)?;
        shift_days(now.date(), *offset).map(Resolution::Date)
    }
}

// ============================================================================
// 5. WEEKDAY NAMES
// ============================================================================

/// Leading qualifiers that don't change which weekday is meant
const WEEKDAY_QUALIFIERS: [&str; 3] = ["next ", "this ", "on "];

pub struct WeekdayMatcher;

impl DateMatcher for WeekdayMatcher {
    fn name(&self) -> &'static str {
        "weekday"
    }

    fn try_match(&self, phrase: &Phrase<'_>, now: NaiveDateTime) -> Option<Resolution> {
        let mut text = phrase.normalized.as_str();
        for qualifier in WEEKDAY_QUALIFIERS {
            if let Some(rest) = text.strip_prefix(qualifier) {
                text = rest.trim_start();
                break;
            }
        }

        if !text.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }

        let weekday = weekday_by_prefix(text)?;
        next_weekday(now.date(), weekday).map(Resolution::Date)
    }
}

// ============================================================================
// 6. FALLBACK DETECTOR
// ============================================================================

/// DateDetector - Generic natural-language date recognizer
///
/// Used as the last resort once every specific strategy has passed.
pub trait DateDetector: Send + Sync {
    fn detect(&self, text: &str, now: NaiveDateTime) -> Option<NaiveDate>;
}

const MONTH_PREFIXES: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

static EMBEDDED_ISO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b").unwrap());
static EMBEDDED_US: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b").unwrap());
static EMBEDDED_MONTH_DAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(january|jan|february|feb|march|mar|april|apr|may|june|jun|july|jul|august|aug|september|sept?|october|oct|november|nov|december|dec)\.?\s+(\d{1,2})(?:st|nd|rd|th)?\b(?:,?\s+(\d{4})\b)?",
    )
    .unwrap()
});
static EMBEDDED_KEYWORDS: Lazy<Vec<(Regex, i64)>> = Lazy::new(|| {
    vec![
        (Regex::new(r"\bday\s+after\s+tomorrow\b").unwrap(), 2),
        (Regex::new(r"\bday\s+before\s+yesterday\b").unwrap(), -2),
        (Regex::new(r"\btomorrow\b").unwrap(), 1),
        (Regex::new(r"\byesterday\b").unwrap(), -1),
        (Regex::new(r"\btonight\b").unwrap(), 0),
        (Regex::new(r"\btoday\b").unwrap(), 0),
    ]
});
static EMBEDDED_WEEKDAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(sunday|monday|tuesday|wednesday|thursday|friday|saturday|mon|tues?|thu(?:rs?)?|fri)\b")
        .unwrap()
});

/// EmbeddedDateDetector - Finds a date mentioned somewhere inside a longer phrase
///
/// Checks, in order: explicit ISO and US dates, month-name dates, relative
/// keywords, then weekday names. "tomorrow at 8am" and "next wednesday at
/// 14:30" resolve; "after lunch" does not. Month and weekday names must be
/// whole words, and the bare forms "sun", "wed" and "sat" are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedDateDetector;

impl DateDetector for EmbeddedDateDetector {
    fn detect(&self, text: &str, now: NaiveDateTime) -> Option<NaiveDate> {
        let text = text.to_lowercase();
        let today = now.date();

        if let Some(caps) = EMBEDDED_ISO.captures(&text) {
            let date = NaiveDate::from_ymd_opt(
                caps[1].parse().ok()?,
                caps[2].parse().ok()?,
                caps[3].parse().ok()?,
            );
            if date.is_some() {
                return date;
            }
        }

        if let Some(caps) = EMBEDDED_US.captures(&text) {
            let date = NaiveDate::from_ymd_opt(
                caps[3].parse().ok()?,
                caps[1].parse().ok()?,
                caps[2].parse().ok()?,
            );
            if date.is_some() {
                return date;
            }
        }

        if let Some(caps) = EMBEDDED_MONTH_DAY.captures(&text) {
            let month = MONTH_PREFIXES.iter().position(|m| caps[1].starts_with(m))? as u32 + 1;
            let day: u32 = caps[2].parse().ok()?;
            let year = match caps.get(3) {
                Some(year) => year.as_str().parse().ok()?,
                None => today.year(),
            };
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                return Some(date);
            }
        }

        for (pattern, offset) in EMBEDDED_KEYWORDS.iter() {
            if pattern.is_match(&text) {
                return shift_days(today, *offset);
            }
        }

        let caps = EMBEDDED_WEEKDAY.captures(&text)?;
        let weekday = weekday_by_prefix(&caps[1])?;
        next_weekday(today, weekday)
    }
}

pub struct FallbackMatcher {
    detector: Arc<dyn DateDetector>,
}

impl FallbackMatcher {
    pub fn new(detector: Arc<dyn DateDetector>) -> Self {
        FallbackMatcher { detector }
    }
}

impl DateMatcher for FallbackMatcher {
    fn name(&self) -> &'static str {
        "fallback_detector"
    }

    fn try_match(&self, phrase: &Phrase<'_>, now: NaiveDateTime) -> Option<Resolution> {
        self.detector.detect(phrase.raw, now).map(Resolution::Date)
    }
}

// ============================================================================
// RESOLVER
// ============================================================================

/// TemporalResolver - Ordered chain of date matchers
///
/// Cheap to clone; matchers are shared.
#[derive(Clone)]
pub struct TemporalResolver {
    matchers: Vec<Arc<dyn DateMatcher>>,
    time_zone: TimeZonePolicy,
}

impl TemporalResolver {
    /// Full chain with the built-in embedded-date fallback
    pub fn new() -> Self {
        Self::with_detector(EmbeddedDateDetector)
    }

    /// Full chain with a custom fallback detector
    pub fn with_detector<D: DateDetector + 'static>(detector: D) -> Self {
        let mut resolver = Self::without_fallback();
        resolver
            .matchers
            .push(Arc::new(FallbackMatcher::new(Arc::new(detector))));
        resolver
    }

    /// Steps 1-5 only
    pub fn without_fallback() -> Self {
        TemporalResolver {
            matchers: vec![
                Arc::new(ExplicitFormatMatcher),
                Arc::new(RelativeOffsetMatcher),
                Arc::new(NextUnitMatcher),
                Arc::new(KeywordMatcher),
                Arc::new(WeekdayMatcher),
            ],
            time_zone: TimeZonePolicy::default(),
        }
    }

    /// Builder: read "now" from a different clock
    pub fn with_time_zone(mut self, time_zone: TimeZonePolicy) -> Self {
        self.time_zone = time_zone;
        self
    }

    pub fn time_zone(&self) -> TimeZonePolicy {
        self.time_zone
    }

    /// Names of the matchers in the order they are tried
    pub fn matcher_names(&self) -> Vec<&'static str> {
        self.matchers.iter().map(|m| m.name()).collect()
    }

    /// Resolve against the current wall clock (read once)
    pub fn resolve(&self, phrase: Option<&str>) -> Option<ResolvedDate> {
        self.resolve_at(phrase, self.time_zone.now())
    }

    /// Resolve against a fixed "now"
    ///
    /// # Returns
    /// * `Some(ResolvedDate)` - first matcher that recognized the phrase
    /// * `None` - empty input, "whenever", or nothing recognized
    pub fn resolve_at(&self, phrase: Option<&str>, now: NaiveDateTime) -> Option<ResolvedDate> {
        let phrase = Phrase::new(phrase?);
        if phrase.raw.is_empty() {
            return None;
        }

        for matcher in &self.matchers {
            match matcher.try_match(&phrase, now) {
                Some(Resolution::Date(date)) => {
                    debug!(phrase = phrase.raw, matcher = matcher.name(), %date, "date phrase resolved");
                    return Some(ResolvedDate(date));
                }
                Some(Resolution::Unresolvable) => {
                    debug!(phrase = phrase.raw, matcher = matcher.name(), "date phrase never resolves");
                    return None;
                }
                None => continue,
            }
        }

        debug!(phrase = phrase.raw, "date phrase unresolved");
        None
    }
}

impl Default for TemporalResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TemporalResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemporalResolver")
            .field("matchers", &self.matcher_names())
            .field("time_zone", &self.time_zone)
            .finish()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    /// Wednesday 2 July 2025, 10:30
    fn wednesday() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 7, 2)
            .unwrap()
            .and_time(NaiveTime::from_hms_opt(10, 30, 0).unwrap())
    }

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(9, 0, 0).unwrap()
    }

    fn resolve(phrase: &str, now: NaiveDateTime) -> Option<String> {
        TemporalResolver::new()
            .resolve_at(Some(phrase), now)
            .map(|d| d.to_string())
    }

    struct AlwaysDetects;

    impl DateDetector for AlwaysDetects {
        fn detect(&self, _text: &str, _now: NaiveDateTime) -> Option<NaiveDate> {
            NaiveDate::from_ymd_opt(1999, 12, 31)
        }
    }

    #[test]
    fn test_fixture_is_a_wednesday() {
        assert_eq!(wednesday().weekday(), Weekday::Wed);
    }

    #[test]
    fn test_explicit_iso_date() {
        assert_eq!(resolve("2024-07-04", wednesday()), Some("04/07/2024".to_string()));
    }

    #[test]
    fn test_explicit_formats() {
        let now = wednesday();

        assert_eq!(resolve("07/04/2024", now), Some("04/07/2024".to_string()));
        assert_eq!(resolve("7/4/2024", now), Some("04/07/2024".to_string()));
        assert_eq!(resolve("July 4, 2024", now), Some("04/07/2024".to_string()));
        assert_eq!(resolve("July 4 2024", now), Some("04/07/2024".to_string()));
        assert_eq!(resolve("4 Jul 2024", now), Some("04/07/2024".to_string()));
        assert_eq!(resolve("07/04/24", now), Some("04/07/2024".to_string()));
        assert_eq!(resolve("2024-07-04 13:45:00", now), Some("04/07/2024".to_string()));
        assert_eq!(resolve("07/04/2024 13:45:00", now), Some("04/07/2024".to_string()));
        assert_eq!(resolve("2024-07-04 13:45", now), Some("04/07/2024".to_string()));
    }

    #[test]
    fn test_partial_formats_fill_from_now() {
        let now = wednesday();

        // Missing year comes from the current year
        assert_eq!(resolve("July 28", now), Some("28/07/2025".to_string()));
        assert_eq!(resolve("Jul 28", now), Some("28/07/2025".to_string()));

        // Time-only forms resolve to today
        assert_eq!(resolve("8:30 PM", now), Some("02/07/2025".to_string()));
        assert_eq!(resolve("8 am", now), Some("02/07/2025".to_string()));

        // Weekday forms resolve to the next occurrence
        assert_eq!(resolve("Friday", now), Some("04/07/2025".to_string()));
        assert_eq!(resolve("Monday 8 AM", now), Some("07/07/2025".to_string()));
    }

    #[test]
    fn test_explicit_format_order() {
        let phrase = Phrase::new("2024-07-04");
        let now = wednesday();

        let first = EXPLICIT_FORMATS
            .iter()
            .find(|format| format.parse(&phrase, now).is_some());
        assert_eq!(first, Some(&ExplicitFormat::Iso));

        assert_eq!(ExplicitFormat::MonthDay.parse(&Phrase::new("2024"), now), None);
        assert_eq!(ExplicitFormat::HourMeridiem.parse(&Phrase::new("13 pm"), now), None);
    }

    #[test]
    fn test_tomorrow_for_any_date() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let resolver = TemporalResolver::new();

        for offset in 0..400 {
            let today = start + Days::new(offset);
            let now = today.and_hms_opt(23, 59, 59).unwrap();
            let expected = ResolvedDate::new(today + Days::new(1));

            assert_eq!(resolver.resolve_at(Some("tomorrow"), now), Some(expected));
        }
    }

    #[test]
    fn test_relative_offsets() {
        let now = wednesday();

        assert_eq!(resolve("in 10 days", now), Some("12/07/2025".to_string()));
        assert_eq!(resolve("in 2 weeks", now), Some("16/07/2025".to_string()));
        assert_eq!(resolve("after 2 weeks", now), Some("16/07/2025".to_string()));
        assert_eq!(resolve("3 months from now", now), Some("02/10/2025".to_string()));
        assert_eq!(resolve("1 year", now), Some("02/07/2026".to_string()));
        assert_eq!(resolve("In 1 Day", now), Some("03/07/2025".to_string()));
        assert_eq!(resolve("in 2 weeks on monday", now), Some("16/07/2025".to_string()));
    }

    #[test]
    fn test_relative_offsets_match_day_arithmetic() {
        let start = NaiveDate::from_ymd_opt(2023, 12, 20).unwrap();
        let resolver = TemporalResolver::new();

        for offset in 0..60 {
            let today = start + Days::new(offset);
            let now = today.and_hms_opt(12, 0, 0).unwrap();

            assert_eq!(
                resolver.resolve_at(Some("in 10 days"), now),
                Some(ResolvedDate::new(today + Days::new(10)))
            );
            assert_eq!(
                resolver.resolve_at(Some("in 2 weeks"), now),
                Some(ResolvedDate::new(today + Days::new(14)))
            );
        }
    }

    #[test]
    fn test_month_offsets_clamp_to_month_end() {
        assert_eq!(resolve("in 1 month", at(2025, 1, 31)), Some("28/02/2025".to_string()));
        assert_eq!(resolve("3 months from now", at(2025, 1, 31)), Some("30/04/2025".to_string()));
        assert_eq!(resolve("next year", at(2024, 2, 29)), Some("28/02/2025".to_string()));
    }

    #[test]
    fn test_huge_offsets_stay_unresolved() {
        let resolver = TemporalResolver::without_fallback();
        assert_eq!(resolver.resolve_at(Some("in 99999999999 days"), wednesday()), None);
        assert_eq!(resolver.resolve_at(Some("in 4000000000 years"), wednesday()), None);
    }

    #[test]
    fn test_next_unit() {
        let now = wednesday();

        assert_eq!(resolve("next week", now), Some("09/07/2025".to_string()));
        assert_eq!(resolve("next month", now), Some("02/08/2025".to_string()));
        assert_eq!(resolve("Next Year", now), Some("02/07/2026".to_string()));
    }

    #[test]
    fn test_keyword_table() {
        let now = wednesday();

        assert_eq!(resolve("tomorrow", now), Some("03/07/2025".to_string()));
        assert_eq!(resolve("yesterday", now), Some("01/07/2025".to_string()));
        assert_eq!(resolve("the day after tomorrow", now), Some("04/07/2025".to_string()));
        assert_eq!(resolve("the day before yesterday", now), Some("30/06/2025".to_string()));

        for phrase in ["today", "now", "asap", "as soon as possible", "Immediately", "  ASAP  "] {
            assert_eq!(resolve(phrase, now), Some("02/07/2025".to_string()), "{phrase}");
        }
    }

    #[test]
    fn test_keyword_matcher_alone() {
        let now = wednesday();

        assert_eq!(
            KeywordMatcher.try_match(&Phrase::new("Tomorrow"), now),
            Some(Resolution::Date(NaiveDate::from_ymd_opt(2025, 7, 3).unwrap()))
        );
        assert_eq!(
            KeywordMatcher.try_match(&Phrase::new("whenever"), now),
            Some(Resolution::Unresolvable)
        );
        assert_eq!(KeywordMatcher.try_match(&Phrase::new("tomorrow at 8am"), now), None);
    }

    #[test]
    fn test_whenever_is_never_resolved() {
        let resolver = TemporalResolver::with_detector(AlwaysDetects);

        assert_eq!(resolver.resolve_at(Some("whenever"), wednesday()), None);
        assert_eq!(resolver.resolve_at(Some("Whenever "), wednesday()), None);
        // The detector is still consulted for anything else
        assert_eq!(
            resolver.resolve_at(Some("some day"), wednesday()).map(|d| d.to_string()),
            Some("31/12/1999".to_string())
        );
    }

    #[test]
    fn test_weekday_names_and_prefixes() {
        let now = wednesday();

        assert_eq!(resolve("friday", now), Some("04/07/2025".to_string()));
        assert_eq!(resolve("fri", now), Some("04/07/2025".to_string()));
        assert_eq!(resolve("thurs", now), Some("03/07/2025".to_string()));
        assert_eq!(resolve("next Mon", now), Some("07/07/2025".to_string()));
        assert_eq!(resolve("on sat", now), Some("05/07/2025".to_string()));
        // Same weekday wraps a full week forward
        assert_eq!(resolve("wednesday", now), Some("09/07/2025".to_string()));
        // Too short to be a prefix
        assert_eq!(WeekdayMatcher.try_match(&Phrase::new("mo"), now), None);
    }

    #[test]
    fn test_next_monday_is_within_a_week() {
        let start = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let resolver = TemporalResolver::new();

        for offset in 0..21 {
            let today = start + Days::new(offset);
            let now = today.and_hms_opt(8, 0, 0).unwrap();
            let resolved = resolver.resolve_at(Some("next monday"), now).unwrap().date();
            let ahead = (resolved - today).num_days();

            assert_eq!(resolved.weekday(), Weekday::Mon);
            assert!((1..=7).contains(&ahead), "{today}: {ahead} days ahead");
        }
    }

    #[test]
    fn test_fallback_finds_embedded_dates() {
        let now = wednesday();

        assert_eq!(resolve("tomorrow at 8am", now), Some("03/07/2025".to_string()));
        assert_eq!(resolve("next wednesday at 14:30", now), Some("09/07/2025".to_string()));
        assert_eq!(resolve("pay it on 2024-07-04 please", now), Some("04/07/2024".to_string()));
        assert_eq!(resolve("by July 10th", now), Some("10/07/2025".to_string()));
        assert_eq!(resolve("due dec 1, 2026", now), Some("01/12/2026".to_string()));
    }

    #[test]
    fn test_fallback_can_be_disabled() {
        let resolver = TemporalResolver::without_fallback();

        assert_eq!(resolver.resolve_at(Some("tomorrow at 8am"), wednesday()), None);
        assert!(!resolver.matcher_names().contains(&"fallback_detector"));
        assert_eq!(TemporalResolver::new().matcher_names().len(), 6);
    }

    #[test]
    fn test_unresolved_inputs() {
        let resolver = TemporalResolver::new();
        let now = wednesday();

        assert_eq!(resolver.resolve_at(None, now), None);
        assert_eq!(resolver.resolve_at(Some(""), now), None);
        assert_eq!(resolver.resolve_at(Some("   "), now), None);
        assert_eq!(resolver.resolve_at(Some("after lunch"), now), None);
        assert_eq!(resolver.resolve_at(Some("sometime soon"), now), None);
    }

    #[test]
    fn test_words_that_start_like_dates_stay_unresolved() {
        let resolver = TemporalResolver::new();
        let now = wednesday();

        for phrase in [
            "meet at the market 3 pm",
            "pay the mayor 5 bucks",
            "the janitor 12 times",
            "augment 4 accounts",
            "sat on it",
            "wed the idea",
            "sun 5 hours",
        ] {
            assert_eq!(resolver.resolve_at(Some(phrase), now), None, "{phrase}");
        }

        // Real month names and abbreviations still resolve
        assert_eq!(resolve("due sept 3", now), Some("03/09/2025".to_string()));
        assert_eq!(resolve("pay on march 3rd", now), Some("03/03/2025".to_string()));
        assert_eq!(resolve("by aug. 9, 2026", now), Some("09/08/2026".to_string()));
    }

    #[test]
    fn test_relative_offsets_search_inside_phrase() {
        let now = wednesday();

        // The number and unit are found anywhere; direction words are not read
        assert_eq!(resolve("3 days ago", now), Some("05/07/2025".to_string()));
        // Only the digits right before the unit count
        assert_eq!(resolve("in 2.5 weeks", now), Some("06/08/2025".to_string()));
    }

    #[test]
    fn test_resolve_uses_wall_clock() {
        let resolver = TemporalResolver::new().with_time_zone(TimeZonePolicy::Utc);
        let before = Utc::now().date_naive();
        let resolved = resolver.resolve(Some("today")).unwrap().date();
        let after = Utc::now().date_naive();

        assert!(resolved == before || resolved == after);
    }

    #[test]
    fn test_resolved_date_round_trip_and_serialize() {
        let date = ResolvedDate::parse("04/07/2024").unwrap();
        assert_eq!(date.date(), NaiveDate::from_ymd_opt(2024, 7, 4).unwrap());
        assert_eq!(date.formatted(), "04/07/2024");
        assert_eq!(serde_json::to_string(&date).unwrap(), "\"04/07/2024\"");
        assert_eq!(ResolvedDate::parse("2024-07-04"), None);
    }

    #[test]
    fn test_time_zone_policy_parse() {
        assert_eq!(TimeZonePolicy::parse("UTC"), Some(TimeZonePolicy::Utc));
        assert_eq!(TimeZonePolicy::parse("local"), Some(TimeZonePolicy::Local));
        assert_eq!(TimeZonePolicy::parse("mars"), None);
    }
}
