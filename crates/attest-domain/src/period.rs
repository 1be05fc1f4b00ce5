//! Employment periods and tenure arithmetic
//!
//! Résumé dates come at two granularities: a bare year (`2019`) or a month
//! and year (`Jan 2019`, `01/2019`, `2019-01`). Comparisons always happen at
//! the coarser of the two granularities involved, so `2019` agrees with
//! `2019-06` but `2019-02` does not agree with `2019-06`.

use chrono::{Datelike, Month, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Words that close a range without a concrete end date.
const OPEN_END_WORDS: &[&str] = &["present", "current", "now", "today", "ongoing"];

/// Spaced separators tried before falling back to a bare hyphen.
const RANGE_SEPARATORS: &[&str] = &[" - ", " to ", " To ", " TO ", " until ", " through "];

/// A calendar date at year or month granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeriodDate {
    /// Calendar year
    pub year: i32,

    /// Month of the year (1-12), when the source gave one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
}

impl PeriodDate {
    /// A year-granularity date
    pub fn year(year: i32) -> Self {
        Self { year, month: None }
    }

    /// A month-granularity date
    pub fn month(year: i32, month: u32) -> Self {
        Self {
            year,
            month: Some(month),
        }
    }

    /// Convert a calendar date into a month-granularity date
    pub fn from_naive(date: NaiveDate) -> Self {
        Self::month(date.year(), date.month())
    }

    /// Parse a single résumé date
    ///
    /// Accepts `2019`, `Jan 2019`, `January 2019`, `Jan. 2019`, `01/2019`
    /// and `2019-01`. Returns `None` for anything else.
    ///
    /// # Examples
    ///
    /// ```
    /// use attest_domain::PeriodDate;
    ///
    /// assert_eq!(PeriodDate::parse("March 2021"), Some(PeriodDate::month(2021, 3)));
    /// assert_eq!(PeriodDate::parse("2019"), Some(PeriodDate::year(2019)));
    /// assert_eq!(PeriodDate::parse("someday"), None);
    /// ```
    pub fn parse(input: &str) -> Option<Self> {
        let s = input
            .trim()
            .trim_start_matches('(')
            .trim_end_matches(|c: char| c == '.' || c == ',' || c == ')')
            .trim();
        if s.is_empty() {
            return None;
        }

        if let Some(year) = parse_year(s) {
            return Some(Self::year(year));
        }

        if let Some((month, year)) = s.split_once('/') {
            return Some(Self::month(parse_year(year.trim())?, parse_month_number(month)?));
        }

        if let Some((year, month)) = s.split_once('-') {
            return Some(Self::month(parse_year(year.trim())?, parse_month_number(month)?));
        }

        let mut parts = s
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|p| !p.is_empty());
        let name = parts.next()?.trim_end_matches('.');
        let year = parse_year(parts.next()?)?;
        if parts.next().is_some() {
            return None;
        }
        let month = name.parse::<Month>().ok()?;
        Some(Self::month(year, month.number_from_month()))
    }

    /// Months since year zero, filling a missing month with `default_month`
    fn ordinal(&self, default_month: u32) -> i32 {
        self.year * 12 + self.month.unwrap_or(default_month) as i32 - 1
    }

    /// Whether two dates agree at their shared granularity
    pub fn agrees_with(&self, other: &PeriodDate) -> bool {
        if self.year != other.year {
            return false;
        }
        match (self.month, other.month) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        }
    }
}

impl fmt::Display for PeriodDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.month {
            Some(month) => write!(f, "{:04}-{:02}", self.year, month),
            None => write!(f, "{:04}", self.year),
        }
    }
}

fn parse_year(s: &str) -> Option<i32> {
    if s.len() != 4 || !s.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    s.parse().ok().filter(|y| (1900..=2199).contains(y))
}

fn parse_month_number(s: &str) -> Option<u32> {
    let s = s.trim();
    if s.is_empty() || s.len() > 2 {
        return None;
    }
    s.parse().ok().filter(|m| (1..=12).contains(m))
}

/// The end of a period: a concrete date or still ongoing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodEnd {
    /// Closed on this date
    Date(PeriodDate),

    /// Open-ended ("Present", "Current")
    Present,
}

impl PeriodEnd {
    fn parse(input: &str) -> Option<Self> {
        let word = input
            .trim()
            .trim_end_matches(|c: char| c == '.' || c == ',' || c == ')')
            .to_lowercase();
        if OPEN_END_WORDS.contains(&word.as_str()) {
            return Some(PeriodEnd::Present);
        }
        PeriodDate::parse(input).map(PeriodEnd::Date)
    }

    fn resolve(&self, as_of: PeriodDate) -> PeriodDate {
        match self {
            PeriodEnd::Date(date) => *date,
            PeriodEnd::Present => as_of,
        }
    }
}

impl fmt::Display for PeriodEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodEnd::Date(date) => write!(f, "{}", date),
            PeriodEnd::Present => write!(f, "Present"),
        }
    }
}

/// Computed duration of a role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Tenure {
    /// Closed role lasting this many months
    Closed {
        /// Whole months between start and end
        months: i32,
    },

    /// Role still held; duration depends on the reference date
    Ongoing,
}

impl Tenure {
    /// Tenure in fractional years, if the role has ended
    pub fn years(&self) -> Option<f64> {
        match self {
            Tenure::Closed { months } => Some(*months as f64 / 12.0),
            Tenure::Ongoing => None,
        }
    }
}

impl fmt::Display for Tenure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tenure::Closed { months } => {
                let (years, rest) = (months / 12, months % 12);
                match (years, rest) {
                    (0, m) => write!(f, "{} months", m),
                    (y, 0) => write!(f, "{} years", y),
                    (y, m) => write!(f, "{} years {} months", y, m),
                }
            }
            Tenure::Ongoing => write!(f, "ongoing"),
        }
    }
}

/// A start/end date range for a role or a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period {
    /// First date of the range
    pub start: PeriodDate,

    /// Last date of the range, or `Present`
    pub end: PeriodEnd,
}

impl Period {
    /// Create a period from its parts
    pub fn new(start: PeriodDate, end: PeriodEnd) -> Self {
        Self { start, end }
    }

    /// A period covering exactly one date ("in 2020")
    pub fn single(date: PeriodDate) -> Self {
        Self::new(date, PeriodEnd::Date(date))
    }

    /// Parse a date range such as `Jan 2019 - Present` or `2019–2022`
    ///
    /// Returns `None` if either side fails to parse or the range runs
    /// backwards.
    ///
    /// # Examples
    ///
    /// ```
    /// use attest_domain::{Period, PeriodDate, PeriodEnd};
    ///
    /// let period = Period::parse("2019 – 2022").unwrap();
    /// assert_eq!(period.start, PeriodDate::year(2019));
    /// assert_eq!(period.end, PeriodEnd::Date(PeriodDate::year(2022)));
    ///
    /// assert!(Period::parse("Mar 2020 to Present").unwrap().is_ongoing());
    /// assert!(Period::parse("2022 - 2019").is_none());
    /// ```
    pub fn parse(input: &str) -> Option<Self> {
        let normalized = input.trim().replace(['–', '—'], "-");

        for sep in RANGE_SEPARATORS {
            if let Some((left, right)) = normalized.split_once(sep) {
                return Self::from_parts(left, right);
            }
        }

        // Bare hyphen: "2019-2022" but also "2019-01-2020-03", so try every split
        normalized
            .match_indices('-')
            .find_map(|(idx, _)| Self::from_parts(&normalized[..idx], &normalized[idx + 1..]))
    }

    fn from_parts(left: &str, right: &str) -> Option<Self> {
        let period = Self::new(PeriodDate::parse(left)?, PeriodEnd::parse(right)?);
        period.is_well_ordered().then_some(period)
    }

    fn is_well_ordered(&self) -> bool {
        match self.end {
            PeriodEnd::Date(end) => end.ordinal(12) >= self.start.ordinal(1),
            PeriodEnd::Present => true,
        }
    }

    /// Whether the period is still running
    pub fn is_ongoing(&self) -> bool {
        matches!(self.end, PeriodEnd::Present)
    }

    /// Tenure as `end - start`, or ongoing when the end is open
    pub fn tenure(&self) -> Tenure {
        match self.end {
            PeriodEnd::Date(end) => Tenure::Closed {
                months: months_between(self.start, end),
            },
            PeriodEnd::Present => Tenure::Ongoing,
        }
    }

    /// Whole months covered, measuring open periods up to `as_of`
    pub fn months_as_of(&self, as_of: PeriodDate) -> i32 {
        months_between(self.start, self.end.resolve(as_of)).max(0)
    }

    /// Fractional years covered, measuring open periods up to `as_of`
    pub fn years_as_of(&self, as_of: PeriodDate) -> f64 {
        self.months_as_of(as_of) as f64 / 12.0
    }

    /// Whether two ranges describe the same span at their shared granularity
    ///
    /// An open end agrees with a concrete end in the `as_of` year or later.
    pub fn agrees_with(&self, other: &Period, as_of: PeriodDate) -> bool {
        if !self.start.agrees_with(&other.start) {
            return false;
        }
        match (self.end, other.end) {
            (PeriodEnd::Present, PeriodEnd::Present) => true,
            (PeriodEnd::Date(a), PeriodEnd::Date(b)) => a.agrees_with(&b),
            (PeriodEnd::Present, PeriodEnd::Date(d)) | (PeriodEnd::Date(d), PeriodEnd::Present) => {
                d.year >= as_of.year
            }
        }
    }

    /// Whether `date` falls inside this range
    pub fn contains(&self, date: PeriodDate, as_of: PeriodDate) -> bool {
        let lower = self.start.ordinal(1);
        let upper = self.end.resolve(as_of).ordinal(12);
        date.ordinal(12) >= lower && date.ordinal(1) <= upper
    }

    /// Whether the range covers exactly one date
    pub fn is_single(&self) -> bool {
        self.end == PeriodEnd::Date(self.start)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single() {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{} - {}", self.start, self.end)
        }
    }
}

fn months_between(start: PeriodDate, end: PeriodDate) -> i32 {
    match (start.month, end.month) {
        (Some(s), Some(e)) => (end.year - start.year) * 12 + e as i32 - s as i32,
        _ => (end.year - start.year) * 12,
    }
}
