use chrono::{Datelike, Duration, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::error::{OpsError, Result};

/// Date format used on the command line and by Cost Explorer
pub const DATE_FORMAT: &str = "%Y-%m-%d";

fn date_shape() -> &'static Regex {
    static SHAPE: OnceLock<Regex> = OnceLock::new();
    SHAPE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("static regex"))
}

/// Parse a strict, fixed-width `YYYY-MM-DD` calendar date.
///
/// Rejects shorter forms such as `2024-3-1` that chrono would otherwise
/// accept, and impossible dates such as `2023-02-29`.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    if !date_shape().is_match(s) {
        return Err(OpsError::InvalidDate(s.to_string()));
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|_| OpsError::InvalidDate(s.to_string()))
}

/// An end-exclusive span of calendar days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day included
    pub start: NaiveDate,
    /// First day excluded
    pub end: NaiveDate,
}

impl DateRange {
    /// Build a range, requiring `end` to strictly follow `start`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end <= start {
            return Err(OpsError::InvalidPeriod {
                start: start.format(DATE_FORMAT).to_string(),
                end: end.format(DATE_FORMAT).to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Parse and validate a range from two date strings
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        let start_date = parse_date(start)?;
        let end_date = parse_date(end)?;
        if end_date <= start_date {
            return Err(OpsError::InvalidPeriod {
                start: start.trim().to_string(),
                end: end.trim().to_string(),
            });
        }
        Ok(Self {
            start: start_date,
            end: end_date,
        })
    }

    /// Number of days covered (always at least 1)
    #[must_use]
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// The span of equal length that ends where this one starts
    #[must_use]
    pub fn preceding(&self) -> Self {
        Self {
            start: self.start - Duration::days(self.days()),
            end: self.start,
        }
    }

    /// Month-to-date range ending at `today`, or `None` on the first of the month
    #[must_use]
    pub fn month_to_date(today: NaiveDate) -> Option<Self> {
        let first = first_of_month(today);
        Self::new(first, today).ok()
    }

    /// Start formatted as `YYYY-MM-DD`
    #[must_use]
    pub fn start_str(&self) -> String {
        self.start.format(DATE_FORMAT).to_string()
    }

    /// End formatted as `YYYY-MM-DD`
    #[must_use]
    pub fn end_str(&self) -> String {
        self.end.format(DATE_FORMAT).to_string()
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {} ({} days)", self.start_str(), self.end_str(), self.days())
    }
}

/// First day of the month containing `date`
#[must_use]
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// The two periods a cost comparison runs over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Periods {
    /// Earlier, usually complete, period
    pub previous: DateRange,
    /// Later, usually partial, period
    pub current: DateRange,
}

impl Periods {
    /// Current period with the previous one derived as the preceding span
    #[must_use]
    pub fn derived(current: DateRange) -> Self {
        Self {
            previous: current.preceding(),
            current,
        }
    }

    /// Build periods from positional date arguments.
    ///
    /// - four dates: `PREV_START PREV_END CUR_START CUR_END`
    /// - two dates: `CUR_START CUR_END`, previous period derived
    ///
    /// Any other count is a usage error; zero arguments is handled by the
    /// caller with interactive prompts.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Result<Self> {
        match args {
            [prev_start, prev_end, cur_start, cur_end] => Ok(Self {
                previous: DateRange::parse(prev_start.as_ref(), prev_end.as_ref())?,
                current: DateRange::parse(cur_start.as_ref(), cur_end.as_ref())?,
            }),
            [cur_start, cur_end] => Ok(Self::derived(DateRange::parse(
                cur_start.as_ref(),
                cur_end.as_ref(),
            )?)),
            other => Err(OpsError::Usage(format!(
                "expected 0, 2 or 4 dates, got {}",
                other.len()
            ))),
        }
    }
}
