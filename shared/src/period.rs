//! Calendar periods that partition the inventory ledger
//!
//! A period is a (year, month, ISO week) triple. Week boundaries follow
//! ISO 8601: week 1 is the week containing January 4th. Year and month are
//! calendar values, so a January period may carry the last week of the
//! previous ISO year and a December period week 1 of the next.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

const MIN_YEAR: i32 = 1;
const MAX_YEAR: i32 = 9999;

/// One inventory bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    pub month: u32,
    pub week: u32,
}

impl Period {
    pub fn new(year: i32, month: u32, week: u32) -> Result<Self, DomainError> {
        validate_year(year)?;
        validate_month(month)?;
        let period = Self { year, month, week };
        match iso_weeks(period.week_year()) {
            Some(last) if (1..=last).contains(&week) => Ok(period),
            _ => Err(DomainError::InvalidWeek { year, week }),
        }
    }

    /// ISO year the week number belongs to
    pub fn week_year(&self) -> i32 {
        match (self.month, self.week) {
            (1, week) if week >= 52 => self.year - 1,
            (12, 1) => self.year + 1,
            _ => self.year,
        }
    }

    /// Period containing the given date: calendar year and month, ISO week number
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            week: date.iso_week().week(),
        }
    }

    /// Period for "now" (UTC). Always passes `Period::new`.
    pub fn current() -> Self {
        Self::containing(Utc::now().date_naive())
    }

    pub fn week_start(&self) -> NaiveDate {
        // Fields were validated on construction, so the week exists.
        monday_of_week(self.week_year(), self.week).unwrap_or(NaiveDate::MIN)
    }

    pub fn week_end(&self) -> NaiveDate {
        self.week_start() + Duration::days(6)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02} W{:02}", self.year, self.month, self.week)
    }
}

/// Monday of ISO week `week` of `year`
pub fn week_start(year: i32, week: u32) -> Result<NaiveDate, DomainError> {
    validate_year(year)?;
    if week == 0 {
        return Err(DomainError::InvalidWeek { year, week });
    }
    monday_of_week(year, week).ok_or(DomainError::InvalidYear(year))
}

fn monday_of_week(iso_year: i32, week: u32) -> Option<NaiveDate> {
    let jan4 = NaiveDate::from_ymd_opt(iso_year, 1, 4)?;
    let week_one = jan4 - Duration::days(i64::from(jan4.weekday().num_days_from_monday()));
    week_one.checked_add_signed(Duration::weeks(i64::from(week) - 1))
}

/// Sunday closing ISO week `week` of `year`
pub fn week_end(year: i32, week: u32) -> Result<NaiveDate, DomainError> {
    Ok(week_start(year, week)? + Duration::days(6))
}

/// Number of ISO weeks in `year` (52 or 53)
pub fn weeks_in_year(year: i32) -> Result<u32, DomainError> {
    validate_year(year)?;
    iso_weeks(year).ok_or(DomainError::InvalidYear(year))
}

/// Highest week number a period of calendar `year` can carry.
///
/// Early January days belong to the last week of the previous ISO year,
/// so a calendar year following a 53-week year can also hold week 53.
pub fn max_week_in_calendar_year(year: i32) -> Result<u32, DomainError> {
    let own = weeks_in_year(year)?;
    Ok(iso_weeks(year - 1).map_or(own, |previous| own.max(previous)))
}

fn iso_weeks(iso_year: i32) -> Option<u32> {
    // December 28th always falls in the last ISO week of its year.
    NaiveDate::from_ymd_opt(iso_year, 12, 28).map(|d| d.iso_week().week())
}

fn validate_year(year: i32) -> Result<(), DomainError> {
    if (MIN_YEAR..=MAX_YEAR).contains(&year) {
        Ok(())
    } else {
        Err(DomainError::InvalidYear(year))
    }
}

fn validate_month(month: u32) -> Result<(), DomainError> {
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        Err(DomainError::InvalidMonth(month))
    }
}

/// Granularity of a snapshot or aggregate query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodType {
    Year,
    Month,
    Week,
}

impl PeriodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodType::Year => "year",
            PeriodType::Month => "month",
            PeriodType::Week => "week",
        }
    }
}

impl FromStr for PeriodType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "year" => Ok(PeriodType::Year),
            "month" => Ok(PeriodType::Month),
            "week" => Ok(PeriodType::Week),
            other => Err(DomainError::UnknownPeriodType(other.to_string())),
        }
    }
}

/// Period selector supplied by the request layer
///
/// Omitted parts widen a read: no week means the whole month, no month
/// means the whole year. Omitted parts default to "now" when a write
/// needs an exact period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodSelector {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub week: Option<u32>,
}

/// What a read covers after resolving a selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodScope {
    Week(Period),
    Month { year: i32, month: u32 },
    Year(i32),
}

impl PeriodScope {
    pub fn year(&self) -> i32 {
        match self {
            PeriodScope::Week(p) => p.year,
            PeriodScope::Month { year, .. } => *year,
            PeriodScope::Year(year) => *year,
        }
    }

    pub fn month(&self) -> Option<u32> {
        match self {
            PeriodScope::Week(p) => Some(p.month),
            PeriodScope::Month { month, .. } => Some(*month),
            PeriodScope::Year(_) => None,
        }
    }

    pub fn week(&self) -> Option<u32> {
        match self {
            PeriodScope::Week(p) => Some(p.week),
            _ => None,
        }
    }
}

impl PeriodSelector {
    pub fn new(year: i32, month: Option<u32>, week: Option<u32>) -> Self {
        Self {
            year: Some(year),
            month,
            week,
        }
    }

    /// Exact period for a write, filling omitted parts from `now`
    pub fn resolve_at(&self, now: Period) -> Result<Period, DomainError> {
        Period::new(
            self.year.unwrap_or(now.year),
            self.month.unwrap_or(now.month),
            self.week.unwrap_or(now.week),
        )
    }

    pub fn resolve(&self) -> Result<Period, DomainError> {
        self.resolve_at(Period::current())
    }

    /// Read scope; only the year defaults to `now`
    pub fn scope_at(&self, now: Period) -> Result<PeriodScope, DomainError> {
        let year = self.year.unwrap_or(now.year);
        validate_year(year)?;
        match (self.month, self.week) {
            (Some(month), Some(week)) => Ok(PeriodScope::Week(Period::new(year, month, week)?)),
            (Some(month), None) => {
                validate_month(month)?;
                Ok(PeriodScope::Month { year, month })
            }
            (None, None) => Ok(PeriodScope::Year(year)),
            (None, Some(_)) => Err(DomainError::WeekWithoutMonth),
        }
    }

    pub fn scope(&self) -> Result<PeriodScope, DomainError> {
        self.scope_at(Period::current())
    }
}

impl From<Period> for PeriodSelector {
    fn from(p: Period) -> Self {
        Self::new(p.year, Some(p.month), Some(p.week))
    }
}
