//! Period resolution
//!
//! Turns a symbolic period selector ("today", "quarter 2 of 2024", a custom
//! range) into a concrete date interval. All month arithmetic funnels through
//! [`last_day_of_month`].

use chrono::{Datelike, Days, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use std::fmt;
use std::str::FromStr;

use crate::consts::{API_TIMESTAMP_FORMAT, DISPLAY_DATE_FORMAT};
use crate::error::AppError;
use crate::utils::{Timezone, parse_date};

/// Source of the reference date that relative periods are computed against.
pub(crate) trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Wall clock of the server (or of a configured timezone).
#[derive(Debug, Clone, Copy)]
pub(crate) struct SystemClock {
    timezone: Timezone,
}

impl SystemClock {
    pub(crate) fn new(timezone: Timezone) -> Self {
        Self { timezone }
    }
}

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        self.timezone.date_of(Utc::now())
    }
}

/// Frozen reference date, used by `--as-of` and tests.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FixedClock(pub(crate) NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PeriodToken {
    Today,
    CurrentMonth,
    PreviousMonth,
    LastNDays(u32),
    Quarter { year: i32, quarter: u32 },
    Month { year: i32, month: u32 },
    /// Bounds are supplied separately as raw user input.
    Custom,
}

/// User-typed bounds for [`PeriodToken::Custom`]
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct CustomBounds<'a> {
    pub(crate) start: Option<&'a str>,
    pub(crate) end: Option<&'a str>,
}

/// Closed interval of whole days: `start 00:00:00.000` through `end 23:59:59.999`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DateInterval {
    pub(crate) start: NaiveDate,
    pub(crate) end: NaiveDate,
}

impl DateInterval {
    pub(crate) fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, AppError> {
        if end < start {
            return Err(AppError::invalid_period(format!(
                "end date {end} is before start date {start}"
            )));
        }
        Ok(Self { start, end })
    }

    pub(crate) fn start_datetime(&self) -> NaiveDateTime {
        self.start.and_time(NaiveTime::MIN)
    }

    pub(crate) fn end_datetime(&self) -> NaiveDateTime {
        self.end.and_time(NaiveTime::MIN) + Duration::milliseconds(86_399_999)
    }

    /// Number of calendar days covered, both ends inclusive
    pub(crate) fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub(crate) fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Interval bounds in the PBX history API format (`YYYYmmddTHHMMSSZ`).
    pub(crate) fn api_bounds(&self) -> (String, String) {
        (
            self.start_datetime().format(API_TIMESTAMP_FORMAT).to_string(),
            self.end_datetime().format(API_TIMESTAMP_FORMAT).to_string(),
        )
    }
}

fn first_day_of_month(year: i32, month: u32) -> Result<NaiveDate, AppError> {
    if !(1..=12).contains(&month) {
        return Err(AppError::invalid_period(format!(
            "month must be 1-12, got {month}"
        )));
    }
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::invalid_period(format!("year {year} is out of range")))
}

/// Last calendar day of `month`, as the day before the first of the next month.
pub(crate) fn last_day_of_month(year: i32, month: u32) -> Result<NaiveDate, AppError> {
    first_day_of_month(year, month)?;
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .ok_or_else(|| AppError::invalid_period(format!("year {year} is out of range")))
}

fn month_interval(year: i32, month: u32) -> Result<DateInterval, AppError> {
    DateInterval::new(
        first_day_of_month(year, month)?,
        last_day_of_month(year, month)?,
    )
}

fn resolve_custom(bounds: CustomBounds<'_>) -> Result<DateInterval, AppError> {
    let parse_bound = |raw: Option<&str>, which: &str| -> Result<NaiveDate, AppError> {
        let raw = raw
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::invalid_period(format!("custom period needs a {which} date")))?;
        parse_date(raw)
            .map_err(|_| AppError::invalid_period(format!("malformed {which} date \"{raw}\"")))
    };
    let start = parse_bound(bounds.start, "start")?;
    let end = parse_bound(bounds.end, "end")?;
    DateInterval::new(start, end)
}

/// Resolve `token` against the reference date supplied by `clock`.
pub(crate) fn resolve(
    token: PeriodToken,
    bounds: CustomBounds<'_>,
    clock: &dyn Clock,
) -> Result<DateInterval, AppError> {
    match token {
        PeriodToken::Today => {
            let today = clock.today();
            DateInterval::new(today, today)
        }
        PeriodToken::CurrentMonth => {
            let today = clock.today();
            month_interval(today.year(), today.month())
        }
        PeriodToken::PreviousMonth => {
            let today = clock.today();
            let (year, month) = if today.month() == 1 {
                (today.year() - 1, 12)
            } else {
                (today.year(), today.month() - 1)
            };
            month_interval(year, month)
        }
        PeriodToken::LastNDays(n) => {
            if n == 0 {
                return Err(AppError::invalid_period("day count must be at least 1"));
            }
            let end = clock.today();
            let start = end
                .checked_sub_days(Days::new(u64::from(n - 1)))
                .ok_or_else(|| AppError::invalid_period(format!("{n} days back is out of range")))?;
            DateInterval::new(start, end)
        }
        PeriodToken::Quarter { year, quarter } => {
            if !(1..=4).contains(&quarter) {
                return Err(AppError::invalid_period(format!(
                    "quarter must be 1-4, got {quarter}"
                )));
            }
            DateInterval::new(
                first_day_of_month(year, 3 * (quarter - 1) + 1)?,
                last_day_of_month(year, 3 * quarter)?,
            )
        }
        PeriodToken::Month { year, month } => month_interval(year, month),
        PeriodToken::Custom => resolve_custom(bounds),
    }
}

fn quarter_numeral(quarter: u32) -> String {
    match quarter {
        1 => "I".to_string(),
        2 => "II".to_string(),
        3 => "III".to_string(),
        4 => "IV".to_string(),
        other => other.to_string(),
    }
}

fn month_name(month: u32) -> &'static str {
    const NAMES: [&str; 12] = [
        "January", "February", "March", "April", "May", "June", "July", "August", "September",
        "October", "November", "December",
    ];
    month
        .checked_sub(1)
        .and_then(|i| NAMES.get(i as usize))
        .copied()
        .unwrap_or("Month")
}

/// Human-readable caption for a resolved period, e.g.
/// `Quarter II 2024: 01.04.2024 – 30.06.2024`.
pub(crate) fn describe(token: PeriodToken, interval: &DateInterval) -> String {
    let start = interval.start.format(DISPLAY_DATE_FORMAT);
    let end = interval.end.format(DISPLAY_DATE_FORMAT);
    match token {
        PeriodToken::Today => format!("Today: {start}"),
        PeriodToken::CurrentMonth => format!("Current month: {start} – {end}"),
        PeriodToken::PreviousMonth => format!("Previous month: {start} – {end}"),
        PeriodToken::LastNDays(1) => format!("Last day: {start}"),
        PeriodToken::LastNDays(n) => format!("Last {n} days: {start} – {end}"),
        PeriodToken::Quarter { year, quarter } => {
            format!("Quarter {} {year}: {start} – {end}", quarter_numeral(quarter))
        }
        PeriodToken::Month { year, month } => {
            format!("{} {year}: {start} – {end}", month_name(month))
        }
        PeriodToken::Custom => format!("Custom period: {start} – {end}"),
    }
}

impl fmt::Display for PeriodToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodToken::Today => write!(f, "today"),
            PeriodToken::CurrentMonth => write!(f, "current_month"),
            PeriodToken::PreviousMonth => write!(f, "previous_month"),
            PeriodToken::LastNDays(n) => write!(f, "last_{n}_days"),
            PeriodToken::Quarter { year, quarter } => write!(f, "quarter_{year}_{quarter}"),
            PeriodToken::Month { year, month } => write!(f, "month_{year}_{month:02}"),
            PeriodToken::Custom => write!(f, "custom"),
        }
    }
}

impl FromStr for PeriodToken {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let unknown = || AppError::invalid_period(format!("unknown period \"{trimmed}\""));
        let raw = trimmed.to_ascii_lowercase();

        match raw.as_str() {
            "today" => return Ok(PeriodToken::Today),
            "current_month" => return Ok(PeriodToken::CurrentMonth),
            "previous_month" => return Ok(PeriodToken::PreviousMonth),
            "week" => return Ok(PeriodToken::LastNDays(7)),
            "month" => return Ok(PeriodToken::LastNDays(30)),
            "custom" => return Ok(PeriodToken::Custom),
            _ => {}
        }

        let parts: Vec<&str> = raw.split('_').collect();
        match parts.as_slice() {
            ["quarter", year, quarter] => Ok(PeriodToken::Quarter {
                year: year.parse().map_err(|_| unknown())?,
                quarter: quarter.parse().map_err(|_| unknown())?,
            }),
            ["month", year, month] => Ok(PeriodToken::Month {
                year: year.parse().map_err(|_| unknown())?,
                month: month.parse().map_err(|_| unknown())?,
            }),
            ["last", n, "days"] => Ok(PeriodToken::LastNDays(n.parse().map_err(|_| unknown())?)),
            _ => Err(unknown()),
        }
    }
}
