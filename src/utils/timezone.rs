use chrono::{DateTime, Local, NaiveDate, Utc};
use chrono_tz::Tz;
use std::str::FromStr;

use crate::error::AppError;

/// Zone that decides which calendar day "today" is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Timezone {
    /// The server's own zone
    Local,
    Named(Tz),
}

impl Timezone {
    /// `None`, empty and "local" mean the server zone; "utc"/"z" are
    /// accepted as shorthands; anything else must be an IANA name.
    pub(crate) fn parse(value: Option<&str>) -> Result<Self, AppError> {
        let raw = value.map(str::trim).unwrap_or_default();
        if raw.is_empty() || raw.eq_ignore_ascii_case("local") {
            return Ok(Timezone::Local);
        }
        if raw.eq_ignore_ascii_case("utc") || raw.eq_ignore_ascii_case("z") {
            return Ok(Timezone::Named(chrono_tz::UTC));
        }
        Tz::from_str(raw)
            .map(Timezone::Named)
            .map_err(|_| AppError::InvalidTimezone {
                input: raw.to_string(),
            })
    }

    /// Calendar date of the instant `utc` on a wall clock in this zone.
    pub(crate) fn date_of(self, utc: DateTime<Utc>) -> NaiveDate {
        match self {
            Timezone::Local => utc.with_timezone(&Local).date_naive(),
            Timezone::Named(tz) => utc.with_timezone(&tz).date_naive(),
        }
    }
}
