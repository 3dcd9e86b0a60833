use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("Invalid period: {reason}")]
    InvalidPeriod { reason: String },

    #[error("No call data found")]
    NoData,

    #[error("Invalid date \"{input}\" (expected YYYYMMDD or YYYY-MM-DD)")]
    InvalidDate { input: String },

    #[error("Invalid timezone: {input}")]
    InvalidTimezone { input: String },

    #[error("Unsupported locale: {input}")]
    UnsupportedLocale { input: String },

    #[error("Department {input} not found (available: {available})")]
    UnknownDepartment { input: String, available: String },

    #[error("Invalid phone number: \"{input}\"")]
    InvalidPhone { input: String },

    #[error("Missing configuration value: {key}")]
    MissingConfig { key: &'static str },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("{0}")]
    Source(#[from] SourceError),

    #[error("Failed to build spreadsheet: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),
}

impl AppError {
    pub(crate) fn invalid_period(reason: impl Into<String>) -> Self {
        AppError::InvalidPeriod {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        AppError::InvalidConfig {
            reason: reason.into(),
        }
    }
}

/// Failures talking to the employee directory or the call-history API.
#[derive(Debug, Error)]
pub(crate) enum SourceError {
    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("Unexpected response from {url}: {message}")]
    Response { url: String, message: String },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },

    #[error("No cached employee directory at {path} (run once without --offline)")]
    CacheMissing { path: String },
}

/// Per-record defect. Absorbed by the aggregator, never returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum RecordError {
    #[error("call record has no type")]
    MissingType,

    #[error("call record has no start timestamp")]
    MissingTimestamp,

    #[error("unparsable call timestamp \"{input}\"")]
    MalformedTimestamp { input: String },
}
