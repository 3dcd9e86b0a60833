/// Standard date format used throughout the codebase: "2025-01-15"
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// Date format for captions and file names: "15.01.2025"
pub(crate) const DISPLAY_DATE_FORMAT: &str = "%d.%m.%Y";

/// Call time in the incoming-call log: "15.01.2025 09:30"
pub(crate) const CALL_TIME_FORMAT: &str = "%d.%m.%Y %H:%M";

/// Timestamp format expected by the PBX history API: "20250115T000000Z"
pub(crate) const API_TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Department id of the grand total
pub(crate) const ALL_DEPARTMENTS: &str = "ALL";

/// Phone placeholders the directory uses for employees without a line
pub(crate) const PHONE_SENTINELS: [&str; 2] = ["no data", "нет данных"];
