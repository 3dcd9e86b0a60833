//! PBX call-history client

use serde_json::Value;
use tracing::debug;

use crate::core::{CallRecord, DateInterval};
use crate::error::{AppError, SourceError};
use crate::source::CallHistorySource;
use crate::source::http::{JsonClient, join_url};

const HISTORY_LIMIT: usize = 1000;

pub(crate) struct HistoryClient {
    client: JsonClient,
    url: String,
}

impl HistoryClient {
    pub(crate) fn new(api_url: &str, api_key: &str) -> Self {
        Self {
            client: JsonClient::new()
                .with_header("X-API-KEY", api_key)
                .with_header("Content-Type", "application/json"),
            url: join_url(api_url, "history/json"),
        }
    }
}

impl CallHistorySource for HistoryClient {
    fn name(&self) -> &'static str {
        "pbx"
    }

    fn fetch_calls(
        &self,
        phone: &str,
        interval: &DateInterval,
    ) -> Result<Vec<CallRecord>, AppError> {
        let diversion = normalize_phone(phone)?;
        let (start, end) = interval.api_bounds();
        let query = [
            ("start", start),
            ("end", end),
            ("diversion", diversion),
            ("type", "all".to_string()),
            ("limit", HISTORY_LIMIT.to_string()),
        ];
        let body = self.client.get_json(&self.url, &query)?;
        Ok(parse_history(body, &self.url)?)
    }
}

/// Normalize a Russian phone number to `+7XXXXXXXXXX`.
///
/// Ten digits get the country code prepended, eleven digits starting with
/// 7 or 8 have it replaced; anything else is passed through with a `+`.
pub(crate) fn normalize_phone(raw: &str) -> Result<String, AppError> {
    let trimmed = raw.trim();
    let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
    if trimmed.chars().count() < 10 || digits.is_empty() {
        return Err(AppError::InvalidPhone {
            input: raw.to_string(),
        });
    }
    let normalized = match digits.len() {
        10 => format!("+7{digits}"),
        11 if digits.starts_with('7') || digits.starts_with('8') => format!("+7{}", &digits[1..]),
        _ => format!("+{digits}"),
    };
    Ok(normalized)
}

/// Turn a history response body into records. `null` means no calls;
/// any other non-list body is an error. Non-object entries are dropped.
pub(crate) fn parse_history(body: Value, url: &str) -> Result<Vec<CallRecord>, SourceError> {
    let items = match body {
        Value::Null => return Ok(Vec::new()),
        Value::Array(items) => items,
        other => {
            return Err(SourceError::Response {
                url: url.to_string(),
                message: format!("expected a list of calls, got {}", json_kind(&other)),
            });
        }
    };

    let total = items.len();
    let records: Vec<CallRecord> = items.iter().filter_map(CallRecord::from_json).collect();
    if records.len() < total {
        debug!(dropped = total - records.len(), "ignored non-object history entries");
    }
    Ok(records)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalize_phone_variants() {
        assert_eq!(normalize_phone("9991234567").unwrap(), "+79991234567");
        assert_eq!(normalize_phone("89991234567").unwrap(), "+79991234567");
        assert_eq!(normalize_phone("+7 (999) 123-45-67").unwrap(), "+79991234567");
        assert_eq!(normalize_phone("19991234567").unwrap(), "+19991234567");
        assert_eq!(normalize_phone("380991234567").unwrap(), "+380991234567");
    }

    #[test]
    fn normalize_phone_rejects_short_numbers() {
        assert!(matches!(
            normalize_phone("12345"),
            Err(AppError::InvalidPhone { .. })
        ));
        assert!(normalize_phone("").is_err());
        assert!(normalize_phone("no phone at all").is_err());
    }

    #[test]
    fn parse_history_null_is_empty() {
        assert!(parse_history(Value::Null, "u").unwrap().is_empty());
    }

    #[test]
    fn parse_history_rejects_objects() {
        let err = parse_history(json!({"error": "bad key"}), "https://pbx/history/json")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unexpected response from https://pbx/history/json: expected a list of calls, got an object"
        );
    }

    #[test]
    fn parse_history_drops_non_objects() {
        let records = parse_history(
            json!([
                {"type": "in", "status": "success", "start": "2024-06-10T09:00:00Z"},
                "garbage",
                {"type": "out"}
            ]),
            "u",
        )
        .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].call_type.as_deref(), Some("out"));
    }
}
