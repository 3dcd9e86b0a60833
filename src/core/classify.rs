//! Call classification
//!
//! Maps the PBX's free-form `type` and `status` strings onto a direction and
//! a missed flag. The vocabulary lives in tables so new PBX versions only
//! need configuration.

use std::collections::{HashMap, HashSet};

use crate::core::types::CallRecord;
use crate::error::RecordError;

const DEFAULT_INCOMING: &[&str] = &["in", "incoming", "received", "inbound", "входящий"];
const DEFAULT_OUTGOING: &[&str] = &["out", "outgoing", "исходящий"];
const DEFAULT_MISSED: &[&str] = &["noanswer", "missed", "пропущен", "неотвечен", "нет ответа"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CallDirection {
    Incoming,
    Outgoing,
    Unclassified,
}

/// Direction and missed flag are independent: a missed call is usually also
/// incoming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Classification {
    pub(crate) direction: CallDirection,
    pub(crate) missed: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct CallClassifier {
    directions: HashMap<String, CallDirection>,
    missed: HashSet<String>,
}

fn normalize(term: &str) -> String {
    term.trim().to_lowercase()
}

impl Default for CallClassifier {
    fn default() -> Self {
        let mut classifier = Self {
            directions: HashMap::new(),
            missed: HashSet::new(),
        };
        classifier.extend(DEFAULT_INCOMING, DEFAULT_OUTGOING, DEFAULT_MISSED);
        classifier
    }
}

impl CallClassifier {
    /// Add terms on top of the current vocabulary. A term listed for both
    /// directions ends up outgoing.
    pub(crate) fn extend<S: AsRef<str>>(&mut self, incoming: &[S], outgoing: &[S], missed: &[S]) {
        for term in incoming {
            self.directions
                .insert(normalize(term.as_ref()), CallDirection::Incoming);
        }
        for term in outgoing {
            self.directions
                .insert(normalize(term.as_ref()), CallDirection::Outgoing);
        }
        self.missed
            .extend(missed.iter().map(|term| normalize(term.as_ref())));
    }

    pub(crate) fn direction_of(&self, call_type: &str) -> CallDirection {
        self.directions
            .get(&normalize(call_type))
            .copied()
            .unwrap_or(CallDirection::Unclassified)
    }

    pub(crate) fn is_missed(&self, status: &str) -> bool {
        self.missed.contains(&normalize(status))
    }

    /// Classify one record. A record without a type is malformed; the caller
    /// still counts it towards the total.
    pub(crate) fn classify(&self, record: &CallRecord) -> Result<Classification, RecordError> {
        let call_type = record.call_type.as_deref().ok_or(RecordError::MissingType)?;
        Ok(Classification {
            direction: self.direction_of(call_type),
            missed: record
                .status
                .as_deref()
                .is_some_and(|status| self.is_missed(status)),
        })
    }

    /// Looser reading for the incoming-call log: when `type` is missing or
    /// unknown the `direction` field decides, and a missed term in either
    /// `status` or `type` marks the call missed.
    pub(crate) fn classify_with_fallback(&self, record: &CallRecord) -> Classification {
        let from_type = record
            .call_type
            .as_deref()
            .map_or(CallDirection::Unclassified, |t| self.direction_of(t));
        let direction = match (from_type, record.direction.as_deref()) {
            (CallDirection::Unclassified, Some(direction)) => self.direction_of(direction),
            (direction, _) => direction,
        };
        let missed = [record.status.as_deref(), record.call_type.as_deref()]
            .into_iter()
            .flatten()
            .any(|term| self.is_missed(term));
        Classification { direction, missed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_uses_direction_field() {
        let c = CallClassifier::default();
        let record = CallRecord {
            call_type: Some("call".to_string()),
            direction: Some("Inbound".to_string()),
            ..Default::default()
        };
        assert_eq!(
            c.classify_with_fallback(&record).direction,
            CallDirection::Incoming
        );

        let untyped = CallRecord {
            direction: Some("in".to_string()),
            ..Default::default()
        };
        assert_eq!(
            c.classify_with_fallback(&untyped).direction,
            CallDirection::Incoming
        );
        assert!(c.classify(&untyped).is_err());
    }

    #[test]
    fn fallback_keeps_known_type() {
        let c = CallClassifier::default();
        let record = CallRecord {
            call_type: Some("out".to_string()),
            direction: Some("in".to_string()),
            ..Default::default()
        };
        assert_eq!(
            c.classify_with_fallback(&record).direction,
            CallDirection::Outgoing
        );
    }

    #[test]
    fn fallback_missed_from_type_or_status() {
        let c = CallClassifier::default();
        let by_type = CallRecord {
            call_type: Some("missed".to_string()),
            ..Default::default()
        };
        let result = c.classify_with_fallback(&by_type);
        assert!(result.missed);
        assert_eq!(result.direction, CallDirection::Unclassified);

        let by_status = CallRecord {
            call_type: Some("in".to_string()),
            status: Some("noanswer".to_string()),
            ..Default::default()
        };
        assert!(c.classify_with_fallback(&by_status).missed);
    }

    fn record(call_type: Option<&str>, status: Option<&str>) -> CallRecord {
        CallRecord {
            call_type: call_type.map(str::to_string),
            status: status.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn default_vocabulary_directions() {
        let c = CallClassifier::default();
        for term in ["in", "incoming", "received", "inbound", "входящий"] {
            assert_eq!(c.direction_of(term), CallDirection::Incoming, "{term}");
        }
        for term in ["out", "outgoing", "исходящий"] {
            assert_eq!(c.direction_of(term), CallDirection::Outgoing, "{term}");
        }
        assert_eq!(c.direction_of("transfer"), CallDirection::Unclassified);
        assert_eq!(c.direction_of(""), CallDirection::Unclassified);
    }

    #[test]
    fn normalization_trims_and_lowercases() {
        let c = CallClassifier::default();
        assert_eq!(c.direction_of("  IN "), CallDirection::Incoming);
        assert_eq!(c.direction_of("Входящий"), CallDirection::Incoming);
        assert!(c.is_missed(" NoAnswer"));
        assert!(c.is_missed("Нет ответа"));
        assert!(!c.is_missed("success"));
    }

    #[test]
    fn missed_is_orthogonal_to_direction() {
        let c = CallClassifier::default();
        let result = c.classify(&record(Some("in"), Some("missed"))).unwrap();
        assert_eq!(result.direction, CallDirection::Incoming);
        assert!(result.missed);

        let result = c.classify(&record(Some("out"), Some("success"))).unwrap();
        assert_eq!(result.direction, CallDirection::Outgoing);
        assert!(!result.missed);

        let result = c.classify(&record(Some("weird"), Some("noanswer"))).unwrap();
        assert_eq!(result.direction, CallDirection::Unclassified);
        assert!(result.missed);
    }

    #[test]
    fn missing_type_is_malformed() {
        let c = CallClassifier::default();
        let rec = record(None, Some("missed"));
        assert_eq!(c.classify(&rec), Err(RecordError::MissingType));
    }

    #[test]
    fn extend_adds_vocabulary() {
        let mut c = CallClassifier::default();
        assert_eq!(c.direction_of("callback"), CallDirection::Unclassified);
        c.extend(&["Callback"], &["dialout"], &["busy"]);
        assert_eq!(c.direction_of("callback"), CallDirection::Incoming);
        assert_eq!(c.direction_of("DIALOUT"), CallDirection::Outgoing);
        assert!(c.is_missed("busy"));
        // defaults survive
        assert_eq!(c.direction_of("in"), CallDirection::Incoming);
    }
}
