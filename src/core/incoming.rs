//! Incoming-call log
//!
//! Lists every answered or missed incoming call with the number that called,
//! for callback follow-up. Unlike the aggregate report this keeps one line
//! per call.

use chrono::NaiveDateTime;
use tracing::debug;

use crate::core::classify::{CallClassifier, CallDirection};
use crate::core::types::{CallRecord, Employee, department_sort_key};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IncomingKind {
    Answered,
    Missed,
}

impl IncomingKind {
    pub(crate) fn label(self) -> &'static str {
        match self {
            IncomingKind::Answered => "incoming",
            IncomingKind::Missed => "missed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct IncomingCall {
    pub(crate) department: String,
    pub(crate) employee_name: String,
    /// Line that received the call
    pub(crate) receiver_phone: String,
    /// PBX user who took it, when the PBX reports one
    pub(crate) user_name: Option<String>,
    pub(crate) caller: String,
    pub(crate) kind: IncomingKind,
    pub(crate) started_at: Option<NaiveDateTime>,
    /// Start as sent by the PBX, kept when it does not parse
    pub(crate) raw_start: Option<String>,
    pub(crate) record_url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct IncomingLog {
    pub(crate) calls: Vec<IncomingCall>,
    pub(crate) answered: u64,
    pub(crate) missed: u64,
}

fn to_incoming(
    employee: &Employee,
    record: &CallRecord,
    classifier: &CallClassifier,
) -> Option<IncomingCall> {
    let caller = record.caller.as_deref()?;
    let classification = classifier.classify_with_fallback(record);
    let kind = if classification.missed {
        IncomingKind::Missed
    } else if classification.direction == CallDirection::Incoming {
        IncomingKind::Answered
    } else {
        return None;
    };

    Some(IncomingCall {
        department: employee.department.clone(),
        employee_name: employee.name.clone(),
        receiver_phone: employee.phone.clone(),
        user_name: record.user_name.clone(),
        caller: caller.to_string(),
        kind,
        started_at: record.started_at().ok(),
        raw_start: record.start.clone(),
        record_url: record.record.clone(),
    })
}

/// Pick the answered and missed incoming calls out of every employee's
/// records. Calls without a caller number are skipped. Lines are ordered by
/// department, then call time, then employee.
///
/// Returns [`AppError::NoData`] when no call qualifies.
pub(crate) fn collect_incoming(
    fetched: &[(Employee, Vec<CallRecord>)],
    classifier: &CallClassifier,
) -> Result<IncomingLog, AppError> {
    let mut log = IncomingLog::default();
    let mut skipped = 0usize;

    for (employee, records) in fetched {
        for record in records {
            match to_incoming(employee, record, classifier) {
                Some(call) => {
                    match call.kind {
                        IncomingKind::Answered => log.answered += 1,
                        IncomingKind::Missed => log.missed += 1,
                    }
                    log.calls.push(call);
                }
                None => skipped += 1,
            }
        }
    }
    debug!(
        kept = log.calls.len(),
        skipped, "collected incoming calls"
    );

    if log.calls.is_empty() {
        return Err(AppError::NoData);
    }

    log.calls.sort_by(|a, b| {
        department_sort_key(&a.department)
            .cmp(&department_sort_key(&b.department))
            .then_with(|| a.started_at.cmp(&b.started_at))
            .then_with(|| a.employee_name.cmp(&b.employee_name))
    });
    Ok(log)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee(name: &str, phone: &str, department: &str) -> Employee {
        Employee {
            name: name.to_string(),
            phone: phone.to_string(),
            department: department.to_string(),
        }
    }

    fn incoming(caller: &str, start: &str) -> CallRecord {
        CallRecord {
            call_type: Some("in".to_string()),
            status: Some("success".to_string()),
            start: Some(start.to_string()),
            caller: Some(caller.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn keeps_incoming_and_missed_with_caller() {
        let fetched = vec![(
            employee("Ivanov Ivan", "+79990000001", "2"),
            vec![
                incoming("+74950000001", "2024-06-10 09:00:00"),
                CallRecord {
                    status: Some("noanswer".to_string()),
                    record: Some("https://pbx/rec/2".to_string()),
                    user_name: Some("ivanov".to_string()),
                    ..incoming("+74950000002", "2024-06-10 10:00:00")
                },
                CallRecord {
                    call_type: Some("out".to_string()),
                    ..incoming("+74950000003", "2024-06-10 11:00:00")
                },
                CallRecord {
                    caller: None,
                    ..incoming("", "2024-06-10 12:00:00")
                },
            ],
        )];

        let log = collect_incoming(&fetched, &CallClassifier::default()).unwrap();
        assert_eq!(log.calls.len(), 2);
        assert_eq!(log.answered, 1);
        assert_eq!(log.missed, 1);

        let first = &log.calls[0];
        assert_eq!(first.caller, "+74950000001");
        assert_eq!(first.kind, IncomingKind::Answered);
        assert_eq!(first.receiver_phone, "+79990000001");

        let second = &log.calls[1];
        assert_eq!(second.kind, IncomingKind::Missed);
        assert_eq!(second.user_name.as_deref(), Some("ivanov"));
        assert_eq!(second.record_url.as_deref(), Some("https://pbx/rec/2"));
    }

    #[test]
    fn direction_field_fallback() {
        let fetched = vec![(
            employee("A", "+79990000001", "1"),
            vec![CallRecord {
                call_type: Some("call".to_string()),
                direction: Some("incoming".to_string()),
                ..incoming("+74950000001", "2024-06-10 09:00:00")
            }],
        )];
        let log = collect_incoming(&fetched, &CallClassifier::default()).unwrap();
        assert_eq!(log.calls[0].kind, IncomingKind::Answered);
    }

    #[test]
    fn ordered_by_department_then_time() {
        let fetched = vec![
            (
                employee("Late", "+79990000003", "10"),
                vec![incoming("+74950000009", "2024-06-01 08:00:00")],
            ),
            (
                employee("B", "+79990000002", "2"),
                vec![incoming("+74950000002", "2024-06-10 12:00:00")],
            ),
            (
                employee("A", "+79990000001", "2"),
                vec![incoming("+74950000001", "2024-06-10 09:00:00")],
            ),
        ];
        let log = collect_incoming(&fetched, &CallClassifier::default()).unwrap();
        let order: Vec<_> = log.calls.iter().map(|c| c.employee_name.as_str()).collect();
        assert_eq!(order, vec!["A", "B", "Late"]);
    }

    #[test]
    fn unparsable_start_is_kept_raw() {
        let fetched = vec![(
            employee("A", "+79990000001", "1"),
            vec![incoming("+74950000001", "yesterday")],
        )];
        let log = collect_incoming(&fetched, &CallClassifier::default()).unwrap();
        assert_eq!(log.calls[0].started_at, None);
        assert_eq!(log.calls[0].raw_start.as_deref(), Some("yesterday"));
    }

    #[test]
    fn nothing_incoming_is_no_data() {
        let fetched = vec![(
            employee("A", "+79990000001", "1"),
            vec![CallRecord {
                call_type: Some("out".to_string()),
                ..incoming("+74950000001", "2024-06-10 09:00:00")
            }],
        )];
        assert!(matches!(
            collect_incoming(&fetched, &CallClassifier::default()),
            Err(AppError::NoData)
        ));
        assert!(matches!(
            collect_incoming(&[], &CallClassifier::default()),
            Err(AppError::NoData)
        ));
    }
}
