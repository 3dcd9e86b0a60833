//! Core data types
//!
//! Inputs handed over by the directory and call-history collaborators, and
//! the derived statistics the aggregator produces for the presentation layer.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::consts::ALL_DEPARTMENTS;
use crate::error::RecordError;
use crate::utils::parse_timestamp;

/// One person on the roster, as supplied by the directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Employee {
    pub(crate) name: String,
    /// Raw phone, may be empty or a "no data" placeholder
    pub(crate) phone: String,
    /// Department number, digits only once the roster is prepared
    pub(crate) department: String,
}

/// Fields that carry the other party's number, in lookup order. API
/// versions disagree on the name.
const CALLER_FIELDS: [&str; 8] = [
    "phone",
    "caller",
    "caller_id",
    "source",
    "from",
    "from_number",
    "number",
    "client",
];

/// Raw call as returned by the PBX. Vocabulary differs between API versions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct CallRecord {
    pub(crate) call_type: Option<String>,
    pub(crate) status: Option<String>,
    pub(crate) start: Option<String>,
    pub(crate) end: Option<String>,
    /// Older API versions put the direction here instead of in `type`
    pub(crate) direction: Option<String>,
    /// PBX user who handled the call
    pub(crate) user_name: Option<String>,
    /// Other party's number
    pub(crate) caller: Option<String>,
    /// Recording URL
    pub(crate) record: Option<String>,
}

fn json_text(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn non_empty_text(value: &Value, key: &str) -> Option<String> {
    json_text(value, key).filter(|s| !s.trim().is_empty())
}

impl CallRecord {
    /// Lenient conversion from one element of an API response.
    /// Returns `None` only when the element is not an object.
    pub(crate) fn from_json(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        Some(Self {
            call_type: json_text(value, "type"),
            status: json_text(value, "status"),
            start: json_text(value, "start"),
            end: json_text(value, "end"),
            direction: non_empty_text(value, "direction"),
            user_name: non_empty_text(value, "user_name"),
            caller: CALLER_FIELDS
                .iter()
                .find_map(|key| non_empty_text(value, key)),
            record: non_empty_text(value, "record"),
        })
    }

    pub(crate) fn started_at(&self) -> Result<NaiveDateTime, RecordError> {
        let raw = self.start.as_deref().ok_or(RecordError::MissingTimestamp)?;
        parse_timestamp(raw).ok_or_else(|| RecordError::MalformedTimestamp {
            input: raw.to_string(),
        })
    }

    pub(crate) fn ended_at(&self) -> Option<NaiveDateTime> {
        self.end.as_deref().and_then(parse_timestamp)
    }
}

/// Typed call counters. `total` is the raw record count and may exceed
/// `incoming + outgoing` (unclassified calls) or fall short of
/// `incoming + outgoing + missed` (missed overlaps a direction).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CallCounts {
    pub(crate) incoming: u64,
    pub(crate) outgoing: u64,
    pub(crate) missed: u64,
    pub(crate) total: u64,
}

impl CallCounts {
    pub(crate) fn add(&mut self, other: &CallCounts) {
        self.incoming += other.incoming;
        self.outgoing += other.outgoing;
        self.missed += other.missed;
        self.total += other.total;
    }

    pub(crate) fn averages(&self, employees: usize) -> CallAverages {
        if employees == 0 {
            return CallAverages::default();
        }
        let n = employees as f64;
        CallAverages {
            incoming: self.incoming as f64 / n,
            outgoing: self.outgoing as f64 / n,
            missed: self.missed as f64 / n,
            total: self.total as f64 / n,
        }
    }
}

/// Per-employee means of [`CallCounts`]
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub(crate) struct CallAverages {
    pub(crate) incoming: f64,
    pub(crate) outgoing: f64,
    pub(crate) missed: f64,
    pub(crate) total: f64,
}

/// One row per employee per report
#[derive(Debug, Clone)]
pub(crate) struct EmployeeStats {
    pub(crate) employee_name: String,
    pub(crate) phone: String,
    pub(crate) department: String,
    pub(crate) counts: CallCounts,
    /// Sum of `end - start` over records where both timestamps parse
    pub(crate) talk_seconds: i64,
    /// Records that contributed to `talk_seconds`
    pub(crate) timed_calls: u64,
    pub(crate) first_call: Option<NaiveDateTime>,
    pub(crate) last_call: Option<NaiveDateTime>,
    /// Records with a missing type or unparsable start
    pub(crate) malformed: u64,
}

impl EmployeeStats {
    /// Mean talk time over timed calls, `None` when no call had both timestamps
    pub(crate) fn average_talk_seconds(&self) -> Option<f64> {
        (self.timed_calls > 0).then(|| self.talk_seconds as f64 / self.timed_calls as f64)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct DepartmentSummary {
    pub(crate) department_id: String,
    pub(crate) totals: CallCounts,
    pub(crate) employee_count: usize,
    pub(crate) averages: CallAverages,
}

impl DepartmentSummary {
    pub(crate) fn new(department_id: impl Into<String>) -> Self {
        Self {
            department_id: department_id.into(),
            totals: CallCounts::default(),
            employee_count: 0,
            averages: CallAverages::default(),
        }
    }

    pub(crate) fn add_employee(&mut self, counts: &CallCounts) {
        self.totals.add(counts);
        self.employee_count += 1;
    }

    pub(crate) fn merge(&mut self, other: &DepartmentSummary) {
        self.totals.add(&other.totals);
        self.employee_count += other.employee_count;
    }

    pub(crate) fn finalize(&mut self) {
        self.averages = self.totals.averages(self.employee_count);
    }

    pub(crate) fn is_grand_total(&self) -> bool {
        self.department_id == ALL_DEPARTMENTS
    }
}

/// Orders department ids numerically ("2" before "10"), non-numeric last.
pub(crate) fn department_sort_key(id: &str) -> (u64, &str) {
    (id.parse::<u64>().unwrap_or(u64::MAX), id)
}

/// Output of one aggregation pass
#[derive(Debug, Clone)]
pub(crate) struct Report {
    pub(crate) rows: Vec<EmployeeStats>,
    pub(crate) departments: BTreeMap<String, DepartmentSummary>,
    pub(crate) grand_total: DepartmentSummary,
}

impl Report {
    /// Departments in numeric order
    pub(crate) fn ordered_departments(&self) -> Vec<&DepartmentSummary> {
        let mut departments: Vec<_> = self.departments.values().collect();
        departments.sort_by(|a, b| {
            department_sort_key(&a.department_id).cmp(&department_sort_key(&b.department_id))
        });
        departments
    }

    pub(crate) fn rows_in<'a>(
        &'a self,
        department_id: &'a str,
    ) -> impl Iterator<Item = &'a EmployeeStats> + 'a {
        self.rows
            .iter()
            .filter(move |row| row.department == department_id)
    }
}
