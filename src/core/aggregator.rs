//! Call aggregation
//!
//! Folds every employee's fetched records into per-employee rows, department
//! summaries and a grand total. Runs once, after all fetches have finished,
//! because averages need the final employee count of each department.

use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::consts::ALL_DEPARTMENTS;
use crate::core::classify::{CallClassifier, CallDirection};
use crate::core::types::{
    CallCounts, CallRecord, DepartmentSummary, Employee, EmployeeStats, Report,
    department_sort_key,
};
use crate::error::{AppError, RecordError};

/// Running figures for one employee
#[derive(Debug, Default)]
struct EmployeeAccumulator {
    counts: CallCounts,
    talk_seconds: i64,
    timed_calls: u64,
    first_call: Option<NaiveDateTime>,
    last_call: Option<NaiveDateTime>,
    malformed: u64,
}

impl EmployeeAccumulator {
    fn add_record(&mut self, record: &CallRecord, classifier: &CallClassifier) {
        // every record counts, whatever its shape
        self.counts.total += 1;

        let classification = match classifier.classify(record) {
            Ok(classification) => classification,
            Err(err) => return self.reject(err),
        };
        let started = match record.started_at() {
            Ok(started) => Some(started),
            Err(RecordError::MissingTimestamp) => None,
            Err(err) => return self.reject(err),
        };

        match classification.direction {
            CallDirection::Incoming => self.counts.incoming += 1,
            CallDirection::Outgoing => self.counts.outgoing += 1,
            CallDirection::Unclassified => {}
        }
        if classification.missed {
            self.counts.missed += 1;
        }

        if let Some(started) = started {
            self.update_timestamps(started);
            if let Some(ended) = record.ended_at()
                && ended >= started
            {
                self.talk_seconds += (ended - started).num_seconds();
                self.timed_calls += 1;
            }
        }
    }

    fn reject(&mut self, err: RecordError) {
        debug!(error = %err, "skipping malformed call record");
        self.malformed += 1;
    }

    fn update_timestamps(&mut self, started: NaiveDateTime) {
        if self.first_call.is_none_or(|first| started < first) {
            self.first_call = Some(started);
        }
        if self.last_call.is_none_or(|last| started > last) {
            self.last_call = Some(started);
        }
    }

    fn into_employee_stats(self, employee: Employee) -> EmployeeStats {
        EmployeeStats {
            employee_name: employee.name,
            phone: employee.phone,
            department: employee.department,
            counts: self.counts,
            talk_seconds: self.talk_seconds,
            timed_calls: self.timed_calls,
            first_call: self.first_call,
            last_call: self.last_call,
            malformed: self.malformed,
        }
    }
}

/// Aggregate all employees' records into a report.
///
/// Employees with an empty record list stay in their department's
/// denominator. Returns [`AppError::NoData`] when there is not a single
/// record across the whole input.
pub(crate) fn aggregate(
    input: Vec<(Employee, Vec<CallRecord>)>,
    classifier: &CallClassifier,
) -> Result<Report, AppError> {
    let mut rows = Vec::with_capacity(input.len());
    let mut departments: BTreeMap<String, DepartmentSummary> = BTreeMap::new();
    let mut record_count: u64 = 0;
    let mut malformed: u64 = 0;

    for (employee, records) in input {
        let mut acc = EmployeeAccumulator::default();
        for record in &records {
            acc.add_record(record, classifier);
        }
        record_count += acc.counts.total;
        malformed += acc.malformed;

        departments
            .entry(employee.department.clone())
            .or_insert_with(|| DepartmentSummary::new(employee.department.clone()))
            .add_employee(&acc.counts);
        rows.push(acc.into_employee_stats(employee));
    }

    if record_count == 0 {
        return Err(AppError::NoData);
    }
    if malformed > 0 {
        warn!(malformed, total = record_count, "some call records were malformed");
    }

    let mut grand_total = DepartmentSummary::new(ALL_DEPARTMENTS);
    for department in departments.values_mut() {
        department.finalize();
        grand_total.merge(department);
    }
    grand_total.finalize();

    rows.sort_by(|a, b| {
        department_sort_key(&a.department)
            .cmp(&department_sort_key(&b.department))
            .then_with(|| a.employee_name.cmp(&b.employee_name))
    });

    Ok(Report {
        rows,
        departments,
        grand_total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee(name: &str, department: &str) -> Employee {
        Employee {
            name: name.to_string(),
            phone: format!("+7900{:07}", name.len()),
            department: department.to_string(),
        }
    }

    fn call(call_type: &str) -> CallRecord {
        CallRecord {
            call_type: Some(call_type.to_string()),
            ..Default::default()
        }
    }

    fn call_with(call_type: &str, status: &str) -> CallRecord {
        CallRecord {
            status: Some(status.to_string()),
            ..call(call_type)
        }
    }

    fn timed(call_type: &str, start: &str, end: &str) -> CallRecord {
        CallRecord {
            start: Some(start.to_string()),
            end: Some(end.to_string()),
            ..call(call_type)
        }
    }

    fn run(input: Vec<(Employee, Vec<CallRecord>)>) -> Result<Report, AppError> {
        aggregate(input, &CallClassifier::default())
    }

    #[test]
    fn counts_overlap_and_unclassified() {
        let report = run(vec![(
            employee("A", "1"),
            vec![
                call("in"),
                call("out"),
                call("weird"),
                call_with("in", "missed"),
            ],
        )])
        .unwrap();

        let row = &report.rows[0];
        assert_eq!(row.counts.incoming, 2);
        assert_eq!(row.counts.outgoing, 1);
        assert_eq!(row.counts.missed, 1);
        assert_eq!(row.counts.total, 4);
        assert_eq!(row.malformed, 0);
    }

    #[test]
    fn zero_call_employee_counts_in_denominator() {
        let report = run(vec![
            (employee("Idle", "5"), vec![]),
            (
                employee("Busy", "5"),
                vec![call("in"), call("in"), call("out")],
            ),
        ])
        .unwrap();

        let dept = &report.departments["5"];
        assert_eq!(dept.employee_count, 2);
        assert_eq!(dept.totals.total, 3);
        assert_eq!(dept.averages.total, 1.5);
        assert_eq!(dept.averages.incoming, 1.0);
        assert_eq!(dept.averages.outgoing, 0.5);
    }

    #[test]
    fn grand_total_divides_by_all_employees() {
        let report = run(vec![
            (employee("A", "1"), vec![call("in"), call("in")]),
            (employee("B", "2"), vec![call("out")]),
            (employee("C", "2"), vec![]),
        ])
        .unwrap();

        let total = &report.grand_total;
        assert!(total.is_grand_total());
        assert_eq!(total.employee_count, 3);
        assert_eq!(total.totals.incoming, 2);
        assert_eq!(total.totals.outgoing, 1);
        assert_eq!(total.totals.total, 3);
        assert_eq!(total.averages.total, 1.0);
    }

    #[test]
    fn empty_input_is_no_data() {
        assert!(matches!(run(vec![]), Err(AppError::NoData)));
    }

    #[test]
    fn all_employees_without_records_is_no_data() {
        let result = run(vec![
            (employee("A", "1"), vec![]),
            (employee("B", "2"), vec![]),
        ]);
        assert!(matches!(result, Err(AppError::NoData)));
    }

    #[test]
    fn no_phantom_departments() {
        let report = run(vec![
            (employee("A", "3"), vec![call("in")]),
            (employee("B", "7"), vec![]),
        ])
        .unwrap();
        let ids: Vec<_> = report.departments.keys().cloned().collect();
        assert_eq!(ids, vec!["3", "7"]);
    }

    #[test]
    fn malformed_records_count_in_total_only() {
        let report = run(vec![(
            employee("A", "1"),
            vec![
                CallRecord {
                    status: Some("missed".to_string()),
                    ..Default::default()
                },
                CallRecord {
                    start: Some("garbage".to_string()),
                    ..call("in")
                },
                timed("in", "2024-06-10 09:00:00", "2024-06-10 09:01:00"),
            ],
        )])
        .unwrap();

        let row = &report.rows[0];
        assert_eq!(row.counts.total, 3);
        assert_eq!(row.counts.incoming, 1);
        assert_eq!(row.counts.missed, 0);
        assert_eq!(row.malformed, 2);
        assert_eq!(row.talk_seconds, 60);
        assert_eq!(row.timed_calls, 1);
    }

    #[test]
    fn average_talk_time_needs_timed_calls() {
        let report = run(vec![(employee("A", "1"), vec![call("in")])]).unwrap();
        assert_eq!(report.rows[0].timed_calls, 0);
        assert_eq!(report.rows[0].average_talk_seconds(), None);
    }

    #[test]
    fn timestamps_and_talk_time() {
        let report = run(vec![(
            employee("A", "1"),
            vec![
                timed("in", "2024-06-10 12:00:00", "2024-06-10 12:05:00"),
                timed("out", "2024-06-10 08:30:00", "2024-06-10 08:30:45"),
                // end before start contributes no talk time
                timed("out", "2024-06-11 10:00:00", "2024-06-11 09:00:00"),
                call("in"),
            ],
        )])
        .unwrap();

        let row = &report.rows[0];
        assert_eq!(row.talk_seconds, 300 + 45);
        assert_eq!(row.timed_calls, 2);
        assert_eq!(row.average_talk_seconds(), Some(172.5));
        assert_eq!(
            row.first_call.unwrap().to_string(),
            "2024-06-10 08:30:00"
        );
        assert_eq!(row.last_call.unwrap().to_string(), "2024-06-11 10:00:00");
        assert_eq!(row.malformed, 0);
    }

    #[test]
    fn rows_sorted_by_department_then_name() {
        let report = run(vec![
            (employee("Zoe", "10"), vec![call("in")]),
            (employee("Bob", "2"), vec![]),
            (employee("Amy", "2"), vec![]),
            (employee("Max", "1"), vec![]),
        ])
        .unwrap();

        let order: Vec<_> = report
            .rows
            .iter()
            .map(|r| (r.department.as_str(), r.employee_name.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![("1", "Max"), ("2", "Amy"), ("2", "Bob"), ("10", "Zoe")]
        );

        let depts: Vec<_> = report
            .ordered_departments()
            .iter()
            .map(|d| d.department_id.as_str())
            .collect();
        assert_eq!(depts, vec!["1", "2", "10"]);
        assert_eq!(report.rows_in("2").count(), 2);
    }

    #[test]
    fn custom_vocabulary_is_honoured() {
        let mut classifier = CallClassifier::default();
        classifier.extend(&["callback"], &[], &["busy"]);
        let report = aggregate(
            vec![(
                employee("A", "1"),
                vec![call_with("callback", "busy"), call("weird")],
            )],
            &classifier,
        )
        .unwrap();
        let row = &report.rows[0];
        assert_eq!(row.counts.incoming, 1);
        assert_eq!(row.counts.missed, 1);
        assert_eq!(row.counts.total, 2);
    }
}
