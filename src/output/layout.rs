//! Row layout shared by the table, CSV and XLSX writers

use crate::cli::SortOrder;
use crate::core::{CallAverages, CallCounts, DepartmentSummary, EmployeeStats, Report};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineKind {
    Employee,
    Department,
    Total,
}

/// One printable row
#[derive(Debug, Clone)]
pub(crate) struct ReportLine {
    pub(crate) kind: LineKind,
    /// Department id, or "TOTAL <id>" / "TOTAL ALL" for rollups in breakdown mode
    pub(crate) label: String,
    /// Employee name, empty on rollup rows
    pub(crate) employee: String,
    pub(crate) counts: CallCounts,
    /// Rollup rows only
    pub(crate) employee_count: Option<usize>,
    pub(crate) averages: Option<CallAverages>,
    /// Employee rows only
    pub(crate) talk_seconds: Option<i64>,
    /// Employee rows with at least one timed call
    pub(crate) avg_talk_seconds: Option<f64>,
}

impl ReportLine {
    fn employee(row: &EmployeeStats) -> Self {
        ReportLine {
            kind: LineKind::Employee,
            label: row.department.clone(),
            employee: row.employee_name.clone(),
            counts: row.counts,
            employee_count: None,
            averages: None,
            talk_seconds: Some(row.talk_seconds),
            avg_talk_seconds: row.average_talk_seconds(),
        }
    }

    fn rollup(summary: &DepartmentSummary, label: String) -> Self {
        let kind = if summary.is_grand_total() {
            LineKind::Total
        } else {
            LineKind::Department
        };
        ReportLine {
            kind,
            label,
            employee: String::new(),
            counts: summary.totals,
            employee_count: Some(summary.employee_count),
            averages: Some(summary.averages),
            talk_seconds: None,
            avg_talk_seconds: None,
        }
    }

    pub(crate) fn is_rollup(&self) -> bool {
        self.kind != LineKind::Employee
    }
}

pub(crate) fn total_label(department_id: &str) -> String {
    format!("TOTAL {department_id}")
}

/// Summary: one line per department then `TOTAL ALL`.
/// Breakdown: employees grouped by department, each group closed by
/// `TOTAL <dept>`, then `TOTAL ALL`.
pub(crate) fn report_lines(report: &Report, breakdown: bool, order: SortOrder) -> Vec<ReportLine> {
    let mut departments = report.ordered_departments();
    if matches!(order, SortOrder::Desc) {
        departments.reverse();
    }

    let mut lines = Vec::new();
    for department in departments {
        if breakdown {
            lines.extend(report.rows_in(&department.department_id).map(ReportLine::employee));
            lines.push(ReportLine::rollup(
                department,
                total_label(&department.department_id),
            ));
        } else {
            lines.push(ReportLine::rollup(
                department,
                department.department_id.clone(),
            ));
        }
    }
    lines.push(ReportLine::rollup(
        &report.grand_total,
        total_label(&report.grand_total.department_id),
    ));
    lines
}


#[cfg(test)]
mod tests {
    use super::test_support::sample_report;
    use super::*;

    #[test]
    fn summary_lines() {
        let lines = report_lines(&sample_report(), false, SortOrder::Asc);
        let labels: Vec<_> = lines.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(labels, vec!["2", "10", "TOTAL ALL"]);
        assert_eq!(lines[0].employee_count, Some(2));
        assert_eq!(lines[0].counts.total, 3);
        assert_eq!(lines[2].counts.total, 4);
        assert!(lines.iter().all(ReportLine::is_rollup));
    }

    #[test]
    fn breakdown_lines() {
        let lines = report_lines(&sample_report(), true, SortOrder::Asc);
        let labels: Vec<_> = lines
            .iter()
            .map(|l| (l.label.as_str(), l.employee.as_str()))
            .collect();
        assert_eq!(
            labels,
            vec![
                ("2", "Ivanov Ivan"),
                ("2", "Petrov Petr"),
                ("TOTAL 2", ""),
                ("10", "Sidorov Sid"),
                ("TOTAL 10", ""),
                ("TOTAL ALL", ""),
            ]
        );
        assert_eq!(lines[0].talk_seconds, Some(270));
        assert_eq!(lines[0].avg_talk_seconds, Some(90.0));
        assert_eq!(lines[1].avg_talk_seconds, None);
        assert_eq!(lines[2].kind, LineKind::Department);
        assert_eq!(lines[5].kind, LineKind::Total);
    }

    #[test]
    fn descending_order_reverses_departments() {
        let lines = report_lines(&sample_report(), false, SortOrder::Desc);
        let labels: Vec<_> = lines.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(labels, vec!["10", "2", "TOTAL ALL"]);
    }
}
