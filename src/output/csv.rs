use std::fmt::Write;

use crate::cli::SortOrder;
use crate::core::Report;
use crate::output::format::round_average;
use crate::output::layout::{ReportLine, report_lines};

pub(crate) const CSV_HEADER: [&str; 13] = [
    "department",
    "employee",
    "employees",
    "incoming",
    "outgoing",
    "missed",
    "total",
    "avg_incoming",
    "avg_outgoing",
    "avg_missed",
    "avg_total",
    "talk_seconds",
    "avg_talk_seconds",
];

pub(super) fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Cell values in `CSV_HEADER` order; empty where a column does not apply
pub(crate) fn line_fields(line: &ReportLine) -> [String; 13] {
    let avg = |f: fn(&crate::core::CallAverages) -> f64| {
        line.averages
            .as_ref()
            .map(|a| format!("{:.1}", round_average(f(a))))
            .unwrap_or_default()
    };
    [
        line.label.clone(),
        line.employee.clone(),
        line.employee_count.map(|n| n.to_string()).unwrap_or_default(),
        line.counts.incoming.to_string(),
        line.counts.outgoing.to_string(),
        line.counts.missed.to_string(),
        line.counts.total.to_string(),
        avg(|a| a.incoming),
        avg(|a| a.outgoing),
        avg(|a| a.missed),
        avg(|a| a.total),
        line.talk_seconds.map(|s| s.to_string()).unwrap_or_default(),
        line.avg_talk_seconds
            .map(|s| format!("{:.0}", s.round()))
            .unwrap_or_default(),
    ]
}

pub(crate) fn output_report_csv(report: &Report, breakdown: bool, order: SortOrder) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", CSV_HEADER.join(","));

    for line in report_lines(report, breakdown, order) {
        let fields: Vec<String> = line_fields(&line).iter().map(|f| csv_escape(f)).collect();
        let _ = writeln!(out, "{}", fields.join(","));
    }
    out
}
