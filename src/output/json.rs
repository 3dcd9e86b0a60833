use serde_json::{Value, json};

use crate::consts::DATE_FORMAT;
use crate::core::{CallAverages, DateInterval, DepartmentSummary, EmployeeStats, Report};
use crate::output::format::round_average;

fn averages_json(averages: &CallAverages) -> Value {
    json!({
        "incoming": round_average(averages.incoming),
        "outgoing": round_average(averages.outgoing),
        "missed": round_average(averages.missed),
        "total": round_average(averages.total),
    })
}

fn department_json(summary: &DepartmentSummary) -> Value {
    json!({
        "department": summary.department_id,
        "employees": summary.employee_count,
        "incoming": summary.totals.incoming,
        "outgoing": summary.totals.outgoing,
        "missed": summary.totals.missed,
        "total": summary.totals.total,
        "averages": averages_json(&summary.averages),
    })
}

fn row_json(row: &EmployeeStats) -> Value {
    json!({
        "employee": row.employee_name,
        "phone": row.phone,
        "department": row.department,
        "incoming": row.counts.incoming,
        "outgoing": row.counts.outgoing,
        "missed": row.counts.missed,
        "total": row.counts.total,
        "talk_seconds": row.talk_seconds,
        "avg_talk_seconds": row.average_talk_seconds().map(round_average),
        "first_call": row.first_call.map(|t| t.to_string()),
        "last_call": row.last_call.map(|t| t.to_string()),
        "malformed": row.malformed,
    })
}

/// `{period, start, end, rows, departments, total}`. Employee rows are
/// included only in breakdown mode.
pub(crate) fn output_report_json(
    report: &Report,
    caption: &str,
    interval: &DateInterval,
    breakdown: bool,
) -> String {
    let rows: Vec<Value> = if breakdown {
        report.rows.iter().map(row_json).collect()
    } else {
        Vec::new()
    };
    let departments: Vec<Value> = report
        .ordered_departments()
        .into_iter()
        .map(department_json)
        .collect();

    let output = json!({
        "period": caption,
        "start": interval.start.format(DATE_FORMAT).to_string(),
        "end": interval.end.format(DATE_FORMAT).to_string(),
        "rows": rows,
        "departments": departments,
        "total": department_json(&report.grand_total),
    });
    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
}
