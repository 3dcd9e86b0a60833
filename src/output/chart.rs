//! Horizontal unicode bar chart of call volume

use std::fmt::Write;

use crate::core::Report;
use crate::output::format::{NumberFormat, format_number};

const BAR_WIDTH: usize = 40;
const EIGHTHS: [char; 8] = [' ', '▏', '▎', '▍', '▌', '▋', '▊', '▉'];

/// Bar of `value / max` scaled to `width` cells, with eighth-block precision
fn bar(value: u64, max: u64, width: usize) -> String {
    if max == 0 || value == 0 {
        return String::new();
    }
    let eighths = (value as u128 * width as u128 * 8).div_ceil(max as u128) as usize;
    let mut s = "█".repeat(eighths / 8);
    if eighths % 8 > 0 {
        s.push(EIGHTHS[eighths % 8]);
    }
    s
}

/// Total calls per department, or per employee in breakdown mode
pub(crate) fn render_chart(report: &Report, breakdown: bool, number_format: NumberFormat) -> String {
    let entries: Vec<(String, u64)> = if breakdown {
        report
            .rows
            .iter()
            .map(|row| (format!("{} · {}", row.department, row.employee_name), row.counts.total))
            .collect()
    } else {
        report
            .ordered_departments()
            .into_iter()
            .map(|d| (format!("Department {}", d.department_id), d.totals.total))
            .collect()
    };

    let label_width = entries
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0);
    let max = entries.iter().map(|(_, v)| *v).max().unwrap_or(0);

    let mut out = String::new();
    for (label, value) in &entries {
        let pad = label_width - label.chars().count();
        let _ = writeln!(
            out,
            "{label}{} │{} {}",
            " ".repeat(pad),
            bar(*value, max, BAR_WIDTH),
            format_number(*value, number_format)
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::layout::test_support::sample_report;

    #[test]
    fn bar_scaling() {
        assert_eq!(bar(0, 10, 10), "");
        assert_eq!(bar(5, 0, 10), "");
        assert_eq!(bar(10, 10, 10), "██████████");
        assert_eq!(bar(5, 10, 10), "█████");
        assert_eq!(bar(1, 16, 2), "▏");
    }

    #[test]
    fn department_chart() {
        let chart = render_chart(&sample_report(), false, NumberFormat::default());
        let lines: Vec<_> = chart.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Department 2  │"));
        assert!(lines[0].ends_with(" 3"));
        assert!(lines[1].starts_with("Department 10 │"));
    }

    #[test]
    fn employee_chart() {
        let chart = render_chart(&sample_report(), true, NumberFormat::default());
        assert_eq!(chart.lines().count(), 3);
        assert!(chart.contains("2 · Petrov Petr"));
    }
}
