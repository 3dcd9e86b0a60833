use comfy_table::{Cell, Color, Table};

use crate::cli::SortOrder;
use crate::core::Report;
use crate::output::format::{
    NumberFormat, create_styled_table, format_duration, format_number, format_total_with_average,
    header_cell, right_cell, styled_cell,
};
use crate::output::layout::{LineKind, ReportLine, report_lines};

#[derive(Debug, Clone, Copy)]
pub(crate) struct ReportTableOptions {
    pub(crate) order: SortOrder,
    pub(crate) use_color: bool,
    pub(crate) breakdown: bool,
    pub(crate) number_format: NumberFormat,
}

fn build_header(opts: &ReportTableOptions) -> Vec<Cell> {
    let c = opts.use_color;
    if opts.breakdown {
        vec![
            header_cell("Department", c),
            header_cell("Employee", c),
            header_cell("Incoming", c),
            header_cell("Outgoing", c),
            header_cell("Missed", c),
            header_cell("Total", c),
            header_cell("Talk time", c),
            header_cell("Avg talk", c),
        ]
    } else {
        vec![
            header_cell("Department", c),
            header_cell("Employees", c),
            header_cell("Incoming (avg)", c),
            header_cell("Outgoing (avg)", c),
            header_cell("Missed (avg)", c),
            header_cell("Total (avg)", c),
        ]
    }
}

fn line_colors(line: &ReportLine, use_color: bool) -> (Option<Color>, bool) {
    match (line.kind, use_color) {
        (LineKind::Employee, _) => (None, false),
        (LineKind::Department, true) => (Some(Color::Yellow), true),
        (LineKind::Total, true) => (Some(Color::Cyan), true),
        (_, false) => (None, true),
    }
}

fn breakdown_row(line: &ReportLine, opts: &ReportTableOptions) -> Vec<Cell> {
    let nf = opts.number_format;
    let (color, bold) = line_colors(line, opts.use_color);
    let talk = line.talk_seconds.map(format_duration).unwrap_or_default();
    let avg_talk = line
        .avg_talk_seconds
        .map(|s| format_duration(s.round() as i64))
        .unwrap_or_default();
    vec![
        styled_cell(&line.label, color, bold),
        Cell::new(&line.employee),
        right_cell(&format_number(line.counts.incoming, nf), color, bold),
        right_cell(&format_number(line.counts.outgoing, nf), color, bold),
        right_cell(&format_number(line.counts.missed, nf), color, bold),
        right_cell(&format_number(line.counts.total, nf), color, bold),
        right_cell(&talk, None, false),
        right_cell(&avg_talk, None, false),
    ]
}

fn summary_row(line: &ReportLine, opts: &ReportTableOptions) -> Vec<Cell> {
    let nf = opts.number_format;
    let (color, bold) = line_colors(line, opts.use_color);
    let averages = line.averages.unwrap_or_default();
    let employees = line
        .employee_count
        .map(|n| format_number(n as u64, nf))
        .unwrap_or_default();
    vec![
        styled_cell(&line.label, color, bold),
        right_cell(&employees, None, false),
        right_cell(
            &format_total_with_average(line.counts.incoming, averages.incoming, nf),
            color,
            bold,
        ),
        right_cell(
            &format_total_with_average(line.counts.outgoing, averages.outgoing, nf),
            color,
            bold,
        ),
        right_cell(
            &format_total_with_average(line.counts.missed, averages.missed, nf),
            color,
            bold,
        ),
        right_cell(
            &format_total_with_average(line.counts.total, averages.total, nf),
            color,
            bold,
        ),
    ]
}

pub(crate) fn build_report_table(report: &Report, options: ReportTableOptions) -> Table {
    let mut table = create_styled_table();
    table.set_header(build_header(&options));

    for line in report_lines(report, options.breakdown, options.order) {
        let row = if options.breakdown {
            breakdown_row(&line, &options)
        } else {
            summary_row(&line, &options)
        };
        table.add_row(row);
    }
    table
}

pub(crate) fn print_report_table(report: &Report, caption: &str, options: ReportTableOptions) {
    let table = build_report_table(report, options);
    println!("\n  {caption}\n");
    println!("{table}");

    let malformed: u64 = report.rows.iter().map(|row| row.malformed).sum();
    if malformed > 0 {
        println!(
            "\n  {} malformed call records counted in totals only\n",
            format_number(malformed, options.number_format)
        );
    } else {
        println!();
    }
}
