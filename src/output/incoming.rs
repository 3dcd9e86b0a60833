//! Renderers for the incoming-call log: table, JSON, CSV and XLSX

use std::fmt::Write as _;
use std::path::Path;

use comfy_table::{Cell, Color, Table};
use rust_xlsxwriter::{Format, Workbook};
use serde_json::{Value, json};

use crate::consts::{CALL_TIME_FORMAT, DATE_FORMAT};
use crate::core::{DateInterval, IncomingCall, IncomingKind, IncomingLog};
use crate::error::AppError;
use crate::output::csv::csv_escape;
use crate::output::format::{
    NumberFormat, create_styled_table, format_number, header_cell, styled_cell,
};

const SHEET_NAME: &str = "Incoming";

pub(crate) const INCOMING_HEADER: [&str; 8] = [
    "department",
    "employee",
    "receiver",
    "user",
    "caller",
    "type",
    "started",
    "record",
];

fn call_time(call: &IncomingCall) -> String {
    match (call.started_at, &call.raw_start) {
        (Some(started), _) => started.format(CALL_TIME_FORMAT).to_string(),
        (None, Some(raw)) => raw.clone(),
        (None, None) => String::new(),
    }
}

/// Cell values in `INCOMING_HEADER` order
pub(crate) fn incoming_fields(call: &IncomingCall) -> [String; 8] {
    [
        call.department.clone(),
        call.employee_name.clone(),
        call.receiver_phone.clone(),
        call.user_name.clone().unwrap_or_default(),
        call.caller.clone(),
        call.kind.label().to_string(),
        call_time(call),
        call.record_url.clone().unwrap_or_default(),
    ]
}

pub(crate) fn output_incoming_csv(log: &IncomingLog) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", INCOMING_HEADER.join(","));
    for call in &log.calls {
        let fields: Vec<String> = incoming_fields(call).iter().map(|f| csv_escape(f)).collect();
        let _ = writeln!(out, "{}", fields.join(","));
    }
    out
}

pub(crate) fn output_incoming_json(
    log: &IncomingLog,
    caption: &str,
    interval: &DateInterval,
) -> String {
    let calls: Vec<Value> = log
        .calls
        .iter()
        .map(|call| {
            json!({
                "department": call.department,
                "employee": call.employee_name,
                "receiver": call.receiver_phone,
                "user": call.user_name,
                "caller": call.caller,
                "type": call.kind.label(),
                "started": call.started_at.map(|t| t.to_string()).or_else(|| call.raw_start.clone()),
                "record": call.record_url,
            })
        })
        .collect();
    let output = json!({
        "period": caption,
        "start": interval.start.format(DATE_FORMAT).to_string(),
        "end": interval.end.format(DATE_FORMAT).to_string(),
        "incoming": log.answered,
        "missed": log.missed,
        "calls": calls,
    });
    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
}

pub(crate) fn build_incoming_table(log: &IncomingLog, use_color: bool) -> Table {
    let mut table = create_styled_table();
    table.set_header(
        ["Department", "Employee", "Receiver", "User", "Caller", "Type", "Started", "Record"]
            .into_iter()
            .map(|title| header_cell(title, use_color))
            .collect::<Vec<_>>(),
    );
    for call in &log.calls {
        let color = match (call.kind, use_color) {
            (IncomingKind::Missed, true) => Some(Color::Red),
            _ => None,
        };
        let mut row: Vec<Cell> = Vec::with_capacity(INCOMING_HEADER.len());
        for (col, value) in incoming_fields(call).iter().enumerate() {
            // type column carries the color
            let cell = if col == 5 {
                styled_cell(value, color, false)
            } else {
                Cell::new(value)
            };
            row.push(cell);
        }
        table.add_row(row);
    }
    table
}

pub(crate) fn print_incoming_table(
    log: &IncomingLog,
    caption: &str,
    use_color: bool,
    number_format: NumberFormat,
) {
    println!("\n  {caption}\n");
    println!("{}", build_incoming_table(log, use_color));
    println!(
        "\n  {} incoming, {} missed\n",
        format_number(log.answered, number_format),
        format_number(log.missed, number_format)
    );
}

/// Single sheet: caption, bold header, one row per call
pub(crate) fn write_incoming_xlsx(
    log: &IncomingLog,
    caption: &str,
    path: &Path,
) -> Result<(), AppError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    let bold = Format::new().set_bold();
    let header_format = Format::new()
        .set_bold()
        .set_background_color(rust_xlsxwriter::Color::Gray);

    worksheet.write_string_with_format(0, 0, caption, &bold)?;
    for (col, title) in INCOMING_HEADER.iter().enumerate() {
        worksheet.write_string_with_format(1, col as u16, *title, &header_format)?;
    }

    let mut row: u32 = 2;
    for call in &log.calls {
        for (col, value) in incoming_fields(call).iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            if col == 7 {
                worksheet.write_url(row, col as u16, value.as_str())?;
            } else {
                worksheet.write_string(row, col as u16, value)?;
            }
        }
        row += 1;
    }

    worksheet.autofit();
    workbook.save(path)?;
    Ok(())
}
