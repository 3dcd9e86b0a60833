mod chart;
mod csv;
mod format;
mod incoming;
mod json;
mod layout;
mod roster;
mod table;
mod xlsx;

pub(crate) use chart::render_chart;
pub(crate) use csv::output_report_csv;
pub(crate) use format::NumberFormat;
pub(crate) use incoming::{
    output_incoming_csv, output_incoming_json, print_incoming_table, write_incoming_xlsx,
};
pub(crate) use json::output_report_json;
pub(crate) use roster::{output_roster_json, print_roster_table};
pub(crate) use table::{ReportTableOptions, print_report_table};
pub(crate) use xlsx::{default_xlsx_name, write_report_xlsx};
