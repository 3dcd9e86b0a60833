use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, Workbook};

use crate::cli::SortOrder;
use crate::core::Report;
use crate::error::AppError;
use crate::output::csv::{CSV_HEADER, line_fields};
use crate::output::layout::report_lines;

const SHEET_NAME: &str = "Calls";
const FIRST_NUMERIC_COLUMN: usize = 2;

/// `<prefix>_<slug of the period caption>.xlsx`
pub(crate) fn default_xlsx_name(prefix: &str, caption: &str) -> PathBuf {
    let mut slug = String::new();
    for c in caption.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('_') {
            slug.push('_');
        }
    }
    let slug = slug.trim_end_matches('_');
    if slug.is_empty() {
        PathBuf::from(format!("{prefix}.xlsx"))
    } else {
        PathBuf::from(format!("{prefix}_{slug}.xlsx"))
    }
}

/// Write the report as a single-sheet workbook: caption, bold header, then
/// the same rows as the CSV export with rollups in bold.
pub(crate) fn write_report_xlsx(
    report: &Report,
    caption: &str,
    breakdown: bool,
    order: SortOrder,
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
    for (col, title) in CSV_HEADER.iter().enumerate() {
        worksheet.write_string_with_format(1, col as u16, *title, &header_format)?;
    }

    let mut row: u32 = 2;
    for line in report_lines(report, breakdown, order) {
        let rollup = line.is_rollup();
        for (col, value) in line_fields(&line).iter().enumerate() {
            let col = col as u16;
            if value.is_empty() {
                continue;
            }
            let number = (col as usize >= FIRST_NUMERIC_COLUMN)
                .then(|| value.parse::<f64>().ok())
                .flatten();
            match (number, rollup) {
                (Some(n), true) => {
                    worksheet.write_number_with_format(row, col, n, &bold)?;
                }
                (Some(n), false) => {
                    worksheet.write_number(row, col, n)?;
                }
                (None, true) => {
                    worksheet.write_string_with_format(row, col, value, &bold)?;
                }
                (None, false) => {
                    worksheet.write_string(row, col, value)?;
                }
            }
        }
        row += 1;
    }

    worksheet.autofit();
    workbook.save(path)?;
    Ok(())
}
