//! CLI subcommand definitions
//!
//! Each report subcommand names a period; `employees` prints the roster.

use clap::Subcommand;

use crate::core::PeriodToken;
use crate::error::AppError;

/// Main CLI commands
#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Calls made today
    Today,
    /// Current calendar month (default)
    CurrentMonth,
    /// Previous calendar month
    PreviousMonth,
    /// Last 7 days including today
    Week,
    /// Last 30 days including today
    Last30,
    /// A calendar quarter
    Quarter {
        /// Year, e.g. 2024
        year: i32,
        /// Quarter number 1-4
        quarter: u32,
    },
    /// A calendar month
    Month {
        /// Year, e.g. 2024
        year: i32,
        /// Month number 1-12
        month: u32,
    },
    /// Custom range given by --since and --until
    Custom,
    /// Period by token: today, current_month, previous_month, week, month,
    /// last_<n>_days, quarter_<year>_<q>, month_<year>_<m>, custom
    Period {
        #[arg(value_name = "TOKEN")]
        token: String,
    },
    /// Every incoming and missed call with the caller's number
    Incoming {
        /// Period token (see `period`); defaults to the current month, or
        /// to the custom range when --since/--until is given
        #[arg(value_name = "TOKEN")]
        token: Option<String>,
    },
    /// Print the prepared employee roster
    Employees,
}

/// Normalized command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReportCommand {
    Report(PeriodToken),
    Incoming(PeriodToken),
    Employees,
}

/// Parse the CLI command. Without a subcommand the report covers the
/// current month, or the custom range when `--since`/`--until` is given.
pub(crate) fn parse_command(
    cmd: &Option<Commands>,
    has_custom_bounds: bool,
) -> Result<ReportCommand, AppError> {
    let token = match cmd {
        None if has_custom_bounds => PeriodToken::Custom,
        None | Some(Commands::CurrentMonth) => PeriodToken::CurrentMonth,
        Some(Commands::Today) => PeriodToken::Today,
        Some(Commands::PreviousMonth) => PeriodToken::PreviousMonth,
        Some(Commands::Week) => PeriodToken::LastNDays(7),
        Some(Commands::Last30) => PeriodToken::LastNDays(30),
        Some(Commands::Quarter { year, quarter }) => PeriodToken::Quarter {
            year: *year,
            quarter: *quarter,
        },
        Some(Commands::Month { year, month }) => PeriodToken::Month {
            year: *year,
            month: *month,
        },
        Some(Commands::Custom) => PeriodToken::Custom,
        Some(Commands::Period { token }) => token.parse()?,
        Some(Commands::Incoming { token }) => {
            let token = match token {
                Some(raw) => raw.parse()?,
                None if has_custom_bounds => PeriodToken::Custom,
                None => PeriodToken::CurrentMonth,
            };
            return Ok(ReportCommand::Incoming(token));
        }
        Some(Commands::Employees) => return Ok(ReportCommand::Employees),
    };
    Ok(ReportCommand::Report(token))
}
