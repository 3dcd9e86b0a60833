//! CLI argument definitions
//!
//! Global CLI options and configuration merging logic.

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::{Config, ConfigColorMode, ConfigSortOrder};
use crate::core::CustomBounds;

use super::commands::Commands;

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub(crate) enum SortOrder {
    /// Lowest department number first (default)
    #[default]
    Asc,
    /// Highest department number first
    Desc,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq)]
pub(crate) enum ColorMode {
    /// Auto-detect based on terminal (default)
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

#[derive(Parser)]
#[command(name = "callstats")]
#[command(about = "PBX call statistics per employee and department", version)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Option<Commands>,

    /// Custom range start (YYYYMMDD or YYYY-MM-DD)
    #[arg(short, long, global = true)]
    pub(crate) since: Option<String>,

    /// Custom range end, inclusive (YYYYMMDD or YYYY-MM-DD)
    #[arg(short, long, global = true)]
    pub(crate) until: Option<String>,

    /// Only report this department number
    #[arg(short, long, global = true, value_name = "NUMBER")]
    pub(crate) department: Option<String>,

    /// Show per-employee rows under each department
    #[arg(short, long, global = true)]
    pub(crate) breakdown: bool,

    /// Output as JSON
    #[arg(short, long, global = true)]
    pub(crate) json: bool,

    /// Output as CSV
    #[arg(long, global = true, conflicts_with = "json")]
    pub(crate) csv: bool,

    /// Write an Excel workbook; without `=PATH` the name is derived from the period
    #[arg(long, global = true, value_name = "PATH", num_args = 0..=1, require_equals = true)]
    pub(crate) xlsx: Option<Option<PathBuf>>,

    /// Print a bar chart of call volume after the table
    #[arg(long, global = true)]
    pub(crate) chart: bool,

    /// Department sort order
    #[arg(short, long, global = true, value_enum, default_value = "asc")]
    pub(crate) order: SortOrder,

    /// Color output mode
    #[arg(long, global = true, value_enum, default_value = "auto")]
    pub(crate) color: ColorMode,

    /// Disable colored output (shorthand for --color=never)
    #[arg(long, global = true)]
    pub(crate) no_color: bool,

    /// Enable debug logging on stderr
    #[arg(long, global = true)]
    pub(crate) debug: bool,

    /// Suppress progress messages
    #[arg(short, long, global = true)]
    pub(crate) quiet: bool,

    /// Refetch the employee directory even if the cache is fresh
    #[arg(long, global = true, conflicts_with = "offline")]
    pub(crate) refresh: bool,

    /// Use the cached employee directory only
    #[arg(short = 'O', long, global = true)]
    pub(crate) offline: bool,

    /// Read employees from a JSON file instead of the directory
    #[arg(long, global = true, value_name = "FILE")]
    pub(crate) roster: Option<PathBuf>,

    /// Read call history from <DIR>/<phone digits>.json instead of the PBX
    #[arg(long, global = true, value_name = "DIR")]
    pub(crate) history_dir: Option<PathBuf>,

    /// Pretend today is this date (YYYYMMDD or YYYY-MM-DD)
    #[arg(long, global = true, value_name = "DATE")]
    pub(crate) as_of: Option<String>,

    /// Timezone that decides what "today" is (e.g., "Europe/Moscow", "UTC")
    #[arg(long, global = true, value_name = "TZ")]
    pub(crate) timezone: Option<String>,

    /// Locale for number formatting (e.g., "en", "ru", "de")
    #[arg(long, global = true, value_name = "LOCALE")]
    pub(crate) locale: Option<String>,
}

impl Cli {
    /// Merge config file values into CLI (CLI args take precedence)
    pub(crate) fn with_config(mut self, config: &Config) -> Self {
        // For boolean flags, config only applies if CLI is false (default)
        if !self.breakdown && config.breakdown {
            self.breakdown = true;
        }
        if !self.debug && config.debug {
            self.debug = true;
        }

        // For enum values, only override if CLI is at default
        if config.order == Some(ConfigSortOrder::Desc) && self.order == SortOrder::Asc {
            self.order = SortOrder::Desc;
        }
        if self.color == ColorMode::Auto {
            match config.color {
                Some(ConfigColorMode::Always) => self.color = ColorMode::Always,
                Some(ConfigColorMode::Never) => self.color = ColorMode::Never,
                Some(ConfigColorMode::Auto) | None => {}
            }
        }

        // String options: only apply if CLI didn't set them
        if self.timezone.is_none() {
            self.timezone = config.timezone.clone();
        }
        if self.locale.is_none() {
            self.locale = config.locale.clone();
        }

        self
    }

    pub(crate) fn use_color(&self) -> bool {
        if self.no_color {
            return false;
        }
        match self.color {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => std::io::stdout().is_terminal(),
        }
    }

    pub(crate) fn custom_bounds(&self) -> CustomBounds<'_> {
        CustomBounds {
            start: self.since.as_deref(),
            end: self.until.as_deref(),
        }
    }

    pub(crate) fn has_custom_bounds(&self) -> bool {
        self.since.is_some() || self.until.is_some()
    }

    /// Machine-readable output goes to stdout, so progress lines are muted
    pub(crate) fn is_quiet(&self) -> bool {
        self.quiet || self.json || self.csv
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("callstats").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = parse(&["quarter", "2024", "2", "-d", "5", "--json", "-b"]);
        assert_eq!(cli.department.as_deref(), Some("5"));
        assert!(cli.json);
        assert!(cli.breakdown);
        assert!(cli.is_quiet());
    }

    #[test]
    fn xlsx_without_path() {
        let cli = parse(&["--xlsx"]);
        assert_eq!(cli.xlsx, Some(None));
        let cli = parse(&["today", "--xlsx"]);
        assert_eq!(cli.xlsx, Some(None));
        assert!(matches!(cli.command, Some(Commands::Today)));
    }

    #[test]
    fn xlsx_does_not_swallow_subcommand() {
        let cli = parse(&["--xlsx", "today"]);
        assert_eq!(cli.xlsx, Some(None));
        assert!(matches!(cli.command, Some(Commands::Today)));
    }

    #[test]
    fn xlsx_with_path() {
        let cli = parse(&["--xlsx=out.xlsx", "today"]);
        assert_eq!(cli.xlsx, Some(Some(PathBuf::from("out.xlsx"))));
        assert!(parse(&["today"]).xlsx.is_none());
    }

    #[test]
    fn json_and_csv_conflict() {
        assert!(Cli::try_parse_from(["callstats", "--json", "--csv"]).is_err());
    }

    #[test]
    fn config_fills_defaults_only() {
        let config = Config {
            breakdown: true,
            order: Some(ConfigSortOrder::Desc),
            color: Some(ConfigColorMode::Never),
            timezone: Some("Europe/Moscow".to_string()),
            locale: Some("ru".to_string()),
            ..Default::default()
        };
        let cli = parse(&["--locale", "en"]).with_config(&config);
        assert!(cli.breakdown);
        assert_eq!(cli.order, SortOrder::Desc);
        assert_eq!(cli.color, ColorMode::Never);
        assert!(!cli.use_color());
        assert_eq!(cli.timezone.as_deref(), Some("Europe/Moscow"));
        assert_eq!(cli.locale.as_deref(), Some("en"));
    }

    #[test]
    fn custom_bounds_from_flags() {
        let cli = parse(&["custom", "--since", "2024-06-01", "--until", "20240610"]);
        let bounds = cli.custom_bounds();
        assert_eq!(bounds.start, Some("2024-06-01"));
        assert_eq!(bounds.end, Some("20240610"));
        assert!(cli.has_custom_bounds());
    }
}
