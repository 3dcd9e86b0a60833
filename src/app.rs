use std::path::{Path, PathBuf};

use tracing::debug;

use crate::cli::{Cli, ReportCommand};
use crate::config::Config;
use crate::core::{
    CallClassifier, CallRecord, Clock, DateInterval, DepartmentScope, Employee, FixedClock,
    IncomingLog, PeriodToken, Report, SystemClock, aggregate, collect_incoming, describe,
    prepare_roster, resolve,
};
use crate::error::AppError;
use crate::output::{
    NumberFormat, ReportTableOptions, default_xlsx_name, output_incoming_csv,
    output_incoming_json, output_report_csv, output_report_json, output_roster_json,
    print_incoming_table, print_report_table, print_roster_table, render_chart,
    write_incoming_xlsx, write_report_xlsx,
};
use crate::source::loader::with_pool;
use crate::source::{
    CacheMode, CachedDirectory, CallHistorySource, DirectoryClient, EmployeeSource, HistoryClient,
    HistoryDir, RosterFile, fetch_all,
};
use crate::utils::{Timezone, parse_date};

pub(crate) struct CommandContext<'a> {
    pub(crate) cli: &'a Cli,
    pub(crate) config: &'a Config,
    pub(crate) classifier: CallClassifier,
    pub(crate) number_format: NumberFormat,
    pub(crate) clock: Box<dyn Clock>,
}

impl<'a> CommandContext<'a> {
    pub(crate) fn new(cli: &'a Cli, config: &'a Config) -> Result<Self, AppError> {
        let timezone = Timezone::parse(cli.timezone.as_deref())?;
        let number_format = NumberFormat::from_locale(cli.locale.as_deref())?;
        let clock: Box<dyn Clock> = match cli.as_of.as_deref() {
            Some(raw) => Box::new(FixedClock(parse_date(raw)?)),
            None => Box::new(SystemClock::new(timezone)),
        };

        let mut classifier = CallClassifier::default();
        let vocabulary = &config.vocabulary;
        classifier.extend(
            &vocabulary.incoming[..],
            &vocabulary.outgoing[..],
            &vocabulary.missed[..],
        );

        Ok(Self {
            cli,
            config,
            classifier,
            number_format,
            clock,
        })
    }
}

fn employee_source(ctx: &CommandContext<'_>) -> Result<Box<dyn EmployeeSource>, AppError> {
    if let Some(path) = &ctx.cli.roster {
        return Ok(Box::new(RosterFile::new(path)));
    }
    let (url, token) = ctx.config.require_directory()?;
    let mode = if ctx.cli.offline {
        CacheMode::Offline
    } else if ctx.cli.refresh {
        CacheMode::Refresh
    } else {
        CacheMode::Normal
    };
    let client = DirectoryClient::new(url, token, ctx.config.department_range()?);
    Ok(Box::new(CachedDirectory::new(
        client,
        ctx.config.cache_ttl(),
        mode,
    )))
}

fn history_source(ctx: &CommandContext<'_>) -> Result<Box<dyn CallHistorySource>, AppError> {
    if let Some(dir) = &ctx.cli.history_dir {
        return Ok(Box::new(HistoryDir::new(dir)));
    }
    let (url, key) = ctx.config.require_pbx()?;
    Ok(Box::new(HistoryClient::new(url, key)))
}

/// List employees and apply the department scope
fn load_roster(ctx: &CommandContext<'_>) -> Result<Vec<Employee>, AppError> {
    let source = employee_source(ctx)?;
    let employees = source.list_employees()?;
    let listed = employees.len();
    let scope = DepartmentScope::from_option(ctx.cli.department.as_deref());
    let roster = prepare_roster(employees, &scope)?;
    debug!(source = source.name(), listed, kept = roster.len(), "roster prepared");
    if !ctx.cli.is_quiet() {
        eprintln!("Loaded {} employees from {}", roster.len(), source.name());
    }
    Ok(roster)
}

/// Target of `--xlsx`: the given path, or one named after the period
fn xlsx_path(ctx: &CommandContext<'_>, prefix: &str, caption: &str) -> Option<PathBuf> {
    match &ctx.cli.xlsx {
        None => None,
        Some(Some(path)) => Some(path.clone()),
        Some(None) => Some(default_xlsx_name(prefix, caption)),
    }
}

fn saved(ctx: &CommandContext<'_>, path: &Path) {
    if !ctx.cli.is_quiet() {
        eprintln!("Saved {}", path.display());
    }
}

fn emit_report(
    report: &Report,
    caption: &str,
    interval: &DateInterval,
    ctx: &CommandContext<'_>,
) -> Result<(), AppError> {
    let cli = ctx.cli;

    if let Some(path) = xlsx_path(ctx, "calls", caption) {
        write_report_xlsx(report, caption, cli.breakdown, cli.order, &path)?;
        saved(ctx, &path);
    }

    if cli.json {
        println!(
            "{}",
            output_report_json(report, caption, interval, cli.breakdown)
        );
    } else if cli.csv {
        print!("{}", output_report_csv(report, cli.breakdown, cli.order));
    } else {
        print_report_table(
            report,
            caption,
            ReportTableOptions {
                order: cli.order,
                use_color: cli.use_color(),
                breakdown: cli.breakdown,
                number_format: ctx.number_format,
            },
        );
        if cli.chart {
            println!("{}", render_chart(report, cli.breakdown, ctx.number_format));
        }
    }
    Ok(())
}

/// Records of every in-scope employee over one resolved period
struct Fetched {
    interval: DateInterval,
    caption: String,
    records: Vec<(Employee, Vec<CallRecord>)>,
}

fn fetch_period(token: PeriodToken, ctx: &CommandContext<'_>) -> Result<Fetched, AppError> {
    let interval = resolve(token, ctx.cli.custom_bounds(), ctx.clock.as_ref())?;
    let caption = describe(token, &interval);
    debug!(
        period = %token,
        start = %interval.start,
        end = %interval.end,
        days = interval.days(),
        "resolved period"
    );

    let roster = load_roster(ctx)?;
    let history = history_source(ctx)?;
    let quiet = ctx.cli.is_quiet();
    let records = with_pool(ctx.config.concurrency, || {
        fetch_all(history.as_ref(), roster, &interval, quiet)
    })?;
    Ok(Fetched {
        interval,
        caption,
        records,
    })
}

/// `NoData` is a normal outcome for a quiet period
fn report_no_data(result: Result<(), AppError>, caption: &str) -> Result<(), AppError> {
    match result {
        Err(AppError::NoData) => {
            println!("No call data found ({caption}).");
            Ok(())
        }
        other => other,
    }
}

fn run_report(token: PeriodToken, ctx: &CommandContext<'_>) -> Result<(), AppError> {
    let Fetched {
        interval,
        caption,
        records,
    } = fetch_period(token, ctx)?;
    let result = aggregate(records, &ctx.classifier)
        .and_then(|report| emit_report(&report, &caption, &interval, ctx));
    report_no_data(result, &caption)
}

fn emit_incoming(
    log: &IncomingLog,
    caption: &str,
    interval: &DateInterval,
    ctx: &CommandContext<'_>,
) -> Result<(), AppError> {
    let cli = ctx.cli;

    if let Some(path) = xlsx_path(ctx, "incoming", caption) {
        write_incoming_xlsx(log, caption, &path)?;
        saved(ctx, &path);
    }

    if cli.json {
        println!("{}", output_incoming_json(log, caption, interval));
    } else if cli.csv {
        print!("{}", output_incoming_csv(log));
    } else {
        print_incoming_table(log, caption, cli.use_color(), ctx.number_format);
    }
    Ok(())
}

fn run_incoming(token: PeriodToken, ctx: &CommandContext<'_>) -> Result<(), AppError> {
    let Fetched {
        interval,
        caption,
        records,
    } = fetch_period(token, ctx)?;
    let result = collect_incoming(&records, &ctx.classifier)
        .and_then(|log| emit_incoming(&log, &caption, &interval, ctx));
    report_no_data(result, &caption)
}

fn run_employees(ctx: &CommandContext<'_>) -> Result<(), AppError> {
    let roster = load_roster(ctx)?;
    if ctx.cli.json {
        println!("{}", output_roster_json(&roster));
    } else {
        print_roster_table(&roster, ctx.cli.use_color());
    }
    Ok(())
}

/// Run one CLI command
pub(crate) fn handle_command(
    command: ReportCommand,
    ctx: &CommandContext<'_>,
) -> Result<(), AppError> {
    match command {
        ReportCommand::Report(token) => run_report(token, ctx),
        ReportCommand::Incoming(token) => run_incoming(token, ctx),
        ReportCommand::Employees => run_employees(ctx),
    }
}

