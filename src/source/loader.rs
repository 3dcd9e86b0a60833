//! Concurrent call-history fetch for a whole roster

use rayon::prelude::*;
use std::time::Instant;
use tracing::{info, warn};

use crate::core::{CallRecord, DateInterval, Employee};
use crate::error::AppError;
use crate::source::CallHistorySource;

/// Fetch every employee's records in parallel.
///
/// A failed fetch is logged and yields an empty list, so the employee stays
/// in the result and in its department's head count. Output order matches
/// the roster.
pub(crate) fn fetch_all(
    source: &dyn CallHistorySource,
    roster: Vec<Employee>,
    interval: &DateInterval,
    quiet: bool,
) -> Vec<(Employee, Vec<CallRecord>)> {
    if roster.is_empty() {
        return Vec::new();
    }

    let employee_count = roster.len();
    let fetch_start = Instant::now();
    let results: Vec<(Employee, Vec<CallRecord>)> = roster
        .into_par_iter()
        .map(|employee| {
            let records = match source.fetch_calls(&employee.phone, interval) {
                Ok(records) => records,
                Err(err) => {
                    warn!(
                        employee = %employee.name,
                        phone = %employee.phone,
                        source = source.name(),
                        error = %err,
                        "call history fetch failed, counting as no calls"
                    );
                    Vec::new()
                }
            };
            (employee, records)
        })
        .collect();
    let fetch_ms = fetch_start.elapsed().as_secs_f64() * 1000.0;

    let record_count: usize = results.iter().map(|(_, records)| records.len()).sum();
    info!(employee_count, record_count, fetch_ms, "fetched call history");
    if !quiet {
        eprintln!(
            "Fetched {} calls for {} employees ({:.2}ms)",
            record_count, employee_count, fetch_ms
        );
    }
    results
}

/// Run `f` on a dedicated pool of `threads` workers, or on the global pool
/// when no size is configured.
pub(crate) fn with_pool<T: Send>(
    threads: Option<usize>,
    f: impl FnOnce() -> T + Send,
) -> Result<T, AppError> {
    match threads {
        Some(n) if n > 0 => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| AppError::invalid_config(format!("concurrency {n}: {e}")))?;
            Ok(pool.install(f))
        }
        _ => Ok(f()),
    }
}
