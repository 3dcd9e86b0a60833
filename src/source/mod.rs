//! Data source abstraction layer
//!
//! The report needs two collaborators: an employee directory and a call
//! history service. Each has a live HTTP implementation and a file-backed
//! one used for offline replay.

pub(crate) mod cache;
pub(crate) mod directory;
pub(crate) mod file;
pub(crate) mod history;
pub(crate) mod http;
pub(crate) mod loader;

use crate::core::{CallRecord, DateInterval, Employee};
use crate::error::{AppError, SourceError};

/// Supplies the employee roster
pub(crate) trait EmployeeSource: Send + Sync {
    /// Name used in log lines
    fn name(&self) -> &'static str;

    fn list_employees(&self) -> Result<Vec<Employee>, SourceError>;
}

/// Supplies call records for one phone line over a date interval
pub(crate) trait CallHistorySource: Send + Sync {
    fn name(&self) -> &'static str;

    fn fetch_calls(&self, phone: &str, interval: &DateInterval)
    -> Result<Vec<CallRecord>, AppError>;
}

pub(crate) use cache::{CacheMode, CachedDirectory};
pub(crate) use directory::DirectoryClient;
pub(crate) use file::{HistoryDir, RosterFile};
pub(crate) use history::HistoryClient;
pub(crate) use loader::fetch_all;
