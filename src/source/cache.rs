//! On-disk cache for the employee directory
//!
//! The processed roster is stored as JSON; its age is the file's mtime.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tracing::{debug, warn};

use crate::core::Employee;
use crate::error::SourceError;
use crate::source::EmployeeSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum CacheMode {
    /// Use the cache while it is younger than the TTL
    #[default]
    Normal,
    /// Always refetch, fall back to the cache if that fails
    Refresh,
    /// Never touch the network
    Offline,
}

pub(crate) fn default_cache_path() -> Option<PathBuf> {
    let home = dirs::home_dir()?;
    Some(home.join(".cache").join("callstats").join("employees.json"))
}

fn load_cache(path: &Path) -> Option<Vec<Employee>> {
    let file = File::open(path).ok()?;
    serde_json::from_reader(file).ok()
}

fn load_cache_if_fresh(path: &Path, ttl: Duration) -> Option<(Vec<Employee>, Duration)> {
    let meta = std::fs::metadata(path).ok()?;
    let modified = meta.modified().ok()?;
    let age = SystemTime::now().duration_since(modified).ok()?;
    if age > ttl {
        return None;
    }
    Some((load_cache(path)?, age))
}

fn save_cache(path: &Path, employees: &[Employee]) {
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    match File::create(path) {
        Ok(mut file) => {
            if let Err(e) = serde_json::to_writer(&mut file, employees) {
                warn!(path = %path.display(), error = %e, "failed to write directory cache");
            }
        }
        Err(e) => warn!(path = %path.display(), error = %e, "failed to create directory cache"),
    }
}

/// Wraps a live directory with the JSON cache
pub(crate) struct CachedDirectory<S> {
    inner: S,
    path: Option<PathBuf>,
    ttl: Duration,
    mode: CacheMode,
}

impl<S: EmployeeSource> CachedDirectory<S> {
    pub(crate) fn new(inner: S, ttl: Duration, mode: CacheMode) -> Self {
        Self::with_path(inner, default_cache_path(), ttl, mode)
    }

    pub(crate) fn with_path(inner: S, path: Option<PathBuf>, ttl: Duration, mode: CacheMode) -> Self {
        Self {
            inner,
            path,
            ttl,
            mode,
        }
    }

    fn fetch_and_store(&self) -> Result<Vec<Employee>, SourceError> {
        let result = self.inner.list_employees();
        let Some(path) = &self.path else {
            return result;
        };
        match result {
            Ok(employees) => {
                save_cache(path, &employees);
                Ok(employees)
            }
            Err(err) => match load_cache(path) {
                Some(stale) => {
                    warn!(error = %err, "directory unavailable, using cached roster");
                    Ok(stale)
                }
                None => Err(err),
            },
        }
    }
}

impl<S: EmployeeSource> EmployeeSource for CachedDirectory<S> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn list_employees(&self) -> Result<Vec<Employee>, SourceError> {
        match (self.mode, &self.path) {
            (CacheMode::Offline, Some(path)) => {
                load_cache(path).ok_or_else(|| SourceError::CacheMissing {
                    path: path.display().to_string(),
                })
            }
            (CacheMode::Offline, None) => Err(SourceError::CacheMissing {
                path: "~/.cache/callstats/employees.json".to_string(),
            }),
            (CacheMode::Normal, Some(path)) => {
                if let Some((employees, age)) = load_cache_if_fresh(path, self.ttl) {
                    debug!(age_secs = age.as_secs(), "using cached roster");
                    return Ok(employees);
                }
                self.fetch_and_store()
            }
            _ => self.fetch_and_store(),
        }
    }
}
