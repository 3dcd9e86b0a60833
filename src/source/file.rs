//! File-backed sources for offline replay
//!
//! `RosterFile` reads a JSON list of employees. `HistoryDir` reads one JSON
//! file per phone line, named after the digits of the phone
//! (`79991234567.json`), in the same shape the PBX returns.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::{CallRecord, DateInterval, Employee};
use crate::error::{AppError, SourceError};
use crate::source::history::parse_history;
use crate::source::{CallHistorySource, EmployeeSource};

fn read_json(path: &Path) -> Result<serde_json::Value, SourceError> {
    let file = File::open(path).map_err(|source| SourceError::Read {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| SourceError::Parse {
        path: path.display().to_string(),
        source,
    })
}

pub(crate) struct RosterFile {
    path: PathBuf,
}

impl RosterFile {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl EmployeeSource for RosterFile {
    fn name(&self) -> &'static str {
        "roster file"
    }

    fn list_employees(&self) -> Result<Vec<Employee>, SourceError> {
        let value = read_json(&self.path)?;
        serde_json::from_value(value).map_err(|source| SourceError::Parse {
            path: self.path.display().to_string(),
            source,
        })
    }
}

pub(crate) struct HistoryDir {
    dir: PathBuf,
}

impl HistoryDir {
    pub(crate) fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, phone: &str) -> PathBuf {
        let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
        self.dir.join(format!("{digits}.json"))
    }
}

impl CallHistorySource for HistoryDir {
    fn name(&self) -> &'static str {
        "history dir"
    }

    /// Records whose start falls outside the interval are dropped, the way
    /// the PBX filters server-side. Records without a usable start are kept.
    fn fetch_calls(
        &self,
        phone: &str,
        interval: &DateInterval,
    ) -> Result<Vec<CallRecord>, AppError> {
        let path = self.path_for(phone);
        if !path.exists() {
            debug!(path = %path.display(), "no history file");
            return Ok(Vec::new());
        }
        let records = parse_history(read_json(&path)?, &path.display().to_string())?;
        Ok(records
            .into_iter()
            .filter(|record| match record.started_at() {
                Ok(started) => interval.contains(started.date()),
                Err(_) => true,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fs;

    fn june() -> DateInterval {
        DateInterval::new(
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn roster_file_reads_employees() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.json");
        fs::write(
            &path,
            r#"[{"name":"Ivanov Ivan","phone":"+79990000001","department":"Отдел 1"}]"#,
        )
        .unwrap();

        let employees = RosterFile::new(&path).list_employees().unwrap();
        assert_eq!(employees.len(), 1);
        assert_eq!(employees[0].department, "Отдел 1");
    }

    #[test]
    fn roster_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = RosterFile::new(dir.path().join("nope.json"));
        assert!(matches!(
            missing.list_employees(),
            Err(SourceError::Read { .. })
        ));

        let path = dir.path().join("bad.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            RosterFile::new(&path).list_employees(),
            Err(SourceError::Parse { .. })
        ));
    }

    #[test]
    fn history_dir_filters_by_interval() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("79990000001.json"),
            r#"[
                {"type":"in","start":"2024-06-10 09:00:00"},
                {"type":"out","start":"2024-07-01 09:00:00"},
                {"type":"in"}
            ]"#,
        )
        .unwrap();

        let source = HistoryDir::new(dir.path());
        let records = source.fetch_calls("+7 999 000-00-01", &june()).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn history_dir_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let source = HistoryDir::new(dir.path());
        assert!(source.fetch_calls("+79990000009", &june()).unwrap().is_empty());
    }
}
