//! Core module - period resolution, classification and aggregation

mod aggregator;
mod classify;
mod incoming;
mod period;
mod roster;
mod types;

pub(crate) use aggregator::aggregate;
pub(crate) use classify::CallClassifier;
pub(crate) use incoming::{IncomingCall, IncomingKind, IncomingLog, collect_incoming};
pub(crate) use period::{
    Clock, CustomBounds, DateInterval, FixedClock, PeriodToken, SystemClock, describe, resolve,
};
pub(crate) use roster::{DepartmentScope, prepare_roster};
pub(crate) use types::{
    CallAverages, CallCounts, CallRecord, DepartmentSummary, Employee, EmployeeStats, Report,
    department_sort_key,
};
