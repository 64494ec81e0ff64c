//! Schedule reporting and KPI evaluation.
//!
//! # KPI
//!
//! `ScheduleKpi` breaks a schedule's evaluation into its weighted
//! components and soft-constraint violation counts, with slot utilization.
//!
//! # Report
//!
//! `ScheduleReport` is the printable form of a finished schedule: the
//! evaluation score and each event's slot, sorted by event identifier.
//! It also serializes to JSON.

mod kpi;
mod report;

pub use kpi::{ScheduleKpi, WeightedComponents};
pub use report::{ReportEntry, ScheduleReport};
