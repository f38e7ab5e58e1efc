//! Shiftgate Attendance - the clock-in/clock-out lifecycle
//!
//! This crate orchestrates location acquisition, site resolution and the
//! shift ledger, and provides read-only projections over recorded shifts.

pub mod aggregate;
pub mod ledger;
pub mod location;
pub mod service;
pub mod sites;
pub mod workers;

pub use aggregate::{ActivityAggregator, RosterEntry, WorkerStats, WorkerSummary};
pub use ledger::ShiftLedger;
pub use location::{LocationAcquisitionService, Locate, ReportedLocation};
pub use service::AttendanceService;
pub use sites::SiteResolver;
pub use workers::WorkerDirectory;
