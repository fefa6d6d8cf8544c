//! Shared utilities for parkwise
//!
//! This crate provides:
//! - ID types (VehicleId, GuardId, PassId, BillNumber)
//! - Wall-clock helpers (mock time, calendar-month arithmetic, day windows)
//! - Default paths for config and data directories

mod ids;
mod paths;
mod time;

pub use ids::*;
pub use paths::*;
pub use time::*;
