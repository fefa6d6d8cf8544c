//! Fee and lifecycle engine for parkwise
//!
//! This crate is the heart of parkwise, containing:
//! - Exit billing (per started day, minimum one day)
//! - Vehicle lifecycle (`active -> exited`, exactly once)
//! - Prepaid parking passes (calendar-month validity)
//! - Injected ID providers for record IDs and bill numbers
//! - The parking service that ties the engine to a store
//! - Dashboard statistics

mod billing;
mod ids;
mod service;
mod stats;

pub use billing::*;
pub use ids::*;
pub use service::*;
pub use stats::*;
