//! Domain types for parkwise
//!
//! This crate defines the records every other crate exchanges:
//! - Vehicles and their `active -> exited` lifecycle
//! - Guards and shifts
//! - Pricing tables
//! - Bills and prepaid parking passes
//! - Dashboard statistics
//! - The error taxonomy surfaced to callers

mod error;
mod types;
mod validation;

pub use error::*;
pub use types::*;
pub use validation::*;
