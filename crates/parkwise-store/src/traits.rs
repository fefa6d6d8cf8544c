//! Store trait definitions

use chrono::{DateTime, Local};
use parkwise_api::{Bill, Guard, ParkingPass, PricingTable, Vehicle, VehicleFilter};
use parkwise_util::{BillNumber, GuardId, VehicleId};
use serde::{Deserialize, Serialize};

use crate::{AuditEvent, StoreResult};

/// Outcome of writing a new vehicle entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryWrite {
    Inserted,
    /// Another stay for the same plate is still active; nothing was written
    AlreadyParked(Vehicle),
}

/// Outcome of the atomic exit write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitWrite {
    Recorded,
    /// The vehicle left before this write; carries the stored record
    AlreadyExited(Vehicle),
    NotFound,
}

/// Highest sequential number stored for each identifier prefix, used to
/// resume sequential IDs. Numbers minted but never stored leave gaps; the
/// counters only ever continue past the highest one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceMarks {
    pub vehicles: u64,
    pub guards: u64,
    pub passes: u64,
    /// Entry and exit bills
    pub bills: u64,
    pub pass_bills: u64,
}

/// Repository behind the parking service
pub trait Store: Send + Sync {
    // Audit log

    /// Append an audit event
    fn append_audit(&self, event: AuditEvent) -> StoreResult<()>;

    /// Get recent audit events, newest first
    fn get_recent_audits(&self, limit: usize) -> StoreResult<Vec<AuditEvent>>;

    /// Get all audit events of one vehicle, oldest first
    fn get_vehicle_audits(&self, vehicle_id: &VehicleId) -> StoreResult<Vec<AuditEvent>>;

    // Vehicles

    /// Insert an active vehicle and its entry bill in one transaction.
    /// With `reject_duplicate`, an active stay for the same plate aborts the write.
    fn insert_entry(
        &self,
        vehicle: &Vehicle,
        bill: &Bill,
        reject_duplicate: bool,
    ) -> StoreResult<EntryWrite>;

    /// Get a vehicle record by ID
    fn get_vehicle(&self, id: &VehicleId) -> StoreResult<Option<Vehicle>>;

    /// Most recent stay for a plate (case-insensitive), active or not
    fn find_latest_by_number(&self, vehicle_number: &str) -> StoreResult<Option<Vehicle>>;

    /// Most recent active stay for a plate (case-insensitive)
    fn find_active_by_number(&self, vehicle_number: &str) -> StoreResult<Option<Vehicle>>;

    /// List vehicles matching a filter, newest entry first
    fn list_vehicles(&self, filter: &VehicleFilter) -> StoreResult<Vec<Vehicle>>;

    /// Transition `vehicle` to its exited state and store the exit bill.
    ///
    /// Check-active, update and bill insert happen in one transaction, so of
    /// two concurrent exits for the same vehicle exactly one is recorded.
    fn record_exit(&self, vehicle: &Vehicle, bill: &Bill) -> StoreResult<ExitWrite>;

    // Bills

    /// Get a bill by number
    fn get_bill(&self, bill_number: &BillNumber) -> StoreResult<Option<Bill>>;

    /// All bills of one vehicle, oldest first
    fn list_bills_for_vehicle(&self, vehicle_id: &VehicleId) -> StoreResult<Vec<Bill>>;

    /// Bills created in `[from, to)`, oldest first
    fn list_bills_between(
        &self,
        from: DateTime<Local>,
        to: DateTime<Local>,
    ) -> StoreResult<Vec<Bill>>;

    // Passes

    /// Insert a pass and its bill in one transaction
    fn insert_pass(&self, pass: &ParkingPass, bill: &Bill) -> StoreResult<()>;

    /// Passes sold for a vehicle, oldest first
    fn list_passes(&self, vehicle_id: &VehicleId) -> StoreResult<Vec<ParkingPass>>;

    // Guards

    fn insert_guard(&self, guard: &Guard) -> StoreResult<()>;

    fn get_guard(&self, id: &GuardId) -> StoreResult<Option<Guard>>;

    fn list_guards(&self) -> StoreResult<Vec<Guard>>;

    /// Replace a guard record. Returns false if it does not exist.
    fn update_guard(&self, guard: &Guard) -> StoreResult<bool>;

    /// Remove a guard record. Returns false if it does not exist.
    fn delete_guard(&self, id: &GuardId) -> StoreResult<bool>;

    // Pricing

    /// Load the current pricing table, if one was ever saved
    fn load_pricing(&self) -> StoreResult<Option<PricingTable>>;

    /// Replace the pricing table
    fn save_pricing(&self, pricing: &PricingTable) -> StoreResult<()>;

    // Housekeeping

    /// Highest sequential identifier numbers in use
    fn sequence_marks(&self) -> StoreResult<SequenceMarks>;

    /// Check if store is healthy
    fn is_healthy(&self) -> bool;
}
