//! Identifier and bill number providers
//!
//! The engine never invents IDs on its own; it asks an [`IdProvider`]. Tests
//! use [`SequentialIds`] for predictable values, production defaults to
//! [`UuidIds`].

use parkwise_api::BillKind;
use parkwise_config::IdStrategy;
use parkwise_store::SequenceMarks;
use parkwise_util::{
    format_sequence_id, BillNumber, GuardId, PassId, VehicleId, BILL_PREFIX, GUARD_ID_PREFIX,
    PASS_BILL_PREFIX, PASS_ID_PREFIX, VEHICLE_ID_PREFIX,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

fn bill_prefix(kind: BillKind) -> &'static str {
    match kind {
        BillKind::Entry | BillKind::Exit => BILL_PREFIX,
        BillKind::Pass => PASS_BILL_PREFIX,
    }
}

/// Source of unique identifiers
pub trait IdProvider: Send + Sync {
    fn next_vehicle_id(&self) -> VehicleId;

    fn next_guard_id(&self) -> GuardId;

    fn next_pass_id(&self) -> PassId;

    /// Next receipt number; the prefix depends on the bill kind
    fn next_bill_number(&self, kind: BillKind) -> BillNumber;
}

/// Random UUID-based identifiers
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIds;

impl UuidIds {
    fn token() -> String {
        Uuid::new_v4().simple().to_string().to_uppercase()
    }
}

impl IdProvider for UuidIds {
    fn next_vehicle_id(&self) -> VehicleId {
        VehicleId::from_uuid(Uuid::new_v4())
    }

    fn next_guard_id(&self) -> GuardId {
        GuardId::from_uuid(Uuid::new_v4())
    }

    fn next_pass_id(&self) -> PassId {
        PassId::from_uuid(Uuid::new_v4())
    }

    fn next_bill_number(&self, kind: BillKind) -> BillNumber {
        BillNumber::new(format!("{}-{}", bill_prefix(kind), Self::token()))
    }
}

/// Monotonic counters, one per record kind.
///
/// Values look like `V-000001`, `G-000001`, `P-000001`, `BILL-000001` and
/// `PASS-000001`.
#[derive(Debug, Default)]
pub struct SequentialIds {
    vehicles: AtomicU64,
    guards: AtomicU64,
    passes: AtomicU64,
    bills: AtomicU64,
    pass_bills: AtomicU64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue numbering after the highest numbers already in a store
    pub fn resume(marks: SequenceMarks) -> Self {
        Self {
            vehicles: AtomicU64::new(marks.vehicles),
            guards: AtomicU64::new(marks.guards),
            passes: AtomicU64::new(marks.passes),
            bills: AtomicU64::new(marks.bills),
            pass_bills: AtomicU64::new(marks.pass_bills),
        }
    }

    fn next(counter: &AtomicU64) -> u64 {
        counter.fetch_add(1, Ordering::Relaxed) + 1
    }
}

impl IdProvider for SequentialIds {
    fn next_vehicle_id(&self) -> VehicleId {
        VehicleId::new(format_sequence_id(VEHICLE_ID_PREFIX, Self::next(&self.vehicles)))
    }

    fn next_guard_id(&self) -> GuardId {
        GuardId::new(format_sequence_id(GUARD_ID_PREFIX, Self::next(&self.guards)))
    }

    fn next_pass_id(&self) -> PassId {
        PassId::new(format_sequence_id(PASS_ID_PREFIX, Self::next(&self.passes)))
    }

    fn next_bill_number(&self, kind: BillKind) -> BillNumber {
        let counter = match kind {
            BillKind::Entry | BillKind::Exit => &self.bills,
            BillKind::Pass => &self.pass_bills,
        };
        BillNumber::new(format_sequence_id(bill_prefix(kind), Self::next(counter)))
    }
}

/// Build the provider selected in the facility config
pub fn provider_for(strategy: IdStrategy, marks: SequenceMarks) -> Arc<dyn IdProvider> {
    match strategy {
        IdStrategy::Uuid => Arc::new(UuidIds),
        IdStrategy::Sequential => Arc::new(SequentialIds::resume(marks)),
    }
}
