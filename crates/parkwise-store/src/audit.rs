//! Audit event types

use chrono::{DateTime, Local};
use parkwise_api::{PricingTable, VehicleCategory};
use parkwise_util::{BillNumber, GuardId, PassId, VehicleId};
use serde::{Deserialize, Serialize};

/// Types of audit events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEventType {
    /// Service opened the store
    ServiceStarted,

    /// Configuration loaded
    ConfigLoaded { guard_count: usize },

    /// Vehicle entered the facility
    VehicleEntered {
        vehicle_id: VehicleId,
        vehicle_number: String,
        vehicle_type: VehicleCategory,
        guard_id: GuardId,
        bill_number: BillNumber,
    },

    /// Entry refused
    EntryRejected {
        vehicle_number: String,
        reason: String,
    },

    /// Vehicle checked out and billed
    VehicleExited {
        vehicle_id: VehicleId,
        vehicle_number: String,
        days: u64,
        fees: u64,
        bill_number: BillNumber,
    },

    /// Exit refused (unknown vehicle, already exited, ...)
    ExitRejected {
        vehicle_id: VehicleId,
        reason: String,
    },

    /// Prepaid pass sold
    PassCreated {
        pass_id: PassId,
        vehicle_id: VehicleId,
        months_duration: u32,
        amount: u64,
        bill_number: BillNumber,
    },

    /// Guard account created
    GuardCreated { guard_id: GuardId },

    /// Guard account changed
    GuardUpdated { guard_id: GuardId },

    /// Guard account removed
    GuardDeleted { guard_id: GuardId },

    /// Day rates changed by an admin
    PricingUpdated { pricing: PricingTable },
}

impl AuditEventType {
    /// Vehicle this event belongs to, used for per-vehicle history
    pub fn vehicle_id(&self) -> Option<&VehicleId> {
        match self {
            AuditEventType::VehicleEntered { vehicle_id, .. }
            | AuditEventType::VehicleExited { vehicle_id, .. }
            | AuditEventType::ExitRejected { vehicle_id, .. }
            | AuditEventType::PassCreated { vehicle_id, .. } => Some(vehicle_id),
            _ => None,
        }
    }
}

/// Full audit event with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique event ID
    pub id: i64,

    /// Event timestamp
    pub timestamp: DateTime<Local>,

    /// Event type and details
    pub event: AuditEventType,
}

impl AuditEvent {
    pub fn new(event: AuditEventType, timestamp: DateTime<Local>) -> Self {
        Self {
            id: 0, // Will be set by store
            timestamp,
            event,
        }
    }
}
