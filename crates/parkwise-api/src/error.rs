//! Error types for parkwise operations

use chrono::{DateTime, Local};
use parkwise_util::GuardId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Vehicle;

/// Core error type for parkwise operations
#[derive(Debug, Error)]
pub enum ParkingError {
    #[error("Vehicle not found: {0}")]
    VehicleNotFound(String),

    /// Carries the existing record so callers can show the prior exit
    #[error("Vehicle {} has already exited", .vehicle.vehicle_number)]
    VehicleAlreadyExited { vehicle: Box<Vehicle> },

    #[error("Vehicle {} is already parked", .vehicle.vehicle_number)]
    VehicleAlreadyParked { vehicle: Box<Vehicle> },

    #[error("Invalid vehicle number format: {0:?} (expected 5-10 letters or digits)")]
    InvalidVehicleNumberFormat(String),

    #[error("Unknown vehicle category: {0}")]
    UnknownVehicleCategory(String),

    #[error("Unknown shift: {0} (expected day or night)")]
    UnknownShift(String),

    #[error("Exit time {exit_time} is before entry time {entry_time}")]
    ExitBeforeEntry {
        entry_time: DateTime<Local>,
        exit_time: DateTime<Local>,
    },

    #[error("Invalid pass duration: {0} months")]
    InvalidPassDuration(u32),

    #[error("Amount overflow: {units} units at {rate} each")]
    AmountOverflow { units: u64, rate: u64 },

    #[error("Guard not found: {0}")]
    GuardNotFound(GuardId),

    #[error("Guard is inactive: {0}")]
    GuardInactive(GuardId),

    #[error("Invalid email format: {0:?}")]
    InvalidEmailFormat(String),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ParkingError {
    pub fn already_exited(vehicle: Vehicle) -> Self {
        Self::VehicleAlreadyExited {
            vehicle: Box::new(vehicle),
        }
    }

    pub fn already_parked(vehicle: Vehicle) -> Self {
        Self::VehicleAlreadyParked {
            vehicle: Box::new(vehicle),
        }
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Validation errors can be fixed by the user and resubmitted
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ParkingError::InvalidVehicleNumberFormat(_)
                | ParkingError::UnknownVehicleCategory(_)
                | ParkingError::UnknownShift(_)
                | ParkingError::InvalidPassDuration(_)
                | ParkingError::InvalidEmailFormat(_)
                | ParkingError::MissingField(_)
        )
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ParkingError::VehicleNotFound(_) => ErrorCode::VehicleNotFound,
            ParkingError::VehicleAlreadyExited { .. } => ErrorCode::VehicleAlreadyExited,
            ParkingError::VehicleAlreadyParked { .. } => ErrorCode::VehicleAlreadyParked,
            ParkingError::InvalidVehicleNumberFormat(_) => ErrorCode::InvalidVehicleNumberFormat,
            ParkingError::UnknownVehicleCategory(_) => ErrorCode::UnknownVehicleCategory,
            ParkingError::GuardNotFound(_) => ErrorCode::GuardNotFound,
            ParkingError::GuardInactive(_) => ErrorCode::GuardInactive,
            ParkingError::ExitBeforeEntry { .. } => ErrorCode::InvalidTimestamps,
            ParkingError::UnknownShift(_)
            | ParkingError::InvalidPassDuration(_)
            | ParkingError::InvalidEmailFormat(_)
            | ParkingError::MissingField(_) => ErrorCode::InvalidRequest,
            ParkingError::AmountOverflow { .. }
            | ParkingError::Store(_)
            | ParkingError::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Convert into a serializable form for display
    pub fn to_info(&self) -> ErrorInfo {
        let vehicle = match self {
            ParkingError::VehicleAlreadyExited { vehicle }
            | ParkingError::VehicleAlreadyParked { vehicle } => Some((**vehicle).clone()),
            _ => None,
        };

        ErrorInfo {
            code: self.code(),
            message: self.to_string(),
            vehicle,
        }
    }
}

pub type Result<T> = std::result::Result<T, ParkingError>;

/// Error codes surfaced to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidRequest,
    VehicleNotFound,
    VehicleAlreadyExited,
    VehicleAlreadyParked,
    InvalidVehicleNumberFormat,
    UnknownVehicleCategory,
    InvalidTimestamps,
    GuardNotFound,
    GuardInactive,
    InternalError,
}

/// Error information for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub code: ErrorCode,
    pub message: String,
    /// The conflicting record, for lifecycle conflicts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle: Option<Vehicle>,
}
