//! Strongly-typed identifiers for parkwise
//!
//! All identifiers are opaque strings. Their values are minted by an ID
//! provider in `parkwise-core`; this module only gives them distinct types so
//! a guard ID can never be passed where a vehicle ID is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Build an identifier from a random UUID
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid.to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

string_id!(
    /// Unique identifier of a vehicle record (one per parking stay)
    VehicleId
);

string_id!(
    /// Unique identifier of a guard account
    GuardId
);

string_id!(
    /// Unique identifier of a prepaid parking pass
    PassId
);

string_id!(
    /// Receipt number printed on a bill, e.g. `BILL-000042` or `PASS-000007`
    BillNumber
);

/// Prefixes of sequentially numbered identifiers (`V-000001`, `BILL-000001`, ...)
pub const VEHICLE_ID_PREFIX: &str = "V";
pub const GUARD_ID_PREFIX: &str = "G";
pub const PASS_ID_PREFIX: &str = "P";
pub const BILL_PREFIX: &str = "BILL";
pub const PASS_BILL_PREFIX: &str = "PASS";

/// Format a sequential identifier as `<prefix>-<zero-padded number>`
pub fn format_sequence_id(prefix: &str, number: u64) -> String {
    format!("{prefix}-{number:06}")
}

/// Number of a sequential identifier with the given prefix.
///
/// Returns `None` for identifiers minted any other way, e.g. a UUID bill
/// number that happens to share the prefix.
pub fn parse_sequence_number(id: &str, prefix: &str) -> Option<u64> {
    let digits = id.strip_prefix(prefix)?.strip_prefix('-')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
