//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Facility-wide settings
    #[serde(default)]
    pub facility: RawFacilityConfig,

    /// Initial day rates; only used to seed an empty store
    #[serde(default)]
    pub pricing: Option<RawPricing>,

    /// Guard accounts to seed into an empty store
    #[serde(default)]
    pub guards: Vec<RawGuard>,
}

/// Facility-level settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawFacilityConfig {
    /// Display name printed on receipts
    pub name: Option<String>,

    /// Data directory for the store
    pub data_dir: Option<PathBuf>,

    /// How record IDs and bill numbers are minted: "uuid" or "sequential"
    pub id_strategy: Option<String>,

    /// Refuse a second entry for a plate that is still parked
    pub reject_duplicate_entries: Option<bool>,
}

/// Day rates. Signed so negative values get a validation message instead of
/// a TOML type error.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawPricing {
    pub two_wheeler: Option<i64>,
    pub three_wheeler: Option<i64>,
    pub four_wheeler: Option<i64>,
}

/// Raw guard definition
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawGuard {
    /// Unique stable ID
    pub id: String,

    pub name: String,

    pub email: String,

    /// "day" or "night"
    pub shift: String,

    /// "active" (default) or "inactive"
    pub status: Option<String>,
}
