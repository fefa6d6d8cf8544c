//! Validated facility configuration

use crate::schema::{RawConfig, RawFacilityConfig, RawGuard, RawPricing};
use crate::validation::{parse_id_strategy, IdStrategy};
use parkwise_api::{Guard, GuardStatus, PricingTable, Shift};
use parkwise_util::{default_data_dir, GuardId};
use std::path::PathBuf;

/// Default facility name when none is configured
pub const DEFAULT_FACILITY_NAME: &str = "Parkwise Facility";

/// Validated configuration ready for use by the service
#[derive(Debug, Clone, Default)]
pub struct FacilityConfig {
    pub facility: FacilitySettings,

    /// Day rates used when the store has none yet
    pub pricing: PricingTable,

    /// Guards to seed into an empty store
    pub guards: Vec<Guard>,
}

impl FacilityConfig {
    /// Convert from raw config (after validation)
    pub fn from_raw(raw: RawConfig) -> Self {
        Self {
            facility: FacilitySettings::from_raw(raw.facility),
            pricing: convert_pricing(raw.pricing),
            guards: raw.guards.into_iter().filter_map(convert_guard).collect(),
        }
    }
}

/// Facility-wide settings
#[derive(Debug, Clone)]
pub struct FacilitySettings {
    pub name: String,
    pub data_dir: PathBuf,
    pub id_strategy: IdStrategy,
    pub reject_duplicate_entries: bool,
}

impl FacilitySettings {
    fn from_raw(raw: RawFacilityConfig) -> Self {
        Self {
            name: raw.name.unwrap_or_else(|| DEFAULT_FACILITY_NAME.to_string()),
            data_dir: raw.data_dir.unwrap_or_else(default_data_dir),
            id_strategy: raw
                .id_strategy
                .as_deref()
                .and_then(parse_id_strategy)
                .unwrap_or_default(),
            reject_duplicate_entries: raw.reject_duplicate_entries.unwrap_or(true),
        }
    }
}

impl Default for FacilitySettings {
    fn default() -> Self {
        Self::from_raw(RawFacilityConfig::default())
    }
}

fn convert_pricing(raw: Option<RawPricing>) -> PricingTable {
    let defaults = PricingTable::default();
    let Some(raw) = raw else {
        return defaults;
    };

    // Negative rates were rejected during validation
    let rate = |value: Option<i64>, fallback: u64| {
        value
            .and_then(|v| u64::try_from(v).ok())
            .unwrap_or(fallback)
    };

    PricingTable {
        two_wheeler: rate(raw.two_wheeler, defaults.two_wheeler),
        three_wheeler: rate(raw.three_wheeler, defaults.three_wheeler),
        four_wheeler: rate(raw.four_wheeler, defaults.four_wheeler),
    }
}

fn convert_guard(raw: RawGuard) -> Option<Guard> {
    let shift: Shift = raw.shift.parse().ok()?;
    let status = match raw.status {
        Some(s) => s.parse().ok()?,
        None => GuardStatus::Active,
    };

    Some(Guard {
        id: GuardId::new(raw.id),
        name: raw.name,
        email: raw.email,
        shift,
        status,
    })
}
