//! Shared types for the parkwise domain

use chrono::{DateTime, Local, NaiveDate};
use parkwise_util::{BillNumber, GuardId, PassId, VehicleId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ParkingError;

/// Vehicle category, which selects the day rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleCategory {
    TwoWheeler,
    ThreeWheeler,
    FourWheeler,
}

impl VehicleCategory {
    pub const ALL: [VehicleCategory; 3] = [
        VehicleCategory::TwoWheeler,
        VehicleCategory::ThreeWheeler,
        VehicleCategory::FourWheeler,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleCategory::TwoWheeler => "two_wheeler",
            VehicleCategory::ThreeWheeler => "three_wheeler",
            VehicleCategory::FourWheeler => "four_wheeler",
        }
    }
}

impl fmt::Display for VehicleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleCategory {
    type Err = ParkingError;

    /// Accepts `two_wheeler`, `two-wheeler` and `twoWheeler` spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "twowheeler" => Ok(VehicleCategory::TwoWheeler),
            "threewheeler" => Ok(VehicleCategory::ThreeWheeler),
            "fourwheeler" => Ok(VehicleCategory::FourWheeler),
            _ => Err(ParkingError::UnknownVehicleCategory(s.to_string())),
        }
    }
}

/// Lifecycle status of a vehicle record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleStatus {
    Active,
    Exited,
}

impl VehicleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleStatus::Active => "active",
            VehicleStatus::Exited => "exited",
        }
    }
}

impl FromStr for VehicleStatus {
    type Err = ParkingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "active" => Ok(VehicleStatus::Active),
            "exited" => Ok(VehicleStatus::Exited),
            other => Err(ParkingError::Internal(format!("unknown vehicle status: {other}"))),
        }
    }
}

/// Guard work period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shift {
    Day,
    Night,
}

impl Shift {
    pub fn as_str(&self) -> &'static str {
        match self {
            Shift::Day => "day",
            Shift::Night => "night",
        }
    }
}

impl FromStr for Shift {
    type Err = ParkingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "day" => Ok(Shift::Day),
            "night" => Ok(Shift::Night),
            _ => Err(ParkingError::UnknownShift(s.to_string())),
        }
    }
}

/// Whether a guard account may record entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GuardStatus {
    #[default]
    Active,
    Inactive,
}

impl GuardStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GuardStatus::Active => "active",
            GuardStatus::Inactive => "inactive",
        }
    }
}

impl FromStr for GuardStatus {
    type Err = ParkingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "active" => Ok(GuardStatus::Active),
            "inactive" => Ok(GuardStatus::Inactive),
            other => Err(ParkingError::Internal(format!("unknown guard status: {other}"))),
        }
    }
}

/// Facility staff member who records vehicle entry and exit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guard {
    pub id: GuardId,
    pub name: String,
    pub email: String,
    pub shift: Shift,
    pub status: GuardStatus,
}

impl Guard {
    pub fn is_active(&self) -> bool {
        self.status == GuardStatus::Active
    }
}

/// Fields for a new guard account; the ID is minted by the service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGuard {
    pub name: String,
    pub email: String,
    pub shift: Shift,
    #[serde(default)]
    pub status: GuardStatus,
}

/// Partial update of a guard account. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GuardUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub shift: Option<Shift>,
    pub status: Option<GuardStatus>,
}

impl GuardUpdate {
    pub fn apply_to(&self, guard: &Guard) -> Guard {
        Guard {
            id: guard.id.clone(),
            name: self.name.clone().unwrap_or_else(|| guard.name.clone()),
            email: self.email.clone().unwrap_or_else(|| guard.email.clone()),
            shift: self.shift.unwrap_or(guard.shift),
            status: self.status.unwrap_or(guard.status),
        }
    }
}

/// One parking stay of a vehicle.
///
/// `exit_time` and `fees` are set if and only if `status` is `Exited`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    /// Upper-cased plate number
    pub vehicle_number: String,
    pub vehicle_type: VehicleCategory,
    pub entry_time: DateTime<Local>,
    pub exit_time: Option<DateTime<Local>>,
    pub guard_id: GuardId,
    pub guard_name: String,
    pub shift: Shift,
    pub fees: Option<u64>,
    pub status: VehicleStatus,
    #[serde(default)]
    pub parking_spot: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
}

impl Vehicle {
    pub fn is_active(&self) -> bool {
        self.status == VehicleStatus::Active
    }

    /// Check the exit-time/fees/status invariant
    pub fn is_consistent(&self) -> bool {
        match self.status {
            VehicleStatus::Active => self.exit_time.is_none() && self.fees.is_none(),
            VehicleStatus::Exited => self.exit_time.is_some() && self.fees.is_some(),
        }
    }
}

/// Optional descriptive attributes recorded at entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VehicleDetails {
    pub parking_spot: Option<String>,
    pub color: Option<String>,
    pub brand: Option<String>,
}

/// Request to register a vehicle entering the facility
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryRequest {
    pub vehicle_number: String,
    pub vehicle_type: VehicleCategory,
    pub guard_id: GuardId,
    #[serde(default)]
    pub details: VehicleDetails,
}

/// Criteria for listing vehicles. Unset fields match everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VehicleFilter {
    pub status: Option<VehicleStatus>,
    pub vehicle_type: Option<VehicleCategory>,
    /// Case-insensitive exact plate match
    pub vehicle_number: Option<String>,
    pub guard_id: Option<GuardId>,
}

impl VehicleFilter {
    pub fn active() -> Self {
        Self {
            status: Some(VehicleStatus::Active),
            ..Default::default()
        }
    }

    pub fn matches(&self, vehicle: &Vehicle) -> bool {
        self.status.is_none_or(|s| s == vehicle.status)
            && self.vehicle_type.is_none_or(|t| t == vehicle.vehicle_type)
            && self
                .vehicle_number
                .as_ref()
                .is_none_or(|n| n.eq_ignore_ascii_case(&vehicle.vehicle_number))
            && self.guard_id.as_ref().is_none_or(|g| g == &vehicle.guard_id)
    }
}

/// Per-day rate for each vehicle category, in whole currency units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTable {
    pub two_wheeler: u64,
    pub three_wheeler: u64,
    pub four_wheeler: u64,
}

impl PricingTable {
    pub fn rate_for(&self, category: VehicleCategory) -> u64 {
        match category {
            VehicleCategory::TwoWheeler => self.two_wheeler,
            VehicleCategory::ThreeWheeler => self.three_wheeler,
            VehicleCategory::FourWheeler => self.four_wheeler,
        }
    }

    /// Return a copy with the rates present in `update` replaced
    pub fn with_update(&self, update: &PricingUpdate) -> PricingTable {
        PricingTable {
            two_wheeler: update.two_wheeler.unwrap_or(self.two_wheeler),
            three_wheeler: update.three_wheeler.unwrap_or(self.three_wheeler),
            four_wheeler: update.four_wheeler.unwrap_or(self.four_wheeler),
        }
    }
}

impl Default for PricingTable {
    fn default() -> Self {
        Self {
            two_wheeler: 50,
            three_wheeler: 100,
            four_wheeler: 200,
        }
    }
}

/// Admin pricing change. `None` keeps the current rate.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PricingUpdate {
    pub two_wheeler: Option<u64>,
    pub three_wheeler: Option<u64>,
    pub four_wheeler: Option<u64>,
}

impl PricingUpdate {
    pub fn is_empty(&self) -> bool {
        self.two_wheeler.is_none() && self.three_wheeler.is_none() && self.four_wheeler.is_none()
    }
}

/// Which transaction a bill was issued for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillKind {
    Entry,
    Exit,
    Pass,
}

impl BillKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillKind::Entry => "entry",
            BillKind::Exit => "exit",
            BillKind::Pass => "pass",
        }
    }
}

/// Validity window printed on a parking pass bill
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassDetails {
    pub pass_id: PassId,
    pub start_date: DateTime<Local>,
    pub end_date: DateTime<Local>,
    pub months_duration: u32,
}

/// Transaction-specific part of a bill
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BillDetails {
    /// Informational receipt issued at entry; nothing is charged yet
    Entry { entry_time: DateTime<Local> },

    /// Metered stay, billed per started day
    Exit {
        entry_time: DateTime<Local>,
        exit_time: DateTime<Local>,
        days: u64,
        duration: String,
    },

    /// Prepaid pass, billed per calendar month
    Pass(PassDetails),
}

/// Immutable receipt for one parking transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bill {
    pub bill_number: BillNumber,
    pub vehicle_id: VehicleId,
    pub vehicle_number: String,
    pub vehicle_type: VehicleCategory,
    pub amount: u64,
    pub guard_id: GuardId,
    pub guard_name: String,
    pub shift: Shift,
    pub created_at: DateTime<Local>,
    pub details: BillDetails,
}

impl Bill {
    pub fn kind(&self) -> BillKind {
        match self.details {
            BillDetails::Entry { .. } => BillKind::Entry,
            BillDetails::Exit { .. } => BillKind::Exit,
            BillDetails::Pass(_) => BillKind::Pass,
        }
    }

    pub fn is_parking_pass(&self) -> bool {
        matches!(self.details, BillDetails::Pass(_))
    }

    pub fn pass_details(&self) -> Option<&PassDetails> {
        match &self.details {
            BillDetails::Pass(details) => Some(details),
            _ => None,
        }
    }

    /// Human-readable stay length, present on exit bills only
    pub fn duration_label(&self) -> Option<&str> {
        match &self.details {
            BillDetails::Exit { duration, .. } => Some(duration),
            _ => None,
        }
    }
}

/// Prepaid multi-month parking authorization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParkingPass {
    pub id: PassId,
    pub vehicle_id: VehicleId,
    pub vehicle_number: String,
    pub start_date: DateTime<Local>,
    pub end_date: DateTime<Local>,
    pub months_duration: u32,
    pub rate_per_month: u64,
    pub amount: u64,
    pub bill_number: BillNumber,
    pub created_at: DateTime<Local>,
}

impl ParkingPass {
    /// Whether `at` falls inside the half-open validity window
    pub fn is_valid_at(&self, at: DateTime<Local>) -> bool {
        self.start_date <= at && at < self.end_date
    }
}

/// Vehicle counts per category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub two_wheeler: u64,
    pub three_wheeler: u64,
    pub four_wheeler: u64,
}

impl CategoryCounts {
    pub fn increment(&mut self, category: VehicleCategory) {
        match category {
            VehicleCategory::TwoWheeler => self.two_wheeler += 1,
            VehicleCategory::ThreeWheeler => self.three_wheeler += 1,
            VehicleCategory::FourWheeler => self.four_wheeler += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.two_wheeler + self.three_wheeler + self.four_wheeler
    }
}

/// Revenue collected on one local calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRevenue {
    /// Short weekday label (`Mon`..`Sun`)
    pub day: String,
    pub date: NaiveDate,
    pub revenue: u64,
}

/// Occupancy and revenue summary for the admin dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_vehicles: u64,
    pub vehicles_parked: u64,
    pub today_revenue: u64,
    pub month_revenue: u64,
    pub active_guards: u64,
    pub vehicle_type_distribution: CategoryCounts,
    /// Seven days ending today, oldest first
    pub revenue_by_day: Vec<DailyRevenue>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_vehicle() -> Vehicle {
        Vehicle {
            id: VehicleId::new("1"),
            vehicle_number: "KA01AB1234".into(),
            vehicle_type: VehicleCategory::FourWheeler,
            entry_time: Local.with_ymd_and_hms(2025, 3, 15, 9, 0, 0).single().unwrap(),
            exit_time: None,
            guard_id: GuardId::new("g1"),
            guard_name: "John Doe".into(),
            shift: Shift::Day,
            fees: None,
            status: VehicleStatus::Active,
            parking_spot: None,
            color: None,
            brand: None,
        }
    }

    #[test]
    fn category_parses_all_spellings() {
        assert_eq!("twoWheeler".parse::<VehicleCategory>().unwrap(), VehicleCategory::TwoWheeler);
        assert_eq!(
            "three_wheeler".parse::<VehicleCategory>().unwrap(),
            VehicleCategory::ThreeWheeler
        );
        assert_eq!(
            "Four-Wheeler".parse::<VehicleCategory>().unwrap(),
            VehicleCategory::FourWheeler
        );
    }

    #[test]
    fn unknown_category_is_rejected() {
        let err = "sixWheeler".parse::<VehicleCategory>().unwrap_err();
        assert!(matches!(err, ParkingError::UnknownVehicleCategory(ref s) if s == "sixWheeler"));
    }

    #[test]
    fn pricing_rate_lookup_and_update() {
        let pricing = PricingTable::default();
        assert_eq!(pricing.rate_for(VehicleCategory::TwoWheeler), 50);
        assert_eq!(pricing.rate_for(VehicleCategory::ThreeWheeler), 100);
        assert_eq!(pricing.rate_for(VehicleCategory::FourWheeler), 200);

        let updated = pricing.with_update(&PricingUpdate {
            three_wheeler: Some(120),
            ..Default::default()
        });
        assert_eq!(updated.two_wheeler, 50);
        assert_eq!(updated.three_wheeler, 120);
        assert_eq!(updated.four_wheeler, 200);
    }

    #[test]
    fn vehicle_invariant() {
        let mut vehicle = sample_vehicle();
        assert!(vehicle.is_consistent());

        vehicle.status = VehicleStatus::Exited;
        assert!(!vehicle.is_consistent());

        vehicle.exit_time = Some(vehicle.entry_time);
        vehicle.fees = Some(200);
        assert!(vehicle.is_consistent());
    }

    #[test]
    fn filter_matches_plate_case_insensitively() {
        let vehicle = sample_vehicle();
        let filter = VehicleFilter {
            vehicle_number: Some("ka01ab1234".into()),
            ..Default::default()
        };
        assert!(filter.matches(&vehicle));
        assert!(VehicleFilter::active().matches(&vehicle));

        let exited_only = VehicleFilter {
            status: Some(VehicleStatus::Exited),
            ..Default::default()
        };
        assert!(!exited_only.matches(&vehicle));
    }

    #[test]
    fn guard_update_is_partial() {
        let guard = Guard {
            id: GuardId::new("1"),
            name: "John Doe".into(),
            email: "john@example.com".into(),
            shift: Shift::Day,
            status: GuardStatus::Active,
        };

        let updated = GuardUpdate {
            shift: Some(Shift::Night),
            ..Default::default()
        }
        .apply_to(&guard);

        assert_eq!(updated.name, "John Doe");
        assert_eq!(updated.shift, Shift::Night);
        assert_eq!(updated.id, guard.id);
    }

    #[test]
    fn bill_details_serialize_with_kind_tag() {
        let at = Local.with_ymd_and_hms(2025, 3, 15, 9, 0, 0).single().unwrap();
        let details = BillDetails::Entry { entry_time: at };
        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["kind"], "entry");
    }
}
