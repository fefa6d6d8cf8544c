//! Integration tests for parkctl
//!
//! These tests drive the parking service end to end over a real SQLite file.

use chrono::{DateTime, Duration, Local, TimeZone};
use parkwise_api::{
    BillKind, EntryRequest, ParkingError, PricingUpdate, VehicleCategory, VehicleDetails,
    VehicleStatus,
};
use parkwise_config::{load_config, FacilityConfig};
use parkwise_core::ParkingService;
use parkwise_store::{SqliteStore, Store};
use parkwise_util::{GuardId, DATABASE_FILENAME};
use std::sync::Arc;

const CONFIG: &str = r#"
config_version = 1

[facility]
name = "Test Plaza"
id_strategy = "sequential"

[pricing]
two_wheeler = 50
three_wheeler = 100
four_wheeler = 200

[[guards]]
id = "1"
name = "John Doe"
email = "john@example.com"
shift = "day"

[[guards]]
id = "2"
name = "Jane Smith"
email = "jane@example.com"
shift = "night"
status = "inactive"
"#;

fn t0() -> DateTime<Local> {
    Local.with_ymd_and_hms(2025, 3, 15, 9, 0, 0).single().unwrap()
}

fn load_test_config(dir: &tempfile::TempDir) -> FacilityConfig {
    let path = dir.path().join("config.toml");
    std::fs::write(&path, CONFIG).unwrap();
    load_config(&path).unwrap()
}

fn open_store(dir: &tempfile::TempDir) -> Arc<dyn Store> {
    Arc::new(SqliteStore::open(dir.path().join(DATABASE_FILENAME)).unwrap())
}

fn entry(number: &str, vehicle_type: VehicleCategory) -> EntryRequest {
    EntryRequest {
        vehicle_number: number.into(),
        vehicle_type,
        guard_id: GuardId::new("1"),
        details: VehicleDetails::default(),
    }
}

#[test]
fn test_config_loading() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_test_config(&dir);

    assert_eq!(config.facility.name, "Test Plaza");
    assert_eq!(config.guards.len(), 2);
    assert_eq!(config.pricing.four_wheeler, 200);
}

#[test]
fn test_full_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_test_config(&dir);
    let service = ParkingService::from_config(&config, open_store(&dir), t0()).unwrap();

    let reg = service
        .register_entry(entry("MH12XY9876", VehicleCategory::FourWheeler), t0())
        .unwrap();
    assert_eq!(reg.vehicle.guard_name, "John Doe");

    let vehicle = service.find_active_vehicle("mh12xy9876").unwrap();
    let out = service
        .process_exit(&vehicle.id, t0() + Duration::minutes(70))
        .unwrap();
    assert_eq!(out.bill.amount, 200);
    assert_eq!(out.bill.duration_label(), Some("1 day"));

    let history = service.vehicle_history(&vehicle.id).unwrap();
    assert_eq!(history.vehicle.status, VehicleStatus::Exited);
    assert_eq!(history.bills.len(), 2);
    assert_eq!(history.events.len(), 2);

    // The plate can come back for a new stay
    let again = service
        .register_entry(
            entry("MH12XY9876", VehicleCategory::FourWheeler),
            t0() + Duration::days(1),
        )
        .unwrap();
    assert_ne!(again.vehicle.id, vehicle.id);
}

#[test]
fn test_inactive_config_guard_cannot_admit() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_test_config(&dir);
    let service = ParkingService::from_config(&config, open_store(&dir), t0()).unwrap();

    let mut request = entry("MH12XY9876", VehicleCategory::TwoWheeler);
    request.guard_id = GuardId::new("2");

    let err = service.register_entry(request, t0()).unwrap_err();
    assert!(matches!(err, ParkingError::GuardInactive(_)));
}

#[test]
fn test_concurrent_exits_bill_once() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_test_config(&dir);
    let service = Arc::new(ParkingService::from_config(&config, open_store(&dir), t0()).unwrap());

    let reg = service
        .register_entry(entry("KA01AB1234", VehicleCategory::TwoWheeler), t0())
        .unwrap();
    let id = reg.vehicle.id;

    let results: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let service = Arc::clone(&service);
                let id = id.clone();
                s.spawn(move || service.process_exit(&id, t0() + Duration::hours(25 + i)))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let winners: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(winners.len(), 1);
    let winner = winners[0];

    for result in &results {
        if let Err(e) = result {
            match e {
                ParkingError::VehicleAlreadyExited { vehicle } => {
                    assert_eq!(**vehicle, winner.vehicle);
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    let bills = service.vehicle_history(&id).unwrap().bills;
    let exits: Vec<_> = bills.iter().filter(|b| b.kind() == BillKind::Exit).collect();
    assert_eq!(exits.len(), 1);
    assert_eq!(exits[0].bill_number, winner.bill.bill_number);
    assert_eq!(service.get_vehicle(&id).unwrap().fees, Some(winner.bill.amount));
}

#[test]
fn test_restart_resumes_numbering_and_pricing() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_test_config(&dir);

    {
        let service = ParkingService::from_config(&config, open_store(&dir), t0()).unwrap();
        let reg = service
            .register_entry(entry("KA01AB1234", VehicleCategory::ThreeWheeler), t0())
            .unwrap();
        assert_eq!(reg.bill.bill_number.as_str(), "BILL-000001");

        service
            .update_pricing(
                &PricingUpdate {
                    three_wheeler: Some(150),
                    ..Default::default()
                },
                t0(),
            )
            .unwrap();
    }

    let service = ParkingService::from_config(&config, open_store(&dir), t0()).unwrap();
    let vehicle = service.find_active_vehicle("KA01AB1234").unwrap();

    let out = service
        .process_exit(&vehicle.id, t0() + Duration::hours(49))
        .unwrap();
    assert_eq!(out.bill.bill_number.as_str(), "BILL-000002");
    assert_eq!(out.bill.amount, 3 * 150);

    let sale = service
        .create_parking_pass(&vehicle.id, 1, 1000, t0() + Duration::hours(50))
        .unwrap();
    assert_eq!(sale.bill.bill_number.as_str(), "PASS-000001");
}

#[test]
fn test_restart_after_rejected_entry_skips_used_numbers() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_test_config(&dir);

    {
        let service = ParkingService::from_config(&config, open_store(&dir), t0()).unwrap();
        let first = service
            .register_entry(entry("KA01AA0001", VehicleCategory::TwoWheeler), t0())
            .unwrap();
        assert_eq!(first.vehicle.id.as_str(), "V-000001");

        // A rejected entry burns an id and a bill number that never reach the store
        let err = service
            .register_entry(entry("KA01AA0001", VehicleCategory::TwoWheeler), t0())
            .unwrap_err();
        assert!(matches!(err, ParkingError::VehicleAlreadyParked { .. }));

        let second = service
            .register_entry(entry("KA01AA0002", VehicleCategory::TwoWheeler), t0())
            .unwrap();
        assert_eq!(second.vehicle.id.as_str(), "V-000003");
        assert_eq!(second.bill.bill_number.as_str(), "BILL-000003");
    }

    let service = ParkingService::from_config(&config, open_store(&dir), t0()).unwrap();
    let third = service
        .register_entry(entry("KA01AA0003", VehicleCategory::TwoWheeler), t0())
        .unwrap();
    assert_eq!(third.vehicle.id.as_str(), "V-000004");
    assert_eq!(third.bill.bill_number.as_str(), "BILL-000004");

    let vehicle = service.find_active_vehicle("KA01AA0002").unwrap();
    let out = service
        .process_exit(&vehicle.id, t0() + Duration::hours(2))
        .unwrap();
    assert_eq!(out.bill.bill_number.as_str(), "BILL-000005");
    assert_eq!(service.active_vehicles().unwrap().len(), 2);
}

#[test]
fn test_pass_after_exit() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_test_config(&dir);
    let service = ParkingService::from_config(&config, open_store(&dir), t0()).unwrap();

    let reg = service
        .register_entry(entry("KA01AB1234", VehicleCategory::FourWheeler), t0())
        .unwrap();
    service
        .process_exit(&reg.vehicle.id, t0() + Duration::hours(1))
        .unwrap();

    let vehicle = service.find_latest_vehicle("KA01AB1234").unwrap();
    let sale = service
        .create_parking_pass(&vehicle.id, 2, 1000, t0() + Duration::hours(2))
        .unwrap();
    assert_eq!(sale.pass.amount, 2000);
    assert_eq!(service.vehicle_history(&reg.vehicle.id).unwrap().passes, vec![sale.pass]);
}

#[test]
fn test_dashboard_over_a_day() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_test_config(&dir);
    let service = ParkingService::from_config(&config, open_store(&dir), t0()).unwrap();

    let plates = [
        ("KA01AA0001", VehicleCategory::TwoWheeler),
        ("KA01AA0002", VehicleCategory::ThreeWheeler),
        ("KA01AA0003", VehicleCategory::FourWheeler),
    ];
    for (plate, category) in plates {
        service.register_entry(entry(plate, category), t0()).unwrap();
    }
    for (plate, _) in &plates[..2] {
        let vehicle = service.find_active_vehicle(plate).unwrap();
        service
            .process_exit(&vehicle.id, t0() + Duration::hours(3))
            .unwrap();
    }

    let stats = service.dashboard_stats(t0() + Duration::hours(4)).unwrap();
    assert_eq!(stats.total_vehicles, 3);
    assert_eq!(stats.vehicles_parked, 1);
    assert_eq!(stats.today_revenue, 150);
    assert_eq!(stats.active_guards, 1);
    assert_eq!(stats.vehicle_type_distribution.total(), 3);
    assert_eq!(stats.revenue_by_day.len(), 7);
}
