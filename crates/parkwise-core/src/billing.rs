//! Exit billing, entry registration and parking passes
//!
//! These functions are pure: they take the current record, the pricing table
//! and `now`, and return new values. Nothing here touches a store or the
//! system clock; IDs come from the injected [`IdProvider`].

use chrono::{DateTime, Duration, Local};
use parkwise_api::{
    normalize_vehicle_number, Bill, BillDetails, BillKind, Guard, ParkingError, ParkingPass,
    PassDetails, PricingTable, Result, Vehicle, VehicleCategory, VehicleDetails, VehicleStatus,
};
use parkwise_util::add_calendar_months;
use serde::Serialize;

use crate::IdProvider;

/// Milliseconds in one billing day
pub const MILLIS_PER_DAY: u64 = 24 * 60 * 60 * 1000;

/// New vehicle record plus its informational entry receipt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub vehicle: Vehicle,
    pub bill: Bill,
}

/// Exited vehicle record plus its final bill
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Checkout {
    pub vehicle: Vehicle,
    pub bill: Bill,
}

/// Prepaid pass plus its bill
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassSale {
    pub pass: ParkingPass,
    pub bill: Bill,
}

/// Number of days billed for a stay from `entry` to `exit`.
///
/// Every started day counts as a full day and the minimum is one day, so a
/// stay of a few minutes bills the same as a stay of 24 hours.
pub fn billable_days(entry: DateTime<Local>, exit: DateTime<Local>) -> Result<u64> {
    let before_entry = || ParkingError::ExitBeforeEntry {
        entry_time: entry,
        exit_time: exit,
    };

    let elapsed = exit.signed_duration_since(entry);
    if elapsed < Duration::zero() {
        return Err(before_entry());
    }

    // A partial millisecond still starts the next one
    let mut elapsed_ms = u64::try_from(elapsed.num_milliseconds()).map_err(|_| before_entry())?;
    if elapsed.subsec_nanos() % 1_000_000 != 0 {
        elapsed_ms += 1;
    }

    Ok(elapsed_ms.div_ceil(MILLIS_PER_DAY).max(1))
}

/// Label printed on exit bills
pub fn duration_label(days: u64) -> String {
    if days == 1 {
        "1 day".to_string()
    } else {
        format!("{days} days")
    }
}

fn multiply(units: u64, rate: u64) -> Result<u64> {
    units
        .checked_mul(rate)
        .ok_or(ParkingError::AmountOverflow { units, rate })
}

/// Create an active vehicle record and its zero-amount entry receipt.
pub fn register_entry(
    vehicle_number: &str,
    vehicle_type: VehicleCategory,
    guard: &Guard,
    details: VehicleDetails,
    now: DateTime<Local>,
    ids: &dyn IdProvider,
) -> Result<Registration> {
    let vehicle_number = normalize_vehicle_number(vehicle_number)?;

    let vehicle = Vehicle {
        id: ids.next_vehicle_id(),
        vehicle_number,
        vehicle_type,
        entry_time: now,
        exit_time: None,
        guard_id: guard.id.clone(),
        guard_name: guard.name.clone(),
        shift: guard.shift,
        fees: None,
        status: VehicleStatus::Active,
        parking_spot: details.parking_spot,
        color: details.color,
        brand: details.brand,
    };

    let bill = Bill {
        bill_number: ids.next_bill_number(BillKind::Entry),
        vehicle_id: vehicle.id.clone(),
        vehicle_number: vehicle.vehicle_number.clone(),
        vehicle_type,
        amount: 0,
        guard_id: guard.id.clone(),
        guard_name: guard.name.clone(),
        shift: guard.shift,
        created_at: now,
        details: BillDetails::Entry { entry_time: now },
    };

    Ok(Registration { vehicle, bill })
}

/// Bill an active vehicle at `now` and move it to `exited`.
///
/// Fails with `VehicleAlreadyExited` (carrying the record unchanged) if the
/// vehicle has left already; the fee is never recomputed.
pub fn compute_exit_fee(
    vehicle: &Vehicle,
    pricing: &PricingTable,
    now: DateTime<Local>,
    ids: &dyn IdProvider,
) -> Result<Checkout> {
    if vehicle.status != VehicleStatus::Active {
        return Err(ParkingError::already_exited(vehicle.clone()));
    }

    let days = billable_days(vehicle.entry_time, now)?;
    let fee_per_day = pricing.rate_for(vehicle.vehicle_type);
    let total_fee = multiply(days, fee_per_day)?;

    let exited = Vehicle {
        exit_time: Some(now),
        fees: Some(total_fee),
        status: VehicleStatus::Exited,
        ..vehicle.clone()
    };

    let bill = Bill {
        bill_number: ids.next_bill_number(BillKind::Exit),
        vehicle_id: vehicle.id.clone(),
        vehicle_number: vehicle.vehicle_number.clone(),
        vehicle_type: vehicle.vehicle_type,
        amount: total_fee,
        guard_id: vehicle.guard_id.clone(),
        guard_name: vehicle.guard_name.clone(),
        shift: vehicle.shift,
        created_at: now,
        details: BillDetails::Exit {
            entry_time: vehicle.entry_time,
            exit_time: now,
            days,
            duration: duration_label(days),
        },
    };

    Ok(Checkout {
        vehicle: exited,
        bill,
    })
}

/// Sell a prepaid pass for `months_duration` calendar months starting `now`.
pub fn create_parking_pass(
    vehicle: &Vehicle,
    months_duration: u32,
    rate_per_month: u64,
    now: DateTime<Local>,
    ids: &dyn IdProvider,
) -> Result<PassSale> {
    if months_duration == 0 {
        return Err(ParkingError::InvalidPassDuration(months_duration));
    }

    let end_date = add_calendar_months(now, months_duration)
        .ok_or(ParkingError::InvalidPassDuration(months_duration))?;
    let amount = multiply(u64::from(months_duration), rate_per_month)?;
    let bill_number = ids.next_bill_number(BillKind::Pass);

    let pass = ParkingPass {
        id: ids.next_pass_id(),
        vehicle_id: vehicle.id.clone(),
        vehicle_number: vehicle.vehicle_number.clone(),
        start_date: now,
        end_date,
        months_duration,
        rate_per_month,
        amount,
        bill_number: bill_number.clone(),
        created_at: now,
    };

    let bill = Bill {
        bill_number,
        vehicle_id: vehicle.id.clone(),
        vehicle_number: vehicle.vehicle_number.clone(),
        vehicle_type: vehicle.vehicle_type,
        amount,
        guard_id: vehicle.guard_id.clone(),
        guard_name: vehicle.guard_name.clone(),
        shift: vehicle.shift,
        created_at: now,
        details: BillDetails::Pass(PassDetails {
            pass_id: pass.id.clone(),
            start_date: now,
            end_date,
            months_duration,
        }),
    };

    Ok(PassSale { pass, bill })
}
