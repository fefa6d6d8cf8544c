//! Dashboard statistics

use chrono::{DateTime, Days, Local, NaiveDate};
use parkwise_api::{
    Bill, CategoryCounts, DailyRevenue, DashboardStats, Guard, ParkingError, Result, Vehicle,
};
use parkwise_util::{day_bounds, month_bounds};

/// Days covered by `revenue_by_day`, ending today
pub const REVENUE_HISTORY_DAYS: u64 = 7;

fn bounds_error(date: NaiveDate) -> ParkingError {
    ParkingError::internal(format!("no local time bounds for {date}"))
}

fn first_history_day(today: NaiveDate) -> Result<NaiveDate> {
    today
        .checked_sub_days(Days::new(REVENUE_HISTORY_DAYS - 1))
        .ok_or_else(|| bounds_error(today))
}

/// Half-open window of bill timestamps needed for the stats at `now`:
/// the start of the month or of the weekly history, whichever is earlier,
/// up to the end of today.
pub fn stats_window(now: DateTime<Local>) -> Result<(DateTime<Local>, DateTime<Local>)> {
    let today = now.date_naive();
    let (month_start, _) = month_bounds(today).ok_or_else(|| bounds_error(today))?;
    let (_, today_end) = day_bounds(today).ok_or_else(|| bounds_error(today))?;

    let history_day = first_history_day(today)?;
    let (history_start, _) = day_bounds(history_day).ok_or_else(|| bounds_error(history_day))?;

    Ok((month_start.min(history_start), today_end))
}

fn revenue_between(bills: &[Bill], from: DateTime<Local>, to: DateTime<Local>) -> u64 {
    bills
        .iter()
        .filter(|b| from <= b.created_at && b.created_at < to)
        .map(|b| b.amount)
        .fold(0u64, u64::saturating_add)
}

/// Summarize occupancy and revenue as seen at `now`.
///
/// `bills` may contain bills outside the windows; they are ignored.
pub fn compute_dashboard_stats(
    vehicles: &[Vehicle],
    bills: &[Bill],
    guards: &[Guard],
    now: DateTime<Local>,
) -> Result<DashboardStats> {
    let today = now.date_naive();

    let mut distribution = CategoryCounts::default();
    for vehicle in vehicles {
        distribution.increment(vehicle.vehicle_type);
    }

    let (day_start, day_end) = day_bounds(today).ok_or_else(|| bounds_error(today))?;
    let (month_start, month_end) = month_bounds(today).ok_or_else(|| bounds_error(today))?;

    let mut revenue_by_day = Vec::with_capacity(REVENUE_HISTORY_DAYS as usize);
    let mut date = first_history_day(today)?;
    while date <= today {
        let (from, to) = day_bounds(date).ok_or_else(|| bounds_error(date))?;
        revenue_by_day.push(DailyRevenue {
            day: date.format("%a").to_string(),
            date,
            revenue: revenue_between(bills, from, to),
        });
        date = date.succ_opt().ok_or_else(|| bounds_error(date))?;
    }

    Ok(DashboardStats {
        total_vehicles: vehicles.len() as u64,
        vehicles_parked: vehicles.iter().filter(|v| v.is_active()).count() as u64,
        today_revenue: revenue_between(bills, day_start, day_end),
        month_revenue: revenue_between(bills, month_start, month_end),
        active_guards: guards.iter().filter(|g| g.is_active()).count() as u64,
        vehicle_type_distribution: distribution,
        revenue_by_day,
    })
}
