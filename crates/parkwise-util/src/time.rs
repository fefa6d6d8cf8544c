//! Wall-clock utilities for parkwise
//!
//! Billing works on wall-clock timestamps in the facility's local timezone.
//! Every engine operation takes `now` as an argument; this module only
//! supplies it at the edges and provides the calendar arithmetic the billing
//! rules need.
//!
//! # Mock Time for Development
//!
//! In debug builds, the `PARKWISE_MOCK_TIME` environment variable can be set
//! to override the system time returned by [`now`]. Useful for checking
//! overnight and multi-day fees without waiting.
//!
//! Format: `YYYY-MM-DD HH:MM:SS` (e.g., `2025-03-15 09:30:00`)
//!
//! ```bash
//! PARKWISE_MOCK_TIME="2025-03-15 09:30:00" parkctl exit KA01AB1234
//! ```

use chrono::{DateTime, Datelike, Local, Months, NaiveDate, NaiveDateTime, TimeZone};
use std::sync::OnceLock;

/// Environment variable name for mock time (debug builds only)
pub const MOCK_TIME_ENV_VAR: &str = "PARKWISE_MOCK_TIME";

/// Offset between mock time and real time, captured once at first use so
/// mock time keeps advancing at the real rate.
static MOCK_TIME_OFFSET: OnceLock<Option<chrono::Duration>> = OnceLock::new();

fn get_mock_time_offset() -> Option<chrono::Duration> {
    *MOCK_TIME_OFFSET.get_or_init(|| {
        #[cfg(debug_assertions)]
        {
            let mock_time_str = std::env::var(MOCK_TIME_ENV_VAR).ok()?;
            let Ok(naive_dt) = NaiveDateTime::parse_from_str(&mock_time_str, "%Y-%m-%d %H:%M:%S")
            else {
                tracing::warn!(
                    mock_time = %mock_time_str,
                    expected_format = "%Y-%m-%d %H:%M:%S",
                    "Invalid mock time format"
                );
                return None;
            };

            match Local.from_local_datetime(&naive_dt).single() {
                Some(mock_dt) => {
                    let offset = mock_dt.signed_duration_since(Local::now());
                    tracing::info!(
                        mock_time = %mock_time_str,
                        offset_secs = offset.num_seconds(),
                        "Mock time enabled"
                    );
                    Some(offset)
                }
                None => {
                    tracing::warn!(
                        mock_time = %mock_time_str,
                        "Mock time does not map to a single local instant"
                    );
                    None
                }
            }
        }
        #[cfg(not(debug_assertions))]
        {
            None
        }
    })
}

/// Returns whether mock time is currently active.
pub fn is_mock_time_active() -> bool {
    get_mock_time_offset().is_some()
}

/// Current local time, respecting `PARKWISE_MOCK_TIME` in debug builds.
pub fn now() -> DateTime<Local> {
    let real_now = Local::now();

    match get_mock_time_offset() {
        Some(offset) => real_now + offset,
        None => real_now,
    }
}

/// Add whole calendar months to a timestamp.
///
/// The day of month is kept where possible and clamped to the last day of
/// the target month otherwise (Jan 31 + 1 month = Feb 28/29). Returns `None`
/// if the result is out of range or falls into a DST gap.
pub fn add_calendar_months(dt: DateTime<Local>, months: u32) -> Option<DateTime<Local>> {
    dt.checked_add_months(Months::new(months))
}

/// Local midnight at the start of `date`.
pub fn start_of_day(date: NaiveDate) -> Option<DateTime<Local>> {
    let midnight = date.and_hms_opt(0, 0, 0)?;
    Local.from_local_datetime(&midnight).earliest()
}

/// Half-open `[start, end)` bounds of the local calendar day `date`.
pub fn day_bounds(date: NaiveDate) -> Option<(DateTime<Local>, DateTime<Local>)> {
    let start = start_of_day(date)?;
    let end = start_of_day(date.succ_opt()?)?;
    Some((start, end))
}

/// Half-open `[start, end)` bounds of the local calendar month containing `date`.
pub fn month_bounds(date: NaiveDate) -> Option<(DateTime<Local>, DateTime<Local>)> {
    let first = date.with_day(1)?;
    let next_first = first.checked_add_months(Months::new(1))?;
    Some((start_of_day(first)?, start_of_day(next_first)?))
}
