//! Availability-rate and operating-status derivation.
//!
//! The operating-status rule is a pure function of the evaluation
//! instant, the day-type, and a record's schedule-window fields; the
//! instant is always passed in explicitly (it is the run's collection
//! timestamp, not a wall-clock read) so derivations are deterministic
//! and testable. Any missing or non-numeric window field fails safe to
//! `Closed`.

use chrono::{DateTime, Datelike, FixedOffset, Timelike};
use serde::Serialize;

use citypulse_core::{DayType, GeoPoint, HolidayCalendar};
use citypulse_provider::types::{coerce_f64, coerce_i64};
use citypulse_provider::RawParkingRecord;

use crate::types::EnrichedFacility;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatingStatus {
    Operating,
    Closed,
}

impl OperatingStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OperatingStatus::Operating => "operating",
            OperatingStatus::Closed => "closed",
        }
    }
}

/// Congestion label derived from the availability rate. Lower bounds
/// inclusive, upper bounds exclusive; a missing rate is `Unknown`, never
/// a defaulted number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Congestion {
    Congested,
    Moderate,
    Free,
    Unknown,
}

impl Congestion {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Congestion::Congested => "congested",
            Congestion::Moderate => "moderate",
            Congestion::Free => "free",
            Congestion::Unknown => "unknown",
        }
    }
}

const WEEKDAY_LABELS: [&str; 7] = ["월", "화", "수", "목", "금", "토", "일"];

/// `(capacity - occupied) / capacity` rounded to 2 decimals, or `None`
/// when capacity is not positive. In `[0, 1]` for every record the
/// validity filter lets through.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn availability_rate(capacity: i64, occupied: i64) -> Option<f64> {
    if capacity <= 0 {
        return None;
    }
    let rate = (capacity - occupied) as f64 / capacity as f64;
    Some((rate * 100.0).round() / 100.0)
}

/// Classifies an availability rate into a congestion label.
#[must_use]
pub fn congestion(rate: Option<f64>) -> Congestion {
    match rate {
        None => Congestion::Unknown,
        Some(r) if r < 0.30 => Congestion::Congested,
        Some(r) if r < 0.70 => Congestion::Moderate,
        Some(_) => Congestion::Free,
    }
}

/// Picks the record's `(open, close)` HHMM window for a day-type.
/// `None` when either field is missing or non-numeric.
fn select_window(record: &RawParkingRecord, day_type: DayType) -> Option<(i64, i64)> {
    let (open, close) = match day_type {
        DayType::Weekday => (&record.weekday_open, &record.weekday_close),
        DayType::Saturday => (&record.weekend_open, &record.weekend_close),
        // Sundays share the holiday schedule.
        DayType::Sunday | DayType::Holiday => (&record.holiday_open, &record.holiday_close),
    };
    Some((coerce_i64(open.as_ref())?, coerce_i64(close.as_ref())?))
}

/// The instant's time of day as an HHMM integer (e.g. 09:05 → 905).
fn hhmm(instant: &DateTime<FixedOffset>) -> i64 {
    i64::from(instant.hour()) * 100 + i64::from(instant.minute())
}

/// Derives the operating status at `instant`. `Operating` iff the
/// day-type's window exists and `open <= HHMM(instant) <= close`.
#[must_use]
pub fn operating_status(
    record: &RawParkingRecord,
    instant: &DateTime<FixedOffset>,
    calendar: &HolidayCalendar,
) -> OperatingStatus {
    let day_type = calendar.day_type(instant.date_naive());
    match select_window(record, day_type) {
        Some((open, close)) => {
            let now = hhmm(instant);
            if open <= now && now <= close {
                OperatingStatus::Operating
            } else {
                OperatingStatus::Closed
            }
        }
        None => OperatingStatus::Closed,
    }
}

/// Won per hour extrapolated from the base fee: `charge / minutes * 60`,
/// rounded. `None` when either input is missing or minutes is zero.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn hourly_rate(basic_charge: Option<f64>, basic_time_minutes: Option<f64>) -> Option<i64> {
    let charge = basic_charge?;
    let minutes = basic_time_minutes?;
    if minutes > 0.0 {
        Some((charge / minutes * 60.0).round() as i64)
    } else {
        None
    }
}

/// Extracts the district from an address: the first whitespace token
/// ending in `구`.
#[must_use]
pub fn district(address: &str) -> Option<String> {
    address
        .split_whitespace()
        .find(|word| word.ends_with('구'))
        .map(ToOwned::to_owned)
}

/// Builds an [`EnrichedFacility`] from a validated record. Counter
/// fields are coerced a second time here; the validity filter already
/// guaranteed they parse.
#[must_use]
pub fn enrich_facility(
    record: &RawParkingRecord,
    location: Option<GeoPoint>,
    instant: DateTime<FixedOffset>,
    calendar: &HolidayCalendar,
) -> EnrichedFacility {
    let capacity = record.capacity_count().unwrap_or(0);
    let occupied = record.occupied_count().unwrap_or(0);
    let rate = availability_rate(capacity, occupied);
    let weekday_order = instant.weekday().num_days_from_monday();

    EnrichedFacility {
        name: record.name.clone().unwrap_or_default(),
        address: record.address.clone(),
        location,
        capacity,
        occupied,
        availability_rate: rate,
        operating_status: operating_status(record, &instant, calendar),
        congestion: congestion(rate),
        updated_at: record.updated_at.clone(),
        paid_label: record.paid_label.clone(),
        saturday_free_label: record.saturday_free_label.clone(),
        holiday_free_label: record.holiday_free_label.clone(),
        basic_charge: coerce_i64(record.basic_charge.as_ref()),
        basic_time_minutes: coerce_i64(record.basic_time_minutes.as_ref()),
        add_charge: coerce_i64(record.add_charge.as_ref()),
        add_time_minutes: coerce_i64(record.add_time_minutes.as_ref()),
        hourly_rate: hourly_rate(
            coerce_f64(record.basic_charge.as_ref()),
            coerce_f64(record.basic_time_minutes.as_ref()),
        ),
        district: record.address.as_deref().and_then(district),
        collected_at: instant,
        weekday: WEEKDAY_LABELS[weekday_order as usize],
        weekday_order,
        nearby_average_rate: None,
    }
}
