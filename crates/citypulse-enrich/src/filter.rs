//! Record-validity predicates for the parking dataset.
//!
//! A record must pass every predicate to continue downstream; a failing
//! record is silently excluded, never an error. Each predicate is a
//! named function so boundary behavior stays individually testable.

use chrono::{NaiveDate, NaiveDateTime};

use citypulse_provider::RawParkingRecord;

/// Lot-type code for on-street parking, the only subtype whose realtime
/// counters are trustworthy.
const ON_STREET: &str = "NW";

/// Returns `true` when the record is eligible for enrichment on
/// `collection_date`.
#[must_use]
pub fn is_valid(record: &RawParkingRecord, collection_date: NaiveDate) -> bool {
    is_on_street(record)
        && has_realtime_feed(record)
        && has_consistent_counters(record)
        && is_fresh(record, collection_date)
}

fn is_on_street(record: &RawParkingRecord) -> bool {
    record.lot_type.as_deref() == Some(ON_STREET)
}

fn has_realtime_feed(record: &RawParkingRecord) -> bool {
    record.realtime_flag.as_deref() == Some("1")
}

/// Capacity and occupied count both parse as non-negative, and
/// occupancy never exceeds capacity (negative availability means a
/// stuck counter).
fn has_consistent_counters(record: &RawParkingRecord) -> bool {
    match (record.capacity_count(), record.occupied_count()) {
        (Some(capacity), Some(occupied)) => {
            capacity >= 0 && occupied >= 0 && capacity - occupied >= 0
        }
        _ => false,
    }
}

/// The realtime counter was updated on the collection date; older
/// records are stale feeds, not live state.
fn is_fresh(record: &RawParkingRecord, collection_date: NaiveDate) -> bool {
    record
        .updated_at
        .as_deref()
        .and_then(parse_update_timestamp)
        .is_some_and(|dt| dt.date() == collection_date)
}

/// Parses the provider's `YYYY-MM-DD HH:MM:SS` update stamp.
#[must_use]
pub fn parse_update_timestamp(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%d %H:%M:%S").ok()
}
