//! Index-document construction.
//!
//! Document ids are content-derived: the SHA-256 of the record's natural
//! business key and the run's collection timestamp. Re-running a
//! pipeline for the same collection instant therefore rewrites the same
//! documents instead of appending duplicates. Records without a resolved
//! location are never turned into documents.

use chrono::{DateTime, FixedOffset};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use citypulse_enrich::{EnrichedArea, EnrichedCategory, EnrichedFacility};

/// Deterministic document id: lowercase hex SHA-256 of
/// `"{business_key}|{rfc3339 timestamp}"`. No random component, so the
/// id is reproducible from the source fields alone.
#[must_use]
pub fn doc_id(business_key: &str, collected_at: &DateTime<FixedOffset>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(business_key.as_bytes());
    hasher.update(b"|");
    hasher.update(collected_at.to_rfc3339().as_bytes());
    hex::encode(hasher.finalize())
}

/// Builds the `(id, source)` pair for a parking facility, or `None` when
/// the facility has no resolved location or no name to key by.
#[must_use]
pub fn parking_document(facility: &EnrichedFacility) -> Option<(String, Value)> {
    let location = facility.location?;
    if facility.name.is_empty() {
        return None;
    }

    let id = doc_id(&facility.name, &facility.collected_at);
    let source = json!({
        "parking_name": facility.name,
        "address": facility.address,
        "latitude": location.lat,
        "longitude": location.lon,
        "location": location,
        "available_rate": facility.availability_rate,
        "is_operating_now": facility.operating_status,
        "available_status": facility.congestion,
        "update_time": facility.updated_at,
        "is_paid": facility.paid_label,
        "saturday_free": facility.saturday_free_label,
        "holiday_free": facility.holiday_free_label,
        "basic_charge": facility.basic_charge,
        "basic_time": facility.basic_time_minutes,
        "add_charge": facility.add_charge,
        "add_time": facility.add_time_minutes,
        "hourly_rate": facility.hourly_rate,
        "district": facility.district,
        "weekday": facility.weekday,
        "weekday_order": facility.weekday_order,
        "nearby_average_rate": facility.nearby_average_rate,
        "timestamp": facility.collected_at.to_rfc3339(),
    });
    Some((id, source))
}

/// Builds the `(id, source)` pair for a commercial-area summary, keyed
/// by its search keyword. `None` when the keyword never geocoded.
#[must_use]
pub fn area_document(area: &EnrichedArea) -> Option<(String, Value)> {
    let location = area.location?;

    let id = doc_id(&area.search_keyword, &area.collected_at);
    let source = json!({
        "area_name": area.area_name,
        "search_keyword": area.search_keyword,
        "latitude": location.lat,
        "longitude": location.lon,
        "location": location,
        "activity_level": area.activity_level,
        "payment_count": area.payment_count,
        "min_amount": area.min_amount,
        "max_amount": area.max_amount,
        "nearby_parking_count": area.nearby_parking_count,
        "nearby_average_availability": area.nearby_average_availability,
        "timestamp": area.collected_at.to_rfc3339(),
    });
    Some((id, source))
}

/// Builds the `(id, source)` pair for one business-category row. The id
/// folds the category name into the business key — categories of one
/// area share a keyword and timestamp and must not collide.
#[must_use]
pub fn category_document(row: &EnrichedCategory) -> Option<(String, Value)> {
    let location = row.location?;
    let category = row.category.as_deref().unwrap_or("기타");

    let id = doc_id(
        &format!("{}|{category}", row.search_keyword),
        &row.collected_at,
    );
    let source = json!({
        "area_name": row.area_name,
        "search_keyword": row.search_keyword,
        "latitude": location.lat,
        "longitude": location.lon,
        "location": location,
        "category": category,
        "level": row.level,
        "payment_count": row.payment_count,
        "amount_min": row.min_amount,
        "amount_max": row.max_amount,
        "stores": row.store_count,
        "reported_at": row.reported_at,
        "timestamp": row.collected_at.to_rfc3339(),
    });
    Some((id, source))
}
