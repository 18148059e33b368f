//! Enriched records, the pipeline's mid-stage currency.
//!
//! Built once per validated raw record and treated as immutable
//! afterwards, except for the spatial joiner's additive fields.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use citypulse_core::GeoPoint;

use crate::status::{Congestion, OperatingStatus};

/// A validated, geocoded, status-derived parking facility.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedFacility {
    pub name: String,
    pub address: Option<String>,
    pub location: Option<GeoPoint>,
    pub capacity: i64,
    pub occupied: i64,
    /// `(capacity - occupied) / capacity`, 2 decimals; `None` when
    /// capacity is zero.
    pub availability_rate: Option<f64>,
    pub operating_status: OperatingStatus,
    pub congestion: Congestion,
    pub updated_at: Option<String>,
    pub paid_label: Option<String>,
    pub saturday_free_label: Option<String>,
    pub holiday_free_label: Option<String>,
    pub basic_charge: Option<i64>,
    pub basic_time_minutes: Option<i64>,
    pub add_charge: Option<i64>,
    pub add_time_minutes: Option<i64>,
    /// Won per hour extrapolated from the base fee.
    pub hourly_rate: Option<i64>,
    pub district: Option<String>,
    pub collected_at: DateTime<FixedOffset>,
    pub weekday: &'static str,
    pub weekday_order: u32,
    /// Filled by the spatial joiner when this facility is the join's
    /// primary side; `None` otherwise.
    pub nearby_average_rate: Option<f64>,
}

/// A commercial area's activity summary, geocoded by its landmark
/// keyword and joined against nearby parking.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedArea {
    pub area_name: String,
    pub search_keyword: String,
    pub location: Option<GeoPoint>,
    pub activity_level: Option<String>,
    pub payment_count: Option<f64>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    pub collected_at: DateTime<FixedOffset>,
    /// Parking facilities within the join radius.
    pub nearby_parking_count: usize,
    /// Mean availability rate over those facilities, when any report one.
    pub nearby_average_availability: Option<f64>,
}

/// One business-category detail row under an area. Shares the area's
/// resolved location so category documents satisfy the same
/// location-completeness rule as everything else.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedCategory {
    pub area_name: String,
    pub search_keyword: String,
    pub location: Option<GeoPoint>,
    pub category: Option<String>,
    pub level: Option<String>,
    pub payment_count: Option<f64>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    pub store_count: Option<i64>,
    pub reported_at: Option<String>,
    pub collected_at: DateTime<FixedOffset>,
}
