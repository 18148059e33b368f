use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod app_config;
pub mod areas;
pub mod config;
pub mod holidays;

pub use app_config::AppConfig;
pub use areas::{load_areas, AreaConfig, AreasFile};
pub use config::{load_app_config, load_app_config_from_env};
pub use holidays::{load_holidays, DayType, HolidayCalendar};

/// A resolved latitude/longitude pair.
///
/// Serializes as `{"lat": ..., "lon": ...}`, the shape Elasticsearch
/// expects for a `geo_point` field. A record either has a full
/// `GeoPoint` or no location at all; partially-resolved coordinates
/// are never represented.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    /// Builds a point only when both coordinates are finite.
    #[must_use]
    pub fn new(lat: f64, lon: f64) -> Option<Self> {
        if lat.is_finite() && lon.is_finite() {
            Some(Self { lat, lon })
        } else {
            None
        }
    }
}

/// UTC+9, the offset every provider timestamp is expressed in.
#[must_use]
pub fn seoul_offset() -> FixedOffset {
    // 9 hours is always inside FixedOffset's valid range.
    FixedOffset::east_opt(9 * 3600).expect("UTC+9 is a valid offset")
}

/// The current instant in Seoul local time. Used as the single
/// evaluation timestamp of a pipeline run.
#[must_use]
pub fn seoul_now() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&seoul_offset())
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read config file {path}: {source}")]
    FileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("config validation failed: {0}")]
    Validation(String),
}
