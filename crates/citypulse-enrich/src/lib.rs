pub mod filter;
pub mod spatial;
pub mod status;
pub mod types;

pub use filter::is_valid;
pub use spatial::{haversine_meters, join, NearbyStats};
pub use status::{enrich_facility, Congestion, OperatingStatus};
pub use types::{EnrichedArea, EnrichedCategory, EnrichedFacility};
