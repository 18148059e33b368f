pub mod client;
pub mod error;
pub mod geocode;
pub mod retry;
pub mod types;

pub use client::CityApiClient;
pub use error::ProviderError;
pub use geocode::{GeocodeMode, KakaoGeocoder};
pub use types::{CommercialCategory, CommercialStatus, RawParkingRecord};
