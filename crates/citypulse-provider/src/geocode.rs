//! Kakao local-search geocoding with per-query memoization.
//!
//! Two resolution modes exist: structured address lookup (parking lot
//! addresses) and free-text keyword lookup (commercial-area landmark
//! keywords). Both return the first candidate or nothing — "not found"
//! is a value, never an error. Results, including misses, are memoized
//! for the resolver's lifetime, and at most one external call is in
//! flight per unique query.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Url};
use serde::Deserialize;
use tokio::sync::Mutex;

use citypulse_core::GeoPoint;

use crate::error::ProviderError;

const DEFAULT_BASE_URL: &str = "https://dapi.kakao.com";

/// Which Kakao local-search endpoint a query goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeocodeMode {
    Address,
    Keyword,
}

impl GeocodeMode {
    fn path(self) -> &'static str {
        match self {
            GeocodeMode::Address => "/v2/local/search/address.json",
            GeocodeMode::Keyword => "/v2/local/search/keyword.json",
        }
    }
}

#[derive(Debug, Deserialize)]
struct KakaoResponse {
    #[serde(default)]
    documents: Vec<KakaoDocument>,
}

/// Kakao returns coordinates as decimal strings: `y` latitude, `x` longitude.
#[derive(Debug, Deserialize)]
struct KakaoDocument {
    y: String,
    x: String,
}

type CacheSlot = Arc<Mutex<Option<Option<GeoPoint>>>>;

/// Geocoder backed by the Kakao local API.
pub struct KakaoGeocoder {
    client: Client,
    api_key: String,
    base_url: Url,
    /// Memo table keyed by `(endpoint, query)`. The outer lock is held
    /// only to look up or insert a slot; the per-slot lock is held for
    /// the duration of a resolution so a second caller of the same query
    /// waits instead of issuing a duplicate call.
    cache: Mutex<HashMap<String, CacheSlot>>,
}

impl KakaoGeocoder {
    /// Creates a geocoder pointed at the production Kakao API.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, ProviderError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a geocoder with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the `reqwest::Client` cannot be
    /// constructed, or [`ProviderError::InvalidBaseUrl`] for an
    /// unparseable base URL.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("citypulse/0.1 (facility-state-pipeline)")
            .build()?;

        let base_url =
            Url::parse(base_url.trim_end_matches('/')).map_err(|e| ProviderError::InvalidBaseUrl {
                url: base_url.to_owned(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            cache: Mutex::new(HashMap::new()),
        })
    }

    /// Resolves a structured address to a coordinate.
    pub async fn resolve_address(&self, address: &str) -> Option<GeoPoint> {
        self.resolve(GeocodeMode::Address, address).await
    }

    /// Resolves a free-text search keyword to a coordinate.
    pub async fn resolve_keyword(&self, keyword: &str) -> Option<GeoPoint> {
        self.resolve(GeocodeMode::Keyword, keyword).await
    }

    /// Resolves a query in the given mode, consulting the memo table
    /// first. Unresolvable queries are memoized too so repeated misses
    /// cost one external call.
    pub async fn resolve(&self, mode: GeocodeMode, query: &str) -> Option<GeoPoint> {
        let slot = {
            let mut cache = self.cache.lock().await;
            Arc::clone(
                cache
                    .entry(format!("{}\u{1f}{query}", mode.path()))
                    .or_default(),
            )
        };

        let mut entry = slot.lock().await;
        if let Some(cached) = *entry {
            return cached;
        }
        let resolved = self.resolve_uncached(mode, query).await;
        *entry = Some(resolved);
        resolved
    }

    /// Performs the external call and takes the first candidate. Any
    /// failure — non-2xx, network error, malformed body, unparseable
    /// coordinates — resolves to `None` with a warning.
    async fn resolve_uncached(&self, mode: GeocodeMode, query: &str) -> Option<GeoPoint> {
        let mut url = self.base_url.clone();
        url.set_path(mode.path());
        url.query_pairs_mut().append_pair("query", query);

        let response = match self
            .client
            .get(url)
            .header("Authorization", format!("KakaoAK {}", self.api_key))
            .send()
            .await
        {
            Ok(r) => r,
            Err(err) => {
                tracing::warn!(query, error = %err, "geocode request failed");
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::warn!(query, status = %response.status(), "geocode returned non-success");
            return None;
        }

        let parsed: KakaoResponse = match response.json().await {
            Ok(p) => p,
            Err(err) => {
                tracing::warn!(query, error = %err, "geocode response body malformed");
                return None;
            }
        };

        let first = parsed.documents.into_iter().next()?;
        let lat = first.y.parse::<f64>().ok()?;
        let lon = first.x.parse::<f64>().ok()?;
        GeoPoint::new(lat, lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modes_map_to_distinct_endpoints() {
        assert_eq!(GeocodeMode::Address.path(), "/v2/local/search/address.json");
        assert_eq!(GeocodeMode::Keyword.path(), "/v2/local/search/keyword.json");
    }

    #[test]
    fn candidate_coordinates_parse_from_strings() {
        let response: KakaoResponse = serde_json::from_str(
            r#"{"documents": [{"y": "37.497942", "x": "127.027621", "place_name": "강남역"}]}"#,
        )
        .unwrap();
        let first = &response.documents[0];
        assert!((first.y.parse::<f64>().unwrap() - 37.497_942).abs() < 1e-9);
        assert!((first.x.parse::<f64>().unwrap() - 127.027_621).abs() < 1e-9);
    }

    #[test]
    fn empty_documents_deserialize() {
        let response: KakaoResponse = serde_json::from_str(r#"{"documents": []}"#).unwrap();
        assert!(response.documents.is_empty());
    }
}
