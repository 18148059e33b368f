//! HTTP client for the city open-data portal.
//!
//! Two endpoints are consumed: the paged `GetParkingInfo` dataset and the
//! per-area `citydata` feed whose live commercial block this pipeline
//! uses. The portal embeds the service key as a path segment rather than
//! a query parameter.

use std::time::Duration;

use futures::stream::{self, StreamExt};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::ProviderError;
use crate::retry::retry_with_backoff;
use crate::types::{CityDataEnvelope, CommercialStatus, ParkingInfoEnvelope, RawParkingRecord};

const DEFAULT_BASE_URL: &str = "http://openapi.seoul.go.kr:8088";

/// Client for the city open-data API.
///
/// Use [`CityApiClient::new`] for production or
/// [`CityApiClient::with_base_url`] to point at a mock server in tests.
pub struct CityApiClient {
    client: Client,
    service_key: String,
    base_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
    max_concurrent: usize,
}

impl CityApiClient {
    /// Creates a client pointed at the production open-data portal.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        service_key: &str,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
        max_concurrent: usize,
    ) -> Result<Self, ProviderError> {
        Self::with_base_url(
            service_key,
            timeout_secs,
            max_retries,
            backoff_base_ms,
            max_concurrent,
            DEFAULT_BASE_URL,
        )
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the `reqwest::Client` cannot be
    /// constructed, or [`ProviderError::InvalidBaseUrl`] for an unparseable
    /// base URL.
    pub fn with_base_url(
        service_key: &str,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
        max_concurrent: usize,
        base_url: &str,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("citypulse/0.1 (facility-state-pipeline)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url =
            Url::parse(&normalised).map_err(|e| ProviderError::InvalidBaseUrl {
                url: base_url.to_owned(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            service_key: service_key.to_owned(),
            base_url,
            max_retries,
            backoff_base_ms,
            max_concurrent: max_concurrent.max(1),
        })
    }

    /// Probes the dataset size with a `1/1` request and returns
    /// `list_total_count`.
    ///
    /// # Errors
    ///
    /// Propagates [`ProviderError`] — unlike individual pages, a failed
    /// probe leaves nothing to paginate over.
    pub async fn total_parking_count(&self) -> Result<u64, ProviderError> {
        let envelope = self.request_parking_range(1, 1).await?;
        Ok(envelope.body.list_total_count)
    }

    /// Fetches the full parking dataset in pages of `batch_size` rows,
    /// issuing pages with bounded concurrency.
    ///
    /// A page that fails (non-2xx, network error, malformed body) after
    /// the configured retries is logged and skipped; the result is then
    /// simply incomplete. Row order is not meaningful to callers.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] only if the initial total-count probe
    /// fails.
    pub async fn fetch_all_parking(
        &self,
        batch_size: usize,
    ) -> Result<Vec<RawParkingRecord>, ProviderError> {
        let total = self.total_parking_count().await?;
        let batch = batch_size.max(1) as u64;

        let ranges: Vec<(u64, u64)> = (0..)
            .map(|i| 1 + i * batch)
            .take_while(|start| *start <= total)
            .map(|start| (start, (start + batch - 1).min(total)))
            .collect();

        let pages: Vec<Vec<RawParkingRecord>> = stream::iter(ranges)
            .map(|(start, end)| async move {
                match self.fetch_parking_page(start, end).await {
                    Ok(rows) => {
                        tracing::debug!(start, end, rows = rows.len(), "fetched parking page");
                        rows
                    }
                    Err(err) => {
                        tracing::warn!(start, end, error = %err, "skipping failed parking page");
                        Vec::new()
                    }
                }
            })
            .buffer_unordered(self.max_concurrent)
            .collect()
            .await;

        Ok(pages.into_iter().flatten().collect())
    }

    /// Fetches one inclusive `[start, end]` page of parking rows, with
    /// retry on transient errors.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] after retries are exhausted.
    pub async fn fetch_parking_page(
        &self,
        start: u64,
        end: u64,
    ) -> Result<Vec<RawParkingRecord>, ProviderError> {
        let envelope = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.request_parking_range(start, end)
        })
        .await?;
        Ok(envelope.body.row)
    }

    /// Fetches the live commercial block for one area, or `None` when the
    /// feed carries no commercial data for it.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on HTTP failure or a malformed body
    /// after retries are exhausted.
    pub async fn fetch_commercial_status(
        &self,
        area_name: &str,
    ) -> Result<Option<CommercialStatus>, ProviderError> {
        let url = self.citydata_url(area_name);
        let context = format!("citydata({area_name})");
        let envelope: CityDataEnvelope =
            retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
                self.request_json(&url, &context)
            })
            .await?;
        Ok(envelope.citydata.and_then(|c| c.commercial))
    }

    async fn request_parking_range(
        &self,
        start: u64,
        end: u64,
    ) -> Result<ParkingInfoEnvelope, ProviderError> {
        let url = self.parking_url(start, end);
        self.request_json(&url, &format!("GetParkingInfo({start}..{end})"))
            .await
    }

    fn parking_url(&self, start: u64, end: u64) -> Url {
        self.build_url(&[
            "json",
            "GetParkingInfo",
            &start.to_string(),
            &end.to_string(),
        ])
    }

    fn citydata_url(&self, area_name: &str) -> Url {
        self.build_url(&["json", "citydata", "1", "5", area_name])
    }

    /// Appends `{service_key}/{segments...}` to the base URL. Segments
    /// are percent-encoded, which the portal requires for Korean area
    /// names.
    fn build_url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        {
            // Base URLs are always http(s), so path_segments_mut cannot fail.
            let mut path = url.path_segments_mut().expect("base URL is not a base");
            path.pop_if_empty();
            path.push(&self.service_key);
            path.extend(segments);
        }
        url
    }

    /// Sends a GET request, asserts a 2xx status, and deserializes the
    /// body. `context` names the call in errors without leaking the
    /// service key embedded in the URL.
    async fn request_json<T: DeserializeOwned>(
        &self,
        url: &Url,
        context: &str,
    ) -> Result<T, ProviderError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::UnexpectedStatus {
                status: status.as_u16(),
                context: context.to_owned(),
            });
        }
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ProviderError::Deserialize {
            context: context.to_owned(),
            source: e,
        })
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
