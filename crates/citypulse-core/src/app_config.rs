use std::path::PathBuf;

/// Runtime configuration for a pipeline run, loaded from the environment.
///
/// API keys are redacted in the `Debug` impl so the full config can be
/// logged at startup.
#[derive(Clone)]
pub struct AppConfig {
    /// Seoul open-data portal service key.
    pub service_key: String,
    /// Kakao REST API key for geocoding.
    pub kakao_key: String,
    /// Base URL of the Elasticsearch node documents are upserted into.
    pub elastic_url: String,
    /// Records per page for the paged parking fetch.
    pub batch_size: usize,
    /// Spatial-join radius in meters.
    pub radius_meters: f64,
    pub log_level: String,
    pub areas_path: PathBuf,
    pub holidays_path: PathBuf,
    pub request_timeout_secs: u64,
    /// Bound on concurrent in-flight provider requests (pages, geocodes).
    pub max_concurrent_requests: usize,
    /// Additional attempts per external call after the first failure.
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("service_key", &"[redacted]")
            .field("kakao_key", &"[redacted]")
            .field("elastic_url", &self.elastic_url)
            .field("batch_size", &self.batch_size)
            .field("radius_meters", &self.radius_meters)
            .field("log_level", &self.log_level)
            .field("areas_path", &self.areas_path)
            .field("holidays_path", &self.holidays_path)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_concurrent_requests", &self.max_concurrent_requests)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .finish()
    }
}
