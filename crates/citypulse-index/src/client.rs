//! HTTP client for the Elasticsearch collaborator.
//!
//! The pipeline only needs three capabilities: create an index with a
//! geo-point mapping on first use, bulk-upsert documents keyed by their
//! deterministic ids, and read a snapshot back out. Without the
//! geo-point mapping the coordinates land as plain objects and proximity
//! queries silently stop working, so index creation always carries it.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde_json::{json, Value};

use crate::error::IndexError;

/// Outcome of a bulk upsert: how many documents the index accepted
/// versus rejected. Candidates that never became documents (no resolved
/// location) are tracked by the caller, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkReport {
    pub upserted: usize,
    pub failed: usize,
}

/// Minimal Elasticsearch client over its JSON REST API.
pub struct ElasticClient {
    client: Client,
    base_url: Url,
}

impl ElasticClient {
    /// Creates a client for the node at `base_url`
    /// (e.g. `http://localhost:9200`).
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`IndexError::InvalidBaseUrl`] for an
    /// unparseable base URL.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, IndexError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| IndexError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self { client, base_url })
    }

    /// The mapping every pipeline index is created with: `location` as a
    /// geo-point and `timestamp` as a date.
    #[must_use]
    pub fn geo_mappings() -> Value {
        json!({
            "properties": {
                "location": {"type": "geo_point"},
                "timestamp": {"type": "date"},
            }
        })
    }

    /// Creates `index` with `mappings` unless it already exists.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError`] when the existence probe or the creation
    /// request fails.
    pub async fn ensure_index(&self, index: &str, mappings: &Value) -> Result<(), IndexError> {
        let url = self.index_url(index, &[]);

        let head = self.client.head(url.clone()).send().await?;
        match head.status() {
            StatusCode::OK => return Ok(()),
            StatusCode::NOT_FOUND => {}
            status => {
                return Err(IndexError::UnexpectedStatus {
                    status: status.as_u16(),
                    context: format!("HEAD /{index}"),
                })
            }
        }

        let response = self
            .client
            .put(url)
            .json(&json!({"mappings": mappings}))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(IndexError::UnexpectedStatus {
                status: status.as_u16(),
                context: format!("PUT /{index}"),
            });
        }
        tracing::info!(index, "created index with geo_point mapping");
        Ok(())
    }

    /// Bulk-upserts `(id, source)` documents into `index`. Individual
    /// rejections are logged and counted, not fatal; re-sending a
    /// document under an existing id overwrites it.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError`] when the request itself fails, the
    /// response cannot be parsed, or it carries no per-item results.
    /// Per-document failures only surface in the returned
    /// [`BulkReport`].
    pub async fn bulk_upsert(
        &self,
        index: &str,
        documents: &[(String, Value)],
    ) -> Result<BulkReport, IndexError> {
        if documents.is_empty() {
            return Ok(BulkReport {
                upserted: 0,
                failed: 0,
            });
        }

        let mut body = String::new();
        for (id, source) in documents {
            body.push_str(&json!({"index": {"_index": index, "_id": id}}).to_string());
            body.push('\n');
            body.push_str(&source.to_string());
            body.push('\n');
        }

        let url = self.index_url("_bulk", &[]);
        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/x-ndjson")
            .body(body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(IndexError::UnexpectedStatus {
                status: status.as_u16(),
                context: format!("POST /_bulk ({index})"),
            });
        }

        let raw = response.text().await?;
        let parsed: Value =
            serde_json::from_str(&raw).map_err(|e| IndexError::Deserialize {
                context: format!("bulk response for {index}"),
                source: e,
            })?;

        let Some(items) = parsed["items"].as_array() else {
            // An errors flag without per-item detail leaves nothing to
            // count; treat the whole batch as rejected.
            return Err(IndexError::BulkRejected {
                index: index.to_owned(),
                reason: "bulk response carried no items array".to_owned(),
            });
        };
        let mut report = BulkReport {
            upserted: 0,
            failed: 0,
        };
        for item in items {
            let result = &item["index"];
            let item_status = result["status"].as_u64().unwrap_or(0);
            if (200..300).contains(&item_status) {
                report.upserted += 1;
            } else {
                report.failed += 1;
                tracing::warn!(
                    index,
                    status = item_status,
                    error = %result["error"],
                    "bulk item rejected"
                );
            }
        }
        Ok(report)
    }

    /// Returns the `_source` of up to `size` documents from `index` via
    /// a `match_all` search.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError`] on HTTP failure or an unexpected response
    /// shape.
    pub async fn search_source(&self, index: &str, size: usize) -> Result<Vec<Value>, IndexError> {
        let url = self.index_url(index, &["_search"]);
        let response = self
            .client
            .post(url)
            .json(&json!({"size": size, "query": {"match_all": {}}}))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(IndexError::UnexpectedStatus {
                status: status.as_u16(),
                context: format!("POST /{index}/_search"),
            });
        }

        let raw = response.text().await?;
        let parsed: Value =
            serde_json::from_str(&raw).map_err(|e| IndexError::Deserialize {
                context: format!("search response for {index}"),
                source: e,
            })?;

        let hits = parsed["hits"]["hits"]
            .as_array()
            .map_or(&[][..], Vec::as_slice);
        Ok(hits.iter().map(|h| h["_source"].clone()).collect())
    }

    fn index_url(&self, first: &str, rest: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        {
            // Base URLs are always http(s), so path_segments_mut cannot fail.
            let mut path = url.path_segments_mut().expect("base URL is not a base");
            path.pop_if_empty();
            path.push(first);
            path.extend(rest);
        }
        url
    }
}
