//! The parking harvest command.
//!
//! Fetch the full parking dataset, keep the records whose realtime
//! counters are trustworthy today, geocode their addresses, derive
//! availability and operating state, and upsert documents into the
//! parking index. Failures below the run level (a page, a geocode, a
//! single bulk item) are logged and skipped by the layers that own them;
//! only run-level failures propagate out of here.

use citypulse_core::{AppConfig, GeoPoint, HolidayCalendar};
use citypulse_enrich::{enrich_facility, is_valid, EnrichedFacility};
use citypulse_index::{parking_document, ElasticClient, PARKING_INDEX};
use citypulse_provider::{CityApiClient, KakaoGeocoder, RawParkingRecord};
use futures::stream::{self, StreamExt};

/// Builds the production collaborators and runs the harvest.
///
/// # Errors
///
/// Returns an error when a client cannot be constructed, the dataset
/// probe fails, or the index cannot be reached.
pub(crate) async fn run(config: &AppConfig, dry_run: bool) -> anyhow::Result<()> {
    let holidays = citypulse_core::load_holidays(&config.holidays_path)?;
    let api = CityApiClient::new(
        &config.service_key,
        config.request_timeout_secs,
        config.max_retries,
        config.retry_backoff_base_ms,
        config.max_concurrent_requests,
    )?;
    let geocoder = KakaoGeocoder::new(&config.kakao_key, config.request_timeout_secs)?;
    let elastic = ElasticClient::new(&config.elastic_url, config.request_timeout_secs)?;

    run_with(config, &holidays, &api, &geocoder, &elastic, dry_run).await
}

/// Runs the harvest against injected collaborators so tests can point
/// every external call at a local mock server.
pub(crate) async fn run_with(
    config: &AppConfig,
    holidays: &HolidayCalendar,
    api: &CityApiClient,
    geocoder: &KakaoGeocoder,
    elastic: &ElasticClient,
    dry_run: bool,
) -> anyhow::Result<()> {
    let now = citypulse_core::seoul_now();

    let rows = api.fetch_all_parking(config.batch_size).await?;
    tracing::info!(total = rows.len(), "fetched parking records");

    let valid: Vec<&RawParkingRecord> = rows
        .iter()
        .filter(|r| is_valid(r, now.date_naive()))
        .collect();
    tracing::info!(valid = valid.len(), "records passed the validity filter");

    // Addresses repeat across records, so the geocoder's memo table
    // keeps the real call count well below the record count. `buffered`
    // preserves input order, which keeps records zipped to the right
    // coordinates.
    let locations: Vec<Option<GeoPoint>> = stream::iter(valid.iter().map(|record| async move {
        match record.address.as_deref() {
            Some(address) => geocoder.resolve_address(address).await,
            None => None,
        }
    }))
    .buffered(config.max_concurrent_requests.max(1))
    .collect()
    .await;

    let facilities: Vec<EnrichedFacility> = valid
        .iter()
        .zip(locations)
        .map(|(record, location)| enrich_facility(record, location, now, holidays))
        .collect();

    let documents: Vec<_> = facilities.iter().filter_map(parking_document).collect();
    let unlocated = facilities.len().saturating_sub(documents.len());
    if unlocated > 0 {
        tracing::warn!(unlocated, "facilities dropped for lack of a resolved location");
    }

    if dry_run {
        println!(
            "dry-run: would upsert {} of {} valid parking records into {PARKING_INDEX}",
            documents.len(),
            facilities.len()
        );
        return Ok(());
    }

    elastic
        .ensure_index(PARKING_INDEX, &ElasticClient::geo_mappings())
        .await?;
    let report = elastic.bulk_upsert(PARKING_INDEX, &documents).await?;
    tracing::info!(
        fetched = rows.len(),
        valid = facilities.len(),
        upserted = report.upserted,
        failed = report.failed,
        "parking run complete"
    );
    println!(
        "parking: {} fetched, {} valid, {} upserted, {} rejected",
        rows.len(),
        facilities.len(),
        report.upserted,
        report.failed
    );

    Ok(())
}

#[cfg(test)]
#[path = "parking_test.rs"]
mod tests;
