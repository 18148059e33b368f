//! The commercial-area summary command.
//!
//! For every configured area: fetch its live commercial block, geocode
//! the area's landmark keyword, and join it against the parking
//! documents already sitting in the index to answer "how easy is it to
//! park near this area right now". Writes one summary document per area
//! and one detail document per business category.

use citypulse_core::{AppConfig, GeoPoint};
use citypulse_enrich::{join, EnrichedArea, EnrichedCategory};
use citypulse_index::{
    area_document, category_document, ElasticClient, COMMERCIAL_CATEGORIES_INDEX,
    COMMERCIAL_INDEX, PARKING_INDEX,
};
use citypulse_provider::types::{coerce_f64, coerce_i64};
use citypulse_provider::{CityApiClient, CommercialStatus, KakaoGeocoder};
use serde_json::Value;

/// How many parking documents to pull back for the spatial join. The
/// dataset sits well under this, so the snapshot is always complete.
const PARKING_SNAPSHOT_SIZE: usize = 10_000;

/// Builds the production collaborators and runs the summary.
///
/// # Errors
///
/// Returns an error when a client cannot be constructed, the areas file
/// does not load, or the index cannot be reached. Per-area provider
/// failures are logged and skipped.
pub(crate) async fn run(config: &AppConfig, dry_run: bool) -> anyhow::Result<()> {
    let areas = citypulse_core::load_areas(&config.areas_path)?;
    let api = CityApiClient::new(
        &config.service_key,
        config.request_timeout_secs,
        config.max_retries,
        config.retry_backoff_base_ms,
        config.max_concurrent_requests,
    )?;
    let geocoder = KakaoGeocoder::new(&config.kakao_key, config.request_timeout_secs)?;
    let elastic = ElasticClient::new(&config.elastic_url, config.request_timeout_secs)?;

    run_with(config, &areas, &api, &geocoder, &elastic, dry_run).await
}

/// Runs the summary against injected collaborators so tests can point
/// every external call at a local mock server.
pub(crate) async fn run_with(
    config: &AppConfig,
    areas: &citypulse_core::AreasFile,
    api: &CityApiClient,
    geocoder: &KakaoGeocoder,
    elastic: &ElasticClient,
    dry_run: bool,
) -> anyhow::Result<()> {
    let now = citypulse_core::seoul_now();

    let snapshot = parking_snapshot(elastic).await?;
    tracing::info!(parking = snapshot.len(), "loaded parking snapshot for the join");

    // One sequential pass over the areas. The citydata endpoint is slow
    // and rate-limited, so fan-out buys little here; an area that fails
    // or has no commercial block is skipped, not fatal.
    let mut collected: Vec<(String, String, Option<GeoPoint>, CommercialStatus)> = Vec::new();
    for name in areas.names() {
        let Some(keyword) = areas.keyword_for(name) else {
            continue;
        };

        let status = match api.fetch_commercial_status(name).await {
            Ok(Some(status)) => status,
            Ok(None) => {
                tracing::warn!(area = name, "no commercial block in citydata, skipping");
                continue;
            }
            Err(e) => {
                tracing::warn!(area = name, error = %e, "citydata fetch failed, skipping");
                continue;
            }
        };

        let location = geocoder.resolve_keyword(keyword).await;
        collected.push((name.to_owned(), keyword.to_owned(), location, status));
    }

    let centers: Vec<Option<GeoPoint>> = collected.iter().map(|(_, _, loc, _)| *loc).collect();
    let nearby = join(&centers, &snapshot, config.radius_meters);

    let mut area_rows: Vec<EnrichedArea> = Vec::with_capacity(collected.len());
    let mut category_rows: Vec<EnrichedCategory> = Vec::new();
    for ((name, keyword, location, status), stats) in collected.into_iter().zip(nearby) {
        for category in &status.categories {
            category_rows.push(EnrichedCategory {
                area_name: name.clone(),
                search_keyword: keyword.clone(),
                location,
                category: category.category.clone(),
                level: category.level.clone(),
                payment_count: coerce_f64(category.payment_count.as_ref()),
                min_amount: coerce_f64(category.min_amount.as_ref()),
                max_amount: coerce_f64(category.max_amount.as_ref()),
                store_count: coerce_i64(category.store_count.as_ref()),
                reported_at: category.reported_at.clone(),
                collected_at: now,
            });
        }

        area_rows.push(EnrichedArea {
            area_name: name,
            search_keyword: keyword,
            location,
            activity_level: status.activity_level.clone(),
            payment_count: coerce_f64(status.payment_count.as_ref()),
            min_amount: coerce_f64(status.min_amount.as_ref()),
            max_amount: coerce_f64(status.max_amount.as_ref()),
            collected_at: now,
            nearby_parking_count: stats.count,
            nearby_average_availability: stats.average,
        });
    }

    let area_docs: Vec<_> = area_rows.iter().filter_map(area_document).collect();
    let category_docs: Vec<_> = category_rows.iter().filter_map(category_document).collect();

    if dry_run {
        println!(
            "dry-run: would upsert {} area and {} category documents",
            area_docs.len(),
            category_docs.len()
        );
        return Ok(());
    }

    elastic
        .ensure_index(COMMERCIAL_INDEX, &ElasticClient::geo_mappings())
        .await?;
    elastic
        .ensure_index(COMMERCIAL_CATEGORIES_INDEX, &ElasticClient::geo_mappings())
        .await?;

    let area_report = elastic.bulk_upsert(COMMERCIAL_INDEX, &area_docs).await?;
    let category_report = elastic
        .bulk_upsert(COMMERCIAL_CATEGORIES_INDEX, &category_docs)
        .await?;

    tracing::info!(
        areas = area_report.upserted,
        categories = category_report.upserted,
        area_failures = area_report.failed,
        category_failures = category_report.failed,
        "commercial run complete"
    );
    println!(
        "commercial: {} areas upserted, {} categories upserted",
        area_report.upserted, category_report.upserted
    );

    Ok(())
}

/// Pulls every parking document's coordinate and availability rate out
/// of the index. Documents without a usable coordinate are skipped; the
/// indexer never writes them, but the snapshot does not trust that.
async fn parking_snapshot(
    elastic: &ElasticClient,
) -> anyhow::Result<Vec<(GeoPoint, Option<f64>)>> {
    let sources = elastic
        .search_source(PARKING_INDEX, PARKING_SNAPSHOT_SIZE)
        .await?;

    Ok(sources
        .iter()
        .filter_map(|source| {
            let point = GeoPoint::new(
                source.get("latitude").and_then(Value::as_f64)?,
                source.get("longitude").and_then(Value::as_f64)?,
            )?;
            let rate = source.get("available_rate").and_then(Value::as_f64);
            Some((point, rate))
        })
        .collect())
}

#[cfg(test)]
#[path = "commercial_test.rs"]
mod tests;
