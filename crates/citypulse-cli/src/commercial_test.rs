//! End-to-end tests for the commercial command with every collaborator
//! pointed at a wiremock server.

use std::path::PathBuf;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use citypulse_core::{AppConfig, AreaConfig, AreasFile};
use citypulse_index::ElasticClient;
use citypulse_provider::{CityApiClient, KakaoGeocoder};

use super::run_with;

fn test_config() -> AppConfig {
    AppConfig {
        service_key: "test-key".to_owned(),
        kakao_key: "test-kakao-key".to_owned(),
        elastic_url: "http://unused.invalid".to_owned(),
        batch_size: 100,
        radius_meters: 300.0,
        log_level: "info".to_owned(),
        areas_path: PathBuf::from("unused"),
        holidays_path: PathBuf::from("unused"),
        request_timeout_secs: 5,
        max_concurrent_requests: 2,
        max_retries: 0,
        retry_backoff_base_ms: 0,
    }
}

fn one_area() -> AreasFile {
    AreasFile {
        areas: vec![AreaConfig {
            name: "강남 MICE 관광특구".to_owned(),
            keyword: "코엑스".to_owned(),
        }],
    }
}

fn citydata_body() -> serde_json::Value {
    json!({
        "CITYDATA": {
            "LIVE_CMRCL_STTS": {
                "AREA_CMRCL_LVL": "바쁨",
                "AREA_SH_PAYMENT_CNT": "1200",
                "AREA_SH_PAYMENT_AMT_MIN": "9000",
                "AREA_SH_PAYMENT_AMT_MAX": "45000",
                "CMRCL_RSB": [
                    {
                        "RSB_MID_CTGR": "한식",
                        "RSB_PAYMENT_LVL": "보통",
                        "RSB_SH_PAYMENT_CNT": "300",
                        "RSB_SH_PAYMENT_AMT_MIN": "8000",
                        "RSB_SH_PAYMENT_AMT_MAX": "30000",
                        "RSB_MCT_CNT": "42",
                        "RSB_MCT_TIME": "20250301",
                    },
                    {
                        "RSB_MID_CTGR": "카페",
                        "RSB_PAYMENT_LVL": "한산한",
                        "RSB_SH_PAYMENT_CNT": "120",
                        "RSB_SH_PAYMENT_AMT_MIN": "4000",
                        "RSB_SH_PAYMENT_AMT_MAX": "12000",
                        "RSB_MCT_CNT": "17",
                        "RSB_MCT_TIME": "20250301",
                    },
                ],
            }
        }
    })
}

/// One parking document near the area's landmark, one across town.
fn parking_search_body() -> serde_json::Value {
    json!({
        "hits": {
            "total": {"value": 2},
            "hits": [
                {"_source": {
                    "parking_name": "코엑스 앞 노상",
                    "latitude": 37.5663, "longitude": 126.9779,
                    "available_rate": 0.4,
                }},
                {"_source": {
                    "parking_name": "멀리 있는 노상",
                    "latitude": 37.70, "longitude": 127.10,
                    "available_rate": 0.9,
                }},
            ],
        }
    })
}

async fn mount_kakao(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v2/local/search/keyword.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [{"y": "37.5663", "x": "126.9779"}]
        })))
        .mount(server)
        .await;
}

async fn mount_elastic(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/seoul_parking/_search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(parking_search_body()))
        .mount(server)
        .await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/_bulk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "took": 1,
            "errors": false,
            "items": [{"index": {"status": 201}}, {"index": {"status": 201}}],
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn joins_area_against_nearby_parking() {
    let portal = MockServer::start().await;
    let kakao = MockServer::start().await;
    let elastic_server = MockServer::start().await;

    // The citydata path embeds a Korean area name whose percent-encoding
    // is client-defined, so this server answers every GET the same way.
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(citydata_body()))
        .mount(&portal)
        .await;
    mount_kakao(&kakao).await;
    mount_elastic(&elastic_server).await;

    let config = test_config();
    let api = CityApiClient::with_base_url("test-key", 5, 0, 0, 2, &portal.uri()).unwrap();
    let geocoder = KakaoGeocoder::with_base_url("test-kakao-key", 5, &kakao.uri()).unwrap();
    let elastic = ElasticClient::new(&elastic_server.uri(), 5).unwrap();

    run_with(&config, &one_area(), &api, &geocoder, &elastic, false)
        .await
        .unwrap();

    let bulk_bodies: Vec<String> = elastic_server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.url.path() == "/_bulk")
        .map(|r| String::from_utf8(r.body).unwrap())
        .collect();
    assert_eq!(bulk_bodies.len(), 2);

    // First bulk carries the area summary: only the facility within
    // 300 m of the landmark counts, and its rate is the average.
    let area_source: serde_json::Value =
        serde_json::from_str(bulk_bodies[0].lines().nth(1).unwrap()).unwrap();
    assert_eq!(area_source["area_name"], "강남 MICE 관광특구");
    assert_eq!(area_source["activity_level"], "바쁨");
    assert_eq!(area_source["nearby_parking_count"], 1);
    assert!((area_source["nearby_average_availability"].as_f64().unwrap() - 0.4).abs() < 1e-9);

    // Second bulk carries one document per business category.
    assert_eq!(bulk_bodies[1].lines().count(), 4);
    assert!(bulk_bodies[1].contains("한식"));
    assert!(bulk_bodies[1].contains("카페"));
}

#[tokio::test]
async fn area_without_commercial_block_is_skipped() {
    let portal = MockServer::start().await;
    let kakao = MockServer::start().await;
    let elastic_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"CITYDATA": {}})))
        .mount(&portal)
        .await;
    mount_kakao(&kakao).await;
    mount_elastic(&elastic_server).await;

    let config = test_config();
    let api = CityApiClient::with_base_url("test-key", 5, 0, 0, 2, &portal.uri()).unwrap();
    let geocoder = KakaoGeocoder::with_base_url("test-kakao-key", 5, &kakao.uri()).unwrap();
    let elastic = ElasticClient::new(&elastic_server.uri(), 5).unwrap();

    run_with(&config, &one_area(), &api, &geocoder, &elastic, false)
        .await
        .unwrap();

    // Nothing to upsert, so no bulk request goes out at all.
    let bulk_count = elastic_server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/_bulk")
        .count();
    assert_eq!(bulk_count, 0);
}

#[tokio::test]
async fn dry_run_reads_the_snapshot_but_writes_nothing() {
    let portal = MockServer::start().await;
    let kakao = MockServer::start().await;
    let elastic_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(citydata_body()))
        .mount(&portal)
        .await;
    mount_kakao(&kakao).await;
    Mock::given(method("POST"))
        .and(path("/seoul_parking/_search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(parking_search_body()))
        .mount(&elastic_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/_bulk"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&elastic_server)
        .await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&elastic_server)
        .await;

    let config = test_config();
    let api = CityApiClient::with_base_url("test-key", 5, 0, 0, 2, &portal.uri()).unwrap();
    let geocoder = KakaoGeocoder::with_base_url("test-kakao-key", 5, &kakao.uri()).unwrap();
    let elastic = ElasticClient::new(&elastic_server.uri(), 5).unwrap();

    run_with(&config, &one_area(), &api, &geocoder, &elastic, true)
        .await
        .unwrap();
}
