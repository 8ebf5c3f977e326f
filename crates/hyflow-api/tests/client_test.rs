// Integration tests for the request executor using wiremock.

#![allow(clippy::unwrap_used)]

use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hyflow_api::{DecisionMode, HyflowClient, RetryPolicy};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, HyflowClient) {
    let server = MockServer::start().await;
    let client = HyflowClient::new(server.uri().parse().unwrap()).unwrap();
    (server, client)
}

/// Client with a compressed backoff schedule so exhaustion tests don't
/// slow the suite down.
async fn setup_fast() -> (MockServer, HyflowClient) {
    let server = MockServer::start().await;
    let retry = RetryPolicy {
        max_attempts: 3,
        backoff: vec![Duration::from_millis(5), Duration::from_millis(10)],
    };
    let client = HyflowClient::with_retry(server.uri().parse().unwrap(), retry).unwrap();
    (server, client)
}

// ── Retry behavior ──────────────────────────────────────────────────

#[tokio::test]
async fn recovers_after_two_server_errors_with_backoff() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/production/all"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/production/all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let started = Instant::now();
    let res = client.production_all().await;
    let elapsed = started.elapsed();

    assert!(res.success);
    assert_eq!(res.data, Some(json!({"ok": true})));
    assert!(res.message.is_empty());
    // 250 ms before attempt 2 plus 500 ms before attempt 3.
    assert!(
        elapsed >= Duration::from_millis(750),
        "expected >= 750ms of backoff, got {elapsed:?}"
    );
}

#[tokio::test]
async fn gives_up_after_three_attempts_on_persistent_server_error() {
    let (server, client) = setup_fast().await;

    Mock::given(method("GET"))
        .and(path("/storage/all"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"detail": "database offline"})),
        )
        .expect(3)
        .mount(&server)
        .await;

    let res = client.storage_all().await;

    assert!(!res.success);
    assert!(res.data.is_none());
    assert_eq!(res.message, "database offline");
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/prediction/demand"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "no model"})))
        .expect(1)
        .mount(&server)
        .await;

    let res = client.prediction_demand().await;

    assert!(!res.success);
    assert!(res.data.is_none());
    assert_eq!(res.message, "no model");
}

#[tokio::test]
async fn connection_refused_retries_then_fails() {
    // Bind-then-drop leaves a port that refuses connections.
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let retry = RetryPolicy {
        max_attempts: 3,
        backoff: vec![Duration::from_millis(1)],
    };
    let client = HyflowClient::with_retry(uri.parse().unwrap(), retry).unwrap();

    let res = client.dashboard_summary().await;

    assert!(!res.success);
    assert!(res.data.is_none());
    assert!(!res.message.is_empty());
}

// ── Envelope normalization ──────────────────────────────────────────

#[tokio::test]
async fn non_json_success_body_is_wrapped_as_text() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/train"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("retraining started", "text/plain"),
        )
        .mount(&server)
        .await;

    let res = client.train().await;

    assert!(res.success);
    assert_eq!(res.data, Some(json!("retraining started")));
}

#[tokio::test]
async fn error_body_without_detail_falls_back_to_raw_text() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/prediction/renewable"))
        .respond_with(ResponseTemplate::new(422).set_body_raw("bad window", "text/plain"))
        .mount(&server)
        .await;

    let res = client.prediction_renewable().await;

    assert!(!res.success);
    assert_eq!(res.message, "bad window");
}

#[tokio::test]
async fn empty_error_body_yields_status_message() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/prediction/storage-alerts"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    let res = client.prediction_storage_alerts().await;

    assert!(!res.success);
    assert_eq!(res.message, "HTTP 400");
}

// ── Endpoint surface ────────────────────────────────────────────────

#[tokio::test]
async fn fleet_passes_decision_mode_query() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/transport/fleet"))
        .and(query_param("decision_mode", "rule"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let res = client.transport_fleet(DecisionMode::Rule).await;
    assert!(res.success);
}

#[tokio::test]
async fn optimal_route_posts_body_under_transport_prefix() {
    let (server, client) = setup().await;

    let body = json!({"vehicle_id": "VH002", "destination": [28.6139, 77.2090]});

    Mock::given(method("POST"))
        .and(path("/transport/optimal-route"))
        .and(body_json(&body))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "route": {"distance_km": 1148.0, "duration_min": 1020.0}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let res = client.transport_optimal_route(&body).await;
    assert!(res.success);
    assert_eq!(res.data.unwrap()["route"]["duration_min"], json!(1020.0));
}

#[tokio::test]
async fn fleet_optimize_posts_destination_and_load() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/fleet/optimize"))
        .and(body_json(json!({
            "destination": [36.1699, -115.1398],
            "hydrogen_load": 12000.0
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"vehicle_id": "VH007"})))
        .expect(1)
        .mount(&server)
        .await;

    let res = client.fleet_optimize([36.1699, -115.1398], 12000.0).await;
    assert!(res.success);
    assert_eq!(res.data, Some(json!({"vehicle_id": "VH007"})));
}

#[tokio::test]
async fn route_lookup_sends_coordinates_as_comma_pairs() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/route"))
        .and(query_param("source", "19.076,72.8777"))
        .and(query_param("destination", "18.5204,73.8567"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "route": {"distance_km": 148.2, "duration_min": 176.0, "approximate": true}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let res = client
        .transport_route([19.076, 72.8777], [18.5204, 73.8567])
        .await;
    assert!(res.success);
    assert_eq!(res.data.unwrap()["route"]["distance_km"], json!(148.2));
}

#[tokio::test]
async fn mutation_bodies_pass_through_unchanged() {
    let (server, client) = setup().await;

    let body = json!({
        "vehicle_id": "VH001",
        "destination": [36.1699, -115.1398],
        "hydrogen_load": 12000.0
    });

    Mock::given(method("POST"))
        .and(path("/fleet/assign"))
        .and(body_json(&body))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let res = client.fleet_assign(&body).await;
    assert!(res.success);
    assert_eq!(res.data, Some(json!({"ok": true})));
}

#[tokio::test]
async fn demand_predict_builds_request_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/demand/predict"))
        .and(body_json(json!({
            "region": "west",
            "weather_risk": 0.3,
            "traffic_score": 0.5
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "predicted_demand_kg": 812.0,
            "eff_score": 81.2
        })))
        .mount(&server)
        .await;

    let res = client.demand_predict("west", 0.3, 0.5).await;

    assert!(res.success);
    assert_eq!(res.data.unwrap()["predicted_demand_kg"], json!(812.0));
}

#[tokio::test]
async fn update_endpoints_address_resources_by_id() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/storage/update/tank-3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let res = client
        .storage_update("tank-3", &json!({"level_kg": 1000.0}))
        .await;
    assert!(res.success);
}
