use pretty_assertions::assert_eq;
use program_dashboard_lib::models::{CoverageMetrics, EnvironmentMetrics};
use program_dashboard_lib::overview::OverviewClient;
use program_dashboard_lib::{DashboardService, Domain, SnapshotSource};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const OVERVIEW_PATH: &str = "/api/dashboard/overview";

#[tokio::test]
async fn overview_data_is_merged_over_zero_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(OVERVIEW_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "coverage": { "coveragePercentage": 72, "passRate": 64 },
                "releases": { "total": 4, "averageProgress": 55 }
            }
        })))
        .mount(&server)
        .await;

    let client = OverviewClient::new(format!("{}{OVERVIEW_PATH}", server.uri()), Duration::from_secs(2)).expect("client");
    let snapshot = client.snapshot().await;

    assert_eq!(snapshot.source, SnapshotSource::Overview);
    assert_eq!(snapshot.coverage.coverage_percentage, 72);
    assert_eq!(snapshot.coverage.pass_rate, 64);
    assert_eq!(snapshot.coverage.total_scenarios, 0);
    assert_eq!(snapshot.releases.total, 4);
    assert_eq!(snapshot.squads.total, 0);
    assert!(snapshot.unavailable_sources.is_empty());
}

#[tokio::test]
async fn overview_percentages_are_capped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(OVERVIEW_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "coverage": { "coveragePercentage": 250, "passRate": 999 },
                "environments": { "utilizationPercentage": 180, "totalUsage": -3.0 }
            }
        })))
        .mount(&server)
        .await;

    let client = OverviewClient::new(format!("{}{OVERVIEW_PATH}", server.uri()), Duration::from_secs(2)).expect("client");
    let snapshot = client.snapshot().await;

    assert!(snapshot.unavailable_sources.is_empty());
    assert_eq!(snapshot.coverage.coverage_percentage, 100);
    assert_eq!(snapshot.coverage.pass_rate, 100);
    assert_eq!(snapshot.environments.utilization_percentage, 100);
    assert_eq!(snapshot.environments.total_usage, 0.0);
}

#[tokio::test]
async fn server_error_yields_zero_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(OVERVIEW_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = OverviewClient::new(format!("{}{OVERVIEW_PATH}", server.uri()), Duration::from_secs(2)).expect("client");
    let snapshot = client.snapshot().await;

    assert_eq!(snapshot.unavailable_sources, vec![Domain::Overview]);
    assert_eq!(snapshot.coverage, CoverageMetrics::default());
}

#[tokio::test]
async fn slow_endpoint_times_out_to_zero_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(OVERVIEW_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": { "squads": { "total": 3 } } }))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let client =
        OverviewClient::new(format!("{}{OVERVIEW_PATH}", server.uri()), Duration::from_millis(50)).expect("client");
    let snapshot = client.snapshot().await;

    assert_eq!(snapshot.unavailable_sources, vec![Domain::Overview]);
    assert_eq!(snapshot.squads.total, 0);
}

#[tokio::test]
async fn undecodable_body_yields_zero_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(OVERVIEW_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let client = OverviewClient::new(format!("{}{OVERVIEW_PATH}", server.uri()), Duration::from_secs(2)).expect("client");
    assert_eq!(client.snapshot().await.unavailable_sources, vec![Domain::Overview]);
}

#[tokio::test]
async fn unreachable_endpoint_via_service_settings() {
    let dir = tempfile::tempdir().expect("tempdir");
    let service = DashboardService::new(dir.path()).expect("service");
    service
        .update_settings(json!({
            "snapshotSource": "overview",
            "overviewUrl": "http://127.0.0.1:9/api/dashboard/overview",
            "overviewTimeoutMs": 500
        }))
        .expect("settings");

    let snapshot = service.snapshot().await;
    assert_eq!(snapshot.source, SnapshotSource::Overview);
    assert_eq!(snapshot.unavailable_sources, vec![Domain::Overview]);
    assert_eq!(snapshot.environments, EnvironmentMetrics::default());
}
