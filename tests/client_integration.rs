//! Client Integration Tests
//!
//! Serves the app on an ephemeral local port and drives it through
//! `ApiClient`, covering envelope decoding, API key handling and the
//! reference-data cache.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::Request;
use axum::middleware::{self, Next};

use wormdriller::api::{create_app, AppState};
use wormdriller::client::{ApiClient, ClientError, SurveyValidation};
use wormdriller::config::ServiceConfig;
use wormdriller::types::{CalculationMethod, SurveyStation, UnitSystem};

async fn spawn_server(cfg: ServiceConfig) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = create_app(AppState::in_memory(cfg));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn stations() -> Vec<SurveyStation> {
    vec![
        SurveyStation::new(0.0, 0.0, 0.0),
        SurveyStation::new(1000.0, 0.0, 0.0),
        SurveyStation::new(1500.0, 10.0, 45.0),
        SurveyStation::new(2000.0, 20.0, 45.0),
    ]
}

#[tokio::test]
async fn test_health_and_wellpath_round_trip() {
    let base = spawn_server(ServiceConfig::default()).await;
    let client = ApiClient::new(&base, None).unwrap();

    let health = client.check_health().await;
    assert!(health.healthy);

    let result = client
        .calculate_wellpath(&stations(), CalculationMethod::BalancedTangential, UnitSystem::Imperial, 45.0)
        .await
        .unwrap();
    assert_eq!(result.method, CalculationMethod::BalancedTangential);
    assert_eq!(result.wellpath.len(), 4);
    assert!((result.total_md - 2000.0).abs() < 1e-9);
    // Everything is drilled toward 45 degrees, so vertical section equals closure
    let last = result.wellpath.last().unwrap();
    assert!((last.vertical_section - last.closure).abs() < 1e-6);
}

#[tokio::test]
async fn test_dogleg_projection_and_methods() {
    let base = spawn_server(ServiceConfig::default()).await;
    let client = ApiClient::new(&base, None).unwrap();

    let dls = client
        .calculate_dogleg_severity((0.0, 0.0), (3.0, 0.0), 30.0, UnitSystem::Metric)
        .await
        .unwrap();
    assert!((dls.dogleg_severity - 3.0).abs() < 1e-9);
    assert_eq!(dls.unit, "°/30m");

    let projection = client
        .project_wellpath(SurveyStation::new(2000.0, 20.0, 45.0), 2.0, 1.0, 100.0, 3, UnitSystem::Imperial)
        .await
        .unwrap();
    assert_eq!(projection.projected_points.len(), 4);
    assert!((projection.total_projected_md - 300.0).abs() < 1e-9);

    let methods = client.get_calculation_methods().await.unwrap();
    assert_eq!(methods.default_method, CalculationMethod::MinimumCurvature);
    assert_eq!(methods.unit_systems.len(), 2);
}

#[tokio::test]
async fn test_validate_survey_outcomes() {
    let base = spawn_server(ServiceConfig::default()).await;
    let client = ApiClient::new(&base, None).unwrap();

    match client.validate_survey(&stations()).await.unwrap() {
        SurveyValidation::Valid(report) => assert_eq!(report.num_points, 4),
        other => panic!("expected a valid survey, got {other:?}"),
    }

    let short = [SurveyStation::new(0.0, 0.0, 0.0)];
    match client.validate_survey(&short).await.unwrap() {
        SurveyValidation::Invalid(reason) => assert!(reason.contains("two survey points")),
        other => panic!("expected an invalid survey, got {other:?}"),
    }
}

#[tokio::test]
async fn test_api_key_is_sent() {
    let mut cfg = ServiceConfig::default();
    cfg.auth.require_api_key = true;
    cfg.auth.api_keys = vec!["k-123".to_string()];
    let base = spawn_server(cfg).await;

    let anonymous = ApiClient::new(&base, None).unwrap();
    let err = anonymous
        .calculate_wellpath(&stations(), CalculationMethod::MinimumCurvature, UnitSystem::Imperial, 0.0)
        .await
        .unwrap_err();
    match err {
        ClientError::Server { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "API key required");
        }
        other => panic!("expected a server error, got {other:?}"),
    }

    let keyed = ApiClient::new(&base, Some("k-123")).unwrap();
    assert!(keyed
        .calculate_wellpath(&stations(), CalculationMethod::MinimumCurvature, UnitSystem::Imperial, 0.0)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_server_errors_carry_message() {
    let base = spawn_server(ServiceConfig::default()).await;
    let client = ApiClient::new(&base, None).unwrap();

    let err = client
        .calculate_dogleg_severity((0.0, 0.0), (3.0, 0.0), -5.0, UnitSystem::Imperial)
        .await
        .unwrap_err();
    match err {
        ClientError::Server { status, message } => {
            assert_eq!(status, 400);
            assert!(message.contains("must be positive"));
        }
        other => panic!("expected a server error, got {other:?}"),
    }
}

/// Serve the app while counting requests to the methods endpoint.
async fn spawn_counting_server() -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    let app = create_app(AppState::in_memory(ServiceConfig::default())).layer(middleware::from_fn(
        move |req: Request, next: Next| {
            let counter = Arc::clone(&counter);
            async move {
                if req.uri().path() == "/api/v1/calculations/methods" {
                    counter.fetch_add(1, Ordering::SeqCst);
                }
                next.run(req).await
            }
        },
    ));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), hits)
}

#[tokio::test]
async fn test_methods_are_cached() {
    let (base, hits) = spawn_counting_server().await;

    let client = ApiClient::new(&base, None).unwrap();
    let first = client.get_calculation_methods().await.unwrap();
    let second = client.clone().get_calculation_methods().await.unwrap();
    assert_eq!(first.default_method, second.default_method);
    assert_eq!(hits.load(Ordering::SeqCst), 1, "clones share the cache");

    client.clear_cache();
    client.get_calculation_methods().await.unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 2);

    let uncached = ApiClient::new(&base, None).unwrap().with_cache_max_age(Duration::ZERO);
    uncached.get_calculation_methods().await.unwrap();
    uncached.get_calculation_methods().await.unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 4);
}
