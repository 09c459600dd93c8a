/*!
 * API HTTP SMARTMON - Surface de scrape de l'exporter
 *
 * ROUTES :
 * - GET /metrics        : exposition texte Prometheus (lecture du cache, jamais de smartctl)
 * - GET /health         : liveness, toujours "ok"
 * - GET /system/health  : état du poller en JSON (passes, dernière erreur)
 */

use crate::health::{ExporterHealth, HealthTracker};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{extract::State, routing::get, Json, Router};
use prometheus::{Encoder, Registry, TextEncoder};
use tracing::error;

#[derive(Clone)]
pub struct AppState {
    pub registry: Registry,
    pub health: HealthTracker,
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/system/health", get(get_system_health))
        .route("/metrics", get(get_metrics))
        .with_state(app_state)
}

// GET /metrics
async fn get_metrics(State(app): State<AppState>) -> Response {
    let mut buffer = Vec::new();
    if let Err(e) = TextEncoder::new().encode(&app.registry.gather(), &mut buffer) {
        error!(error = %e, "failed to encode metrics");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    ([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], buffer).into_response()
}

// GET /system/health
async fn get_system_health(State(app): State<AppState>) -> Json<ExporterHealth> {
    Json(app.health.get_health())
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartmon_core::{DeviceStates, Exporter, PassStats};
    use smartmon_devkit::RecordBuilder;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    fn app_state(states: &DeviceStates) -> AppState {
        let registry = Registry::new();
        registry
            .register(Box::new(Exporter::new(states.clone()).unwrap()))
            .unwrap();
        AppState {
            registry,
            health: HealthTracker::new(states.clone(), PassStats::new()),
        }
    }

    async fn body_of(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_metrics_before_first_pass() {
        let states = DeviceStates::new(["/dev/sda"]);
        let response = get_metrics(State(app_state(&states))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(!body_of(response).await.contains("smart_device_"));
    }

    #[tokio::test]
    async fn test_metrics_text_exposition() {
        let states = DeviceStates::new(["/dev/sda"]);
        states
            .get("/dev/sda")
            .unwrap()
            .ingest(RecordBuilder::new("/dev/sda").temperature(39).passed(true).build());

        let response = get_metrics(State(app_state(&states))).await;
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            prometheus::TEXT_FORMAT
        );
        let body = body_of(response).await;
        assert!(body.contains("# HELP smart_device_smart_status_passed"));
        assert!(body.contains("smart_device_smart_status_passed{device=\"/dev/sda\"} 1"));
        assert!(body.contains("smart_device_temperature{device=\"/dev/sda\"} 39"));
    }

    #[tokio::test]
    async fn test_router_serves_health() {
        let states = DeviceStates::new(["/dev/sda"]);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            axum::serve(listener, build_router(app_state(&states))).await.unwrap();
        });

        for (path, expected) in [("/health", "ok"), ("/system/health", "\"devices_tracked\":1")] {
            let mut stream = TcpStream::connect(addr).await.unwrap();
            let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
            stream.write_all(request.as_bytes()).await.unwrap();
            let mut response = String::new();
            stream.read_to_string(&mut response).await.unwrap();
            assert!(response.starts_with("HTTP/1.1 200"), "{response}");
            assert!(response.contains(expected), "{response}");
        }
        server.abort();
    }
}
