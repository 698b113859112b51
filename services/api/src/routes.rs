use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use job_triage::workflows::search::PostingSource;
use job_triage::workflows::triage::{triage_router, KeyValueStore, TriageService};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_triage_routes<S, P>(service: Arc<TriageService<S, P>>) -> axum::Router
where
    S: KeyValueStore + 'static,
    P: PostingSource + 'static,
{
    triage_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let (status, label) = if ready {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "initializing")
    };

    (status, Json(json!({ "status": label })))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use job_triage::workflows::search::{AdzunaClient, SearchQuery};
    use job_triage::workflows::triage::{
        IdentifierStore, JobBoard, MemoryKeyValueStore, PurgeAdvisor, RelevanceClassifier,
    };
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    fn app(ready: bool) -> axum::Router {
        let board = JobBoard::open(
            IdentifierStore::new(Arc::new(MemoryKeyValueStore::default()), "ids"),
            RelevanceClassifier::default(),
            PurgeAdvisor::default(),
        );
        let client = AdzunaClient::new("http://127.0.0.1:9/search", "", "").expect("client");
        let service = Arc::new(TriageService::new(
            board,
            Arc::new(client),
            SearchQuery::default(),
        ));
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        with_triage_routes(service).layer(Extension(state))
    }

    async fn status_of(app: axum::Router, method: &str, uri: &str) -> StatusCode {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .expect("request builds");
        app.oneshot(request).await.expect("router responds").status()
    }

    #[tokio::test]
    async fn health_and_metrics_are_served() {
        assert_eq!(status_of(app(true), "GET", "/health").await, StatusCode::OK);
        assert_eq!(status_of(app(true), "GET", "/metrics").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn readiness_reflects_startup_flag() {
        assert_eq!(status_of(app(true), "GET", "/ready").await, StatusCode::OK);
        assert_eq!(
            status_of(app(false), "GET", "/ready").await,
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[tokio::test]
    async fn triage_routes_are_mounted() {
        assert_eq!(
            status_of(app(true), "GET", "/api/v1/postings").await,
            StatusCode::OK
        );
        assert_eq!(
            status_of(app(true), "POST", "/api/v1/refresh").await,
            StatusCode::SERVICE_UNAVAILABLE,
            "refresh without credentials is unavailable"
        );
    }
}
