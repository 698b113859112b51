use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::board::BoardError;
use super::domain::Category;
use super::service::{RefreshError, RefreshOutcome, TriageService};
use super::store::KeyValueStore;
use crate::workflows::search::{FetchError, PostingSource};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub category: String,
}

/// Router builder exposing the board to the presentation layer.
pub fn triage_router<S, P>(service: Arc<TriageService<S, P>>) -> Router
where
    S: KeyValueStore + 'static,
    P: PostingSource + 'static,
{
    Router::new()
        .route("/api/v1/postings", get(list_handler::<S, P>))
        .route("/api/v1/postings/:posting_id/move", post(move_handler::<S, P>))
        .route("/api/v1/category", post(select_handler::<S, P>))
        .route("/api/v1/refresh", post(refresh_handler::<S, P>))
        .route("/api/v1/maintenance", get(maintenance_handler::<S, P>))
        .route("/api/v1/maintenance/purge", post(purge_handler::<S, P>))
        .with_state(service)
}

pub(crate) async fn list_handler<S, P>(
    State(service): State<Arc<TriageService<S, P>>>,
    Query(query): Query<ListQuery>,
) -> Response
where
    S: KeyValueStore + 'static,
    P: PostingSource + 'static,
{
    let category = query.category.as_deref().map(Category::parse_or_new);
    (StatusCode::OK, axum::Json(service.view(category))).into_response()
}

pub(crate) async fn select_handler<S, P>(
    State(service): State<Arc<TriageService<S, P>>>,
    axum::Json(request): axum::Json<CategoryRequest>,
) -> Response
where
    S: KeyValueStore + 'static,
    P: PostingSource + 'static,
{
    let summary = service.select_category(Category::parse_or_new(&request.category));
    (StatusCode::OK, axum::Json(summary)).into_response()
}

pub(crate) async fn move_handler<S, P>(
    State(service): State<Arc<TriageService<S, P>>>,
    Path(posting_id): Path<String>,
    axum::Json(request): axum::Json<CategoryRequest>,
) -> Response
where
    S: KeyValueStore + 'static,
    P: PostingSource + 'static,
{
    let target = Category::parse_or_new(&request.category);
    match service.move_identifier(target, &posting_id) {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(error) => internal_error(error.to_string()),
    }
}

pub(crate) async fn refresh_handler<S, P>(
    State(service): State<Arc<TriageService<S, P>>>,
) -> Response
where
    S: KeyValueStore + 'static,
    P: PostingSource + 'static,
{
    match service.refresh().await {
        Ok(outcome @ RefreshOutcome::Applied { .. }) => {
            (StatusCode::OK, axum::Json(outcome)).into_response()
        }
        Ok(outcome @ RefreshOutcome::Skipped) => {
            (StatusCode::CONFLICT, axum::Json(outcome)).into_response()
        }
        Err(RefreshError::Fetch(FetchError::MissingCredentials)) => {
            let payload = json!({
                "error": FetchError::MissingCredentials.to_string(),
            });
            (StatusCode::SERVICE_UNAVAILABLE, axum::Json(payload)).into_response()
        }
        Err(RefreshError::Fetch(error)) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::BAD_GATEWAY, axum::Json(payload)).into_response()
        }
        Err(other) => internal_error(other.to_string()),
    }
}

pub(crate) async fn maintenance_handler<S, P>(
    State(service): State<Arc<TriageService<S, P>>>,
) -> Response
where
    S: KeyValueStore + 'static,
    P: PostingSource + 'static,
{
    (StatusCode::OK, axum::Json(service.purge_advice())).into_response()
}

pub(crate) async fn purge_handler<S, P>(
    State(service): State<Arc<TriageService<S, P>>>,
) -> Response
where
    S: KeyValueStore + 'static,
    P: PostingSource + 'static,
{
    match service.purge_unused() {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(error @ BoardError::NoLiveSnapshot) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        Err(error) => internal_error(error.to_string()),
    }
}

fn internal_error(message: String) -> Response {
    let payload = json!({
        "error": message,
    });
    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
}
