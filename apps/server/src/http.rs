//! HTTP 接口
//!
//! `GET /api/search?q=`, `GET /api/examples` and `GET /healthz`. Failures are
//! logged in full and answered with a fixed message.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use search_core::{ContentSource, ExampleRecord, RankedResult, SearchEngine};
use serde::{Deserialize, Serialize};
use tracing::error;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SearchEngine>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchBody {
    pub results: Vec<RankedResult>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
}

type HandlerError = (StatusCode, Json<ErrorBody>);

pub fn router(engine: Arc<SearchEngine>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/search", get(search_handler))
        .route("/api/examples", get(examples_handler))
        .with_state(AppState { engine })
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchBody>, HandlerError> {
    let query = params.q.unwrap_or_default();
    let engine = Arc::clone(&state.engine);
    let outcome = tokio::task::spawn_blocking(move || engine.query_top(&query)).await;

    match outcome {
        Ok(Ok(results)) => Ok(Json(SearchBody { results })),
        Ok(Err(e)) => {
            error!("search failed: {}", e);
            Err(internal_error("Search unavailable"))
        }
        Err(e) => {
            error!("search task failed: {}", e);
            Err(internal_error("Search unavailable"))
        }
    }
}

pub async fn examples_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<ExampleRecord>>, HandlerError> {
    let engine = Arc::clone(&state.engine);
    let outcome = tokio::task::spawn_blocking(move || engine.source().get_all_examples()).await;

    match outcome {
        Ok(Ok(examples)) => Ok(Json(examples)),
        Ok(Err(e)) => {
            error!("loading examples failed: {}", e);
            Err(internal_error("Failed to load examples"))
        }
        Err(e) => {
            error!("examples task failed: {}", e);
            Err(internal_error("Failed to load examples"))
        }
    }
}

fn internal_error(message: &'static str) -> HandlerError {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorBody { error: message }))
}
