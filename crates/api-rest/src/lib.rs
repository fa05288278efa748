//! # API REST
//!
//! REST API for the HMS classification tree.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON envelopes, status codes, CORS)
//!
//! Uses `api-shared` for the wire types and `hms-core` for every query.

#![warn(rust_2018_idioms)]

use api_shared::{CodeDetailRes, ErrorRes, HealthRes, HealthService, SearchRes};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use hms_core::{CodeStore, CoreConfig, SearchService};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::{IntoParams, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

const SEARCH_FAILED: &str = "Failed to search ICD-10 codes";
const LOOKUP_FAILED: &str = "Failed to load ICD-10 code";

type ApiError = (StatusCode, Json<ErrorRes>);

/// Application state shared across REST API handlers
#[derive(Clone)]
pub struct AppState {
    search_service: SearchService,
}

impl AppState {
    pub fn new(cfg: &CoreConfig, store: Arc<dyn CodeStore>) -> Self {
        Self {
            search_service: SearchService::with_config(store, cfg),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(health, search_codes, get_code),
    components(schemas(
        HealthRes,
        SearchRes,
        CodeDetailRes,
        ErrorRes,
        api_shared::CodeNodeDto,
        api_shared::CodeDetailDto,
    ))
)]
pub struct ApiDoc;

/// Query string accepted by the search endpoint.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Substring of a code or description; fewer than 2 characters returns no results
    q: Option<String>,
}

/// Builds the REST router with Swagger UI and permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/icd10/search", get(search_codes))
        .route("/api/icd10/codes/:code", get(get_code))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint used by monitoring and load balancers.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/api/icd10/search",
    params(SearchParams),
    responses(
        (status = 200, description = "Up to 20 matching leaf codes, ascending by code", body = SearchRes),
        (status = 500, description = "Search failed", body = ErrorRes)
    )
)]
/// Search leaf ICD-10 codes
///
/// Matches `q` case-insensitively against code and description and returns only codes with
/// no children. A missing or one-character `q` yields an empty list.
///
/// # Errors
/// Returns `500 Internal Server Error` if the store cannot be queried.
#[axum::debug_handler]
async fn search_codes(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchRes>, ApiError> {
    let query = params.q.unwrap_or_default();
    let service = state.search_service.clone();

    match tokio::task::spawn_blocking(move || service.search(&query)).await {
        Ok(Ok(nodes)) => Ok(Json(SearchRes::ok(nodes))),
        Ok(Err(e)) => {
            tracing::error!("Error searching ICD-10: {:?}", e);
            Err(internal_error(SEARCH_FAILED))
        }
        Err(e) => {
            tracing::error!("ICD-10 search task failed: {:?}", e);
            Err(internal_error(SEARCH_FAILED))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/icd10/codes/{code}",
    params(("code" = String, Path, description = "Exact ICD-10 code, e.g. A00-A09")),
    responses(
        (status = 200, description = "Code with its direct children", body = CodeDetailRes),
        (status = 404, description = "Unknown code", body = ErrorRes),
        (status = 500, description = "Lookup failed", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn get_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<CodeDetailRes>, ApiError> {
    let service = state.search_service.clone();

    match tokio::task::spawn_blocking(move || service.lookup(&code)).await {
        Ok(Ok(Some(detail))) => Ok(Json(CodeDetailRes::ok(detail))),
        Ok(Ok(None)) => Err((StatusCode::NOT_FOUND, Json(ErrorRes::not_found()))),
        Ok(Err(e)) => {
            tracing::error!("Error loading ICD-10 code: {:?}", e);
            Err(internal_error(LOOKUP_FAILED))
        }
        Err(e) => {
            tracing::error!("ICD-10 lookup task failed: {:?}", e);
            Err(internal_error(LOOKUP_FAILED))
        }
    }
}

fn internal_error(message: &str) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorRes::new(message)),
    )
}
