//! HTTP surface. Handlers are stateless pass-throughs to the orchestrator.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::error::QueryError;
use crate::orchestrator::Orchestrator;
use crate::schema;
use crate::types::{ErrorBody, HealthResponse, QueryRequest, QueryResult, SchemaResponse};

pub fn router(orchestrator: Arc<Orchestrator>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/schema", get(get_schema))
        .route("/query", post(process_query))
        .with_state(orchestrator)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(e: QueryError) -> Self {
        let status = match e {
            QueryError::SchemaUnavailable | QueryError::Generation(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            QueryError::Execution(_) => StatusCode::BAD_REQUEST,
        };
        ApiError::new(status, e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { detail: self.detail })).into_response()
    }
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({"message": "Text-to-SQL API is running"}))
}

async fn health(State(orchestrator): State<Arc<Orchestrator>>) -> Json<HealthResponse> {
    match orchestrator.resolver().resolve().await {
        Ok(backend) => Json(HealthResponse::healthy(backend.kind().as_str())),
        Err(e) => Json(HealthResponse::unhealthy(e)),
    }
}

async fn get_schema(State(orchestrator): State<Arc<Orchestrator>>) -> Json<SchemaResponse> {
    let schema = schema::fetch(orchestrator.resolver()).await;
    Json(SchemaResponse { schema })
}

async fn process_query(
    State(orchestrator): State<Arc<Orchestrator>>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResult>, ApiError> {
    if request.question.trim().is_empty() {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, "question must not be empty"));
    }

    info!("query [{}]: {}", request.language, request.question);
    match orchestrator.answer(&request.question, request.language).await {
        Ok(result) => Ok(Json(result)),
        Err(e) => {
            error!("query failed: {}", e);
            Err(e.into())
        }
    }
}
