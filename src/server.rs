//! JSON HTTP API over the request handlers.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version) |
//! | `GET`  | `/api/technologies` | List records, newest first; `?category=a,b` filters |
//! | `POST` | `/api/technologies` | Add a record from `{"techInfo": "..."}` |
//! | `DELETE` | `/api/technologies/{id}` | Delete a record |
//! | `POST` | `/api/search` | Semantic search from `{"query": "..."}` |
//! | `GET`  | `/api/categories` | Distinct categories |
//!
//! # Response Contract
//!
//! Every `/api` response body has the shape `{ "data": ... }` on success or
//! `{ "error": "message" }` on failure. Status codes: `400` validation,
//! `404` not found, `502` AI collaborator failure, `500` storage failure.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::actions::{filter_by_categories, parse_id, Actions};
use crate::config::Config;
use crate::error::{ActionError, ActionResult};
use crate::models::{SearchResponse, Technology};

#[derive(Clone)]
struct AppState {
    actions: Arc<Actions>,
}

/// Starts the HTTP server with store and collaborators built from config.
///
/// Runs until Ctrl-C, then closes the store.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let actions = Arc::new(Actions::from_config(config).await?);
    run_server_with_actions(config, actions).await
}

/// Starts the HTTP server around already-constructed [`Actions`].
pub async fn run_server_with_actions(config: &Config, actions: Arc<Actions>) -> anyhow::Result<()> {
    let app = router(actions.clone());

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!(addr = %listener.local_addr()?, "knowledge base server listening");
    println!("Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    actions.close().await;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

/// Builds the router. Exposed for embedding in other servers.
pub fn router(actions: Arc<Actions>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route(
            "/api/technologies",
            get(handle_list).post(handle_add),
        )
        .route("/api/technologies/{id}", delete(handle_delete))
        .route("/api/search", post(handle_search))
        .route("/api/categories", get(handle_categories))
        .layer(cors)
        .with_state(AppState { actions })
}

// ============ Responses ============

fn status_for(err: &ActionError) -> StatusCode {
    match err {
        ActionError::Validation(_) => StatusCode::BAD_REQUEST,
        ActionError::NotFound(_) => StatusCode::NOT_FOUND,
        ActionError::Dependency { .. } => StatusCode::BAD_GATEWAY,
        ActionError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn respond<T: Serialize>(result: Result<T, ActionError>) -> Response {
    let status = match &result {
        Ok(_) => StatusCode::OK,
        Err(e) => status_for(e),
    };
    (status, Json(ActionResult::from(result))).into_response()
}

/// Unwraps a JSON body, turning extractor rejections (bad syntax, missing
/// fields, wrong content type) into validation errors so they share the
/// `{error}` shape.
fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ActionError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ActionError::validation(rejection.body_text()))
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ /api/technologies ============

#[derive(Deserialize)]
struct ListQuery {
    /// Comma-separated category names.
    category: Option<String>,
}

async fn handle_list(State(state): State<AppState>, Query(q): Query<ListQuery>) -> Response {
    let active: Vec<String> = q
        .category
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();

    let result = state.actions.list().await.map(|records| {
        filter_by_categories(&records, &active)
            .into_iter()
            .cloned()
            .collect::<Vec<_>>()
    });
    respond(result)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddRequest {
    tech_info: String,
}

async fn handle_add(
    State(state): State<AppState>,
    body: Result<Json<AddRequest>, JsonRejection>,
) -> Response {
    match json_body(body) {
        Ok(req) => respond(state.actions.add(&req.tech_info).await),
        Err(e) => respond::<Technology>(Err(e)),
    }
}

#[derive(Serialize)]
struct DeleteResponse {
    success: bool,
}

async fn handle_delete(State(state): State<AppState>, Path(raw_id): Path<String>) -> Response {
    let result = match parse_id(&raw_id) {
        Ok(id) => state
            .actions
            .delete_technology(id)
            .await
            .map(|()| DeleteResponse { success: true }),
        Err(e) => Err(e),
    };
    respond(result)
}

// ============ POST /api/search ============

#[derive(Deserialize)]
struct SearchBody {
    query: String,
}

async fn handle_search(
    State(state): State<AppState>,
    body: Result<Json<SearchBody>, JsonRejection>,
) -> Response {
    match json_body(body) {
        Ok(req) => respond(state.actions.search(&req.query).await),
        Err(e) => respond::<SearchResponse>(Err(e)),
    }
}

// ============ GET /api/categories ============

async fn handle_categories(State(state): State<AppState>) -> Response {
    respond(state.actions.categories().await)
}
