//! HTTP boundary: routing, CORS and request validation around the checker

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;
use crate::cycle_checker::CycleChecker;
use crate::error::PipecheckError;
use crate::pipeline::ParseResponse;
use crate::schema::parse_pipeline;
use crate::variables::extract_variables;

pub const STATUS_MESSAGE: &str = "Pipeline Backend Running";

/// State shared by all handlers; read-only after startup
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub checker: CycleChecker,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let checker = CycleChecker::new(config.traversal);
        Self {
            config: Arc::new(config),
            checker,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

/// GET `/` - Liveness check.
pub async fn status_handler() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: STATUS_MESSAGE,
    })
}

/// POST `/pipelines/parse` - Counts nodes and edges and reports DAG-ness.
///
/// # Request Body
/// ```json
/// {
///   "nodes": [{"id": "a", "type": "text", "data": {}}],
///   "edges": [{"id": "e1", "source": "a", "target": "b"}]
/// }
/// ```
///
/// # Response
/// - `200 OK` with `{"num_nodes", "num_edges", "is_dag"}` (+ `variables` if any)
/// - `400 BAD_REQUEST` if the body is not JSON
/// - `422 UNPROCESSABLE_ENTITY` with per-field `detail` if the body breaks the schema
pub async fn parse_pipeline_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ParseResponse>, PipecheckError> {
    let pipeline = parse_pipeline(&body).inspect_err(|err| {
        warn!(code = err.code(), "Rejected pipeline: {err}");
    })?;

    let (result, cycle) = state.checker.analyze(&pipeline.nodes, &pipeline.edges);
    if let Some(path) = cycle {
        debug!(cycle = %path.join(" → "), "Cycle detected");
    }

    info!(
        num_nodes = result.num_nodes,
        num_edges = result.num_edges,
        is_dag = result.is_dag,
        traversal = %state.checker.effective_traversal(result.num_nodes),
        "Parsed pipeline"
    );

    Ok(Json(ParseResponse {
        result,
        variables: extract_variables(&pipeline.nodes),
    }))
}

/// CORS for the editor frontend
///
/// Methods and headers are mirrored rather than wildcarded: browsers refuse
/// `*` when credentials are allowed.
pub fn cors_layer(config: &ServerConfig) -> Result<CorsLayer, PipecheckError> {
    let origins = config.origin_header_values()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}

/// Build the application router
pub fn router(config: ServerConfig) -> Result<Router, PipecheckError> {
    let cors = cors_layer(&config)?;
    let body_limit = config.max_body_bytes;
    let state = AppState::new(config);

    Ok(Router::new()
        .route("/", get(status_handler))
        .route("/pipelines/parse", post(parse_pipeline_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// Bind and serve until Ctrl-C
pub async fn serve(config: ServerConfig) -> Result<(), PipecheckError> {
    let addr = config.bind;
    let traversal = config.traversal;
    let app = router(config)?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| PipecheckError::Bind { addr, source })?;

    info!(%addr, %traversal, "pipecheck listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(PipecheckError::Server)?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

