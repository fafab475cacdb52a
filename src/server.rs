// http server mode - validation as an api

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::output::Output;
use crate::{BatchCheckResult, Error, ValidationResult, Validator, ValidatorConfig};

struct AppState {
    config: ValidatorConfig,
}

#[derive(Deserialize)]
struct ValidateRequest {
    query: String,
    strict: Option<bool>,
}

#[derive(Serialize)]
struct ValidateResponse {
    #[serde(flatten)]
    result: ValidationResult,
    summary: String,
}

#[derive(Deserialize)]
struct BatchRequest {
    query: String,
    estimated_rows: u64,
    threshold: Option<u64>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

pub struct Server;

impl Server {
    pub fn router(config: ValidatorConfig) -> Router {
        let state = Arc::new(AppState { config });

        Router::new()
            .route("/health", get(health))
            .route("/validate", post(validate))
            .route("/batch", post(batch))
            .layer(CorsLayer::permissive())
            .with_state(state)
    }

    pub async fn run(config: ValidatorConfig, host: &str, port: u16) -> Result<(), Error> {
        let app = Self::router(config);

        let addr = format!("{host}:{port}");
        info!(%addr, strict = config.strict, "starting server");
        println!("server running at http://{addr}");

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| Error::Server(e.to_string()))?;

        axum::serve(listener, app)
            .await
            .map_err(|e| Error::Server(e.to_string()))?;

        Ok(())
    }
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn validate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ValidateRequest>,
) -> Json<ValidateResponse> {
    // per-request override, otherwise whatever the server started with
    let config = ValidatorConfig {
        strict: req.strict.unwrap_or(state.config.strict),
        ..state.config
    };
    let result = Validator::from_config(&config).validate(&req.query);
    let summary = Output::summary(&result);

    Json(ValidateResponse { result, summary })
}

async fn batch(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BatchRequest>,
) -> Json<BatchCheckResult> {
    let threshold = req.threshold.unwrap_or(state.config.batch_threshold);
    Json(BatchCheckResult::with_threshold(
        &req.query,
        req.estimated_rows,
        threshold,
    ))
}
