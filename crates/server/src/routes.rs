use anyhow::anyhow;
use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    routing::{get, post},
    Json, Router,
};
use recon_core::MatchCandidate;
use recon_import::{
    normalize_batch, BatchMode, InvoiceInput, NormalizedBatch, Rejection, TransactionInput,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub invoices: Vec<InvoiceInput>,
    pub transactions: Vec<TransactionInput>,
    /// Skip malformed records instead of rejecting the whole batch.
    #[serde(default)]
    pub partial: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScoreResponse {
    pub candidates: Vec<MatchCandidate>,
    pub rejected: Vec<Rejection>,
}

pub fn create_router(state: AppState) -> Router {
    let body_limit = state.limits.max_body_bytes;

    let api_routes = Router::new().route("/candidates/score", post(score_candidates));

    Router::new()
        .route("/health", get(health))
        .nest("/v1", api_routes)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn health() -> &'static str {
    "Reconciliation engine is running"
}

pub async fn score_candidates(
    State(state): State<AppState>,
    payload: Result<Json<ScoreRequest>, JsonRejection>,
) -> Result<Json<ScoreResponse>, AppError> {
    let Json(req) = payload?;
    let pairs = (req.invoices.len() as u64).saturating_mul(req.transactions.len() as u64);
    if pairs > state.limits.max_pairs {
        return Err(AppError::BatchTooLarge {
            pairs,
            limit: state.limits.max_pairs,
        });
    }

    let mode = if req.partial {
        BatchMode::Partial
    } else {
        BatchMode::FailFast
    };
    let NormalizedBatch {
        invoices,
        transactions,
        rejected,
    } = normalize_batch(&req.invoices, &req.transactions, mode)?;

    let engine = state.engine.clone();
    let candidates =
        tokio::task::spawn_blocking(move || engine.score_matches(&invoices, &transactions))
            .await
            .map_err(|e| anyhow!("scoring task failed: {e}"))?;

    tracing::info!(
        pairs,
        candidates = candidates.len(),
        rejected = rejected.len(),
        "scored candidates"
    );

    Ok(Json(ScoreResponse {
        candidates,
        rejected,
    }))
}
