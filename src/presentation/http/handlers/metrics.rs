//! Metrics Handler
//!
//! Prometheus scrape endpoint.

use axum::{extract::State, http::header, response::IntoResponse};

use crate::infrastructure::metrics;
use crate::shared::error::AppError;
use crate::startup::AppState;

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Encode every registered metric in the Prometheus text format
pub async fn metrics_handler(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let idle = state.db.num_idle() as u32;
    let size = state.db.size();
    metrics::update_db_pool_stats(idle, size.saturating_sub(idle), state.settings.database.max_connections);

    let body = metrics::gather_metrics()
        .map_err(|e| AppError::Internal(format!("Failed to encode metrics: {}", e)))?;

    Ok(([(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)], body))
}
