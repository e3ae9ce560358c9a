use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState};
use axum::{extract::State, routing::post, Json, Router};
use shelfsync_core::{catalog_sync::SyncSummary, Error as CoreError};

/// Runs a reconciliation immediately and waits for it to finish.
///
/// The run lives on its own task so a request timeout or a dropped
/// connection never cuts it off between batches.
async fn sync_catalog(State(state): State<Arc<AppState>>) -> ApiResult<Json<SyncSummary>> {
    let service = state.catalog_sync_service.clone();
    let summary = tokio::spawn(async move { service.run_sync().await })
        .await
        .map_err(|e| CoreError::Unexpected(format!("Catalog sync task failed: {}", e)))??;
    tracing::info!("Manual catalog sync finished: {}", summary.summary());
    Ok(Json(summary))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/catalog/sync", post(sync_catalog))
}
