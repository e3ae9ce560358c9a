use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use shelfsync_core::products::Product;

async fn get_product(
    Path(external_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Product>> {
    let product = state.product_service.get_product(&external_id)?;
    Ok(Json(product))
}

/// Soft delete; later syncs leave the product alone.
async fn delete_product(
    Path(external_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<StatusCode> {
    state.product_service.delete_product(&external_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route(
        "/products/{external_id}",
        get(get_product).delete(delete_product),
    )
}
