use std::sync::Arc;

use crate::config::Config;
use shelfsync_content_source::{ContentSource, ContentfulSource};
use shelfsync_core::{
    catalog_sync::{CatalogSyncService, CatalogSyncServiceTrait},
    products::{ProductRepositoryTrait, ProductService, ProductServiceTrait},
};
use shelfsync_storage_sqlite::{db, products::ProductRepository};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub product_service: Arc<dyn ProductServiceTrait>,
    pub catalog_sync_service: Arc<dyn CatalogSyncServiceTrait>,
}

pub fn init_tracing() {
    let log_format = std::env::var("SHELFSYNC_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

/// Wires the catalog against the Contentful listing configured in the environment.
///
/// Missing `CONTENTFUL_*` settings do not stop startup; each run reports them.
pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    build_state_with_source(config, Arc::new(ContentfulSource::from_env())).await
}

pub async fn build_state_with_source(
    config: &Config,
    source: Arc<dyn ContentSource>,
) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer((*pool).clone());

    let product_repository: Arc<dyn ProductRepositoryTrait> =
        Arc::new(ProductRepository::new(pool.clone(), writer));
    let product_service = Arc::new(ProductService::new(product_repository.clone()));
    let catalog_sync_service = Arc::new(CatalogSyncService::new(
        source.clone(),
        product_repository,
    ));

    tracing::info!(
        "Catalog ready at {} (content source: {})",
        db_path,
        source.id()
    );

    Ok(Arc::new(AppState {
        product_service,
        catalog_sync_service,
    }))
}
