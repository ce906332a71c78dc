use std::sync::Arc;

use axum::Router;
use storefront_core::config::{AppConfig, ConfigError};
use storefront_db::{connect_with_settings, migrations, DbPool, SqlProductRepository};
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::catalog::ProductCatalog;
use crate::{health, products};

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub catalog: ProductCatalog,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
}

impl Application {
    pub fn router(&self) -> Router {
        products::router(self.catalog.clone())
            .merge(health::router(self.db_pool.clone()))
            .layer(TraceLayer::new_for_http())
    }
}

/// Connects and migrates the catalog database, then wires the product service.
pub async fn bootstrap(config: AppConfig) -> Result<Application, BootstrapError> {
    config.validate()?;
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let catalog = ProductCatalog::new(Arc::new(SqlProductRepository::new(db_pool.clone())));

    Ok(Application { config, db_pool, catalog })
}
