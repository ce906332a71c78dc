//! `GET /health`: readiness of the process and the catalog database.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use storefront_db::DbPool;
use tracing::warn;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Readiness {
    Ready,
    Degraded,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CatalogStatus {
    pub status: Readiness,
    /// Products visible to the service; absent when the catalog cannot be read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub status: Readiness,
    pub catalog: CatalogStatus,
    pub checked_at: String,
}

pub fn router(db_pool: DbPool) -> Router {
    Router::new().route("/health", get(health)).with_state(db_pool)
}

pub async fn health(State(db_pool): State<DbPool>) -> (StatusCode, Json<HealthReport>) {
    let catalog = match count_products(&db_pool).await {
        Ok(count) => {
            CatalogStatus { status: Readiness::Ready, product_count: Some(count), error: None }
        }
        Err(error) => {
            warn!(
                event_name = "system.health.degraded",
                error = %error,
                "catalog database is not readable"
            );
            CatalogStatus {
                status: Readiness::Degraded,
                product_count: None,
                error: Some(error.to_string()),
            }
        }
    };

    let code = match catalog.status {
        Readiness::Ready => StatusCode::OK,
        Readiness::Degraded => StatusCode::SERVICE_UNAVAILABLE,
    };
    let report =
        HealthReport { status: catalog.status, catalog, checked_at: Utc::now().to_rfc3339() };
    (code, Json(report))
}

async fn count_products(pool: &DbPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM product").fetch_one(pool).await
}
