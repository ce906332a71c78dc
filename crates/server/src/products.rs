//! Read-only product routes.
//!
//! JSON API Endpoints:
//! - `GET /product`                          list products, optional `area` and `categories`
//! - `GET /product/top-ordered-products`     top ten products in `area` by order count
//! - `GET /product/{id}`                     single product by numeric id

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use storefront_core::domain::product::{ProductFilter, ProductId, ProductView};
use storefront_core::errors::{ApplicationError, DomainError, InterfaceError};
use tracing::{error, warn};
use uuid::Uuid;

use crate::catalog::ProductCatalog;

#[derive(Clone)]
pub struct ProductState {
    catalog: ProductCatalog,
}

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

/// Query of `GET /product`.
///
/// `categories` may be a comma list, a repeated key, or `categories[]`; all
/// occurrences are merged. The first `area` wins.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ListProductsQuery {
    pub area: Option<String>,
    pub categories: Option<Vec<String>>,
}

impl ListProductsQuery {
    fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "area" => {
                    query.area.get_or_insert(value);
                }
                "categories" | "categories[]" => {
                    query.categories.get_or_insert_with(Vec::new).extend(split_categories(&value));
                }
                _ => {}
            }
        }
        query
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct TopOrderedQuery {
    pub area: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
    pub correlation_id: String,
}

type ApiRejection = (StatusCode, Json<ErrorBody>);

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn router(catalog: ProductCatalog) -> Router {
    Router::new()
        .route("/product", get(list_products))
        .route("/product/top-ordered-products", get(top_ordered_products))
        .route("/product/{id}", get(get_product))
        .with_state(ProductState { catalog })
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn list_products(
    Query(pairs): Query<Vec<(String, String)>>,
    State(state): State<ProductState>,
) -> Result<Json<Vec<ProductView>>, ApiRejection> {
    let correlation_id = Uuid::new_v4().to_string();
    let query = ListProductsQuery::from_pairs(pairs);
    let filter = ProductFilter::new(query.categories, query.area);

    state
        .catalog
        .list_products(filter)
        .await
        .map(Json)
        .map_err(|error| reject(error, &correlation_id))
}

async fn get_product(
    Path(raw_id): Path<String>,
    State(state): State<ProductState>,
) -> Result<Json<ProductView>, ApiRejection> {
    let correlation_id = Uuid::new_v4().to_string();
    let id = parse_product_id(&raw_id).map_err(|error| reject(error.into(), &correlation_id))?;

    state
        .catalog
        .get_product_by_id(id)
        .await
        .map(Json)
        .map_err(|error| reject(error, &correlation_id))
}

async fn top_ordered_products(
    Query(query): Query<TopOrderedQuery>,
    State(state): State<ProductState>,
) -> Result<Json<Vec<ProductView>>, ApiRejection> {
    let correlation_id = Uuid::new_v4().to_string();

    // Checked here as well as in the catalog so the request never reaches it.
    let area = match query.area.as_deref() {
        Some(area) if !area.is_empty() => area,
        _ => {
            let error = DomainError::missing("area", "Area query parameter is required");
            return Err(reject(error.into(), &correlation_id));
        }
    };

    state
        .catalog
        .get_top_ordered_products(Some(area))
        .await
        .map(Json)
        .map_err(|error| reject(error, &correlation_id))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Splits `a,b,c` into category names. Empty segments are dropped; values are not trimmed.
fn split_categories(raw: &str) -> impl Iterator<Item = String> + '_ {
    raw.split(',').filter(|segment| !segment.is_empty()).map(ToString::to_string)
}

fn parse_product_id(raw: &str) -> Result<ProductId, DomainError> {
    raw.parse::<i64>()
        .map(ProductId)
        .map_err(|_| DomainError::missing("id", format!("Product id `{raw}` must be an integer")))
}

fn reject(error: ApplicationError, correlation_id: &str) -> ApiRejection {
    let interface = error.into_interface(correlation_id);
    let status = match &interface {
        InterfaceError::BadRequest { message, .. } => {
            warn!(
                event_name = "http.product.bad_request",
                correlation_id,
                message = %message,
                "rejecting product request"
            );
            StatusCode::BAD_REQUEST
        }
        InterfaceError::Internal { message, .. } => {
            error!(
                event_name = "http.product.internal_error",
                correlation_id,
                message = %message,
                "product request failed"
            );
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    (
        status,
        Json(ErrorBody {
            error: interface.user_message().to_string(),
            message: interface.message().to_string(),
            correlation_id: interface.correlation_id().to_string(),
        }),
    )
}
