//! Product query service.
//!
//! Translates listing, lookup and ranking requests into repository queries
//! and returns [`ProductView`] projections. Holds no state besides the
//! repository handle.

use std::sync::Arc;

use storefront_core::domain::product::{ProductFilter, ProductId, ProductQuery, ProductView};
use storefront_core::errors::{ApplicationError, DomainError};
use storefront_db::{ProductRepository, RepositoryError};
use tracing::debug;

#[derive(Clone)]
pub struct ProductCatalog {
    repository: Arc<dyn ProductRepository>,
}

fn persistence(error: RepositoryError) -> ApplicationError {
    ApplicationError::Persistence(error.to_string())
}

impl ProductCatalog {
    pub fn new(repository: Arc<dyn ProductRepository>) -> Self {
        Self { repository }
    }

    pub async fn list_products(
        &self,
        filter: ProductFilter,
    ) -> Result<Vec<ProductView>, ApplicationError> {
        let products =
            self.repository.find_many(&ProductQuery::listing(filter)).await.map_err(persistence)?;

        debug!(
            event_name = "catalog.products.listed",
            result_count = products.len(),
            "listed products"
        );
        Ok(products)
    }

    pub async fn get_product_by_id(&self, id: ProductId) -> Result<ProductView, ApplicationError> {
        let product = self.repository.find_by_id(id).await.map_err(persistence)?;

        match product {
            Some(product) => Ok(product),
            None => {
                debug!(
                    event_name = "catalog.product.not_found",
                    product_id = id.0,
                    "no such product"
                );
                Err(DomainError::NotFound { entity: "Product", id: id.to_string() }.into())
            }
        }
    }

    /// Top products in `area` by order count, at most ten, ties by ascending id.
    ///
    /// A missing or empty area is rejected before the repository is touched.
    pub async fn get_top_ordered_products(
        &self,
        area: Option<&str>,
    ) -> Result<Vec<ProductView>, ApplicationError> {
        let area = match area {
            Some(area) if !area.is_empty() => area,
            _ => return Err(DomainError::missing("area", "Area is required").into()),
        };

        let products = self
            .repository
            .find_many(&ProductQuery::top_ordered(area))
            .await
            .map_err(persistence)?;

        debug!(
            event_name = "catalog.products.ranked",
            area,
            result_count = products.len(),
            "ranked products by order count"
        );
        Ok(products)
    }
}
