use async_trait::async_trait;
use thiserror::Error;

use storefront_core::domain::product::{ProductId, ProductQuery, ProductView};

pub mod memory;
pub mod product;

pub use memory::InMemoryProductRepository;
pub use product::SqlProductRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("constraint violation: {0}")]
    Constraint(String),
}

/// Read access to products together with their live order counts.
///
/// Implementations evaluate the filter, ordering and limit of a
/// [`ProductQuery`] themselves and return fully shaped views.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_many(&self, query: &ProductQuery) -> Result<Vec<ProductView>, RepositoryError>;

    async fn find_by_id(&self, id: ProductId) -> Result<Option<ProductView>, RepositoryError>;
}
