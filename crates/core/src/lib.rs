pub mod config;
pub mod domain;
pub mod errors;

pub use domain::product::{
    Product, ProductFilter, ProductId, ProductOrdering, ProductQuery, ProductView,
    TOP_ORDERED_LIMIT,
};
pub use errors::{ApplicationError, DomainError, InterfaceError};
