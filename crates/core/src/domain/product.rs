use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of rows returned by the top-ordered ranking.
pub const TOP_ORDERED_LIMIT: u32 = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub i64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub area: String,
    pub created_at: DateTime<Utc>,
}

/// Read-only projection of a product with the number of orders referencing it.
///
/// Built fresh for every request; the count reflects the order rows visible
/// at query time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductView {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub area: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    pub order_count: i64,
}

impl ProductView {
    pub fn from_product(product: Product, order_count: i64) -> Self {
        Self {
            id: product.id,
            name: product.name,
            category: product.category,
            area: product.area,
            created_at: product.created_at,
            order_count,
        }
    }
}

/// Optional constraints for a product listing. `None` means unconstrained.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub categories: Option<BTreeSet<String>>,
    pub area: Option<String>,
}

impl ProductFilter {
    /// Builds a filter, folding empty strings and empty category sets into `None`.
    pub fn new<I, S>(categories: Option<I>, area: Option<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let categories = categories
            .map(|values| {
                values
                    .into_iter()
                    .map(Into::into)
                    .filter(|value: &String| !value.is_empty())
                    .collect::<BTreeSet<_>>()
            })
            .filter(|set| !set.is_empty());
        let area = area.filter(|value| !value.is_empty());

        Self { categories, area }
    }

    pub fn by_area(area: impl Into<String>) -> Self {
        Self::new(None::<Vec<String>>, Some(area.into()))
    }

    pub fn is_unconstrained(&self) -> bool {
        self.categories.is_none() && self.area.is_none()
    }

    pub fn matches(&self, product: &Product) -> bool {
        let area_ok = self.area.as_deref().map_or(true, |area| product.area == area);
        let category_ok =
            self.categories.as_ref().map_or(true, |set| set.contains(&product.category));
        area_ok && category_ok
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProductOrdering {
    /// Ascending id.
    #[default]
    Id,
    /// Descending order count, ties broken by ascending id.
    OrderCountDesc,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProductQuery {
    pub filter: ProductFilter,
    pub ordering: ProductOrdering,
    pub limit: Option<u32>,
}

impl ProductQuery {
    pub fn listing(filter: ProductFilter) -> Self {
        Self { filter, ordering: ProductOrdering::Id, limit: None }
    }

    pub fn top_ordered(area: impl Into<String>) -> Self {
        Self {
            filter: ProductFilter::by_area(area),
            ordering: ProductOrdering::OrderCountDesc,
            limit: Some(TOP_ORDERED_LIMIT),
        }
    }
}
