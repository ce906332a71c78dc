use std::collections::{BTreeMap, HashMap};

use tokio::sync::RwLock;

use storefront_core::domain::product::{
    Product, ProductId, ProductOrdering, ProductQuery, ProductView,
};

use super::{ProductRepository, RepositoryError};

#[derive(Default)]
struct Catalog {
    products: BTreeMap<ProductId, Product>,
    order_counts: HashMap<ProductId, i64>,
}

impl Catalog {
    fn view(&self, product: &Product) -> ProductView {
        let order_count = self.order_counts.get(&product.id).copied().unwrap_or(0);
        ProductView::from_product(product.clone(), order_count)
    }
}

/// Product store backed by process memory, mirroring the SQL query semantics.
#[derive(Default)]
pub struct InMemoryProductRepository {
    catalog: RwLock<Catalog>,
}

impl InMemoryProductRepository {
    pub async fn insert_product(&self, product: Product) {
        let mut catalog = self.catalog.write().await;
        catalog.products.insert(product.id, product);
    }

    pub async fn record_orders(&self, id: ProductId, count: u32) -> Result<(), RepositoryError> {
        let mut catalog = self.catalog.write().await;
        if !catalog.products.contains_key(&id) {
            return Err(RepositoryError::Constraint(format!(
                "order references unknown product {id}"
            )));
        }
        *catalog.order_counts.entry(id).or_insert(0) += i64::from(count);
        Ok(())
    }
}

#[async_trait::async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn find_many(&self, query: &ProductQuery) -> Result<Vec<ProductView>, RepositoryError> {
        let catalog = self.catalog.read().await;

        // BTreeMap iteration already yields ascending ids.
        let mut views: Vec<ProductView> = catalog
            .products
            .values()
            .filter(|product| query.filter.matches(product))
            .map(|product| catalog.view(product))
            .collect();

        if query.ordering == ProductOrdering::OrderCountDesc {
            views.sort_by(|a, b| b.order_count.cmp(&a.order_count).then(a.id.cmp(&b.id)));
        }

        if let Some(limit) = query.limit {
            views.truncate(limit as usize);
        }

        Ok(views)
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<ProductView>, RepositoryError> {
        let catalog = self.catalog.read().await;
        Ok(catalog.products.get(&id).map(|product| catalog.view(product)))
    }
}
