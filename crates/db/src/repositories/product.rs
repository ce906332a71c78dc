use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Row, Sqlite};

use storefront_core::domain::product::{
    ProductId, ProductOrdering, ProductQuery, ProductView,
};

use super::{ProductRepository, RepositoryError};
use crate::DbPool;

const SELECT_PRODUCT_VIEW: &str = "SELECT p.id, p.name, p.category, p.area, p.created_at, \
     (SELECT COUNT(*) FROM product_order o WHERE o.product_id = p.id) AS order_count \
     FROM product p";

pub struct SqlProductRepository {
    pool: DbPool,
}

impl SqlProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn push_query<'args>(builder: &mut QueryBuilder<'args, Sqlite>, query: &ProductQuery) {
    builder.push(" WHERE 1=1");

    if let Some(area) = &query.filter.area {
        builder.push(" AND p.area = ");
        builder.push_bind(area.clone());
    }

    if let Some(categories) = &query.filter.categories {
        builder.push(" AND p.category IN (");
        let mut separated = builder.separated(", ");
        for category in categories {
            separated.push_bind(category.clone());
        }
        separated.push_unseparated(")");
    }

    match query.ordering {
        ProductOrdering::Id => builder.push(" ORDER BY p.id ASC"),
        ProductOrdering::OrderCountDesc => builder.push(" ORDER BY order_count DESC, p.id ASC"),
    };

    if let Some(limit) = query.limit {
        builder.push(" LIMIT ");
        builder.push_bind(i64::from(limit));
    }
}

fn row_to_view(row: &sqlx::sqlite::SqliteRow) -> Result<ProductView, RepositoryError> {
    let id: i64 = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let name: String = row.try_get("name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let category: String =
        row.try_get("category").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let area: String = row.try_get("area").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let created_at_str: String =
        row.try_get("created_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let order_count: i64 =
        row.try_get("order_count").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    let created_at = DateTime::parse_from_rfc3339(&created_at_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            RepositoryError::Decode(format!(
                "product {id} has invalid created_at `{created_at_str}`: {e}"
            ))
        })?;

    Ok(ProductView { id: ProductId(id), name, category, area, created_at, order_count })
}

#[async_trait::async_trait]
impl ProductRepository for SqlProductRepository {
    async fn find_many(&self, query: &ProductQuery) -> Result<Vec<ProductView>, RepositoryError> {
        let mut builder = QueryBuilder::<Sqlite>::new(SELECT_PRODUCT_VIEW);
        push_query(&mut builder, query);

        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.iter().map(row_to_view).collect::<Result<Vec<_>, _>>()
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<ProductView>, RepositoryError> {
        let mut builder = QueryBuilder::<Sqlite>::new(SELECT_PRODUCT_VIEW);
        builder.push(" WHERE p.id = ");
        builder.push_bind(id.0);

        let row = builder.build().fetch_optional(&self.pool).await?;

        match row {
            Some(ref r) => Ok(Some(row_to_view(r)?)),
            None => Ok(None),
        }
    }
}
