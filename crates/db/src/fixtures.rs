use chrono::{DateTime, Duration, TimeZone, Utc};

use storefront_core::domain::product::{Product, ProductId};

use crate::connection::DbPool;
use crate::repositories::RepositoryError;

/// Canonical demo catalog: three areas, uneven order volume, more than ten
/// products in Maadi so the ranking cutoff is visible.
const SEED_PRODUCTS: &[SeedProductContract] = &[
    seed(1, "Koshary Bowl", "Meals", "Maadi", 14),
    seed(2, "Ful Medames", "Meals", "Maadi", 9),
    seed(3, "Baladi Bread", "Bakery", "Maadi", 9),
    seed(4, "Hibiscus Juice", "Beverages", "Maadi", 7),
    seed(5, "Feteer Meshaltet", "Bakery", "Maadi", 6),
    seed(6, "Taameya Sandwich", "Meals", "Maadi", 5),
    seed(7, "Sugarcane Juice", "Beverages", "Maadi", 4),
    seed(8, "Basbousa", "Desserts", "Maadi", 3),
    seed(9, "Om Ali", "Desserts", "Maadi", 2),
    seed(10, "Mint Tea", "Beverages", "Maadi", 1),
    seed(11, "Aish Fino", "Bakery", "Maadi", 1),
    seed(12, "Roz Bel Laban", "Desserts", "Maadi", 0),
    seed(13, "Hawawshi", "Meals", "Zamalek", 8),
    seed(14, "Sahlab", "Beverages", "Zamalek", 2),
    seed(15, "Kunafa", "Desserts", "Zamalek", 0),
    seed(16, "Molokhia", "Meals", "Heliopolis", 5),
    seed(17, "Qatayef", "Desserts", "Heliopolis", 3),
];

/// Order ids are derived from the product id so reloading stays idempotent.
const ORDER_ID_STRIDE: i64 = 1_000;

pub struct CatalogSeedDataset;

impl CatalogSeedDataset {
    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let mut tx = pool.begin().await?;
        let mut orders_seeded = 0u32;

        for contract in SEED_PRODUCTS {
            sqlx::query(
                "INSERT OR IGNORE INTO product (id, name, category, area, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .bind(contract.id)
            .bind(contract.name)
            .bind(contract.category)
            .bind(contract.area)
            .bind(contract.created_at().to_rfc3339())
            .execute(&mut *tx)
            .await?;

            for n in 1..=contract.orders {
                sqlx::query(
                    "INSERT OR IGNORE INTO product_order (id, product_id, created_at)
                     VALUES (?1, ?2, ?3)",
                )
                .bind(contract.id * ORDER_ID_STRIDE + i64::from(n))
                .bind(contract.id)
                .bind((contract.created_at() + Duration::hours(i64::from(n))).to_rfc3339())
                .execute(&mut *tx)
                .await?;
            }
            orders_seeded += contract.orders;
        }

        tx.commit().await?;

        Ok(SeedResult { products_seeded: SEED_PRODUCTS.len(), orders_seeded })
    }

    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let mut checks = Vec::new();

        let max_seed_id = SEED_PRODUCTS.iter().map(|contract| contract.id).max().unwrap_or(0);

        let product_count: i64 =
            sqlx::query_scalar("SELECT COUNT(1) FROM product WHERE id BETWEEN 1 AND ?1")
                .bind(max_seed_id)
                .fetch_one(pool)
                .await?;
        checks.push(("products", product_count == SEED_PRODUCTS.len() as i64));

        let mut counts_match = true;
        for contract in SEED_PRODUCTS {
            let order_count: i64 = sqlx::query_scalar(
                "SELECT COUNT(1) FROM product_order WHERE product_id = ?1 AND id BETWEEN ?2 AND ?3",
            )
            .bind(contract.id)
            .bind(contract.id * ORDER_ID_STRIDE + 1)
            .bind(contract.id * ORDER_ID_STRIDE + ORDER_ID_STRIDE - 1)
            .fetch_one(pool)
            .await?;
            counts_match &= order_count == i64::from(contract.orders);
        }
        checks.push(("order-counts", counts_match));

        let top_maadi: Option<i64> = sqlx::query_scalar(
            "SELECT p.id FROM product p
             WHERE p.area = 'Maadi'
             ORDER BY (SELECT COUNT(*) FROM product_order o WHERE o.product_id = p.id) DESC,
                      p.id ASC
             LIMIT 1",
        )
        .fetch_optional(pool)
        .await?;
        checks.push(("maadi-ranking", top_maadi == Some(1)));

        let all_present = checks.iter().all(|(_, passed)| *passed);
        Ok(VerificationResult { all_present, checks })
    }

    pub async fn clean(pool: &DbPool) -> Result<(), RepositoryError> {
        let mut tx = pool.begin().await?;

        for contract in SEED_PRODUCTS {
            sqlx::query("DELETE FROM product_order WHERE product_id = ?1")
                .bind(contract.id)
                .execute(&mut *tx)
                .await?;
            sqlx::query("DELETE FROM product WHERE id = ?1")
                .bind(contract.id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

pub async fn seed_product(pool: &DbPool, product: &Product) -> Result<(), RepositoryError> {
    sqlx::query(
        "INSERT INTO product (id, name, category, area, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(product.id.0)
    .bind(&product.name)
    .bind(&product.category)
    .bind(&product.area)
    .bind(product.created_at.to_rfc3339())
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn seed_orders(
    pool: &DbPool,
    product_id: ProductId,
    count: u32,
) -> Result<(), RepositoryError> {
    let mut tx = pool.begin().await?;
    for _ in 0..count {
        sqlx::query("INSERT INTO product_order (product_id, created_at) VALUES (?1, ?2)")
            .bind(product_id.0)
            .bind(Utc::now().to_rfc3339())
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;
    Ok(())
}

#[derive(Debug, Clone, Copy)]
struct SeedProductContract {
    id: i64,
    name: &'static str,
    category: &'static str,
    area: &'static str,
    orders: u32,
}

const fn seed(
    id: i64,
    name: &'static str,
    category: &'static str,
    area: &'static str,
    orders: u32,
) -> SeedProductContract {
    SeedProductContract { id, name, category, area, orders }
}

impl SeedProductContract {
    fn created_at(&self) -> DateTime<Utc> {
        let base = Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).single().unwrap_or_default();
        base + Duration::days(self.id)
    }
}

#[derive(Debug)]
pub struct SeedResult {
    pub products_seeded: usize,
    pub orders_seeded: u32,
}

#[derive(Debug)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}
