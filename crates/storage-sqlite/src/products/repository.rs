use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use log::debug;
use std::sync::Arc;
use uuid::Uuid;

use shelfsync_core::products::{
    BulkInsertOutcome, NewProduct, Product, ProductRepositoryTrait, ProductUpdate,
};
use shelfsync_core::Result;

use super::model::{timestamp_to_text, NewProductDB, ProductChangesetDB, ProductDB};
use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::products;
use crate::schema::products::dsl::*;

pub struct ProductRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl ProductRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        ProductRepository { pool, writer }
    }

    fn get_by_external_id_impl(&self, wanted: &str) -> Result<Option<Product>> {
        let mut conn = get_connection(&self.pool)?;
        let row = products
            .filter(external_id.eq(wanted))
            .select(ProductDB::as_select())
            .first::<ProductDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        row.map(Product::try_from).transpose()
    }
}

#[async_trait]
impl ProductRepositoryTrait for ProductRepository {
    fn get_by_external_id(&self, wanted: &str) -> Result<Option<Product>> {
        self.get_by_external_id_impl(wanted)
    }

    async fn bulk_insert(&self, new_products: Vec<NewProduct>) -> Result<BulkInsertOutcome> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<BulkInsertOutcome> {
                let mut outcome = BulkInsertOutcome::default();
                for new_product in new_products {
                    let row = NewProductDB::from_domain(Uuid::new_v4().to_string(), new_product);
                    let written = diesel::insert_into(products::table)
                        .values(&row)
                        .on_conflict(products::external_id)
                        .do_nothing()
                        .execute(conn)
                        .map_err(StorageError::from)?;
                    if written == 0 {
                        outcome.conflicts.push(row.external_id);
                    } else {
                        outcome.inserted += written;
                    }
                }
                debug!(
                    "Inserted {} products ({} conflicts)",
                    outcome.inserted,
                    outcome.conflicts.len()
                );
                Ok(outcome)
            })
            .await
    }

    async fn bulk_update(&self, updates: Vec<ProductUpdate>) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let mut changed = 0;
                for update in &updates {
                    let changeset = ProductChangesetDB::from(update);
                    changed += diesel::update(
                        products
                            .filter(products::id.eq(&update.id))
                            .filter(deleted.eq(false)),
                    )
                    .set(&changeset)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                }
                debug!("Updated {} of {} products", changed, updates.len());
                Ok(changed)
            })
            .await
    }

    async fn mark_deleted(&self, wanted: &str, at: DateTime<Utc>) -> Result<bool> {
        let wanted = wanted.to_string();
        let at = timestamp_to_text(&at);
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<bool> {
                let changed = diesel::update(
                    products
                        .filter(external_id.eq(&wanted))
                        .filter(deleted.eq(false)),
                )
                .set((deleted.eq(true), deleted_at.eq(Some(at))))
                .execute(conn)
                .map_err(StorageError::from)?;
                Ok(changed > 0)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, run_migrations, spawn_writer};
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use shelfsync_core::products::{ProductAttributes, ProductStatus};
    use tempfile::tempdir;

    async fn create_test_repository() -> (ProductRepository, tempfile::TempDir) {
        let temp_dir = tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");
        let db_path_str = db_path.to_string_lossy().to_string();

        let pool = create_pool(&db_path_str).expect("Failed to create pool");
        run_migrations(&pool).expect("Failed to run migrations");
        let writer = spawn_writer((*pool).clone());

        (ProductRepository::new(Arc::clone(&pool), writer), temp_dir)
    }

    fn ts(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn new_product(ext: &str, product_name: &str) -> NewProduct {
        NewProduct {
            external_id: ext.to_string(),
            name: product_name.to_string(),
            attributes: ProductAttributes {
                brand: Some("Acme".to_string()),
                price: Some(dec!(1410.29)),
                stock: Some(7),
                sku: Some(1240),
                ..Default::default()
            },
            metadata: json!({ "tags": ["a"] }),
            created_at: ts(2024, 12, 1),
            updated_at: ts(2025, 1, 1),
            last_synced_at: ts(2025, 1, 2),
        }
    }

    #[tokio::test]
    async fn test_insert_then_lookup_round_trips_fields() {
        let (repo, _temp_dir) = create_test_repository().await;

        let outcome = repo
            .bulk_insert(vec![new_product("1", "Watch"), new_product("2", "Phone")])
            .await
            .expect("insert failed");
        assert_eq!(outcome.inserted, 2);
        assert!(outcome.conflicts.is_empty());

        let stored = repo.get_by_external_id("1").unwrap().expect("missing product");
        assert_eq!(stored.name, "Watch");
        assert_eq!(stored.attributes.price, Some(dec!(1410.29)));
        assert_eq!(stored.attributes.sku, Some(1240));
        assert_eq!(stored.attributes.color, None);
        assert_eq!(stored.metadata, json!({ "tags": ["a"] }));
        assert_eq!(stored.created_at, ts(2024, 12, 1));
        assert_eq!(stored.last_synced_at, ts(2025, 1, 2));
        assert_eq!(stored.status, ProductStatus::Active);
        assert!(!stored.id.is_empty());

        assert!(repo.get_by_external_id("missing").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_external_id_is_a_conflict() {
        let (repo, _temp_dir) = create_test_repository().await;
        repo.bulk_insert(vec![new_product("1", "Original")]).await.unwrap();

        let outcome = repo
            .bulk_insert(vec![new_product("1", "Copy"), new_product("2", "Other")])
            .await
            .unwrap();

        assert_eq!(outcome.inserted, 1);
        assert_eq!(outcome.conflicts, vec!["1".to_string()]);
        assert_eq!(repo.get_by_external_id("1").unwrap().unwrap().name, "Original");
    }

    #[tokio::test]
    async fn test_update_keeps_absent_fields() {
        let (repo, _temp_dir) = create_test_repository().await;
        repo.bulk_insert(vec![new_product("1", "Old")]).await.unwrap();
        let stored = repo.get_by_external_id("1").unwrap().unwrap();

        let update = ProductUpdate {
            id: stored.id.clone(),
            name: "New".to_string(),
            attributes: ProductAttributes {
                color: Some("Red".to_string()),
                stock: Some(0),
                ..Default::default()
            },
            metadata: json!({}),
            updated_at: ts(2025, 2, 1),
            last_synced_at: ts(2025, 2, 2),
        };
        let changed = repo.bulk_update(vec![update]).await.unwrap();
        assert_eq!(changed, 1);

        let stored = repo.get_by_external_id("1").unwrap().unwrap();
        assert_eq!(stored.name, "New");
        assert_eq!(stored.attributes.color.as_deref(), Some("Red"));
        assert_eq!(stored.attributes.stock, Some(0));
        assert_eq!(stored.attributes.brand.as_deref(), Some("Acme"));
        assert_eq!(stored.attributes.price, Some(dec!(1410.29)));
        assert_eq!(stored.metadata, json!({}));
        assert_eq!(stored.updated_at, ts(2025, 2, 1));
        assert_eq!(stored.last_synced_at, ts(2025, 2, 2));
        assert_eq!(stored.created_at, ts(2024, 12, 1));
    }

    #[tokio::test]
    async fn test_mark_deleted_and_update_refuses_deleted_rows() {
        let (repo, _temp_dir) = create_test_repository().await;
        repo.bulk_insert(vec![new_product("1", "Old")]).await.unwrap();
        let stored = repo.get_by_external_id("1").unwrap().unwrap();

        assert!(repo.mark_deleted("1", ts(2025, 3, 1)).await.unwrap());
        assert!(!repo.mark_deleted("1", ts(2025, 3, 2)).await.unwrap());
        assert!(!repo.mark_deleted("missing", ts(2025, 3, 2)).await.unwrap());

        let deleted_product = repo.get_by_external_id("1").unwrap().unwrap();
        assert_eq!(
            deleted_product.status,
            ProductStatus::Deleted {
                deleted_at: ts(2025, 3, 1)
            }
        );

        let update = ProductUpdate {
            id: stored.id,
            name: "Resurrected".to_string(),
            attributes: ProductAttributes::default(),
            metadata: json!({}),
            updated_at: ts(2025, 4, 1),
            last_synced_at: ts(2025, 4, 1),
        };
        assert_eq!(repo.bulk_update(vec![update]).await.unwrap(), 0);
        assert_eq!(repo.get_by_external_id("1").unwrap().unwrap().name, "Old");
    }

    #[tokio::test]
    async fn test_sub_second_timestamps_round_trip() {
        let (repo, _temp_dir) = create_test_repository().await;
        let precise = Utc.timestamp_opt(1_735_689_600, 123_456_000).unwrap();
        let mut product = new_product("1", "Precise");
        product.updated_at = precise;
        repo.bulk_insert(vec![product]).await.unwrap();

        let stored = repo.get_by_external_id("1").unwrap().unwrap();
        assert_eq!(stored.updated_at, precise);
        assert_eq!(
            timestamp_to_text(&precise),
            "2025-01-01T00:00:00.123456Z"
        );
    }

    #[tokio::test]
    async fn test_empty_batches_are_noops() {
        let (repo, _temp_dir) = create_test_repository().await;
        assert_eq!(repo.bulk_insert(vec![]).await.unwrap(), BulkInsertOutcome::default());
        assert_eq!(repo.bulk_update(vec![]).await.unwrap(), 0);
    }
}
