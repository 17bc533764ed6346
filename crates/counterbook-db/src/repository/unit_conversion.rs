//! # Unit Conversion Repository
//!
//! Per-item unit conversions (`1 BOX = 12 PCS`). A `(item, from, to)` triple
//! is unique; the UNIQUE index backs up the duplicate check done in core.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use counterbook_core::UnitConversion;

#[derive(Debug, sqlx::FromRow)]
struct UnitConversionRow {
    id: String,
    item_id: String,
    from_unit: String,
    to_unit: String,
    conversion_factor: f64,
    created_at: DateTime<Utc>,
}

impl From<UnitConversionRow> for UnitConversion {
    fn from(row: UnitConversionRow) -> Self {
        UnitConversion {
            id: row.id,
            item_id: row.item_id,
            from_unit: row.from_unit,
            to_unit: row.to_unit,
            conversion_factor: row.conversion_factor,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UnitConversionRepository {
    pool: SqlitePool,
}

impl UnitConversionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UnitConversionRepository { pool }
    }

    /// Conversions defined for an item, oldest first.
    pub async fn list_for_item(&self, item_id: &str) -> DbResult<Vec<UnitConversion>> {
        let rows: Vec<UnitConversionRow> = sqlx::query_as(
            r#"
            SELECT id, item_id, from_unit, to_unit, conversion_factor, created_at
            FROM unit_conversions
            WHERE item_id = ?1
            ORDER BY created_at, from_unit, to_unit
            "#,
        )
        .bind(item_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(UnitConversion::from).collect())
    }

    /// Inserts a conversion.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - Pair already defined for the item
    /// * `Err(DbError::ForeignKeyViolation)` - Unknown item
    pub async fn insert(&self, conversion: &UnitConversion) -> DbResult<UnitConversion> {
        debug!(
            item_id = %conversion.item_id,
            from = %conversion.from_unit,
            to = %conversion.to_unit,
            "Inserting unit conversion"
        );

        sqlx::query(
            r#"
            INSERT INTO unit_conversions (
                id, item_id, from_unit, to_unit, conversion_factor, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&conversion.id)
        .bind(&conversion.item_id)
        .bind(&conversion.from_unit)
        .bind(&conversion.to_unit)
        .bind(conversion.conversion_factor)
        .bind(conversion.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DbError::from(e).with_duplicate(
                "unit conversion",
                &format!("{} -> {}", conversion.from_unit, conversion.to_unit),
            )
        })?;

        Ok(conversion.clone())
    }

    /// Deletes one of an item's conversions.
    pub async fn delete(&self, item_id: &str, id: &str) -> DbResult<()> {
        debug!(item_id = %item_id, id = %id, "Deleting unit conversion");

        let result = sqlx::query("DELETE FROM unit_conversions WHERE id = ?1 AND item_id = ?2")
            .bind(id)
            .bind(item_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Unit conversion", id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use counterbook_core::{CatalogItem, ItemInput};

    async fn db_with_item() -> (Database, CatalogItem) {
        let db = Database::in_memory().await.unwrap();
        let item = CatalogItem::from_input(&ItemInput {
            code: "ITEM010".to_string(),
            name: "Cable".to_string(),
            price: 20.0,
            ..ItemInput::default()
        });
        let item = db.items().insert(&item).await.unwrap();
        (db, item)
    }

    #[tokio::test]
    async fn test_insert_list_delete() {
        let (db, item) = db_with_item().await;
        let repo = db.unit_conversions();

        let box_pcs = repo
            .insert(&UnitConversion::new(&item.id, "BOX", "PCS", 12.0))
            .await
            .unwrap();
        repo.insert(&UnitConversion::new(&item.id, "CTN", "BOX", 4.0))
            .await
            .unwrap();

        let listed = repo.list_for_item(&item.id).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().any(|c| c.same_pair("BOX", "PCS")));

        repo.delete(&item.id, &box_pcs.id).await.unwrap();
        assert_eq!(repo.list_for_item(&item.id).await.unwrap().len(), 1);
        assert!(matches!(
            repo.delete(&item.id, &box_pcs.id).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_duplicate_pair_rejected_by_index() {
        let (db, item) = db_with_item().await;
        let repo = db.unit_conversions();

        repo.insert(&UnitConversion::new(&item.id, "BOX", "PCS", 12.0))
            .await
            .unwrap();
        let err = repo
            .insert(&UnitConversion::new(&item.id, "BOX", "PCS", 10.0))
            .await
            .unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    async fn test_unknown_item_rejected() {
        let (db, _) = db_with_item().await;
        let err = db
            .unit_conversions()
            .insert(&UnitConversion::new("no-such-item", "BOX", "PCS", 12.0))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }
}
