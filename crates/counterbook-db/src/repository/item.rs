//! # Item Repository
//!
//! Database operations for the item master.
//!
//! ## Key Operations
//! - Lookup search for the invoice form (code or name substring)
//! - CRUD operations
//! - Soft delete
//!
//! ## Lookup Search
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  User types: "lap"                                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  code LIKE '%lap%' OR name LIKE '%lap%'   (ASCII case-insensitive)      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                            │
//! │  │ ITEM001 | Laptop      | active  │ ← MATCH                            │
//! │  │ ITEM002 | Mouse       | active  │                                    │
//! │  │ ITEM009 | Laptop Bag  | deleted │ ← skipped (is_active = 0)          │
//! │  └─────────────────────────────────────────┘                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Ordered by code, LIMIT n                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use super::like_pattern;
use crate::error::{DbError, DbResult};
use counterbook_core::{CatalogItem, TaxRates};

const ITEM_COLUMNS: &str = r#"
    id, code, name, price,
    cgst_rate, sgst_rate, igst_rate, cess_rate,
    is_active, created_at, updated_at
"#;

#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    id: String,
    code: String,
    name: String,
    price: f64,
    cgst_rate: f64,
    sgst_rate: f64,
    igst_rate: f64,
    cess_rate: f64,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ItemRow> for CatalogItem {
    fn from(row: ItemRow) -> Self {
        CatalogItem {
            id: row.id,
            code: row.code,
            name: row.name,
            price: row.price,
            rates: TaxRates {
                cgst: row.cgst_rate,
                sgst: row.sgst_rate,
                igst: row.igst_rate,
                cess: row.cess_rate,
            },
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for item master operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.items();
/// let results = repo.search("lap", 20).await?;
/// let item = repo.get_by_id(&results[0].id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ItemRepository {
    pool: SqlitePool,
}

impl ItemRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ItemRepository { pool }
    }

    /// Case-insensitive substring search on code or name over active items.
    ///
    /// An empty query lists active items. SQLite `LIKE` folds ASCII letters
    /// only, so `"ÉCRAN"` does not match `"écran"`.
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<CatalogItem>> {
        let query = query.trim();

        debug!(query = %query, limit = %limit, "Searching items");

        if query.is_empty() {
            return self.list_active(limit).await;
        }

        let sql = format!(
            r#"
            SELECT {ITEM_COLUMNS}
            FROM items
            WHERE is_active = 1
              AND (code LIKE ?1 ESCAPE '\' OR name LIKE ?1 ESCAPE '\')
            ORDER BY code
            LIMIT ?2
            "#
        );

        let rows: Vec<ItemRow> = sqlx::query_as(&sql)
            .bind(like_pattern(query))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = rows.len(), "Search returned items");
        Ok(rows.into_iter().map(CatalogItem::from).collect())
    }

    /// Lists active items ordered by code.
    pub async fn list_active(&self, limit: u32) -> DbResult<Vec<CatalogItem>> {
        let sql = format!(
            r#"
            SELECT {ITEM_COLUMNS}
            FROM items
            WHERE is_active = 1
            ORDER BY code
            LIMIT ?1
            "#
        );

        let rows: Vec<ItemRow> = sqlx::query_as(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(CatalogItem::from).collect())
    }

    /// Gets an active item by its ID. Soft-deleted items are `None`.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<CatalogItem>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = ?1 AND is_active = 1");

        let row: Option<ItemRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(CatalogItem::from))
    }

    /// Gets an active item by its code.
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<CatalogItem>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM items WHERE code = ?1 AND is_active = 1");

        let row: Option<ItemRow> = sqlx::query_as(&sql)
            .bind(code.trim())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(CatalogItem::from))
    }

    /// Inserts a new item.
    ///
    /// ## Returns
    /// * `Ok(CatalogItem)` - The stored item
    /// * `Err(DbError::UniqueViolation)` - An active item already has the code
    pub async fn insert(&self, item: &CatalogItem) -> DbResult<CatalogItem> {
        debug!(code = %item.code, "Inserting item");

        sqlx::query(
            r#"
            INSERT INTO items (
                id, code, name, price,
                cgst_rate, sgst_rate, igst_rate, cess_rate,
                is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&item.id)
        .bind(&item.code)
        .bind(&item.name)
        .bind(item.price)
        .bind(item.rates.cgst)
        .bind(item.rates.sgst)
        .bind(item.rates.igst)
        .bind(item.rates.cess)
        .bind(item.is_active)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate("code", &item.code))?;

        Ok(item.clone())
    }

    /// Updates the editable fields of an active item.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - No active item with that ID
    /// * `Err(DbError::UniqueViolation)` - Code taken by another item
    pub async fn update(&self, item: &CatalogItem) -> DbResult<()> {
        debug!(id = %item.id, "Updating item");

        let result = sqlx::query(
            r#"
            UPDATE items SET
                code = ?2,
                name = ?3,
                price = ?4,
                cgst_rate = ?5,
                sgst_rate = ?6,
                igst_rate = ?7,
                cess_rate = ?8,
                updated_at = ?9
            WHERE id = ?1 AND is_active = 1
            "#,
        )
        .bind(&item.id)
        .bind(&item.code)
        .bind(&item.name)
        .bind(item.price)
        .bind(item.rates.cgst)
        .bind(item.rates.sgst)
        .bind(item.rates.igst)
        .bind(item.rates.cess)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate("code", &item.code))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", &item.id));
        }

        Ok(())
    }

    /// Soft-deletes an item by setting is_active = 0.
    ///
    /// Submitted invoices keep pointing at the row, so it is never removed.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting item");

        let result = sqlx::query(
            r#"
            UPDATE items
            SET is_active = 0, updated_at = ?2
            WHERE id = ?1 AND is_active = 1
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", id));
        }

        Ok(())
    }

    /// Counts active items.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
