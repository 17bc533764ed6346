//! # Sale Repository
//!
//! Database operations for counter sales and the dashboard aggregates.
//!
//! ## Submit Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create(sale)                                                           │
//! │     │                                                                   │
//! │     ├── BEGIN                                                           │
//! │     ├── next number for the day:  MAX(NNNN) of CS-YYYYMMDD-* + 1        │
//! │     ├── INSERT counter_sales        (header + aggregate totals)         │
//! │     ├── INSERT counter_sale_lines   (one per line, snapshot + breakdown)│
//! │     └── COMMIT                                                          │
//! │                                                                         │
//! │  Either everything is stored or nothing is.                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use counterbook_core::{
    AggregateTotals, CounterSale, CounterSaleLine, DiscountMode, ItemRef, LineBreakdown,
    PaymentMethod, SaleListEntry, SalesSummary, TaxMode, TaxRates,
};

/// Prefix of every counter-sale invoice number.
pub const INVOICE_PREFIX: &str = "CS";

/// Formats an invoice number: `CS-YYYYMMDD-NNNN`.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use counterbook_db::repository::sale::format_invoice_number;
///
/// let day = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
/// assert_eq!(format_invoice_number(day, 7), "CS-20261019-0007");
/// ```
pub fn format_invoice_number(day: NaiveDate, sequence: u32) -> String {
    format!("{}-{}-{:04}", INVOICE_PREFIX, day.format("%Y%m%d"), sequence)
}

fn day_prefix(day: NaiveDate) -> String {
    format!("{}-{}-", INVOICE_PREFIX, day.format("%Y%m%d"))
}

// =============================================================================
// Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    id: String,
    invoice_number: String,
    customer_name: String,
    order_date: NaiveDate,
    payment_method: PaymentMethod,
    tax_mode: TaxMode,
    subtotal: f64,
    total_discount: f64,
    total_taxable_amount: f64,
    total_cgst: f64,
    total_sgst: f64,
    total_igst: f64,
    total_cess: f64,
    total_tax: f64,
    round_off_amount: f64,
    grand_total: f64,
    created_by: Option<String>,
    created_at: DateTime<Utc>,
}

impl SaleRow {
    fn into_sale(self, lines: Vec<CounterSaleLine>) -> CounterSale {
        CounterSale {
            id: self.id,
            invoice_number: self.invoice_number,
            customer_name: self.customer_name,
            order_date: self.order_date,
            payment_method: self.payment_method,
            tax_mode: self.tax_mode,
            lines,
            totals: AggregateTotals {
                subtotal: self.subtotal,
                total_discount: self.total_discount,
                total_taxable_amount: self.total_taxable_amount,
                total_cgst: self.total_cgst,
                total_sgst: self.total_sgst,
                total_igst: self.total_igst,
                total_cess: self.total_cess,
                total_tax: self.total_tax,
                round_off_amount: self.round_off_amount,
                grand_total: self.grand_total,
            },
            created_by: self.created_by,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct LineRow {
    line_no: i64,
    item_id: String,
    item_code: String,
    item_name: String,
    quantity: f64,
    unit_price: f64,
    discount_type: DiscountMode,
    discount_value: f64,
    cgst_rate: f64,
    sgst_rate: f64,
    igst_rate: f64,
    cess_rate: f64,
    line_total: f64,
    discount: f64,
    taxable_amount: f64,
    cgst: f64,
    sgst: f64,
    igst: f64,
    cess: f64,
}

impl From<LineRow> for CounterSaleLine {
    fn from(row: LineRow) -> Self {
        CounterSaleLine {
            line_no: row.line_no as u32,
            item: ItemRef {
                id: row.item_id,
                code: row.item_code,
                name: row.item_name,
            },
            quantity: row.quantity,
            unit_price: row.unit_price,
            discount_mode: row.discount_type,
            discount_value: row.discount_value,
            rates: TaxRates {
                cgst: row.cgst_rate,
                sgst: row.sgst_rate,
                igst: row.igst_rate,
                cess: row.cess_rate,
            },
            breakdown: LineBreakdown {
                line_total: row.line_total,
                discount: row.discount,
                taxable_amount: row.taxable_amount,
                cgst: row.cgst,
                sgst: row.sgst,
                igst: row.igst,
                cess: row.cess,
            },
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SaleListRow {
    id: String,
    invoice_number: String,
    customer_name: String,
    order_date: NaiveDate,
    payment_method: PaymentMethod,
    line_count: i64,
    grand_total: f64,
    created_at: DateTime<Utc>,
}

impl From<SaleListRow> for SaleListEntry {
    fn from(row: SaleListRow) -> Self {
        SaleListEntry {
            id: row.id,
            invoice_number: row.invoice_number,
            customer_name: row.customer_name,
            order_date: row.order_date,
            payment_method: row.payment_method,
            line_count: row.line_count,
            grand_total: row.grand_total,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SummaryRow {
    invoice_count: i64,
    gross_total: f64,
    tax_total: f64,
    discount_total: f64,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for counter sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Stores a sale under the next invoice number of its creation day.
    ///
    /// Any number already set on `sale` is replaced. Returns the sale as
    /// stored.
    pub async fn create(&self, mut sale: CounterSale) -> DbResult<CounterSale> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let day = sale.created_at.date_naive();
        let sequence = next_sequence(&mut tx, day).await?;
        sale.invoice_number = format_invoice_number(day, sequence);

        debug!(
            id = %sale.id,
            invoice_number = %sale.invoice_number,
            lines = sale.lines.len(),
            "Inserting counter sale"
        );

        insert_header(&mut tx, &sale).await?;
        for line in &sale.lines {
            insert_line(&mut tx, &sale.id, line).await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            invoice_number = %sale.invoice_number,
            grand_total = sale.totals.grand_total,
            "Counter sale stored"
        );
        Ok(sale)
    }

    /// Gets a sale with its lines.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<CounterSale>> {
        let header: Option<SaleRow> = sqlx::query_as(
            r#"
            SELECT
                id, invoice_number, customer_name, order_date,
                payment_method, tax_mode,
                subtotal, total_discount, total_taxable_amount,
                total_cgst, total_sgst, total_igst, total_cess,
                total_tax, round_off_amount, grand_total,
                created_by, created_at
            FROM counter_sales
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(header) = header else {
            return Ok(None);
        };

        let lines: Vec<LineRow> = sqlx::query_as(
            r#"
            SELECT
                line_no, item_id, item_code, item_name,
                quantity, unit_price, discount_type, discount_value,
                cgst_rate, sgst_rate, igst_rate, cess_rate,
                line_total, discount, taxable_amount,
                cgst, sgst, igst, cess
            FROM counter_sale_lines
            WHERE sale_id = ?1
            ORDER BY line_no
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(header.into_sale(
            lines.into_iter().map(CounterSaleLine::from).collect(),
        )))
    }

    /// Most recently created sales, newest first.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<SaleListEntry>> {
        let rows: Vec<SaleListRow> = sqlx::query_as(
            r#"
            SELECT
                s.id, s.invoice_number, s.customer_name, s.order_date,
                s.payment_method,
                (SELECT COUNT(*) FROM counter_sale_lines l WHERE l.sale_id = s.id) AS line_count,
                s.grand_total, s.created_at
            FROM counter_sales s
            ORDER BY s.created_at DESC, s.invoice_number DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(SaleListEntry::from).collect())
    }

    /// Aggregates sales whose order date lies in `from..=to`.
    pub async fn summary_between(&self, from: NaiveDate, to: NaiveDate) -> DbResult<SalesSummary> {
        debug!(%from, %to, "Summarizing counter sales");

        let row: SummaryRow = sqlx::query_as(
            r#"
            SELECT
                COUNT(*) AS invoice_count,
                COALESCE(SUM(grand_total), 0.0) AS gross_total,
                COALESCE(SUM(total_tax), 0.0) AS tax_total,
                COALESCE(SUM(total_discount), 0.0) AS discount_total
            FROM counter_sales
            WHERE order_date BETWEEN ?1 AND ?2
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;

        Ok(SalesSummary {
            invoice_count: row.invoice_count,
            gross_total: row.gross_total,
            tax_total: row.tax_total,
            discount_total: row.discount_total,
        })
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM counter_sales")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

async fn next_sequence(conn: &mut SqliteConnection, day: NaiveDate) -> DbResult<u32> {
    let prefix = day_prefix(day);

    let max: Option<i64> = sqlx::query_scalar(
        r#"
        SELECT MAX(CAST(substr(invoice_number, ?2) AS INTEGER))
        FROM counter_sales
        WHERE invoice_number LIKE ?1
        "#,
    )
    .bind(format!("{}%", prefix))
    .bind(prefix.len() as i64 + 1)
    .fetch_one(&mut *conn)
    .await?;

    Ok(max.unwrap_or(0) as u32 + 1)
}

async fn insert_header(conn: &mut SqliteConnection, sale: &CounterSale) -> DbResult<()> {
    let t = &sale.totals;

    sqlx::query(
        r#"
        INSERT INTO counter_sales (
            id, invoice_number, customer_name, order_date,
            payment_method, tax_mode,
            subtotal, total_discount, total_taxable_amount,
            total_cgst, total_sgst, total_igst, total_cess,
            total_tax, round_off_amount, grand_total,
            created_by, created_at
        ) VALUES (
            ?1, ?2, ?3, ?4,
            ?5, ?6,
            ?7, ?8, ?9,
            ?10, ?11, ?12, ?13,
            ?14, ?15, ?16,
            ?17, ?18
        )
        "#,
    )
    .bind(&sale.id)
    .bind(&sale.invoice_number)
    .bind(&sale.customer_name)
    .bind(sale.order_date)
    .bind(sale.payment_method)
    .bind(sale.tax_mode)
    .bind(t.subtotal)
    .bind(t.total_discount)
    .bind(t.total_taxable_amount)
    .bind(t.total_cgst)
    .bind(t.total_sgst)
    .bind(t.total_igst)
    .bind(t.total_cess)
    .bind(t.total_tax)
    .bind(t.round_off_amount)
    .bind(t.grand_total)
    .bind(&sale.created_by)
    .bind(sale.created_at)
    .execute(&mut *conn)
    .await
    .map_err(|e| DbError::from(e).with_duplicate("invoice number", &sale.invoice_number))?;

    Ok(())
}

async fn insert_line(conn: &mut SqliteConnection, sale_id: &str, line: &CounterSaleLine) -> DbResult<()> {
    let b = &line.breakdown;

    sqlx::query(
        r#"
        INSERT INTO counter_sale_lines (
            id, sale_id, line_no, item_id, item_code, item_name,
            quantity, unit_price, discount_type, discount_value,
            cgst_rate, sgst_rate, igst_rate, cess_rate,
            line_total, discount, taxable_amount,
            cgst, sgst, igst, cess
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6,
            ?7, ?8, ?9, ?10,
            ?11, ?12, ?13, ?14,
            ?15, ?16, ?17,
            ?18, ?19, ?20, ?21
        )
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(sale_id)
    .bind(line.line_no as i64)
    .bind(&line.item.id)
    .bind(&line.item.code)
    .bind(&line.item.name)
    .bind(line.quantity)
    .bind(line.unit_price)
    .bind(line.discount_mode)
    .bind(line.discount_value)
    .bind(line.rates.cgst)
    .bind(line.rates.sgst)
    .bind(line.rates.igst)
    .bind(line.rates.cess)
    .bind(b.line_total)
    .bind(b.discount)
    .bind(b.taxable_amount)
    .bind(b.cgst)
    .bind(b.sgst)
    .bind(b.igst)
    .bind(b.cess)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use counterbook_core::{
        CatalogItem, InvoiceCalculator, InvoiceDraft, ItemInput, LineUpdate,
    };

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    async fn db_with_item() -> (Database, CatalogItem) {
        let db = Database::in_memory().await.unwrap();
        let item = CatalogItem::from_input(&ItemInput {
            code: "ITEM002".to_string(),
            name: "Mouse".to_string(),
            price: 500.0,
            cgst: 9.0,
            sgst: 9.0,
            ..ItemInput::default()
        });
        let item = db.items().insert(&item).await.unwrap();
        (db, item)
    }

    fn sale_for(item: &CatalogItem, order_date: NaiveDate, mode: TaxMode) -> CounterSale {
        let mut draft = InvoiceDraft::new(order_date);
        draft.customer_name = "Walk-in".to_string();
        draft.select_item(0, item).unwrap();
        draft.update_line(0, LineUpdate::Quantity(2.0)).unwrap();
        draft.update_line(0, LineUpdate::DiscountValue(10.0)).unwrap();
        draft.set_round_off(Some(-0.25));
        draft
            .to_counter_sale(&InvoiceCalculator::new(mode), Some("u-1".to_string()))
            .unwrap()
    }

    #[test]
    fn test_invoice_number_format() {
        assert_eq!(format_invoice_number(day(), 1), "CS-20261019-0001");
        assert_eq!(format_invoice_number(day(), 12345), "CS-20261019-12345");
        assert_eq!(day_prefix(day()), "CS-20261019-");
    }

    #[tokio::test]
    async fn test_create_numbers_sales_per_day() {
        let (db, item) = db_with_item().await;

        let first = db
            .sales()
            .create(sale_for(&item, day(), TaxMode::Exclusive))
            .await
            .unwrap();
        let second = db
            .sales()
            .create(sale_for(&item, day(), TaxMode::Exclusive))
            .await
            .unwrap();

        let today = first.created_at.date_naive();
        assert_eq!(first.invoice_number, format_invoice_number(today, 1));
        assert_eq!(second.invoice_number, format_invoice_number(today, 2));
        assert_eq!(db.sales().count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_round_trip_keeps_full_precision() {
        let (db, item) = db_with_item().await;
        let sale = db
            .sales()
            .create(sale_for(&item, day(), TaxMode::Inclusive))
            .await
            .unwrap();

        let stored = db.sales().get_by_id(&sale.id).await.unwrap().unwrap();
        assert_eq!(stored.invoice_number, sale.invoice_number);
        assert_eq!(stored.order_date, day());
        assert_eq!(stored.tax_mode, TaxMode::Inclusive);
        assert_eq!(stored.payment_method, PaymentMethod::Cash);
        assert_eq!(stored.created_by.as_deref(), Some("u-1"));
        assert_eq!(stored.lines, sale.lines);
        assert_eq!(stored.totals, sale.totals);
        assert_eq!(
            stored.lines[0].breakdown.taxable_amount,
            900.0 * 100.0 / 118.0
        );

        assert!(db.sales().get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_line_for_unknown_item_rolls_back() {
        let (db, item) = db_with_item().await;
        let mut sale = sale_for(&item, day(), TaxMode::Exclusive);
        sale.lines[0].item.id = "no-such-item".to_string();

        let err = db.sales().create(sale).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
        assert_eq!(db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_summary_and_recent() {
        let (db, item) = db_with_item().await;
        let yesterday = day().pred_opt().unwrap();

        let a = db
            .sales()
            .create(sale_for(&item, day(), TaxMode::Exclusive))
            .await
            .unwrap();
        db.sales()
            .create(sale_for(&item, day(), TaxMode::Exclusive))
            .await
            .unwrap();
        db.sales()
            .create(sale_for(&item, yesterday, TaxMode::Exclusive))
            .await
            .unwrap();

        let summary = db.sales().summary_between(day(), day()).await.unwrap();
        assert_eq!(summary.invoice_count, 2);
        assert!((summary.gross_total - 2.0 * a.totals.grand_total).abs() < 1e-9);
        assert!((summary.tax_total - 324.0).abs() < 1e-9);
        assert!((summary.discount_total - 200.0).abs() < 1e-9);

        let all = db.sales().summary_between(yesterday, day()).await.unwrap();
        assert_eq!(all.invoice_count, 3);

        let empty = db
            .sales()
            .summary_between(day().succ_opt().unwrap(), day().succ_opt().unwrap())
            .await
            .unwrap();
        assert_eq!(empty, SalesSummary::default());

        let recent = db.sales().list_recent(2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].line_count, 1);
        assert!(recent[0].invoice_number >= recent[1].invoice_number);
    }
}
