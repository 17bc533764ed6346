//! # Domain Types
//!
//! Core domain types used throughout Counterbook.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  CatalogItem    │   │    LineItem     │   │  CounterSale    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │──►│  item (ref)     │──►│  invoice_number │       │
//! │  │  code (business)│   │  quantity       │   │  lines (frozen) │       │
//! │  │  price          │   │  unit_price     │   │  totals         │       │
//! │  │  rates          │   │  discount       │   │  tax_mode       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    TaxRates     │   │  DiscountMode   │   │    TaxMode      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  cgst / sgst    │   │  Percentage     │   │  Exclusive      │       │
//! │  │  igst / cess    │   │  Amount         │   │  Inclusive      │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Catalog items have:
//! - `id`: UUID v4 - immutable, used for relations
//! - `code`: human-readable business key (e.g. `ITEM001`), unique

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::invoice::{AggregateTotals, LineBreakdown};

// =============================================================================
// Tax Rates
// =============================================================================

/// The four GST components levied on a line, as percentages (`9.0` = 9%).
///
/// Each component is applied to the taxable amount independently; they are
/// never compounded.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TaxRates {
    #[serde(rename = "cgstRate")]
    pub cgst: f64,
    #[serde(rename = "sgstRate")]
    pub sgst: f64,
    #[serde(rename = "igstRate")]
    pub igst: f64,
    #[serde(rename = "cessRate")]
    pub cess: f64,
}

impl TaxRates {
    /// No tax at all.
    pub const fn zero() -> Self {
        TaxRates {
            cgst: 0.0,
            sgst: 0.0,
            igst: 0.0,
            cess: 0.0,
        }
    }

    /// Intra-state supply: the total GST is split evenly into CGST and SGST.
    pub fn intra_state(total: f64) -> Self {
        TaxRates {
            cgst: total / 2.0,
            sgst: total / 2.0,
            ..TaxRates::zero()
        }
    }

    /// Inter-state supply: the whole GST is levied as IGST.
    pub fn inter_state(total: f64) -> Self {
        TaxRates {
            igst: total,
            ..TaxRates::zero()
        }
    }

    /// Adds a cess percentage on top of the existing components.
    pub fn with_cess(mut self, cess: f64) -> Self {
        self.cess = cess;
        self
    }

    /// CGST + SGST, the share used to back tax out of inclusive prices.
    #[inline]
    pub fn state_pair(&self) -> f64 {
        self.cgst + self.sgst
    }
}

// =============================================================================
// Discount Mode
// =============================================================================

/// How a line's `discount_value` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountMode {
    /// `discount_value` is a percentage of the line total.
    #[default]
    Percentage,
    /// `discount_value` is an absolute amount off the line.
    Amount,
}

// =============================================================================
// Tax Mode
// =============================================================================

/// Which base the tax rates are applied to.
///
/// ```text
/// Exclusive:  taxable = discounted             (rates on top)
/// Inclusive:  taxable = discounted × 100 / (100 + cgst + sgst)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum TaxMode {
    /// Prices exclude tax; CGST/SGST/IGST/Cess are added on top.
    #[default]
    Exclusive,
    /// Prices include CGST + SGST; the taxable base is backed out.
    Inclusive,
}

impl std::str::FromStr for TaxMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exclusive" => Ok(TaxMode::Exclusive),
            "inclusive" => Ok(TaxMode::Inclusive),
            other => Err(format!("unknown tax mode '{}'", other)),
        }
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Card,
    Upi,
}

// =============================================================================
// Line Item
// =============================================================================

/// Reference to the catalog record a line was filled from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ItemRef {
    pub id: String,
    pub code: String,
    pub name: String,
}

/// One row of the counter-sale invoice.
///
/// ## Defaults
/// A fresh row is `quantity = 1`, `unit_price = 0`, percentage discount of 0
/// and all tax rates 0, with no item selected yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Selected catalog item, `None` until the user picks one.
    #[serde(default)]
    pub item: Option<ItemRef>,
    pub quantity: f64,
    pub unit_price: f64,
    #[serde(rename = "discountType")]
    pub discount_mode: DiscountMode,
    pub discount_value: f64,
    #[serde(flatten)]
    pub rates: TaxRates,
}

impl Default for LineItem {
    fn default() -> Self {
        LineItem {
            item: None,
            quantity: 1.0,
            unit_price: 0.0,
            discount_mode: DiscountMode::Percentage,
            discount_value: 0.0,
            rates: TaxRates::zero(),
        }
    }
}

impl LineItem {
    /// Creates a line filled from a catalog item with the given quantity.
    pub fn from_catalog(item: &CatalogItem, quantity: f64) -> Self {
        LineItem {
            item: Some(item.item_ref()),
            quantity,
            unit_price: item.price,
            rates: item.rates,
            ..LineItem::default()
        }
    }
}

// =============================================================================
// Catalog Item (Item Master)
// =============================================================================

/// An item in the item master.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Item code - business identifier.
    pub code: String,

    /// Display name shown in the lookup and on the invoice.
    pub name: String,

    /// Selling price per unit.
    pub price: f64,

    #[serde(flatten)]
    pub rates: TaxRates,

    /// Whether the item is active (soft delete).
    pub is_active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl CatalogItem {
    /// Builds a new active item from validated form input.
    pub fn from_input(input: &ItemInput) -> Self {
        let now = Utc::now();
        CatalogItem {
            id: Uuid::new_v4().to_string(),
            code: input.code.trim().to_string(),
            name: input.name.trim().to_string(),
            price: input.price,
            rates: input.rates(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrites the editable fields from form input.
    pub fn apply_input(&mut self, input: &ItemInput) {
        self.code = input.code.trim().to_string();
        self.name = input.name.trim().to_string();
        self.price = input.price;
        self.rates = input.rates();
        self.updated_at = Utc::now();
    }

    /// The reference copied onto invoice lines.
    pub fn item_ref(&self) -> ItemRef {
        ItemRef {
            id: self.id.clone(),
            code: self.code.clone(),
            name: self.name.clone(),
        }
    }

    /// The label shown in the lookup dropdown (`ITEM001 - Laptop`).
    pub fn label(&self) -> String {
        format!("{} - {}", self.code, self.name)
    }

    /// Case-insensitive substring match on code or name.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        self.name.to_lowercase().contains(&term) || self.code.to_lowercase().contains(&term)
    }
}

/// Item master create/edit form.
///
/// ## Defaults
/// Empty code and name, price 0, all rates 0.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemInput {
    pub code: String,
    pub name: String,
    pub cgst: f64,
    pub sgst: f64,
    pub igst: f64,
    pub cess: f64,
    pub price: f64,
}

impl ItemInput {
    pub fn rates(&self) -> TaxRates {
        TaxRates {
            cgst: self.cgst,
            sgst: self.sgst,
            igst: self.igst,
            cess: self.cess,
        }
    }
}

impl From<&CatalogItem> for ItemInput {
    fn from(item: &CatalogItem) -> Self {
        ItemInput {
            code: item.code.clone(),
            name: item.name.clone(),
            cgst: item.rates.cgst,
            sgst: item.rates.sgst,
            igst: item.rates.igst,
            cess: item.rates.cess,
            price: item.price,
        }
    }
}

// =============================================================================
// Unit Conversions
// =============================================================================

/// Standard units offered when defining conversions.
pub const STANDARD_UNITS: &[(&str, &str)] = &[
    ("PCS", "Piece (Pcs)"),
    ("KG", "Kilogram (Kg)"),
    ("LTR", "Liter (L)"),
    ("BOX", "Box"),
    ("MTR", "Meter (m)"),
    ("CTN", "Carton"),
];

/// Returns the display name of a unit code, or the code itself if unknown.
pub fn unit_name(code: &str) -> &str {
    STANDARD_UNITS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
        .unwrap_or(code)
}

/// `1 from_unit = factor × to_unit` for a given item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UnitConversion {
    pub id: String,
    pub item_id: String,
    pub from_unit: String,
    pub to_unit: String,
    pub conversion_factor: f64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl UnitConversion {
    pub fn new(item_id: &str, from_unit: &str, to_unit: &str, factor: f64) -> Self {
        UnitConversion {
            id: Uuid::new_v4().to_string(),
            item_id: item_id.to_string(),
            from_unit: from_unit.trim().to_string(),
            to_unit: to_unit.trim().to_string(),
            conversion_factor: factor,
            created_at: Utc::now(),
        }
    }

    /// Converts a quantity expressed in `from_unit` into `to_unit`.
    #[inline]
    pub fn convert(&self, quantity: f64) -> f64 {
        quantity * self.conversion_factor
    }

    pub fn same_pair(&self, from_unit: &str, to_unit: &str) -> bool {
        self.from_unit == from_unit.trim() && self.to_unit == to_unit.trim()
    }
}

// =============================================================================
// Counter Sale (submitted invoice)
// =============================================================================

/// A submitted invoice line. Uses the snapshot pattern: item identity and
/// every input are frozen next to the computed breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CounterSaleLine {
    pub line_no: u32,
    pub item: ItemRef,
    pub quantity: f64,
    pub unit_price: f64,
    #[serde(rename = "discountType")]
    pub discount_mode: DiscountMode,
    pub discount_value: f64,
    #[serde(flatten)]
    pub rates: TaxRates,
    pub breakdown: LineBreakdown,
}

/// A completed counter-sale invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CounterSale {
    pub id: String,
    pub invoice_number: String,
    pub customer_name: String,
    #[ts(as = "String")]
    pub order_date: NaiveDate,
    pub payment_method: PaymentMethod,
    pub tax_mode: TaxMode,
    pub lines: Vec<CounterSaleLine>,
    pub totals: AggregateTotals,
    pub created_by: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// One row of the dashboard's recent invoices list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleListEntry {
    pub id: String,
    pub invoice_number: String,
    pub customer_name: String,
    #[ts(as = "String")]
    pub order_date: NaiveDate,
    pub payment_method: PaymentMethod,
    pub line_count: i64,
    pub grand_total: f64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl From<&CounterSale> for SaleListEntry {
    fn from(sale: &CounterSale) -> Self {
        SaleListEntry {
            id: sale.id.clone(),
            invoice_number: sale.invoice_number.clone(),
            customer_name: sale.customer_name.clone(),
            order_date: sale.order_date,
            payment_method: sale.payment_method,
            line_count: sale.lines.len() as i64,
            grand_total: sale.totals.grand_total,
            created_at: sale.created_at,
        }
    }
}

/// Aggregated sales figures for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    pub invoice_count: i64,
    pub gross_total: f64,
    pub tax_total: f64,
    pub discount_total: f64,
}

impl SalesSummary {
    /// Mean invoice value, zero when nothing was sold.
    pub fn average_invoice(&self) -> f64 {
        if self.invoice_count == 0 {
            0.0
        } else {
            self.gross_total / self.invoice_count as f64
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
