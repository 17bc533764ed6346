//! # Invoice Draft
//!
//! The counter-sale form record: header fields plus the line items it
//! exclusively owns. Totals are never stored here; they are recomputed from
//! the lines with an [`InvoiceCalculator`] whenever someone asks.
//!
//! ## Edit Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Form Action              Draft Method              Change              │
//! │  ───────────              ────────────              ──────              │
//! │                                                                         │
//! │  "Add item" button ──────► add_line() ────────────► items.push(default) │
//! │  Pick from lookup ───────► select_item(i, item) ──► price + rates copy  │
//! │  Edit qty/price/etc ─────► update_line(i, upd) ───► one field changes   │
//! │  Delete row ─────────────► remove_line(i) ────────► items.remove(i)     │
//! │  Round-off field ────────► set_round_off(v) ──────► round_off = v       │
//! │  Customer/date/payment ──► update_header(h) ──────► header fields       │
//! │  Submit ─────────────────► to_counter_sale() ─────► frozen snapshot     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult, FieldError};
use crate::invoice::{AggregateTotals, InvoiceCalculator, LineBreakdown};
use crate::types::{
    CatalogItem, CounterSale, CounterSaleLine, DiscountMode, LineItem, PaymentMethod, TaxRates,
};
use crate::validation::{validate_invoice, validate_line_capacity};

// =============================================================================
// Update Records
// =============================================================================

/// A single-field edit to one invoice line.
///
/// Wire shape: `{ "field": "unitPrice", "value": 450 }`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum LineUpdate {
    Quantity(f64),
    UnitPrice(f64),
    #[serde(rename = "discountType")]
    DiscountMode(DiscountMode),
    DiscountValue(f64),
    CgstRate(f64),
    SgstRate(f64),
    IgstRate(f64),
    CessRate(f64),
    Rates(TaxRates),
}

impl LineUpdate {
    fn apply(self, line: &mut LineItem) {
        match self {
            LineUpdate::Quantity(v) => line.quantity = v,
            LineUpdate::UnitPrice(v) => line.unit_price = v,
            LineUpdate::DiscountMode(mode) => line.discount_mode = mode,
            LineUpdate::DiscountValue(v) => line.discount_value = v,
            LineUpdate::CgstRate(v) => line.rates.cgst = v,
            LineUpdate::SgstRate(v) => line.rates.sgst = v,
            LineUpdate::IgstRate(v) => line.rates.igst = v,
            LineUpdate::CessRate(v) => line.rates.cess = v,
            LineUpdate::Rates(rates) => line.rates = rates,
        }
    }
}

/// Header edits; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct HeaderUpdate {
    pub customer_name: Option<String>,
    #[ts(as = "Option<String>")]
    pub order_date: Option<NaiveDate>,
    pub payment_method: Option<PaymentMethod>,
}

// =============================================================================
// Invoice Draft
// =============================================================================

/// The open counter-sale form.
///
/// ## Defaults
/// Empty customer, today's date (UTC), cash payment, one default line and
/// no round-off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDraft {
    pub customer_name: String,
    #[ts(as = "String")]
    pub order_date: NaiveDate,
    pub payment_method: PaymentMethod,
    pub items: Vec<LineItem>,
    /// Manual adjustment; an empty field is `None` and counts as 0.
    #[serde(default)]
    pub round_off_amount: Option<f64>,
}

impl Default for InvoiceDraft {
    fn default() -> Self {
        InvoiceDraft::new(Utc::now().date_naive())
    }
}

impl InvoiceDraft {
    /// A blank form dated `order_date`.
    pub fn new(order_date: NaiveDate) -> Self {
        InvoiceDraft {
            customer_name: String::new(),
            order_date,
            payment_method: PaymentMethod::Cash,
            items: vec![LineItem::default()],
            round_off_amount: None,
        }
    }

    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    fn line_mut(&mut self, index: usize) -> CoreResult<&mut LineItem> {
        let len = self.items.len();
        self.items
            .get_mut(index)
            .ok_or(CoreError::LineNotFound { index, len })
    }

    /// Appends a default line and returns its index.
    pub fn add_line(&mut self) -> CoreResult<usize> {
        validate_line_capacity(self.items.len())?;
        self.items.push(LineItem::default());
        Ok(self.items.len() - 1)
    }

    /// Removes and returns the line at `index`.
    pub fn remove_line(&mut self, index: usize) -> CoreResult<LineItem> {
        if index >= self.items.len() {
            return Err(CoreError::LineNotFound {
                index,
                len: self.items.len(),
            });
        }
        Ok(self.items.remove(index))
    }

    /// Fills line `index` from a catalog item.
    ///
    /// Price and the four rates come from the item. The quantity typed so far
    /// is kept (1 if it is 0 or not a number) and so is the discount (value
    /// reset to 0 if not a number).
    pub fn select_item(&mut self, index: usize, item: &CatalogItem) -> CoreResult<()> {
        let line = self.line_mut(index)?;

        let quantity = if line.quantity.is_finite() && line.quantity != 0.0 {
            line.quantity
        } else {
            1.0
        };
        let discount_value = if line.discount_value.is_nan() {
            0.0
        } else {
            line.discount_value
        };

        *line = LineItem {
            discount_mode: line.discount_mode,
            discount_value,
            ..LineItem::from_catalog(item, quantity)
        };
        Ok(())
    }

    /// Applies a single-field edit to line `index`.
    pub fn update_line(&mut self, index: usize, update: LineUpdate) -> CoreResult<()> {
        update.apply(self.line_mut(index)?);
        Ok(())
    }

    pub fn set_round_off(&mut self, amount: Option<f64>) {
        self.round_off_amount = amount;
    }

    /// The round-off as used by the calculator (missing or NaN is 0).
    pub fn round_off(&self) -> f64 {
        self.round_off_amount
            .filter(|v| v.is_finite())
            .unwrap_or(0.0)
    }

    pub fn update_header(&mut self, update: HeaderUpdate) {
        if let Some(name) = update.customer_name {
            self.customer_name = name;
        }
        if let Some(date) = update.order_date {
            self.order_date = date;
        }
        if let Some(method) = update.payment_method {
            self.payment_method = method;
        }
    }

    /// Back to a blank form dated `order_date`.
    pub fn reset(&mut self, order_date: NaiveDate) {
        *self = InvoiceDraft::new(order_date);
    }

    pub fn breakdowns(&self, calc: &InvoiceCalculator) -> Vec<LineBreakdown> {
        calc.lines(&self.items)
    }

    pub fn totals(&self, calc: &InvoiceCalculator) -> AggregateTotals {
        calc.totals(&self.items, self.round_off())
    }

    /// Full-form validation, collecting every failing field.
    pub fn validate(&self) -> CoreResult<()> {
        validate_invoice(&self.customer_name, &self.items)
    }

    /// Validates the form and freezes it into a sale, computed at full
    /// precision. The invoice number is left empty; the sale repository
    /// assigns it when the sale is stored.
    pub fn to_counter_sale(
        &self,
        calc: &InvoiceCalculator,
        created_by: Option<String>,
    ) -> CoreResult<CounterSale> {
        self.validate()?;

        let lines = self
            .items
            .iter()
            .enumerate()
            .map(|(index, line)| {
                let item = line.item.clone().ok_or_else(|| CoreError::InvalidForm {
                    errors: vec![FieldError::new(
                        format!("items.{}.item", index),
                        "item is required",
                    )],
                })?;
                Ok(CounterSaleLine {
                    line_no: index as u32 + 1,
                    item,
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    discount_mode: line.discount_mode,
                    discount_value: line.discount_value,
                    rates: line.rates,
                    breakdown: calc.line(line),
                })
            })
            .collect::<CoreResult<Vec<_>>>()?;

        Ok(CounterSale {
            id: Uuid::new_v4().to_string(),
            invoice_number: String::new(),
            customer_name: self.customer_name.trim().to_string(),
            order_date: self.order_date,
            payment_method: self.payment_method,
            tax_mode: calc.mode(),
            lines,
            totals: self.totals(calc),
            created_by,
            created_at: Utc::now(),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
