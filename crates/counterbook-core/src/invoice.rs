//! # Invoice Calculator
//!
//! The GST engine behind the counter-sale invoice form.
//!
//! ## Per-Line Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  LineItem { qty: 2, price: 500, 10% off, cgst 9, sgst 9 }               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  line_total  = qty × price                         = 1000               │
//! │  discount    = 10% of 1000 (or the flat amount)    =  100               │
//! │  discounted  = max(line_total − discount, 0)       =  900               │
//! │       │                                                                 │
//! │       ├── Exclusive: taxable = discounted          =  900               │
//! │       └── Inclusive: taxable = 900 × 100 / 118     ≈  762.71            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  cgst = taxable × 9%   sgst = taxable × 9%   igst, cess likewise        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Aggregate
//! Totals are recomputed wholesale from the line items every time; nothing
//! is updated incrementally:
//!
//! ```text
//! grand_total = Σ taxable + (Σ cgst + Σ sgst + Σ igst + Σ cess) + round_off
//! ```
//!
//! Amounts keep full `f64` precision here. Use [`AggregateTotals::rounded`]
//! (or [`crate::money::Money`]) only at the presentation edge.
//!
//! The calculator never fails. Rows that are mid-edit (quantity 0, an empty
//! field parsed as NaN) simply contribute zeros.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::round2;
use crate::types::{DiscountMode, LineItem, TaxMode};

// =============================================================================
// Line Breakdown
// =============================================================================

/// Computed amounts for one line item.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineBreakdown {
    pub line_total: f64,
    pub discount: f64,
    pub taxable_amount: f64,
    pub cgst: f64,
    pub sgst: f64,
    pub igst: f64,
    pub cess: f64,
}

impl LineBreakdown {
    /// CGST + SGST + IGST + Cess for this line.
    #[inline]
    pub fn total_tax(&self) -> f64 {
        self.cgst + self.sgst + self.igst + self.cess
    }

    /// What the customer pays for this line before round-off.
    #[inline]
    pub fn line_amount(&self) -> f64 {
        self.taxable_amount + self.total_tax()
    }

    /// Copy with every field rounded to two decimals for display.
    pub fn rounded(&self) -> Self {
        LineBreakdown {
            line_total: round2(self.line_total),
            discount: round2(self.discount),
            taxable_amount: round2(self.taxable_amount),
            cgst: round2(self.cgst),
            sgst: round2(self.sgst),
            igst: round2(self.igst),
            cess: round2(self.cess),
        }
    }
}

// =============================================================================
// Aggregate Totals
// =============================================================================

/// Invoice-level totals. A pure function of the line items plus round-off;
/// never mutated in place by callers.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AggregateTotals {
    pub subtotal: f64,
    pub total_discount: f64,
    pub total_taxable_amount: f64,
    pub total_cgst: f64,
    pub total_sgst: f64,
    pub total_igst: f64,
    pub total_cess: f64,
    pub total_tax: f64,
    /// Signed manual adjustment entered by the user.
    pub round_off_amount: f64,
    pub grand_total: f64,
}

impl AggregateTotals {
    /// Totals of an invoice with no lines: everything zero except the
    /// round-off, which still flows into the grand total.
    pub fn empty(round_off_amount: f64) -> Self {
        AggregateTotals::default().finish(round_off_amount)
    }

    fn accumulate(&mut self, line: &LineBreakdown) {
        self.subtotal += line.line_total;
        self.total_discount += line.discount;
        self.total_taxable_amount += line.taxable_amount;
        self.total_cgst += line.cgst;
        self.total_sgst += line.sgst;
        self.total_igst += line.igst;
        self.total_cess += line.cess;
    }

    fn finish(mut self, round_off_amount: f64) -> Self {
        self.total_tax = self.total_cgst + self.total_sgst + self.total_igst + self.total_cess;
        self.round_off_amount = finite_or_zero(round_off_amount);
        self.grand_total = self.total_taxable_amount + self.total_tax + self.round_off_amount;
        self
    }

    /// Copy with every field rounded to two decimals for display.
    ///
    /// Each field is rounded on its own from the full-precision value, so the
    /// rounded grand total may differ by a paisa from the sum of the rounded
    /// parts.
    pub fn rounded(&self) -> Self {
        AggregateTotals {
            subtotal: round2(self.subtotal),
            total_discount: round2(self.total_discount),
            total_taxable_amount: round2(self.total_taxable_amount),
            total_cgst: round2(self.total_cgst),
            total_sgst: round2(self.total_sgst),
            total_igst: round2(self.total_igst),
            total_cess: round2(self.total_cess),
            total_tax: round2(self.total_tax),
            round_off_amount: round2(self.round_off_amount),
            grand_total: round2(self.grand_total),
        }
    }
}

// =============================================================================
// Calculator
// =============================================================================

/// Line and invoice calculator bound to one taxable-base policy.
///
/// ## Usage
/// ```rust
/// use counterbook_core::invoice::InvoiceCalculator;
/// use counterbook_core::types::{LineItem, TaxMode, TaxRates};
///
/// let calc = InvoiceCalculator::new(TaxMode::Inclusive);
/// let line = LineItem {
///     unit_price: 118.0,
///     rates: TaxRates::intra_state(18.0),
///     ..LineItem::default()
/// };
/// let b = calc.line(&line);
/// assert!((b.taxable_amount - 100.0).abs() < 1e-9);
/// assert!((b.cgst - 9.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InvoiceCalculator {
    mode: TaxMode,
}

impl InvoiceCalculator {
    pub const fn new(mode: TaxMode) -> Self {
        InvoiceCalculator { mode }
    }

    #[inline]
    pub const fn mode(&self) -> TaxMode {
        self.mode
    }

    /// Computes the breakdown of a single line.
    pub fn line(&self, item: &LineItem) -> LineBreakdown {
        let quantity = finite_or_zero(item.quantity);
        let unit_price = finite_or_zero(item.unit_price);
        let discount_value = finite_or_zero(item.discount_value);
        let cgst_rate = finite_or_zero(item.rates.cgst);
        let sgst_rate = finite_or_zero(item.rates.sgst);
        let igst_rate = finite_or_zero(item.rates.igst);
        let cess_rate = finite_or_zero(item.rates.cess);

        let line_total = quantity * unit_price;

        let discount = match item.discount_mode {
            DiscountMode::Percentage => line_total * discount_value / 100.0,
            DiscountMode::Amount => discount_value,
        }
        .max(0.0);

        // Excess discount is absorbed by this line only.
        let discounted = (line_total - discount).max(0.0);

        let taxable_amount = match self.mode {
            TaxMode::Exclusive => discounted,
            TaxMode::Inclusive => {
                let divisor = 100.0 + cgst_rate + sgst_rate;
                if divisor > 0.0 {
                    discounted * 100.0 / divisor
                } else {
                    discounted
                }
            }
        };

        LineBreakdown {
            line_total,
            discount,
            taxable_amount,
            cgst: taxable_amount * cgst_rate / 100.0,
            sgst: taxable_amount * sgst_rate / 100.0,
            igst: taxable_amount * igst_rate / 100.0,
            cess: taxable_amount * cess_rate / 100.0,
        }
    }

    /// Breakdowns for every line, in order.
    pub fn lines(&self, items: &[LineItem]) -> Vec<LineBreakdown> {
        items.iter().map(|item| self.line(item)).collect()
    }

    /// Recomputes the invoice totals from scratch.
    pub fn totals(&self, items: &[LineItem], round_off_amount: f64) -> AggregateTotals {
        items
            .iter()
            .fold(AggregateTotals::default(), |mut acc, item| {
                acc.accumulate(&self.line(item));
                acc
            })
            .finish(round_off_amount)
    }
}

/// Computes one line under the given policy.
pub fn calculate_line(item: &LineItem, mode: TaxMode) -> LineBreakdown {
    InvoiceCalculator::new(mode).line(item)
}

/// Computes invoice totals under the given policy.
pub fn calculate_totals(items: &[LineItem], round_off_amount: f64, mode: TaxMode) -> AggregateTotals {
    InvoiceCalculator::new(mode).totals(items, round_off_amount)
}

#[inline]
fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TaxRates;

    const EPS: f64 = 1e-9;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < EPS
    }

    /// qty 2 × 500, 10% off, 9% + 9%.
    fn scenario_item() -> LineItem {
        LineItem {
            quantity: 2.0,
            unit_price: 500.0,
            discount_mode: DiscountMode::Percentage,
            discount_value: 10.0,
            rates: TaxRates::intra_state(18.0),
            ..LineItem::default()
        }
    }

    fn sample_items() -> Vec<LineItem> {
        vec![
            scenario_item(),
            LineItem {
                quantity: 3.0,
                unit_price: 1500.0,
                discount_mode: DiscountMode::Amount,
                discount_value: 250.0,
                rates: TaxRates::inter_state(12.0).with_cess(1.5),
                ..LineItem::default()
            },
            LineItem {
                quantity: 0.5,
                unit_price: 333.33,
                rates: TaxRates::intra_state(5.0),
                ..LineItem::default()
            },
            LineItem {
                quantity: 1.0,
                unit_price: 40.0,
                discount_mode: DiscountMode::Amount,
                discount_value: 75.0,
                rates: TaxRates::intra_state(28.0).with_cess(12.0),
                ..LineItem::default()
            },
        ]
    }

    #[test]
    fn test_exclusive_scenario() {
        let calc = InvoiceCalculator::new(TaxMode::Exclusive);
        let line = calc.line(&scenario_item());

        assert_eq!(line.line_total, 1000.0);
        assert_eq!(line.discount, 100.0);
        assert_eq!(line.taxable_amount, 900.0);
        assert_eq!(line.cgst, 81.0);
        assert_eq!(line.sgst, 81.0);
        assert_eq!(line.igst, 0.0);
        assert_eq!(line.cess, 0.0);

        let totals = calc.totals(&[scenario_item()], 0.0);
        assert_eq!(totals.subtotal, 1000.0);
        assert_eq!(totals.total_discount, 100.0);
        assert_eq!(totals.total_tax, 162.0);
        assert_eq!(totals.grand_total, 1062.0);

        let with_round_off = calc.totals(&[scenario_item()], -0.5);
        assert!(close(with_round_off.grand_total, 1061.5));
    }

    #[test]
    fn test_inclusive_scenario() {
        let calc = InvoiceCalculator::new(TaxMode::Inclusive);
        let line = calc.line(&scenario_item());

        let expected_taxable = 900.0 * 100.0 / 118.0;
        assert_eq!(line.taxable_amount, expected_taxable);
        assert!((line.taxable_amount - 762.711_864_406_779_7).abs() < 1e-9);
        assert!((line.cgst - 68.644_067_796_610_17).abs() < 1e-9);
        assert_eq!(line.cgst, line.sgst);

        let totals = calc.totals(&[scenario_item()], 0.25);
        assert!((totals.total_tax - 137.288_135_593_220_34).abs() < 1e-9);
        assert!(close(
            totals.grand_total,
            totals.total_taxable_amount + totals.total_tax + 0.25
        ));
        // Backing tax out recovers the discounted amount.
        assert!(close(totals.total_taxable_amount + totals.total_tax, 900.0));
    }

    #[test]
    fn test_policies_differ_materially() {
        let exclusive = calculate_totals(&[scenario_item()], 0.0, TaxMode::Exclusive);
        let inclusive = calculate_totals(&[scenario_item()], 0.0, TaxMode::Inclusive);
        assert!(exclusive.grand_total - inclusive.grand_total > 160.0);
    }

    #[test]
    fn test_zero_discount_taxable_equals_base() {
        for item in sample_items() {
            let item = LineItem {
                discount_value: 0.0,
                ..item
            };
            let line_total = item.quantity * item.unit_price;

            let exclusive = calculate_line(&item, TaxMode::Exclusive);
            assert_eq!(exclusive.taxable_amount, line_total);

            let inclusive = calculate_line(&item, TaxMode::Inclusive);
            assert_eq!(
                inclusive.taxable_amount,
                line_total * 100.0 / (100.0 + item.rates.cgst + item.rates.sgst)
            );
        }
    }

    #[test]
    fn test_discount_exceeding_line_total_is_clamped() {
        let item = LineItem {
            quantity: 1.0,
            unit_price: 40.0,
            discount_mode: DiscountMode::Amount,
            discount_value: 75.0,
            rates: TaxRates::intra_state(18.0),
            ..LineItem::default()
        };

        for mode in [TaxMode::Exclusive, TaxMode::Inclusive] {
            let line = calculate_line(&item, mode);
            assert_eq!(line.discount, 75.0);
            assert_eq!(line.taxable_amount, 0.0);
            assert_eq!(line.total_tax(), 0.0);
        }

        let pct = LineItem {
            discount_mode: DiscountMode::Percentage,
            discount_value: 150.0,
            ..item
        };
        let line = calculate_line(&pct, TaxMode::Exclusive);
        assert_eq!(line.discount, 60.0);
        assert_eq!(line.taxable_amount, 0.0);
    }

    #[test]
    fn test_excess_discount_does_not_reduce_other_lines() {
        let calc = InvoiceCalculator::new(TaxMode::Exclusive);
        let overdiscounted = LineItem {
            unit_price: 10.0,
            discount_mode: DiscountMode::Amount,
            discount_value: 500.0,
            ..LineItem::default()
        };

        let alone = calc.totals(&[scenario_item()], 0.0);
        let together = calc.totals(&[scenario_item(), overdiscounted], 0.0);
        assert_eq!(together.total_taxable_amount, alone.total_taxable_amount);
        assert_eq!(together.grand_total, alone.grand_total);
        assert_eq!(together.total_discount, alone.total_discount + 500.0);
    }

    #[test]
    fn test_discount_and_taxable_never_negative() {
        let mut items = sample_items();
        items.push(LineItem {
            discount_value: -20.0,
            unit_price: 10.0,
            ..LineItem::default()
        });

        for mode in [TaxMode::Exclusive, TaxMode::Inclusive] {
            for line in InvoiceCalculator::new(mode).lines(&items) {
                assert!(line.discount >= 0.0);
                assert!(line.taxable_amount >= 0.0);
            }
        }
    }

    #[test]
    fn test_total_tax_is_sum_of_components() {
        for mode in [TaxMode::Exclusive, TaxMode::Inclusive] {
            let t = calculate_totals(&sample_items(), 0.37, mode);
            assert_eq!(t.total_tax, t.total_cgst + t.total_sgst + t.total_igst + t.total_cess);
            assert!(close(t.grand_total, t.total_taxable_amount + t.total_tax + t.round_off_amount));
        }
    }

    #[test]
    fn test_components_are_independent() {
        let item = LineItem {
            unit_price: 1000.0,
            rates: TaxRates {
                cgst: 2.5,
                sgst: 2.5,
                igst: 5.0,
                cess: 1.0,
            },
            ..LineItem::default()
        };
        let line = calculate_line(&item, TaxMode::Exclusive);
        assert_eq!(line.cgst, 25.0);
        assert_eq!(line.sgst, 25.0);
        assert_eq!(line.igst, 50.0);
        assert_eq!(line.cess, 10.0);
        assert_eq!(line.line_amount(), 1110.0);
    }

    #[test]
    fn test_empty_invoice_only_carries_round_off() {
        let calc = InvoiceCalculator::new(TaxMode::Exclusive);
        let totals = calc.totals(&[], 0.45);

        assert_eq!(totals.subtotal, 0.0);
        assert_eq!(totals.total_discount, 0.0);
        assert_eq!(totals.total_taxable_amount, 0.0);
        assert_eq!(totals.total_tax, 0.0);
        assert_eq!(totals.round_off_amount, 0.45);
        assert_eq!(totals.grand_total, 0.45);
        assert_eq!(totals, AggregateTotals::empty(0.45));
    }

    #[test]
    fn test_add_then_remove_line_restores_totals() {
        let calc = InvoiceCalculator::new(TaxMode::Inclusive);
        let mut items = sample_items();
        let before = calc.totals(&items, -0.2);

        items.push(scenario_item());
        assert_ne!(calc.totals(&items, -0.2), before);

        items.pop();
        assert_eq!(calc.totals(&items, -0.2), before);
    }

    #[test]
    fn test_in_progress_rows_do_not_fail() {
        let calc = InvoiceCalculator::new(TaxMode::Inclusive);
        let typing = LineItem {
            quantity: 0.0,
            unit_price: 500.0,
            rates: TaxRates::intra_state(18.0),
            ..LineItem::default()
        };
        let blank = LineItem {
            quantity: f64::NAN,
            unit_price: f64::NAN,
            discount_value: f64::NAN,
            ..LineItem::default()
        };

        for item in [typing, blank] {
            let line = calc.line(&item);
            assert_eq!(line, LineBreakdown::default());
        }

        let totals = calc.totals(&[LineItem::default()], f64::NAN);
        assert_eq!(totals.grand_total, 0.0);
    }

    #[test]
    fn test_rounded_totals_for_display() {
        let totals = calculate_totals(&[scenario_item()], 0.0, TaxMode::Inclusive).rounded();
        assert_eq!(totals.total_taxable_amount, 762.71);
        assert_eq!(totals.total_cgst, 68.64);
        assert_eq!(totals.total_sgst, 68.64);
        assert_eq!(totals.total_tax, 137.29);
        assert_eq!(totals.grand_total, 900.0);

        let line = calculate_line(&scenario_item(), TaxMode::Inclusive).rounded();
        assert_eq!(line.taxable_amount, 762.71);
    }

    #[test]
    fn test_totals_serialize_camel_case() {
        let json = serde_json::to_value(AggregateTotals::empty(1.0)).unwrap();
        assert_eq!(json["totalTaxableAmount"], 0.0);
        assert_eq!(json["roundOffAmount"], 1.0);
        assert_eq!(json["grandTotal"], 1.0);
    }
}
