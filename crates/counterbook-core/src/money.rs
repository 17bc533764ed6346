//! # Money Module
//!
//! Provides the `Money` type used when amounts leave the calculator for
//! display or storage in whole paise.
//!
//! ## Full Precision In, Paise Out
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  WHERE ROUNDING HAPPENS                                                 │
//! │                                                                         │
//! │  InvoiceCalculator works on f64 with full precision:                    │
//! │    900 × 100 / 118 = 762.711864406...                                   │
//! │                                                                         │
//! │  Only the presentation edge rounds, exactly once:                       │
//! │    Money::from_amount(762.711864406) = 76271 paise = ₹762.71           │
//! │                                                                         │
//! │  Rounding earlier (per line, per tax) makes the grand total drift       │
//! │  from the sum of its parts.                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use counterbook_core::money::Money;
//!
//! let shown = Money::from_amount(762.711864406);
//! assert_eq!(shown.paise(), 76271);
//! assert_eq!(shown.to_string(), "₹762.71");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (paise for INR).
///
/// ## Design Decisions
/// - **i64 (signed)**: round-off adjustments can be negative
/// - **Single field tuple struct**: Zero-cost abstraction over i64
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise.
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Rounds a full-precision amount to the nearest paisa.
    ///
    /// Halves round away from zero (`0.005 → 0.01`, `-0.005 → -0.01`), the
    /// same way the invoice screen's two-decimal display does. Non-finite
    /// input becomes zero.
    ///
    /// ## Example
    /// ```rust
    /// use counterbook_core::money::Money;
    ///
    /// assert_eq!(Money::from_amount(10.994).paise(), 1099);
    /// assert_eq!(Money::from_amount(-5.5).paise(), -550);
    /// assert_eq!(Money::from_amount(f64::NAN).paise(), 0);
    /// ```
    pub fn from_amount(amount: f64) -> Self {
        if !amount.is_finite() {
            return Money::zero();
        }
        // 1.005 is stored as 1.00499999...; the epsilon rounds it up like
        // the two-decimal display does.
        let scaled = amount * 100.0;
        let nudged = scaled + scaled.signum() * 1e-7;
        Money(nudged.round() as i64)
    }

    /// Returns the value in paise.
    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Returns the whole rupee portion.
    #[inline]
    pub const fn rupees(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the paise portion (always 0-99).
    #[inline]
    pub const fn paise_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Back to a decimal amount, e.g. for a rounded display record.
    #[inline]
    pub fn as_amount(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }
}

/// Rounds an amount to two decimals for display.
#[inline]
pub fn round2(amount: f64) -> f64 {
    Money::from_amount(amount).as_amount()
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-friendly rupee formatting. Localised grouping (lakh/crore) is the
/// front end's job.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}₹{}.{:02}",
            sign,
            self.rupees().abs(),
            self.paise_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_paise() {
        let money = Money::from_paise(1099);
        assert_eq!(money.paise(), 1099);
        assert_eq!(money.rupees(), 10);
        assert_eq!(money.paise_part(), 99);
    }

    #[test]
    fn test_from_amount_rounding() {
        assert_eq!(Money::from_amount(762.7118644).paise(), 76271);
        assert_eq!(Money::from_amount(68.6440677).paise(), 6864);
        assert_eq!(Money::from_amount(1.005).paise(), 101);
        assert_eq!(Money::from_amount(-1.005).paise(), -101);
        assert_eq!(Money::from_amount(0.0).paise(), 0);
        assert_eq!(Money::from_amount(f64::INFINITY).paise(), 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_paise(106200).to_string(), "₹1062.00");
        assert_eq!(Money::from_paise(500).to_string(), "₹5.00");
        assert_eq!(Money::from_paise(-550).to_string(), "-₹5.50");
        assert_eq!(Money::from_paise(0).to_string(), "₹0.00");
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(137.28813559), 137.29);
        assert_eq!(round2(-0.456), -0.46);
        assert_eq!(round2(900.0), 900.0);
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_paise(1000);
        let b = Money::from_paise(250);

        assert_eq!((a + b).paise(), 1250);
        assert_eq!((a - b).paise(), 750);

        let mut c = Money::zero();
        c += a;
        assert_eq!(c, a);
        assert!((b - a).is_negative());
        assert_eq!((b - a).abs().paise(), 750);
    }

    /// Summing rounded parts can disagree with rounding the sum; this is why
    /// totals are rounded from the full-precision aggregate.
    #[test]
    fn test_rounding_parts_drift_documented() {
        let parts = [0.333_333, 0.333_333, 0.333_333];
        let rounded_parts: Money = parts
            .iter()
            .map(|p| Money::from_amount(*p))
            .fold(Money::zero(), |acc, m| acc + m);
        let rounded_sum = Money::from_amount(parts.iter().sum());

        assert_eq!(rounded_parts.paise(), 99);
        assert_eq!(rounded_sum.paise(), 100);
    }
}
