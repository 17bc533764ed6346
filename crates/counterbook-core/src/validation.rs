//! # Validation Module
//!
//! Input validation utilities for Counterbook.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Admin panel (browser)                                         │
//! │  ├── Basic format checks (empty, length)                                │
//! │  └── Immediate user feedback                                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Command (Rust)                                                │
//! │  ├── Type validation (deserialization)                                  │
//! │  └── THIS MODULE: Business rule validation                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                             │
//! │  ├── NOT NULL / CHECK constraints                                       │
//! │  ├── UNIQUE constraints (item code, conversion pair)                    │
//! │  └── Foreign key constraints                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Single-field validators return [`ValidationError`] and stop at the first
//! problem. Whole forms go through a [`FormReport`], which keeps *every*
//! failure keyed by its path (`items.0.quantity`) and turns into
//! [`CoreError::InvalidForm`].
//!
//! ## Usage
//! ```rust
//! use counterbook_core::validation::{validate_item_code, validate_quantity};
//!
//! assert!(validate_item_code("ITEM-001").is_ok());
//! assert!(validate_quantity("quantity", 0.0).is_err());
//! ```

use crate::error::{CoreError, CoreResult, FieldError, ValidationError};
use crate::types::{DiscountMode, ItemInput, LineItem, UnitConversion};
use crate::{MAX_INVOICE_LINES, MAX_PERCENT};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an item code.
///
/// ## Rules
/// - Must not be empty
/// - Must be between 1 and 50 characters
/// - Should contain only alphanumeric characters, hyphens, underscores
///
/// ## Example
/// ```rust
/// use counterbook_core::validation::validate_item_code;
///
/// assert!(validate_item_code("ITEM001").is_ok());
/// assert!(validate_item_code("").is_err());
/// assert!(validate_item_code("A".repeat(100).as_str()).is_err());
/// ```
pub fn validate_item_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.chars().count() > 50 {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: 50,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates an item name.
///
/// ## Rules
/// - Must not be empty
/// - Must be between 1 and 200 characters
pub fn validate_item_name(name: &str) -> ValidationResult<()> {
    required_text("name", name, 200)
}

/// Validates the customer name on an invoice (required, at most 200 chars).
pub fn validate_customer_name(name: &str) -> ValidationResult<()> {
    required_text("customerName", name, 200)
}

/// Validates a unit code used in a conversion.
pub fn validate_unit(field: &str, unit: &str) -> ValidationResult<()> {
    required_text(field, unit, 20)
}

fn required_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (lists active items)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

fn finite(field: &str, value: f64) -> ValidationResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValidationError::NotANumber {
            field: field.to_string(),
        })
    }
}

/// Validates a line quantity.
///
/// ## Rules
/// - Must be a finite number
/// - Must be positive (> 0); fractional quantities are fine (2.5 kg)
pub fn validate_quantity(field: &str, qty: f64) -> ValidationResult<()> {
    if finite(field, qty)? <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a price or unit price.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free items)
///
/// ## Example
/// ```rust
/// use counterbook_core::validation::validate_price;
///
/// assert!(validate_price("price", 10.99).is_ok());
/// assert!(validate_price("price", 0.0).is_ok());
/// assert!(validate_price("price", -1.0).is_err());
/// ```
pub fn validate_price(field: &str, price: f64) -> ValidationResult<()> {
    if finite(field, price)? < 0.0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a tax rate percentage (0 to 100 inclusive).
pub fn validate_rate(field: &str, rate: f64) -> ValidationResult<()> {
    let rate = finite(field, rate)?;
    if !(0.0..=MAX_PERCENT).contains(&rate) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0.0,
            max: MAX_PERCENT,
        });
    }
    Ok(())
}

/// Validates a line discount.
///
/// ## Rules
/// ```text
/// ┌──────────────┬─────────────────────────────┐
/// │ Mode         │ Allowed value               │
/// ├──────────────┼─────────────────────────────┤
/// │ PERCENTAGE   │ 0 ..= 100                   │
/// │ AMOUNT       │ >= 0 (may exceed the line;  │
/// │              │ the line is clamped at 0)   │
/// └──────────────┴─────────────────────────────┘
/// ```
pub fn validate_discount(field: &str, mode: DiscountMode, value: f64) -> ValidationResult<()> {
    match mode {
        DiscountMode::Percentage => validate_rate(field, value),
        DiscountMode::Amount => validate_price(field, value),
    }
}

/// Validates a unit conversion factor (> 0).
pub fn validate_conversion_factor(factor: f64) -> ValidationResult<()> {
    validate_quantity("conversionFactor", factor)
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates that one more line can be added to an invoice.
///
/// ## Rules
/// - Must not exceed MAX_INVOICE_LINES (100)
pub fn validate_line_capacity(current_lines: usize) -> CoreResult<()> {
    if current_lines >= MAX_INVOICE_LINES {
        return Err(CoreError::TooManyLines {
            max: MAX_INVOICE_LINES,
        });
    }
    Ok(())
}

// =============================================================================
// Form Reports
// =============================================================================

/// Collects field failures for a whole form instead of stopping at the first.
#[derive(Debug, Default)]
pub struct FormReport {
    errors: Vec<FieldError>,
}

impl FormReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `result` under `path` if it failed.
    pub fn check(&mut self, path: impl Into<String>, result: ValidationResult<()>) -> &mut Self {
        if let Err(err) = result {
            self.errors.push(FieldError::new(path, err.to_string()));
        }
        self
    }

    pub fn push(&mut self, path: impl Into<String>, message: impl Into<String>) -> &mut Self {
        self.errors.push(FieldError::new(path, message));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// `Ok(())` when nothing failed, otherwise [`CoreError::InvalidForm`].
    pub fn into_result(self) -> CoreResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(CoreError::InvalidForm {
                errors: self.errors,
            })
        }
    }
}

/// Validates the item master create/edit form.
pub fn validate_item_input(input: &ItemInput) -> CoreResult<()> {
    let mut report = FormReport::new();
    report
        .check("code", validate_item_code(&input.code))
        .check("name", validate_item_name(&input.name))
        .check("price", validate_price("price", input.price))
        .check("cgst", validate_rate("cgst", input.cgst))
        .check("sgst", validate_rate("sgst", input.sgst))
        .check("igst", validate_rate("igst", input.igst))
        .check("cess", validate_rate("cess", input.cess));
    report.into_result()
}

/// Validates one invoice line, recording failures under `items.{index}.*`.
pub fn validate_line(report: &mut FormReport, index: usize, line: &LineItem) {
    let path = |field: &str| format!("items.{}.{}", index, field);

    if line.item.is_none() {
        report.push(path("item"), "item is required");
    }
    report
        .check(path("quantity"), validate_quantity("quantity", line.quantity))
        .check(path("unitPrice"), validate_price("unitPrice", line.unit_price))
        .check(
            path("discountValue"),
            validate_discount("discountValue", line.discount_mode, line.discount_value),
        )
        .check(path("cgstRate"), validate_rate("cgstRate", line.rates.cgst))
        .check(path("sgstRate"), validate_rate("sgstRate", line.rates.sgst))
        .check(path("igstRate"), validate_rate("igstRate", line.rates.igst))
        .check(path("cessRate"), validate_rate("cessRate", line.rates.cess));
}

/// Validates the counter-sale form before submission.
///
/// ## Rules
/// - Customer name required
/// - At least one line, at most MAX_INVOICE_LINES
/// - Every line passes [`validate_line`]
pub fn validate_invoice(customer_name: &str, items: &[LineItem]) -> CoreResult<()> {
    let mut report = FormReport::new();
    report.check("customerName", validate_customer_name(customer_name));

    if items.is_empty() {
        report.push("items", "at least one item is required");
    } else if items.len() > MAX_INVOICE_LINES {
        report.push(
            "items",
            format!("at most {} items are allowed", MAX_INVOICE_LINES),
        );
    }

    for (index, line) in items.iter().enumerate() {
        validate_line(&mut report, index, line);
    }

    report.into_result()
}

/// Validates a new unit conversion against the item's existing ones.
///
/// Field problems come back as [`CoreError::InvalidForm`]; an already defined
/// `(from, to)` pair as [`CoreError::DuplicateConversion`].
pub fn validate_unit_conversion(
    from_unit: &str,
    to_unit: &str,
    factor: f64,
    existing: &[UnitConversion],
) -> CoreResult<()> {
    let mut report = FormReport::new();
    report
        .check("fromUnit", validate_unit("fromUnit", from_unit))
        .check("toUnit", validate_unit("toUnit", to_unit))
        .check("conversionFactor", validate_conversion_factor(factor));

    if !from_unit.trim().is_empty() && from_unit.trim() == to_unit.trim() {
        report.push("toUnit", "From Unit and To Unit cannot be the same");
    }
    report.into_result()?;

    if existing.iter().any(|c| c.same_pair(from_unit, to_unit)) {
        return Err(CoreError::DuplicateConversion {
            from: from_unit.trim().to_string(),
            to: to_unit.trim().to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
