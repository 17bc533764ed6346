//! # counterbook-core: Pure Business Logic for Counterbook
//!
//! This crate is the **heart** of the counter-sales back office. It contains
//! the invoice tax engine, form records, validation and session bookkeeping
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Counterbook Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Admin Panel (browser)                        │   │
//! │  │   Login ──► Dashboard ──► Item Master ──► Counter Sale Invoice  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ commands                               │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/admin (state + commands)                │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ counterbook-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │  ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌──────────┐  │   │
//! │  │  │  types  │ │ invoice │ │  draft  │ │ session │ │validation│  │   │
//! │  │  │LineItem │ │  Calc   │ │  Form   │ │ Context │ │  rules   │  │   │
//! │  │  └─────────┘ └─────────┘ └─────────┘ └─────────┘ └──────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               counterbook-db (Database Layer)                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (LineItem, CatalogItem, CounterSale, etc.)
//! - [`invoice`] - The line/aggregate GST calculator
//! - [`draft`] - The counter-sale form record and its edit operations
//! - [`money`] - Paise-precision money for display
//! - [`session`] - Explicit session context (user + tokens)
//! - [`validation`] - Field-level business rule validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use counterbook_core::invoice::InvoiceCalculator;
//! use counterbook_core::types::{DiscountMode, LineItem, TaxMode, TaxRates};
//!
//! let line = LineItem {
//!     quantity: 2.0,
//!     unit_price: 500.0,
//!     discount_mode: DiscountMode::Percentage,
//!     discount_value: 10.0,
//!     rates: TaxRates::intra_state(18.0),
//!     ..LineItem::default()
//! };
//!
//! let totals = InvoiceCalculator::new(TaxMode::Exclusive).totals(&[line], 0.0);
//! assert_eq!(totals.total_taxable_amount, 900.0);
//! assert_eq!(totals.total_tax, 162.0);
//! assert_eq!(totals.grand_total, 1062.0);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod draft;
pub mod error;
pub mod invoice;
pub mod money;
pub mod session;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use draft::{HeaderUpdate, InvoiceDraft, LineUpdate};
pub use error::{CoreError, CoreResult, FieldError, ValidationError};
pub use invoice::{AggregateTotals, InvoiceCalculator, LineBreakdown};
pub use money::Money;
pub use session::{AuthTokens, SessionContext, SessionUser};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum line items allowed on a single counter-sale invoice.
pub const MAX_INVOICE_LINES: usize = 100;

/// Upper bound for any percentage field (tax rates, percentage discounts).
pub const MAX_PERCENT: f64 = 100.0;

/// Default delay before a debounced totals recompute fires.
pub const DEFAULT_RECOMPUTE_DEBOUNCE_MS: u64 = 300;
