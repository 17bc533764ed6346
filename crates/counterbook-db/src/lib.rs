//! # counterbook-db: Database Layer for Counterbook
//!
//! SQLite storage for the item master, unit conversions and counter sales,
//! accessed asynchronously through sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Counterbook Data Flow                              │
//! │                                                                         │
//! │  Admin command (submit_invoice)                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  counterbook-db (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────────┐  ┌────────────┐  │   │
//! │  │   │   Database    │    │    Repositories    │  │ Migrations │  │   │
//! │  │   │   (pool.rs)   │    │                    │  │ (embedded) │  │   │
//! │  │   │               │    │ ItemRepository     │  │            │  │   │
//! │  │   │ SqlitePool    │◄───│ UnitConversionRepo │  │ 001_init   │  │   │
//! │  │   │ WAL, FKs on   │    │ SaleRepository     │  │            │  │   │
//! │  │   └───────────────┘    └────────────────────┘  └────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (platform data dir)/counterbook.db                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (item, unit conversion, sale)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use counterbook_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/counterbook.db")).await?;
//!
//! let items = db.items().search("lap", 20).await?;
//! let stored = db.sales().create(sale).await?;
//! println!("{}", stored.invoice_number); // CS-20261019-0001
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::item::ItemRepository;
pub use repository::sale::{format_invoice_number, SaleRepository};
pub use repository::unit_conversion::UnitConversionRepository;
