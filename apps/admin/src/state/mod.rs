//! # State Module
//!
//! Application state for the admin panel, one type per concern.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐ ┌──────────────┐ ┌──────────────┐ ┌──────────────┐   │
//! │  │   DbState    │ │ SessionState │ │ InvoiceState │ │ ConfigState  │   │
//! │  │              │ │              │ │              │ │              │   │
//! │  │  Database    │ │  Arc<Mutex<  │ │  Arc<Mutex<  │ │  store_name  │   │
//! │  │  (SQLite     │ │   Session    │ │   Invoice    │ │  tax_mode    │   │
//! │  │   pool)      │ │   Context>>  │ │   Draft>>    │ │  debounce    │   │
//! │  │              │ │              │ │  + watch tx  │ │              │   │
//! │  └──────────────┘ └──────────────┘ └──────────────┘ └──────────────┘   │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • DbState: Database has internal connection pool (thread-safe)        │
//! │  • SessionState / InvoiceState: Arc<Mutex<T>> for exclusive access     │
//! │  • ConfigState: Read-only after initialization                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod db;
mod invoice;
mod session;

pub use config::ConfigState;
pub use db::DbState;
pub use invoice::{InvoiceState, Submission};
pub use session::SessionState;
