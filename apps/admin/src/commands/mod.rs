//! # Commands Module
//!
//! Everything the admin panel UI can call.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs        ◄─── You are here (exports)
//! ├── session.rs    ◄─── Sign in/out, token refresh
//! ├── item.rs       ◄─── Item master search, CRUD, unit conversions
//! ├── invoice.rs    ◄─── Counter-sale draft editing and submission
//! ├── dashboard.rs  ◄─── Sales summary, recent invoices
//! └── config.rs     ◄─── Configuration retrieval
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UI host (web view / HTTP bridge)                                       │
//! │       │  updateLine({ index: 0, update: { field, value } })             │
//! │       ▼                                                                 │
//! │  commands::invoice::update_line(                                        │
//! │      &services.invoice,   ◄── state the command needs                   │
//! │      &services.session,   ◄── every data command checks the session     │
//! │      index, update,       ◄── deserialized arguments                    │
//! │  ) -> Result<InvoiceResponse, ApiError>                                 │
//! │       │                                                                 │
//! │       ▼  (JSON serialization)                                           │
//! │  UI receives InvoiceResponse or { code, message, fieldErrors? }         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each command takes only the state objects it needs.

pub mod config;
pub mod dashboard;
pub mod invoice;
pub mod item;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support {
    use std::time::Duration;

    use counterbook_core::{AuthTokens, ItemInput, SessionUser};

    use crate::state::ConfigState;
    use crate::AppServices;

    /// In-memory services with a signed-in user `u-1` and no debounce.
    pub async fn signed_in() -> AppServices {
        let config = ConfigState {
            recompute_debounce_ms: 0,
            ..ConfigState::default()
        };
        let app = AppServices::in_memory(config).await.unwrap();
        assert_eq!(app.config.recompute_debounce(), Duration::ZERO);

        super::session::sign_in(
            &app.session,
            SessionUser {
                id: "u-1".to_string(),
                username: "admin".to_string(),
                display_name: "Admin".to_string(),
            },
            AuthTokens {
                access_token: "access".to_string(),
                refresh_token: None,
                expires_at: None,
            },
        );
        app
    }

    pub fn laptop_input() -> ItemInput {
        ItemInput {
            code: "ITEM001".to_string(),
            name: "Laptop".to_string(),
            price: 50000.0,
            cgst: 9.0,
            sgst: 9.0,
            ..ItemInput::default()
        }
    }
}
