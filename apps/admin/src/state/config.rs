//! # Configuration State
//!
//! Stores application configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`COUNTERBOOK_*`)
//! 2. Defaults (this file)
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no mutex needed.

use std::time::Duration;

use counterbook_core::{Money, TaxMode, DEFAULT_RECOMPUTE_DEBOUNCE_MS};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ConfigState {
    /// Store name (shown in the panel header and on printed invoices)
    pub store_name: String,

    /// Currency code (ISO 4217)
    pub currency_code: String,

    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// Taxable base policy for the invoice calculator
    pub tax_mode: TaxMode,

    /// Quiet period before totals are recomputed after an edit
    pub recompute_debounce_ms: u64,

    /// Default number of rows returned by the item lookup
    pub search_limit: u32,

    /// Number of invoices listed on the dashboard
    pub recent_sales_limit: u32,
}

impl Default for ConfigState {
    /// Returns default configuration suitable for development.
    ///
    /// ## Default Values
    /// - Store: "Counterbook Dev Store"
    /// - Currency: INR (₹)
    /// - Tax: exclusive
    /// - Debounce: 300 ms
    fn default() -> Self {
        ConfigState {
            store_name: "Counterbook Dev Store".to_string(),
            currency_code: "INR".to_string(),
            currency_symbol: "₹".to_string(),
            tax_mode: TaxMode::Exclusive,
            recompute_debounce_ms: DEFAULT_RECOMPUTE_DEBOUNCE_MS,
            search_limit: 20,
            recent_sales_limit: 10,
        }
    }
}

impl ConfigState {
    /// Creates a new ConfigState from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `COUNTERBOOK_STORE_NAME`: Override store name
    /// - `COUNTERBOOK_TAX_MODE`: `exclusive` or `inclusive`
    /// - `COUNTERBOOK_DEBOUNCE_MS`: Recompute debounce in milliseconds
    /// - `COUNTERBOOK_SEARCH_LIMIT`: Default item lookup size
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    ///
    /// Unparseable values are logged and the default is kept.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ConfigState::default();

        if let Some(store_name) = lookup("COUNTERBOOK_STORE_NAME") {
            config.store_name = store_name;
        }

        if let Some(mode) = lookup("COUNTERBOOK_TAX_MODE") {
            match mode.parse::<TaxMode>() {
                Ok(mode) => config.tax_mode = mode,
                Err(e) => tracing::warn!(%e, "Ignoring COUNTERBOOK_TAX_MODE"),
            }
        }

        if let Some(ms) = lookup("COUNTERBOOK_DEBOUNCE_MS") {
            match ms.trim().parse::<u64>() {
                Ok(ms) => config.recompute_debounce_ms = ms,
                Err(e) => tracing::warn!(%e, value = %ms, "Ignoring COUNTERBOOK_DEBOUNCE_MS"),
            }
        }

        if let Some(limit) = lookup("COUNTERBOOK_SEARCH_LIMIT") {
            match limit.trim().parse::<u32>() {
                Ok(limit) if limit > 0 => config.search_limit = limit,
                _ => tracing::warn!(value = %limit, "Ignoring COUNTERBOOK_SEARCH_LIMIT"),
            }
        }

        config
    }

    pub fn recompute_debounce(&self) -> Duration {
        Duration::from_millis(self.recompute_debounce_ms)
    }

    /// Formats an amount with the configured symbol. Always two decimals,
    /// the paise scale of [`Money`].
    ///
    /// ## Example
    /// ```rust,ignore
    /// let config = ConfigState::default();
    /// assert_eq!(config.format_currency(Money::from_paise(123456)), "₹1234.56");
    /// ```
    pub fn format_currency(&self, amount: Money) -> String {
        format!(
            "{}{}{}.{:02}",
            if amount.is_negative() { "-" } else { "" },
            self.currency_symbol,
            amount.rupees().abs(),
            amount.paise_part()
        )
    }
}
