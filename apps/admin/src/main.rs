//! # Counterbook Admin Entry Point
//!
//! Headless start-up check for the admin application layer: loads the
//! configuration, opens (and migrates) the database, then reports what the
//! admin panel would see on its dashboard.
//!
//! ```bash
//! COUNTERBOOK_DB_PATH=./counterbook_dev.db cargo run -p counterbook-admin
//! ```

use chrono::Utc;
use counterbook_core::Money;
use tracing::info;

use counterbook_admin::state::ConfigState;
use counterbook_admin::{bootstrap, init_tracing};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    info!("Starting Counterbook admin");

    let config = ConfigState::from_env();
    let services = bootstrap(config).await?;
    let db = services.db.inner();

    let items = db.items().count().await?;
    let today = Utc::now().date_naive();
    let summary = db.sales().summary_between(today, today).await?;

    info!(
        items,
        invoices_today = summary.invoice_count,
        gross_today = %services.config.format_currency(Money::from_amount(summary.gross_total)),
        healthy = db.health_check().await,
        "Counterbook admin ready"
    );

    db.close().await;
    Ok(())
}
