//! # Dashboard Commands
//!
//! Sales figures for the landing page and the sale detail view.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::error::ApiError;
use crate::state::{ConfigState, DbState, SessionState};
use counterbook_core::{CounterSale, SaleListEntry, SalesSummary};

/// Inclusive order-date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    #[ts(as = "String")]
    pub from: NaiveDate,
    #[ts(as = "String")]
    pub to: NaiveDate,
}

impl DateRange {
    pub fn today() -> Self {
        let today = Utc::now().date_naive();
        DateRange { from: today, to: today }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub range: DateRange,
    pub summary: SalesSummary,
    pub average_invoice: f64,
    /// Latest invoices regardless of the range.
    pub recent: Vec<SaleListEntry>,
}

/// Sales summary for `range` (default: today) plus the latest invoices.
pub async fn get_dashboard(
    db: &DbState,
    config: &ConfigState,
    session: &SessionState,
    range: Option<DateRange>,
) -> Result<DashboardResponse, ApiError> {
    session.require_user()?;

    let range = range.unwrap_or_else(DateRange::today);
    debug!(from = %range.from, to = %range.to, "get_dashboard command");

    if range.from > range.to {
        return Err(ApiError::validation("Start date must not be after end date"));
    }

    let sales = db.inner().sales();
    let summary = sales.summary_between(range.from, range.to).await?;
    let recent = sales.list_recent(config.recent_sales_limit).await?;

    Ok(DashboardResponse {
        range,
        average_invoice: summary.average_invoice(),
        summary,
        recent,
    })
}

/// A stored sale with all its lines.
pub async fn get_sale(
    db: &DbState,
    session: &SessionState,
    id: String,
) -> Result<CounterSale, ApiError> {
    session.require_user()?;
    debug!(id = %id, "get_sale command");

    db.inner()
        .sales()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Sale", &id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::invoice::{select_item, submit_invoice, update_header};
    use crate::commands::item::create_item;
    use crate::commands::test_support::{laptop_input, signed_in};
    use crate::error::ErrorCode;
    use counterbook_core::HeaderUpdate;

    #[tokio::test]
    async fn test_dashboard_counts_todays_sales() {
        let app = signed_in().await;

        let empty = get_dashboard(&app.db, &app.config, &app.session, None)
            .await
            .unwrap();
        assert_eq!(empty.summary, SalesSummary::default());
        assert_eq!(empty.average_invoice, 0.0);
        assert!(empty.recent.is_empty());

        let laptop = create_item(&app.db, &app.session, laptop_input()).await.unwrap();
        for customer in ["Asha Traders", "Walk-in"] {
            select_item(&app.db, &app.invoice, &app.session, 0, laptop.id.clone())
                .await
                .unwrap();
            update_header(
                &app.invoice,
                &app.session,
                HeaderUpdate {
                    customer_name: Some(customer.to_string()),
                    ..HeaderUpdate::default()
                },
            )
            .unwrap();
            submit_invoice(&app.db, &app.invoice, &app.session)
                .await
                .unwrap();
        }

        let dashboard = get_dashboard(&app.db, &app.config, &app.session, None)
            .await
            .unwrap();
        assert_eq!(dashboard.summary.invoice_count, 2);
        assert!((dashboard.summary.gross_total - 118000.0).abs() < 1e-6);
        assert!((dashboard.average_invoice - 59000.0).abs() < 1e-6);
        assert_eq!(dashboard.recent.len(), 2);

        let sale = get_sale(&app.db, &app.session, dashboard.recent[0].id.clone())
            .await
            .unwrap();
        assert_eq!(sale.lines.len(), 1);
    }

    #[tokio::test]
    async fn test_inverted_range_rejected() {
        let app = signed_in().await;
        let today = Utc::now().date_naive();
        let err = get_dashboard(
            &app.db,
            &app.config,
            &app.session,
            Some(DateRange {
                from: today,
                to: today.pred_opt().unwrap(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let missing = get_sale(&app.db, &app.session, "nope".into()).await.unwrap_err();
        assert_eq!(missing.code, ErrorCode::NotFound);
    }
}
