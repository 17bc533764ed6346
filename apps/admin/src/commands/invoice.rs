//! # Invoice Commands
//!
//! Commands behind the counter-sale entry form.
//!
//! ## Draft Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Counter Sale Lifecycle                               │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────────┐     ┌──────────┐     ┌──────────┐   │
//! │  │  Blank   │────►│   Editing    │────►│ Validate │────►│  Stored  │   │
//! │  │  Draft   │     │              │     │   form   │     │  CS-...  │   │
//! │  └──────────┘     └──────────────┘     └──────────┘     └──────────┘   │
//! │       ▲                  │                   │                │         │
//! │       │            add_line              submit_invoice       │         │
//! │       │            select_item               │                │         │
//! │       │            update_line          fieldErrors           │         │
//! │       │            set_round_off        back to form          │         │
//! │       │            update_header                              │         │
//! │       │                                                       │         │
//! │       └──────────── reset_invoice ◄───────────────────────────┘         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every editing command answers with the whole form, the per-line
//! breakdowns and the totals, the last two rounded to 2 decimals.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use ts_rs::TS;

use crate::commands::item::find_item;
use crate::error::ApiError;
use crate::state::{DbState, InvoiceState, SessionState};
use counterbook_core::{
    AggregateTotals, HeaderUpdate, InvoiceDraft, LineBreakdown, LineUpdate, TaxMode,
};

/// Invoice form response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceResponse {
    pub draft: InvoiceDraft,
    /// One entry per draft line, same order.
    pub lines: Vec<LineBreakdown>,
    pub totals: AggregateTotals,
    pub tax_mode: TaxMode,
}

impl InvoiceResponse {
    fn from_state(invoice: &InvoiceState) -> Self {
        let calc = *invoice.calculator();
        invoice.with_draft(|d| InvoiceResponse {
            lines: d.breakdowns(&calc).iter().map(LineBreakdown::rounded).collect(),
            totals: d.totals(&calc).rounded(),
            tax_mode: calc.mode(),
            draft: d.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SubmitInvoiceResponse {
    pub sale_id: String,
    pub invoice_number: String,
    pub line_count: usize,
    /// Rounded for display; the stored sale keeps full precision.
    pub totals: AggregateTotals,
    /// The fresh draft that replaced the submitted one.
    pub next: InvoiceResponse,
}

pub fn get_invoice(invoice: &InvoiceState, session: &SessionState) -> Result<InvoiceResponse, ApiError> {
    session.require_user()?;
    debug!("get_invoice command");
    Ok(InvoiceResponse::from_state(invoice))
}

/// Appends a blank line (at most 100 per invoice).
pub fn add_line(invoice: &InvoiceState, session: &SessionState) -> Result<InvoiceResponse, ApiError> {
    session.require_user()?;
    debug!("add_line command");

    invoice.with_draft_mut(|d| d.add_line())?;
    Ok(InvoiceResponse::from_state(invoice))
}

pub fn remove_line(
    invoice: &InvoiceState,
    session: &SessionState,
    index: usize,
) -> Result<InvoiceResponse, ApiError> {
    session.require_user()?;
    debug!(index, "remove_line command");

    invoice.with_draft_mut(|d| d.remove_line(index))?;
    Ok(InvoiceResponse::from_state(invoice))
}

/// Fills line `index` from the item master.
pub async fn select_item(
    db: &DbState,
    invoice: &InvoiceState,
    session: &SessionState,
    index: usize,
    item_id: String,
) -> Result<InvoiceResponse, ApiError> {
    session.require_user()?;
    debug!(index, item_id = %item_id, "select_item command");

    let item = find_item(db.inner(), &item_id).await?;
    invoice.with_draft_mut(|d| d.select_item(index, &item))?;
    Ok(InvoiceResponse::from_state(invoice))
}

/// Edits one field of line `index`.
///
/// ## Wire Shape
/// ```json
/// { "index": 0, "update": { "field": "discountValue", "value": 10 } }
/// ```
pub fn update_line(
    invoice: &InvoiceState,
    session: &SessionState,
    index: usize,
    update: LineUpdate,
) -> Result<InvoiceResponse, ApiError> {
    session.require_user()?;
    debug!(index, ?update, "update_line command");

    invoice.with_draft_mut(|d| d.update_line(index, update))?;
    Ok(InvoiceResponse::from_state(invoice))
}

/// Sets the manual round-off; `None` clears it.
pub fn set_round_off(
    invoice: &InvoiceState,
    session: &SessionState,
    amount: Option<f64>,
) -> Result<InvoiceResponse, ApiError> {
    session.require_user()?;
    debug!(?amount, "set_round_off command");

    invoice.with_draft_mut(|d| d.set_round_off(amount));
    Ok(InvoiceResponse::from_state(invoice))
}

pub fn update_header(
    invoice: &InvoiceState,
    session: &SessionState,
    update: HeaderUpdate,
) -> Result<InvoiceResponse, ApiError> {
    session.require_user()?;
    debug!(?update, "update_header command");

    invoice.with_draft_mut(|d| d.update_header(update));
    Ok(InvoiceResponse::from_state(invoice))
}

pub fn reset_invoice(invoice: &InvoiceState, session: &SessionState) -> Result<InvoiceResponse, ApiError> {
    session.require_user()?;
    debug!("reset_invoice command");

    invoice.reset(Utc::now().date_naive());
    Ok(InvoiceResponse::from_state(invoice))
}

/// Validates and stores the draft, then starts a blank one.
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Click "Save"                                                           │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  1. Signed in? (created_by = user id)                                   │
/// │  2. Claim the draft; a second click while saving gets CONFLICT          │
/// │  3. Validate whole form, collect every failing field                    │
/// │  4. Freeze lines + full-precision totals into a CounterSale and         │
/// │     swap a blank draft in                                               │
/// │  5. Store in one transaction under CS-YYYYMMDD-NNNN                     │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
///
/// On a validation or database failure the submitted draft is put back.
pub async fn submit_invoice(
    db: &DbState,
    invoice: &InvoiceState,
    session: &SessionState,
) -> Result<SubmitInvoiceResponse, ApiError> {
    let user = session.require_user()?;
    debug!(user_id = %user.id, "submit_invoice command");

    let mut submission = invoice
        .begin_submit()
        .ok_or_else(|| ApiError::conflict("An invoice is already being submitted"))?;

    let calc = *invoice.calculator();
    let sale = submission.take_draft(Utc::now().date_naive(), |d| {
        d.to_counter_sale(&calc, Some(user.id.clone()))
    })?;

    let stored = db.inner().sales().create(sale).await?;
    submission.commit();

    info!(
        sale_id = %stored.id,
        invoice_number = %stored.invoice_number,
        lines = stored.lines.len(),
        grand_total = stored.totals.grand_total,
        "Invoice submitted"
    );

    Ok(SubmitInvoiceResponse {
        line_count: stored.lines.len(),
        totals: stored.totals.rounded(),
        sale_id: stored.id,
        invoice_number: stored.invoice_number,
        next: InvoiceResponse::from_state(invoice),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::item::create_item;
    use crate::commands::test_support::{laptop_input, signed_in};
    use crate::error::ErrorCode;
    use counterbook_core::{DiscountMode, ItemInput, PaymentMethod, MAX_INVOICE_LINES};

    #[tokio::test]
    async fn test_edit_and_submit_flow() {
        let app = signed_in().await;
        let mouse = create_item(
            &app.db,
            &app.session,
            ItemInput {
                code: "ITEM002".to_string(),
                name: "Mouse".to_string(),
                price: 500.0,
                cgst: 9.0,
                sgst: 9.0,
                ..ItemInput::default()
            },
        )
        .await
        .unwrap();

        select_item(&app.db, &app.invoice, &app.session, 0, mouse.id.clone())
            .await
            .unwrap();
        update_line(&app.invoice, &app.session, 0, LineUpdate::Quantity(2.0)).unwrap();
        update_line(
            &app.invoice,
            &app.session,
            0,
            LineUpdate::DiscountMode(DiscountMode::Percentage),
        )
        .unwrap();
        update_line(&app.invoice, &app.session, 0, LineUpdate::DiscountValue(10.0)).unwrap();
        set_round_off(&app.invoice, &app.session, Some(-0.4)).unwrap();
        let response = update_header(
            &app.invoice,
            &app.session,
            HeaderUpdate {
                customer_name: Some("Asha Traders".to_string()),
                payment_method: Some(PaymentMethod::Upi),
                ..HeaderUpdate::default()
            },
        )
        .unwrap();

        assert_eq!(response.lines[0].taxable_amount, 900.0);
        assert_eq!(response.totals.total_tax, 162.0);
        assert_eq!(response.totals.grand_total, 1061.6);
        assert_eq!(response.draft.payment_method, PaymentMethod::Upi);

        let submitted = submit_invoice(&app.db, &app.invoice, &app.session)
            .await
            .unwrap();
        assert!(submitted.invoice_number.starts_with("CS-"));
        assert!(submitted.invoice_number.ends_with("-0001"));
        assert_eq!(submitted.line_count, 1);
        assert_eq!(submitted.totals.grand_total, 1061.6);

        // Draft is blank again.
        assert_eq!(submitted.next.draft.customer_name, "");
        assert_eq!(submitted.next.draft.items.len(), 1);

        let stored = app
            .db
            .inner()
            .sales()
            .get_by_id(&submitted.sale_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.customer_name, "Asha Traders");
        assert_eq!(stored.created_by.as_deref(), Some("u-1"));
    }

    #[tokio::test]
    async fn test_invalid_draft_is_kept_on_submit() {
        let app = signed_in().await;
        add_line(&app.invoice, &app.session).unwrap();

        let err = submit_invoice(&app.db, &app.invoice, &app.session)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let fields: Vec<String> = err
            .field_errors
            .unwrap()
            .into_iter()
            .map(|f| f.field)
            .collect();
        assert!(fields.contains(&"customerName".to_string()));
        assert!(fields.contains(&"items.1.item".to_string()));

        assert_eq!(get_invoice(&app.invoice, &app.session).unwrap().draft.items.len(), 2);
        assert_eq!(app.db.inner().sales().count().await.unwrap(), 0);
    }

    async fn ready_to_submit(app: &crate::AppServices) {
        let laptop = create_item(&app.db, &app.session, laptop_input()).await.unwrap();
        select_item(&app.db, &app.invoice, &app.session, 0, laptop.id)
            .await
            .unwrap();
        update_header(
            &app.invoice,
            &app.session,
            HeaderUpdate {
                customer_name: Some("Walk-in".to_string()),
                ..HeaderUpdate::default()
            },
        )
        .unwrap();
    }

    #[tokio::test]
    async fn test_double_submit_stores_one_invoice() {
        let app = signed_in().await;
        ready_to_submit(&app).await;

        let (a, b) = tokio::join!(
            submit_invoice(&app.db, &app.invoice, &app.session),
            submit_invoice(&app.db, &app.invoice, &app.session),
        );

        let (ok, err) = match (a, b) {
            (Ok(ok), Err(err)) | (Err(err), Ok(ok)) => (ok, err),
            other => panic!("expected one success and one rejection, got {:?}", other),
        };
        assert!(ok.invoice_number.ends_with("-0001"));
        // Rejected while the first is in flight, or sees the blank draft after it.
        assert!(matches!(
            err.code,
            ErrorCode::Conflict | ErrorCode::ValidationError
        ));
        assert_eq!(app.db.inner().sales().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_edit_during_submit_lands_on_next_draft() {
        let app = signed_in().await;
        ready_to_submit(&app).await;

        let submitting = submit_invoice(&app.db, &app.invoice, &app.session);
        let editing = async {
            set_round_off(&app.invoice, &app.session, Some(0.25)).unwrap();
        };
        let (submitted, ()) = tokio::join!(submitting, editing);
        let submitted = submitted.unwrap();

        let stored = app
            .db
            .inner()
            .sales()
            .get_by_id(&submitted.sale_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.totals.round_off_amount, 0.0);

        let next = get_invoice(&app.invoice, &app.session).unwrap();
        assert_eq!(next.draft.round_off_amount, Some(0.25));
        assert_eq!(next.draft.customer_name, "");
    }

    #[tokio::test]
    async fn test_failed_store_puts_draft_back() {
        let app = signed_in().await;
        ready_to_submit(&app).await;
        app.db.inner().close().await;

        let err = submit_invoice(&app.db, &app.invoice, &app.session)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);

        let draft = get_invoice(&app.invoice, &app.session).unwrap().draft;
        assert_eq!(draft.customer_name, "Walk-in");
        assert!(app.invoice.begin_submit().is_some());
    }

    #[tokio::test]
    async fn test_line_errors() {
        let app = signed_in().await;

        let err = remove_line(&app.invoice, &app.session, 5).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvoiceError);

        for _ in 1..MAX_INVOICE_LINES {
            add_line(&app.invoice, &app.session).unwrap();
        }
        let err = add_line(&app.invoice, &app.session).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvoiceError);

        let err = select_item(&app.db, &app.invoice, &app.session, 0, "missing".into())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_add_then_remove_restores_totals() {
        let app = signed_in().await;
        let laptop = create_item(&app.db, &app.session, laptop_input()).await.unwrap();
        select_item(&app.db, &app.invoice, &app.session, 0, laptop.id)
            .await
            .unwrap();
        let before = get_invoice(&app.invoice, &app.session).unwrap().totals;

        add_line(&app.invoice, &app.session).unwrap();
        update_line(&app.invoice, &app.session, 1, LineUpdate::UnitPrice(99.0)).unwrap();
        let after = remove_line(&app.invoice, &app.session, 1).unwrap();

        assert_eq!(after.totals, before);
        assert_eq!(app.invoice.totals_now().grand_total, 59000.0);
    }

    #[tokio::test]
    async fn test_reset_invoice() {
        let app = signed_in().await;
        set_round_off(&app.invoice, &app.session, Some(1.0)).unwrap();
        let response = reset_invoice(&app.invoice, &app.session).unwrap();
        assert_eq!(response.draft.round_off_amount, None);
        assert_eq!(response.totals.grand_total, 0.0);
    }
}
