//! # Invoice State
//!
//! Owns the single open counter-sale draft and publishes its totals.
//!
//! ## Debounced Recompute
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  edit ──► with_draft_mut ──► generation += 1 ──► spawn task(gen = N)    │
//! │                                                        │                │
//! │  edit ──► with_draft_mut ──► generation += 1 ──► spawn task(gen = N+1)  │
//! │                                                        │                │
//! │                                  ... debounce elapses ...               │
//! │                                                        │                │
//! │  task N:   generation != N  ──► exit                   │                │
//! │  task N+1: generation == N+1 ──► lock draft, compute ──► watch::send    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The task computes from the draft as it is when the timer fires, so the
//! published totals always match the latest edit. `totals_now` skips the
//! timer entirely.
//!
//! ## Submission
//! Only one [`Submission`] exists at a time. It moves the validated draft out
//! and leaves a blank one in its place, so edits made while the sale is being
//! stored land on the next invoice. Dropping it without `commit` puts the
//! taken draft back.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::NaiveDate;
use counterbook_core::{AggregateTotals, InvoiceCalculator, InvoiceDraft, LineBreakdown, TaxMode};
use tokio::sync::watch;
use tracing::{trace, warn};

#[derive(Debug, Clone)]
pub struct InvoiceState {
    draft: Arc<Mutex<InvoiceDraft>>,
    calculator: InvoiceCalculator,
    debounce: Duration,
    generation: Arc<AtomicU64>,
    totals: Arc<watch::Sender<AggregateTotals>>,
    submitting: Arc<AtomicBool>,
}

impl InvoiceState {
    /// A blank draft dated today.
    pub fn new(mode: TaxMode, debounce: Duration) -> Self {
        Self::from_draft(InvoiceDraft::default(), mode, debounce)
    }

    pub fn from_draft(draft: InvoiceDraft, mode: TaxMode, debounce: Duration) -> Self {
        let calculator = InvoiceCalculator::new(mode);
        let (tx, _rx) = watch::channel(draft.totals(&calculator));
        InvoiceState {
            draft: Arc::new(Mutex::new(draft)),
            calculator,
            debounce,
            generation: Arc::new(AtomicU64::new(0)),
            totals: Arc::new(tx),
            submitting: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn calculator(&self) -> &InvoiceCalculator {
        &self.calculator
    }

    /// Executes a function with read access to the draft.
    pub fn with_draft<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&InvoiceDraft) -> R,
    {
        let draft = self.draft.lock().unwrap_or_else(|e| e.into_inner());
        f(&draft)
    }

    /// Executes a function with write access to the draft, then schedules a
    /// recompute of the published totals.
    pub fn with_draft_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut InvoiceDraft) -> R,
    {
        let result = {
            let mut draft = self.draft.lock().unwrap_or_else(|e| e.into_inner());
            f(&mut draft)
        };
        self.schedule_recompute();
        result
    }

    /// Replaces the draft with a blank one dated `order_date`.
    pub fn reset(&self, order_date: NaiveDate) {
        self.with_draft_mut(|d| d.reset(order_date));
    }

    /// Totals computed from the draft right now, at full precision.
    pub fn totals_now(&self) -> AggregateTotals {
        self.with_draft(|d| d.totals(&self.calculator))
    }

    pub fn breakdowns_now(&self) -> Vec<LineBreakdown> {
        self.with_draft(|d| d.breakdowns(&self.calculator))
    }

    /// Receiver of the debounced totals.
    pub fn subscribe(&self) -> watch::Receiver<AggregateTotals> {
        self.totals.subscribe()
    }

    /// The most recently published totals.
    pub fn published_totals(&self) -> AggregateTotals {
        *self.totals.borrow()
    }

    /// Claims the draft for submission. `None` while another submission is
    /// still in flight.
    pub fn begin_submit(&self) -> Option<Submission> {
        if self.submitting.swap(true, Ordering::SeqCst) {
            return None;
        }
        Some(Submission {
            state: self.clone(),
            taken: None,
        })
    }

    fn schedule_recompute(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) if !self.debounce.is_zero() => handle,
            _ => {
                self.publish();
                return;
            }
        };

        let state = self.clone();
        handle.spawn(async move {
            tokio::time::sleep(state.debounce).await;
            if state.generation.load(Ordering::SeqCst) != generation {
                trace!(generation, "Recompute superseded");
                return;
            }
            state.publish();
        });
    }

    fn publish(&self) {
        let totals = self.totals_now();
        trace!(grand_total = totals.grand_total, "Publishing invoice totals");
        self.totals.send_replace(totals);
    }
}

/// Exclusive claim on the draft while a sale is stored.
#[derive(Debug)]
pub struct Submission {
    state: InvoiceState,
    taken: Option<InvoiceDraft>,
}

impl Submission {
    /// Runs `prepare` on the draft under the lock. On success the draft is
    /// moved out and replaced by a blank one dated `order_date`; on failure
    /// it stays where it is.
    pub fn take_draft<T, E, F>(&mut self, order_date: NaiveDate, prepare: F) -> Result<T, E>
    where
        F: FnOnce(&InvoiceDraft) -> Result<T, E>,
    {
        let prepared = {
            let mut draft = self.state.draft.lock().unwrap_or_else(|e| e.into_inner());
            let prepared = prepare(&draft)?;
            self.taken = Some(std::mem::replace(&mut *draft, InvoiceDraft::new(order_date)));
            prepared
        };
        self.state.schedule_recompute();
        Ok(prepared)
    }

    /// The sale is stored; the taken draft is discarded.
    pub fn commit(mut self) {
        self.taken = None;
    }
}

impl Drop for Submission {
    fn drop(&mut self) {
        if let Some(draft) = self.taken.take() {
            warn!("Submission abandoned, restoring draft");
            self.state.with_draft_mut(|d| *d = draft);
        }
        self.state.submitting.store(false, Ordering::SeqCst);
    }
}
