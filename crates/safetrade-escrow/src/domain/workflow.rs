//! Escrow Workflow
//!
//! The guarded state machine over escrow records. Every operation follows
//! the same sequence: read the record, validate, write the new state, then
//! emit an event for the notification side. The write is the atomic unit;
//! event handling never rolls it back.
//!
//! By default the transitions match the historical permissive behavior:
//! confirm_shipping does not require a confirmed deposit and
//! process_settlement does not require ready_for_settlement. The admin UI
//! is expected to only offer an action when it applies. `with_step_order`
//! turns the natural deposit → shipping → settlement ordering into a hard
//! precondition.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use safetrade_common::{EscrowError, Result, SettlementStatus};

use crate::domain::event::{EscrowEventSink, WorkflowEvent};
use crate::infra::store::EscrowStore;

/// Note written when the operator supplies none
const DEFAULT_DEPOSIT_NOTE: &str = "Deposit confirmed";
const DEFAULT_SETTLEMENT_NOTE: &str = "Settlement complete";

/// Administrative state machine over escrow records
pub struct EscrowWorkflow {
    store: Arc<dyn EscrowStore>,
    events: Arc<dyn EscrowEventSink>,
    enforce_step_order: bool,
}

impl EscrowWorkflow {
    pub fn new(store: Arc<dyn EscrowStore>, events: Arc<dyn EscrowEventSink>) -> Self {
        Self {
            store,
            events,
            enforce_step_order: false,
        }
    }

    /// Require each step's predecessor before allowing the transition
    pub fn with_step_order(mut self, enforce: bool) -> Self {
        self.enforce_step_order = enforce;
        self
    }

    /// Mark the deposit as received.
    ///
    /// Sets the confirmation flag and, on the first confirmation, the
    /// confirmation timestamp. Re-invoking on an already-confirmed record
    /// rewrites the note and re-notifies; the flag and timestamp are
    /// unaffected.
    pub async fn confirm_deposit(&self, id: Uuid, notes: Option<String>) -> Result<()> {
        let mut record = self.store.get(id).await?;
        let now = Utc::now();

        record.deposit_confirmed = true;
        if record.deposit_confirmed_at.is_none() {
            record.deposit_confirmed_at = Some(now);
        }
        record.admin_notes = notes.unwrap_or_else(|| DEFAULT_DEPOSIT_NOTE.to_string());
        record.updated_at = now;

        self.store.update(record).await?;
        info!(escrow_id = %id, "deposit confirmed");

        self.emit(id, |context| WorkflowEvent::DepositConfirmed { context })
            .await;
        Ok(())
    }

    /// Mark the item as shipped, recording tracking data if provided.
    ///
    /// Tracking number and courier are set only on the first confirmation
    /// and are immutable afterwards.
    pub async fn confirm_shipping(
        &self,
        id: Uuid,
        tracking_number: Option<String>,
        courier: Option<String>,
    ) -> Result<()> {
        let mut record = self.store.get(id).await?;

        if self.enforce_step_order && !record.deposit_confirmed {
            return Err(EscrowError::Validation(
                "deposit has not been confirmed yet".to_string(),
            ));
        }

        let now = Utc::now();
        let first_confirmation = !record.shipping_confirmed;

        record.shipping_confirmed = true;
        if first_confirmation {
            record.shipping_confirmed_at = Some(now);
            record.tracking_number = tracking_number;
            record.courier = courier;
        }

        let mut notes = "Shipping started".to_string();
        if let Some(tracking) = &record.tracking_number {
            notes.push_str(&format!(" - tracking: {tracking}"));
        }
        if let Some(courier) = &record.courier {
            notes.push_str(&format!(" ({courier})"));
        }
        record.admin_notes = notes;
        record.updated_at = now;

        self.store.update(record).await?;
        info!(escrow_id = %id, "shipping confirmed");

        self.emit(id, |context| WorkflowEvent::ShippingConfirmed { context })
            .await;
        Ok(())
    }

    /// Settle the escrow and mark the owning transaction as completed.
    ///
    /// Settled is terminal: a repeat call leaves the status unchanged but
    /// still re-touches the owning transaction.
    pub async fn process_settlement(&self, id: Uuid, notes: Option<String>) -> Result<()> {
        let mut record = self.store.get(id).await?;

        if self.enforce_step_order
            && !matches!(
                record.settlement_status,
                SettlementStatus::ReadyForSettlement | SettlementStatus::Settled
            )
        {
            return Err(EscrowError::Validation(
                "escrow is not ready for settlement".to_string(),
            ));
        }

        let now = Utc::now();
        record.settlement_status = SettlementStatus::Settled;
        record.admin_notes = notes.unwrap_or_else(|| DEFAULT_SETTLEMENT_NOTE.to_string());
        record.updated_at = now;
        let transaction_id = record.transaction_id;

        self.store.update(record).await?;
        self.store.complete_transaction(transaction_id, now).await?;
        info!(escrow_id = %id, %transaction_id, "settlement processed");
        Ok(())
    }

    /// Overwrite the operator note
    pub async fn update_notes(&self, id: Uuid, notes: String) -> Result<()> {
        let mut record = self.store.get(id).await?;
        record.admin_notes = notes;
        record.updated_at = Utc::now();

        self.store.update(record).await?;
        info!(escrow_id = %id, "admin notes updated");
        Ok(())
    }

    /// Load the enriched context and publish an event built from it.
    ///
    /// A context lookup failure here means the notification side loses one
    /// event; the state write already happened and stands.
    async fn emit(&self, id: Uuid, build: impl FnOnce(safetrade_common::EscrowContext) -> WorkflowEvent) {
        match self.store.load_context(id).await {
            Ok(context) => self.events.publish(build(context)).await,
            Err(err) => {
                warn!(escrow_id = %id, error = %err, "skipping notification: context unavailable")
            }
        }
    }
}
