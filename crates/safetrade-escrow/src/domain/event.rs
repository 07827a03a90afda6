//! Workflow Events
//!
//! The workflow announces completed state transitions as events instead of
//! calling the SMS machinery directly. The state write is the atomic unit;
//! whatever a sink does with an event is best-effort and must not fail the
//! operation, so `publish` is infallible from the workflow's point of view.

use async_trait::async_trait;

use safetrade_common::EscrowContext;

/// A state transition that outside parties may need to hear about
#[derive(Debug, Clone)]
pub enum WorkflowEvent {
    /// Deposit confirmed by an operator; seller (and reseller) should ship
    DepositConfirmed { context: EscrowContext },

    /// Shipping confirmed by an operator; buyer should watch for delivery
    ShippingConfirmed { context: EscrowContext },
}

impl WorkflowEvent {
    /// Escrow record the event refers to
    pub fn context(&self) -> &EscrowContext {
        match self {
            WorkflowEvent::DepositConfirmed { context } => context,
            WorkflowEvent::ShippingConfirmed { context } => context,
        }
    }
}

/// Consumer of workflow events
#[async_trait]
pub trait EscrowEventSink: Send + Sync {
    /// Handle one event. Implementations swallow their own failures.
    async fn publish(&self, event: WorkflowEvent);
}

/// Sink that drops every event, for wiring tests
pub struct NullEventSink;

#[async_trait]
impl EscrowEventSink for NullEventSink {
    async fn publish(&self, _event: WorkflowEvent) {}
}
