//! Notification Dispatch
//!
//! Consumes workflow events and turns them into per-party SMS messages.
//! Every attempt is persisted to the delivery log; transport failures are
//! logged and swallowed so escrow state progression is never blocked by
//! gateway availability. No retry, no delivery tracking beyond the
//! `is_sent` flag written at call time.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use safetrade_common::{format_currency, EscrowContext, SmsLogEntry, SmsMessageType};

use crate::domain::event::{EscrowEventSink, WorkflowEvent};
use crate::infra::store::EscrowStore;
use crate::infra::transport::SmsTransport;

/// Composes and sends per-step messages to the relevant parties
pub struct NotificationDispatcher {
    store: Arc<dyn EscrowStore>,
    transport: Arc<dyn SmsTransport>,
}

impl NotificationDispatcher {
    pub fn new(store: Arc<dyn EscrowStore>, transport: Arc<dyn SmsTransport>) -> Self {
        Self { store, transport }
    }

    async fn dispatch_deposit_confirmed(&self, context: &EscrowContext) {
        let amount = format_currency(&context.record.deposit_amount);

        if let Some(phone) = &context.parties.seller.phone {
            let body = format!(
                "Deposit confirmed.\nItem: {}\nAmount: {}\nPlease ship the item.",
                context.product_title, amount
            );
            self.send(phone, SmsMessageType::DepositConfirmed, body).await;
        }

        if let Some(reseller) = &context.parties.reseller {
            if let Some(phone) = &reseller.phone {
                let body = format!(
                    "Deposit confirmed.\nItem: {}\nYour commission will be settled after completion.",
                    context.product_title
                );
                self.send(phone, SmsMessageType::DepositConfirmed, body).await;
            }
        }
    }

    async fn dispatch_shipping_confirmed(&self, context: &EscrowContext) {
        let Some(phone) = &context.parties.buyer.phone else {
            return;
        };

        let mut body = format!("Your item has been shipped.\nItem: {}\n", context.product_title);
        if let Some(tracking) = &context.record.tracking_number {
            body.push_str(&format!("Tracking number: {tracking}\n"));
        }
        if let Some(courier) = &context.record.courier {
            body.push_str(&format!("Courier: {courier}\n"));
        }
        body.push_str("Please confirm receipt once it arrives.");

        self.send(phone, SmsMessageType::ShippingStarted, body).await;
    }

    /// Send one message and persist the attempt. Nothing here propagates.
    async fn send(&self, phone: &str, message_type: SmsMessageType, body: String) {
        let sent = match self.transport.send(phone, &body).await {
            Ok(()) => true,
            Err(err) => {
                warn!(phone, %message_type, error = %err, "SMS dispatch failed");
                false
            }
        };

        let entry = SmsLogEntry::new(phone, message_type, body, sent);
        if let Err(err) = self.store.insert_sms_log(entry).await {
            warn!(phone, %message_type, error = %err, "failed to persist SMS log entry");
        }
    }
}

#[async_trait]
impl EscrowEventSink for NotificationDispatcher {
    async fn publish(&self, event: WorkflowEvent) {
        match &event {
            WorkflowEvent::DepositConfirmed { context } => {
                self.dispatch_deposit_confirmed(context).await
            }
            WorkflowEvent::ShippingConfirmed { context } => {
                self.dispatch_shipping_confirmed(context).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use safetrade_common::{Contact, EscrowParties, EscrowRecord};
    use uuid::Uuid;

    use crate::infra::store::InMemoryStore;
    use crate::infra::transport::{RecordingTransport, TransportError};

    fn context(reseller: Option<Contact>, buyer_phone: Option<&str>) -> EscrowContext {
        let mut record = EscrowRecord::new(Uuid::now_v7(), dec!(1_200_000));
        record.tracking_number = Some("1234567890".to_string());
        record.courier = Some("CJ".to_string());

        EscrowContext {
            record,
            product_title: "Vintage camera".to_string(),
            parties: EscrowParties {
                buyer: Contact::new("Buyer Kim", buyer_phone.map(String::from)),
                seller: Contact::new("Seller Lee", Some("010-3333-4444".to_string())),
                reseller,
            },
        }
    }

    #[tokio::test]
    async fn test_deposit_notifies_seller_with_amount() {
        let store = Arc::new(InMemoryStore::new());
        let transport = Arc::new(RecordingTransport::new());
        let dispatcher = NotificationDispatcher::new(store.clone(), transport.clone());

        dispatcher
            .publish(WorkflowEvent::DepositConfirmed {
                context: context(None, Some("010-1111-2222")),
            })
            .await;

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "010-3333-4444");
        assert!(sent[0].1.contains("₩1,200,000"));
        assert!(sent[0].1.contains("Vintage camera"));

        let logs = store.sms_logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].message_type, SmsMessageType::DepositConfirmed);
        assert!(logs[0].is_sent);
    }

    #[tokio::test]
    async fn test_deposit_also_notifies_reseller() {
        let store = Arc::new(InMemoryStore::new());
        let transport = Arc::new(RecordingTransport::new());
        let dispatcher = NotificationDispatcher::new(store.clone(), transport.clone());

        let reseller = Contact::new("Reseller Park", Some("010-5555-6666".to_string()));
        dispatcher
            .publish(WorkflowEvent::DepositConfirmed {
                context: context(Some(reseller), Some("010-1111-2222")),
            })
            .await;

        let sent = transport.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].0, "010-5555-6666");
        assert!(sent[1].1.contains("commission"));
    }

    #[tokio::test]
    async fn test_shipping_notifies_buyer_with_tracking() {
        let store = Arc::new(InMemoryStore::new());
        let transport = Arc::new(RecordingTransport::new());
        let dispatcher = NotificationDispatcher::new(store.clone(), transport.clone());

        dispatcher
            .publish(WorkflowEvent::ShippingConfirmed {
                context: context(None, Some("010-1111-2222")),
            })
            .await;

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "010-1111-2222");
        assert!(sent[0].1.contains("Tracking number: 1234567890"));
        assert!(sent[0].1.contains("Courier: CJ"));
    }

    #[tokio::test]
    async fn test_missing_buyer_phone_skips_quietly() {
        let store = Arc::new(InMemoryStore::new());
        let transport = Arc::new(RecordingTransport::new());
        let dispatcher = NotificationDispatcher::new(store.clone(), transport.clone());

        dispatcher
            .publish(WorkflowEvent::ShippingConfirmed {
                context: context(None, None),
            })
            .await;

        assert!(transport.sent().is_empty());
        assert!(store.sms_logs().is_empty());
    }

    struct FailingTransport;

    #[async_trait]
    impl SmsTransport for FailingTransport {
        async fn send(&self, _phone: &str, _body: &str) -> Result<(), TransportError> {
            Err(TransportError::Unavailable("gateway down".to_string()))
        }
    }

    #[tokio::test]
    async fn test_transport_failure_is_logged_not_raised() {
        let store = Arc::new(InMemoryStore::new());
        let dispatcher = NotificationDispatcher::new(store.clone(), Arc::new(FailingTransport));

        dispatcher
            .publish(WorkflowEvent::DepositConfirmed {
                context: context(None, Some("010-1111-2222")),
            })
            .await;

        // The attempt is still persisted, flagged as unsent.
        let logs = store.sms_logs();
        assert_eq!(logs.len(), 1);
        assert!(!logs[0].is_sent);
    }
}
