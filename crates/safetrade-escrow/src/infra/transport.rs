//! SMS Transport Implementations
//!
//! Outbound message seam. Delivery is best-effort: callers log every
//! attempt and never fail an escrow operation on a transport error.

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::info;

/// Errors from the SMS transport
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("SMS gateway unavailable: {0}")]
    Unavailable(String),
}

/// Trait for SMS transport backends
#[async_trait]
pub trait SmsTransport: Send + Sync {
    /// Send a message to a recipient phone number
    async fn send(&self, phone: &str, body: &str) -> Result<(), TransportError>;
}

/// Transport that only logs the message
///
/// Stand-in for a real SMS gateway; the delivery log written by the
/// dispatcher is the durable record either way.
pub struct ConsoleTransport;

#[async_trait]
impl SmsTransport for ConsoleTransport {
    async fn send(&self, phone: &str, body: &str) -> Result<(), TransportError> {
        info!(phone, body, "SMS sent");
        Ok(())
    }
}

/// Transport that records outbound messages, for tests
#[derive(Default)]
pub struct RecordingTransport {
    sent: RwLock<Vec<(String, String)>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of (phone, body) pairs in send order
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.read().clone()
    }
}

#[async_trait]
impl SmsTransport for RecordingTransport {
    async fn send(&self, phone: &str, body: &str) -> Result<(), TransportError> {
        self.sent.write().push((phone.to_string(), body.to_string()));
        Ok(())
    }
}
