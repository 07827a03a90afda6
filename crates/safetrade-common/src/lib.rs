//! # Safetrade Common
//!
//! Shared types and errors for the Safetrade escrow services.
//!
//! ## Core Types
//!
//! - [`EscrowRecord`]: persisted escrow state, one per marketplace transaction
//! - [`SettlementStatus`]: waiting → ready_for_settlement → settled progression
//! - [`EscrowContext`]/[`EscrowListing`]: record enriched with product/party data
//! - [`DerivedView`]/[`EscrowStep`]: display-only step and progress fraction
//! - [`SmsLogEntry`]: persisted notification delivery attempt
//!
//! ## Errors
//!
//! - [`EscrowError`]: unified taxonomy (unauthenticated, forbidden,
//!   not-found, validation, dependency) used across every service component

pub mod error;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{EscrowError, Result};
pub use types::record::{
    format_currency, Contact, EscrowContext, EscrowListing, EscrowParties, EscrowRecord,
    SettlementStatus, SmsLogEntry, SmsMessageType,
};
pub use types::view::{DerivedView, EscrowStep};

/// Safetrade version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
