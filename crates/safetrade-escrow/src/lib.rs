//! # Safetrade Escrow
//!
//! Safe-transaction (escrow) administration service for the Safetrade
//! marketplace. Moves a marketplace transaction through deposit
//! confirmation → shipping confirmation → delivery → settlement, with
//! admin-only authorization and best-effort SMS notifications at each
//! step.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                       AdminApi                         │
//! │   (single multiplexed action: confirm_deposit, ...)    │
//! │  ┌──────────────┐                                      │
//! │  │ Authorization│  every action starts here            │
//! │  │     Gate     │                                      │
//! │  └──────┬───────┘                                      │
//! │  ┌──────┴────────────┐   ┌────────────────────┐        │
//! │  │   EscrowWorkflow  │   │    QueryService    │        │
//! │  │ (state machine)   │   │  (stats, listing)  │        │
//! │  └──────┬───────┬────┘   └─────────┬──────────┘        │
//! │         │ event │                  │                   │
//! │  ┌──────┴───────┴─────┐            │                   │
//! │  │ NotificationDisp.  │            │                   │
//! │  │ (SMS, best-effort) │            │                   │
//! │  └──────┬─────────────┘            │                   │
//! │  ┌──────┴─────────────────────────┴───────────┐        │
//! │  │               EscrowStore                   │        │
//! │  │  (records, transactions, SMS delivery log)  │        │
//! │  └─────────────────────────────────────────────┘        │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! The state write is the atomic unit of every mutation; notification
//! dispatch happens after it and never rolls it back.

pub mod api;
pub mod auth;
pub mod config;
pub mod domain;
pub mod infra;

// Re-export core types
pub use api::{router, AdminAction, AdminApi};
pub use auth::{
    AdminIdentity, AuthorizationGate, IdentityResolver, Role, StaticTokenResolver, UserAccount,
};
pub use domain::event::{EscrowEventSink, WorkflowEvent};
pub use domain::notification::NotificationDispatcher;
pub use domain::query::{EscrowStats, QueryService};
pub use domain::workflow::EscrowWorkflow;
pub use infra::store::{
    EscrowStore, InMemoryStore, OwningTransaction, RecordFilter, StoreError, TransactionStatus,
};
pub use infra::transport::{ConsoleTransport, RecordingTransport, SmsTransport};

/// Escrow service version
pub const ESCROW_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Page size for get_list when the caller omits a limit
pub const DEFAULT_LIST_LIMIT: usize = 50;
