//! Escrow domain logic
//!
//! State transitions, notification dispatch and operator queries over
//! escrow records.

pub mod event;
pub mod notification;
pub mod query;
pub mod workflow;
