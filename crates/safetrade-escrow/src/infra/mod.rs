//! Infrastructure seams
//!
//! Trait-backed adapters for the external collaborators: the relational
//! data store and the SMS transport.

pub mod store;
pub mod transport;
