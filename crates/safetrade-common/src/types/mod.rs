//! Core data types for the Safetrade escrow services

pub mod record;
pub mod view;
