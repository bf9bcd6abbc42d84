//! Core data models for mosaicsh
//!
//! This module contains the domain entities shared by the session manager,
//! the built-in dispatcher and the history stores.

pub mod exchange;

// Re-exports for convenience
pub use exchange::{
    Exchange, ExchangeId, ExchangeStatus, Payload, Termination, TextFormat,
    LAUNCH_FAILURE_STATUS,
};
