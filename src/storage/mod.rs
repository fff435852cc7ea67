//! Storage Layer
//!
//! JSON configuration persistence. Proposal files live with the proposal
//! services.

pub mod config;

pub use config::*;
