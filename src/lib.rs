//! Escrow keeper: off-chain automation callback for escrow positions.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod chain;
pub mod engine;
