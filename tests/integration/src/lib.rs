//! Integration test utilities for the chat gateway
//!
//! This crate provides helpers for running end-to-end tests against the
//! WebSocket gateway with in-memory collaborators.

pub mod fixtures;

pub use fixtures::*;
pub use helpers::*;
