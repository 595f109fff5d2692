//! # chat-gateway
//!
//! WebSocket gateway for real-time presence, typing, and message delivery.

pub mod broadcast;
pub mod connection;
pub mod events;
pub mod handlers;
pub mod protocol;
pub mod server;

pub use server::{create_app, run, serve, GatewayState};
