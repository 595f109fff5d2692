//! Connection management
//!
//! Tracks authenticated WebSocket connections, their broadcast groups, and
//! their outbound queues.

mod connection;
mod manager;

pub use connection::{Connection, ConnectionState, DeliveryError, Outbound};
pub use manager::ConnectionManager;

#[cfg(test)]
pub(crate) use connection::tests::identity as test_identity;
