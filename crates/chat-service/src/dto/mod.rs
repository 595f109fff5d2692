//! Data transfer objects for gateway actions

pub mod requests;

pub use requests::SendMessageRequest;
