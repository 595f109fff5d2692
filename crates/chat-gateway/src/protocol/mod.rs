//! Gateway protocol definitions
//!
//! Defines the WebSocket frame format, client payloads, error codes, and close codes.

mod close_codes;
mod error_codes;
mod messages;
mod payloads;

pub use close_codes::CloseCode;
pub use error_codes::ErrorCode;
pub use messages::GatewayMessage;
pub use payloads::{ConversationPayload, HandshakeAuth, HandshakePayload, PresenceUpdatePayload};
