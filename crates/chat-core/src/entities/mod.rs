//! Domain entities - core business objects

mod message;
mod user;

pub use message::{Message, MAX_CONTENT_LENGTH};
pub use user::User;
