//! Entity to model mappers
//!
//! - `From<Model> for Entity`: Convert database rows to domain objects
//! - `*Insert` structs: Prepare values for database writes

mod message;
mod user;

pub use message::MessageInsert;
