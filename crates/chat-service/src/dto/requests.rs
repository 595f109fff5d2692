//! Request DTOs for gateway actions
//!
//! Request DTOs implement `Deserialize` and `Validate` for input validation.

use chat_core::MAX_CONTENT_LENGTH;
use serde::Deserialize;
use validator::{Validate, ValidationError};

/// Message send request
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub conversation_id: String,

    #[validate(
        length(min = 1, max = 2000, message = "Message content must be 1-2000 characters"),
        custom(function = "not_blank", message = "Message content cannot be blank")
    )]
    pub content: String,
}

impl SendMessageRequest {
    pub fn new(conversation_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            content: content.into(),
        }
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

// The derive attribute needs a literal; keep it in step with the domain limit.
const _: () = assert!(MAX_CONTENT_LENGTH == 2000);
