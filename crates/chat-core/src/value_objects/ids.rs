//! Opaque string identifiers for users, conversations and messages
//!
//! Identifiers are issued by external collaborators (the user directory,
//! the conversation store, the message store), so the core treats them as
//! opaque strings. They are also used as segments of presence store keys,
//! which is why [`is_key_safe`](UserId::is_key_safe) exists.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator used between segments of presence store keys
pub const KEY_SEPARATOR: char = ':';

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw identifier
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the raw identifier
            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume into the raw identifier
            #[inline]
            pub fn into_inner(self) -> String {
                self.0
            }

            /// True when the id is non-empty and can be embedded in a store key
            pub fn is_key_safe(&self) -> bool {
                !self.0.trim().is_empty() && !self.0.contains(KEY_SEPARATOR)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Identifier of a user account
    UserId
);

string_id!(
    /// Identifier of a conversation (and of its broadcast group)
    ConversationId
);

string_id!(
    /// Identifier of a persisted message
    MessageId
);
