//! Chat-platform identity of a message sender.

use serde::{Deserialize, Serialize};

/// The sender of an inbound chat message.
///
/// Supplied with every message and never persisted on its own; only the
/// [`AccountLink`](crate::AccountLink) built from it is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatIdentity {
    /// Platform user id.
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl ChatIdentity {
    /// Creates an identity with only the platform id set.
    pub fn new(id: i64) -> Self {
        Self {
            id,
            username: None,
            first_name: None,
            last_name: None,
        }
    }

    /// Sets the username.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Sets first and last name.
    pub fn with_name(mut self, first: impl Into<String>, last: Option<&str>) -> Self {
        self.first_name = Some(first.into());
        self.last_name = last.map(str::to_string);
        self
    }

    /// Best human-readable name: full name, then `@username`, then the numeric id.
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(first), None) => first.clone(),
            _ => match &self.username {
                Some(username) => format!("@{}", username),
                None => self.id.to_string(),
            },
        }
    }
}
