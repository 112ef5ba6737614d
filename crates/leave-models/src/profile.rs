//! Application user profiles.

use serde::{Deserialize, Serialize};

use crate::ids::UserId;

/// A row of the user-profile collection owned by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

impl UserProfile {
    /// Creates a new profile.
    pub fn new(id: impl Into<UserId>, email: impl Into<String>, full_name: Option<&str>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            full_name: full_name.map(str::to_string),
        }
    }

    /// Name shown to people: the full name, or the local part of the email.
    pub fn display_name(&self) -> String {
        match self.full_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self
                .email
                .split('@')
                .next()
                .unwrap_or(&self.email)
                .to_string(),
        }
    }

    /// Case-insensitive email comparison.
    pub fn has_email(&self, email: &str) -> bool {
        self.email.eq_ignore_ascii_case(email.trim())
    }
}
