//! Chat-identity-to-user mappings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chat::ChatIdentity;
use crate::ids::{LinkId, UserId};

/// Persistent mapping from one chat identity to one application user.
///
/// At most one link exists per `telegram_user_id`. Links are created by the
/// `/connect` command or the admin setup endpoint and are never rewritten by
/// the bot itself. Field names follow the `telegram_users` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountLink {
    pub id: LinkId,
    pub telegram_user_id: i64,
    pub user_id: UserId,
    pub email: String,
    #[serde(default)]
    pub telegram_username: Option<String>,
    #[serde(default)]
    pub telegram_first_name: Option<String>,
    #[serde(default)]
    pub telegram_last_name: Option<String>,
    /// Chat the link was made from (replies go here).
    #[serde(default)]
    pub telegram_chat_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl AccountLink {
    /// Creates a link for `identity`, copying its display fields.
    pub fn new(
        identity: &ChatIdentity,
        user_id: UserId,
        email: impl Into<String>,
        chat_id: Option<i64>,
    ) -> Self {
        Self {
            id: LinkId::new(),
            telegram_user_id: identity.id,
            user_id,
            email: email.into(),
            telegram_username: identity.username.clone(),
            telegram_first_name: identity.first_name.clone(),
            telegram_last_name: identity.last_name.clone(),
            telegram_chat_id: chat_id,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_copies_identity_fields() {
        let identity = ChatIdentity::new(222)
            .with_username("newbie")
            .with_name("New", None);
        let link = AccountLink::new(&identity, UserId::from("U2"), "new@x.com", Some(222));

        assert_eq!(link.telegram_user_id, 222);
        assert_eq!(link.user_id.as_str(), "U2");
        assert_eq!(link.email, "new@x.com");
        assert_eq!(link.telegram_username.as_deref(), Some("newbie"));
        assert_eq!(link.telegram_first_name.as_deref(), Some("New"));
        assert!(link.telegram_last_name.is_none());
        assert_eq!(link.telegram_chat_id, Some(222));
    }
}
