//! Resolves chat identities to application users.

use std::sync::{Arc, OnceLock};

use leave_models::{AccountLink, ChatIdentity, Locale, UserId, UserProfile};
use leave_persistence::{LeaveRepository, PersistenceError};
use regex::Regex;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::replies;

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("valid regex")
    })
}

/// Finds the first email-shaped token in `text`.
pub fn extract_email(text: &str) -> Option<String> {
    email_regex().find(text).map(|m| m.as_str().to_string())
}

/// Errors from the administrative bootstrap path.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("not an email address: {0}")]
    InvalidEmail(String),

    #[error("no profile found for {0}")]
    ProfileNotFound(String),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Result of a `/connect` command.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkOutcome {
    MissingEmail,
    ProfileNotFound {
        email: String,
    },
    AlreadyLinked {
        email: String,
    },
    Linked {
        link: AccountLink,
        profile: UserProfile,
        request_count: Option<usize>,
    },
    Failed,
}

impl LinkOutcome {
    /// Reply text for this outcome.
    pub fn reply(&self, locale: Locale) -> String {
        match self {
            LinkOutcome::MissingEmail => replies::prompt_for_email(locale),
            LinkOutcome::ProfileNotFound { email } => replies::profile_not_found(locale, email),
            LinkOutcome::AlreadyLinked { email } => replies::already_linked(locale, email),
            LinkOutcome::Linked {
                link,
                profile,
                request_count,
            } => replies::linked(locale, &profile.display_name(), &link.email, *request_count),
            LinkOutcome::Failed => replies::link_failed(locale),
        }
    }
}

/// A chat identity's link plus the linked profile, when it could be read.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkedUser {
    pub link: AccountLink,
    pub profile: Option<UserProfile>,
}

impl LinkedUser {
    pub fn user_id(&self) -> &UserId {
        &self.link.user_id
    }

    /// Profile display name, falling back to the linked email.
    pub fn display_name(&self) -> String {
        match &self.profile {
            Some(profile) => profile.display_name(),
            None => self.link.email.clone(),
        }
    }
}

/// Creates and looks up account links.
///
/// Lookups fail soft: storage errors are logged and read as "not found".
#[derive(Clone)]
pub struct AccountLinker {
    repo: Arc<dyn LeaveRepository>,
}

impl AccountLinker {
    pub fn new(repo: Arc<dyn LeaveRepository>) -> Self {
        Self { repo }
    }

    /// Handles `/connect <email>` from `identity` in chat `chat_id`.
    ///
    /// Never replaces an existing link.
    pub async fn link_by_command(
        &self,
        identity: &ChatIdentity,
        chat_id: i64,
        text: &str,
    ) -> LinkOutcome {
        let Some(email) = extract_email(text) else {
            return LinkOutcome::MissingEmail;
        };

        let profile = match self.repo.find_profile_by_email(&email).await {
            Ok(Some(profile)) => profile,
            Ok(None) => return LinkOutcome::ProfileNotFound { email },
            Err(e) => {
                warn!(email = %email, error = %e, "Profile lookup failed");
                return LinkOutcome::ProfileNotFound { email };
            }
        };

        match self.repo.find_account_link(identity.id).await {
            Ok(Some(existing)) => {
                return LinkOutcome::AlreadyLinked {
                    email: existing.email,
                }
            }
            Ok(None) => {}
            Err(e) => {
                warn!(telegram_user_id = identity.id, error = %e, "Link lookup failed");
            }
        }

        let link = AccountLink::new(identity, profile.id.clone(), &profile.email, Some(chat_id));
        match self.repo.insert_account_link(&link).await {
            Ok(()) => {}
            Err(e) if e.is_conflict() => {
                // Lost a race with a concurrent /connect.
                let email = self
                    .find_link(identity.id)
                    .await
                    .map(|l| l.email)
                    .unwrap_or(email);
                return LinkOutcome::AlreadyLinked { email };
            }
            Err(e) => {
                error!(telegram_user_id = identity.id, error = %e, "Failed to create account link");
                return LinkOutcome::Failed;
            }
        }

        info!(
            telegram_user_id = identity.id,
            user_id = %profile.id,
            "Linked Telegram account"
        );

        let request_count = match self.repo.count_leave_requests(&profile.id).await {
            Ok(count) => Some(count),
            Err(e) => {
                warn!(user_id = %profile.id, error = %e, "Could not count leave requests");
                None
            }
        };

        LinkOutcome::Linked {
            link,
            profile,
            request_count,
        }
    }

    async fn find_link(&self, telegram_user_id: i64) -> Option<AccountLink> {
        match self.repo.find_account_link(telegram_user_id).await {
            Ok(link) => link,
            Err(e) => {
                warn!(telegram_user_id = telegram_user_id, error = %e, "Link lookup failed");
                None
            }
        }
    }

    /// Returns the linked user for a chat identity, if any.
    pub async fn find_linked(&self, telegram_user_id: i64) -> Option<LinkedUser> {
        let link = self.find_link(telegram_user_id).await?;
        let profile = match self.repo.find_profile(&link.user_id).await {
            Ok(profile) => profile,
            Err(e) => {
                warn!(user_id = %link.user_id, error = %e, "Profile lookup failed");
                None
            }
        };
        Some(LinkedUser { link, profile })
    }

    /// Creates or replaces the link for `identity` (admin setup).
    ///
    /// A matching profile is required.
    pub async fn bootstrap(
        &self,
        identity: &ChatIdentity,
        email: &str,
    ) -> Result<AccountLink, LinkError> {
        let email = email.trim();
        if extract_email(email).as_deref() != Some(email) {
            return Err(LinkError::InvalidEmail(email.to_string()));
        }

        let profile = self
            .repo
            .find_profile_by_email(email)
            .await?
            .ok_or_else(|| LinkError::ProfileNotFound(email.to_string()))?;

        let link = AccountLink::new(identity, profile.id, &profile.email, Some(identity.id));
        let saved = self.repo.save_account_link(&link).await?;
        info!(
            telegram_user_id = identity.id,
            user_id = %saved.user_id,
            "Account link set up"
        );
        Ok(saved)
    }
}
