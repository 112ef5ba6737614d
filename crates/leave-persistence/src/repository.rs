//! The repository seam shared by the bot pipeline and the HTTP API.

use async_trait::async_trait;
use leave_models::{AccountLink, LeaveRequest, LeaveRequestId, UserId, UserProfile};

use crate::error::Result;

/// Storage operations for profiles, account links and leave requests.
///
/// Reads return `Ok(None)` for missing rows; callers decide whether that is
/// an error.
#[async_trait]
pub trait LeaveRepository: Send + Sync {
    /// Looks up a profile by user id.
    async fn find_profile(&self, user_id: &UserId) -> Result<Option<UserProfile>>;

    /// Profiles for every id in `user_ids` that has one, in no particular order.
    async fn find_profiles(&self, user_ids: &[UserId]) -> Result<Vec<UserProfile>> {
        let mut profiles = Vec::with_capacity(user_ids.len());
        for user_id in user_ids {
            if let Some(profile) = self.find_profile(user_id).await? {
                profiles.push(profile);
            }
        }
        Ok(profiles)
    }

    /// Looks up a profile by email, ignoring case.
    async fn find_profile_by_email(&self, email: &str) -> Result<Option<UserProfile>>;

    /// Returns the link for a chat user, if any.
    async fn find_account_link(&self, telegram_user_id: i64) -> Result<Option<AccountLink>>;

    /// Inserts a new link.
    ///
    /// Fails with [`PersistenceError::Conflict`](crate::PersistenceError::Conflict)
    /// when the chat user is already linked; existing links are never replaced.
    async fn insert_account_link(&self, link: &AccountLink) -> Result<()>;

    /// Inserts or replaces the link for `link.telegram_user_id`.
    ///
    /// Returns the stored link (its id is kept when one existed).
    async fn save_account_link(&self, link: &AccountLink) -> Result<AccountLink>;

    /// Persists a new leave request and returns the stored row.
    async fn create_leave_request(&self, request: &LeaveRequest) -> Result<LeaveRequest>;

    async fn get_leave_request(&self, id: &LeaveRequestId) -> Result<Option<LeaveRequest>>;

    /// Replaces an existing leave request.
    async fn update_leave_request(&self, request: &LeaveRequest) -> Result<()>;

    /// Removes a leave request.
    ///
    /// Fails with [`PersistenceError::NotFound`](crate::PersistenceError::NotFound)
    /// when there is no such request.
    async fn delete_leave_request(&self, id: &LeaveRequestId) -> Result<()>;

    /// A user's requests, newest first.
    async fn list_leave_requests(&self, user_id: &UserId) -> Result<Vec<LeaveRequest>>;

    /// All requests, newest first.
    async fn list_all_leave_requests(&self) -> Result<Vec<LeaveRequest>>;

    /// Number of requests a user has submitted.
    async fn count_leave_requests(&self, user_id: &UserId) -> Result<usize> {
        Ok(self.list_leave_requests(user_id).await?.len())
    }
}

/// Sorts requests newest first.
pub(crate) fn newest_first(requests: &mut [LeaveRequest]) {
    requests.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
}
