//! In-process backend for tests and local demos.

use std::collections::HashMap;

use async_trait::async_trait;
use leave_models::{AccountLink, LeaveRequest, LeaveRequestId, UserId, UserProfile};
use tokio::sync::RwLock;

use crate::error::{PersistenceError, Result};
use crate::repository::{newest_first, LeaveRepository};

#[derive(Default)]
struct Tables {
    profiles: HashMap<UserId, UserProfile>,
    links: HashMap<i64, AccountLink>,
    requests: HashMap<LeaveRequestId, LeaveRequest>,
}

/// Keeps every collection in memory behind one lock.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with `profiles`.
    pub fn with_profiles(profiles: impl IntoIterator<Item = UserProfile>) -> Self {
        let tables = Tables {
            profiles: profiles.into_iter().map(|p| (p.id.clone(), p)).collect(),
            ..Tables::default()
        };
        Self {
            tables: RwLock::new(tables),
        }
    }

    pub async fn save_profile(&self, profile: &UserProfile) -> Result<()> {
        self.tables
            .write()
            .await
            .profiles
            .insert(profile.id.clone(), profile.clone());
        Ok(())
    }
}

#[async_trait]
impl LeaveRepository for MemoryStore {
    async fn find_profile(&self, user_id: &UserId) -> Result<Option<UserProfile>> {
        Ok(self.tables.read().await.profiles.get(user_id).cloned())
    }

    async fn find_profile_by_email(&self, email: &str) -> Result<Option<UserProfile>> {
        let tables = self.tables.read().await;
        Ok(tables.profiles.values().find(|p| p.has_email(email)).cloned())
    }

    async fn find_account_link(&self, telegram_user_id: i64) -> Result<Option<AccountLink>> {
        Ok(self.tables.read().await.links.get(&telegram_user_id).cloned())
    }

    async fn insert_account_link(&self, link: &AccountLink) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.links.contains_key(&link.telegram_user_id) {
            return Err(PersistenceError::conflict(
                "account link",
                link.telegram_user_id,
            ));
        }
        tables.links.insert(link.telegram_user_id, link.clone());
        Ok(())
    }

    async fn save_account_link(&self, link: &AccountLink) -> Result<AccountLink> {
        let mut tables = self.tables.write().await;
        let mut saved = link.clone();
        if let Some(existing) = tables.links.get(&link.telegram_user_id) {
            saved.id = existing.id.clone();
            saved.created_at = existing.created_at;
        }
        tables.links.insert(saved.telegram_user_id, saved.clone());
        Ok(saved)
    }

    async fn create_leave_request(&self, request: &LeaveRequest) -> Result<LeaveRequest> {
        let mut tables = self.tables.write().await;
        if tables.requests.contains_key(&request.id) {
            return Err(PersistenceError::conflict("leave request", &request.id));
        }
        tables.requests.insert(request.id.clone(), request.clone());
        Ok(request.clone())
    }

    async fn get_leave_request(&self, id: &LeaveRequestId) -> Result<Option<LeaveRequest>> {
        Ok(self.tables.read().await.requests.get(id).cloned())
    }

    async fn update_leave_request(&self, request: &LeaveRequest) -> Result<()> {
        let mut tables = self.tables.write().await;
        match tables.requests.get_mut(&request.id) {
            Some(slot) => {
                *slot = request.clone();
                Ok(())
            }
            None => Err(PersistenceError::not_found("leave request", &request.id)),
        }
    }

    async fn delete_leave_request(&self, id: &LeaveRequestId) -> Result<()> {
        match self.tables.write().await.requests.remove(id) {
            Some(_) => Ok(()),
            None => Err(PersistenceError::not_found("leave request", id)),
        }
    }

    async fn list_leave_requests(&self, user_id: &UserId) -> Result<Vec<LeaveRequest>> {
        let tables = self.tables.read().await;
        let mut requests: Vec<LeaveRequest> = tables
            .requests
            .values()
            .filter(|r| &r.user_id == user_id)
            .cloned()
            .collect();
        newest_first(&mut requests);
        Ok(requests)
    }

    async fn list_all_leave_requests(&self) -> Result<Vec<LeaveRequest>> {
        let tables = self.tables.read().await;
        let mut requests: Vec<LeaveRequest> = tables.requests.values().cloned().collect();
        newest_first(&mut requests);
        Ok(requests)
    }
}
