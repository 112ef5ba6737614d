//! JSON-file backend.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use leave_models::{AccountLink, LeaveRequest, LeaveRequestId, UserId, UserProfile};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{PersistenceError, Result};
use crate::repository::{newest_first, LeaveRepository};

const PROFILES_FILE: &str = "profiles.json";
const LINKS_FILE: &str = "telegram_users.json";
const LEAVE_REQUESTS_FILE: &str = "leave_requests.json";

/// Stores each collection as one JSON array:
/// ```text
/// base_path/
/// ├── profiles.json
/// ├── telegram_users.json
/// └── leave_requests.json
/// ```
///
/// Every read-modify-write runs under one async mutex, so the
/// check-then-insert of [`LeaveRepository::insert_account_link`] cannot race
/// within a process.
pub struct FileStore {
    base_path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Creates a new FileStore rooted at `base_path`.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Inserts or replaces a profile (profiles normally come from the auth provider).
    pub async fn save_profile(&self, profile: &UserProfile) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut profiles: Vec<UserProfile> = self.load(PROFILES_FILE)?;
        profiles.retain(|p| p.id != profile.id);
        profiles.push(profile.clone());
        self.store(PROFILES_FILE, &profiles)
    }

    fn path(&self, file: &str) -> PathBuf {
        self.base_path.join(file)
    }

    fn load<T: DeserializeOwned>(&self, file: &str) -> Result<Vec<T>> {
        let path = self.path(file);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let data = fs::read_to_string(&path)
            .map_err(|source| PersistenceError::ReadError { path, source })?;
        if data.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&data)?)
    }

    fn store<T: Serialize>(&self, file: &str, items: &[T]) -> Result<()> {
        let json = serde_json::to_string_pretty(items)?;
        let path = self.path(file);
        write_atomically(&path, json.as_bytes())?;
        debug!(path = %path.display(), count = items.len(), "Saved collection");
        Ok(())
    }
}

/// Writes through a temp file in the target directory, then renames it over `path`.
fn write_atomically(path: &Path, data: &[u8]) -> Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|source| PersistenceError::DirectoryError {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let write_err = |source| PersistenceError::WriteError {
        path: path.to_path_buf(),
        source,
    };

    let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
    temp.write_all(data).map_err(write_err)?;
    temp.flush().map_err(write_err)?;
    temp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

#[async_trait]
impl LeaveRepository for FileStore {
    async fn find_profile(&self, user_id: &UserId) -> Result<Option<UserProfile>> {
        let profiles: Vec<UserProfile> = self.load(PROFILES_FILE)?;
        Ok(profiles.into_iter().find(|p| &p.id == user_id))
    }

    async fn find_profile_by_email(&self, email: &str) -> Result<Option<UserProfile>> {
        let profiles: Vec<UserProfile> = self.load(PROFILES_FILE)?;
        Ok(profiles.into_iter().find(|p| p.has_email(email)))
    }

    async fn find_account_link(&self, telegram_user_id: i64) -> Result<Option<AccountLink>> {
        let links: Vec<AccountLink> = self.load(LINKS_FILE)?;
        Ok(links
            .into_iter()
            .find(|l| l.telegram_user_id == telegram_user_id))
    }

    async fn insert_account_link(&self, link: &AccountLink) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut links: Vec<AccountLink> = self.load(LINKS_FILE)?;
        if links
            .iter()
            .any(|l| l.telegram_user_id == link.telegram_user_id)
        {
            return Err(PersistenceError::conflict(
                "account link",
                link.telegram_user_id,
            ));
        }
        links.push(link.clone());
        self.store(LINKS_FILE, &links)
    }

    async fn save_account_link(&self, link: &AccountLink) -> Result<AccountLink> {
        let _guard = self.write_lock.lock().await;
        let mut links: Vec<AccountLink> = self.load(LINKS_FILE)?;
        let mut saved = link.clone();
        if let Some(existing) = links
            .iter_mut()
            .find(|l| l.telegram_user_id == link.telegram_user_id)
        {
            saved.id = existing.id.clone();
            saved.created_at = existing.created_at;
            *existing = saved.clone();
        } else {
            links.push(saved.clone());
        }
        self.store(LINKS_FILE, &links)?;
        Ok(saved)
    }

    async fn create_leave_request(&self, request: &LeaveRequest) -> Result<LeaveRequest> {
        let _guard = self.write_lock.lock().await;
        let mut requests: Vec<LeaveRequest> = self.load(LEAVE_REQUESTS_FILE)?;
        if requests.iter().any(|r| r.id == request.id) {
            return Err(PersistenceError::conflict("leave request", &request.id));
        }
        requests.push(request.clone());
        self.store(LEAVE_REQUESTS_FILE, &requests)?;
        Ok(request.clone())
    }

    async fn get_leave_request(&self, id: &LeaveRequestId) -> Result<Option<LeaveRequest>> {
        let requests: Vec<LeaveRequest> = self.load(LEAVE_REQUESTS_FILE)?;
        Ok(requests.into_iter().find(|r| &r.id == id))
    }

    async fn update_leave_request(&self, request: &LeaveRequest) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut requests: Vec<LeaveRequest> = self.load(LEAVE_REQUESTS_FILE)?;
        let slot = requests
            .iter_mut()
            .find(|r| r.id == request.id)
            .ok_or_else(|| PersistenceError::not_found("leave request", &request.id))?;
        *slot = request.clone();
        self.store(LEAVE_REQUESTS_FILE, &requests)
    }

    async fn delete_leave_request(&self, id: &LeaveRequestId) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut requests: Vec<LeaveRequest> = self.load(LEAVE_REQUESTS_FILE)?;
        let before = requests.len();
        requests.retain(|r| &r.id != id);
        if requests.len() == before {
            return Err(PersistenceError::not_found("leave request", id));
        }
        self.store(LEAVE_REQUESTS_FILE, &requests)
    }

    async fn list_leave_requests(&self, user_id: &UserId) -> Result<Vec<LeaveRequest>> {
        let mut requests: Vec<LeaveRequest> = self.load(LEAVE_REQUESTS_FILE)?;
        requests.retain(|r| &r.user_id == user_id);
        newest_first(&mut requests);
        Ok(requests)
    }

    async fn list_all_leave_requests(&self) -> Result<Vec<LeaveRequest>> {
        let mut requests: Vec<LeaveRequest> = self.load(LEAVE_REQUESTS_FILE)?;
        newest_first(&mut requests);
        Ok(requests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use leave_models::{ChatIdentity, LeaveType};
    use tempfile::tempdir;

    fn leave_for(user: &str) -> LeaveRequest {
        let date = NaiveDate::from_ymd_opt(2025, 11, 20).unwrap();
        LeaveRequest::new(UserId::from(user), LeaveType::Sick, vec![date], 1, "flu")
    }

    #[tokio::test]
    async fn test_missing_files_read_as_empty() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());

        assert!(store.find_account_link(1).await.unwrap().is_none());
        assert!(store.list_all_leave_requests().await.unwrap().is_empty());
        assert!(store.find_profile_by_email("a@b.c").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_profile_lookup_by_email() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store
            .save_profile(&UserProfile::new("U1", "User@X.com", Some("User One")))
            .await
            .unwrap();

        let found = store.find_profile_by_email("user@x.com").await.unwrap();
        assert_eq!(found.unwrap().id.as_str(), "U1");
        assert!(store.find_profile(&UserId::from("U1")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_insert_account_link_rejects_duplicates() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let identity = ChatIdentity::new(111);

        let first = AccountLink::new(&identity, UserId::from("U1"), "user@x.com", Some(111));
        store.insert_account_link(&first).await.unwrap();

        let second = AccountLink::new(&identity, UserId::from("U9"), "other@x.com", Some(111));
        let err = store.insert_account_link(&second).await.unwrap_err();
        assert!(err.is_conflict());

        let stored = store.find_account_link(111).await.unwrap().unwrap();
        assert_eq!(stored.user_id.as_str(), "U1");
    }

    #[tokio::test]
    async fn test_save_account_link_replaces_and_keeps_id() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let identity = ChatIdentity::new(5);

        let first = AccountLink::new(&identity, UserId::from("U1"), "a@x.com", None);
        store.insert_account_link(&first).await.unwrap();

        let replacement = AccountLink::new(&identity, UserId::from("U2"), "b@x.com", None);
        let saved = store.save_account_link(&replacement).await.unwrap();

        assert_eq!(saved.id, first.id);
        let stored = store.find_account_link(5).await.unwrap().unwrap();
        assert_eq!(stored.user_id.as_str(), "U2");
        assert_eq!(stored.email, "b@x.com");
    }

    #[tokio::test]
    async fn test_leave_requests_persist_across_instances() {
        let dir = tempdir().unwrap();
        let request = leave_for("U1");
        {
            let store = FileStore::new(dir.path());
            store.create_leave_request(&request).await.unwrap();
            store.create_leave_request(&leave_for("U2")).await.unwrap();
        }

        let reopened = FileStore::new(dir.path());
        let mine = reopened.list_leave_requests(&UserId::from("U1")).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, request.id);
        assert_eq!(reopened.count_leave_requests(&UserId::from("U2")).await.unwrap(), 1);
        assert_eq!(reopened.list_all_leave_requests().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_leave_request() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let mut request = leave_for("U1");
        store.create_leave_request(&request).await.unwrap();

        request.approve("M1", "Manager").unwrap();
        store.update_leave_request(&request).await.unwrap();

        let loaded = store.get_leave_request(&request.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, leave_models::LeaveStatus::Approved);
    }

    #[tokio::test]
    async fn test_delete_leave_request_keeps_others() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let gone = leave_for("U1");
        let kept = leave_for("U1");
        store.create_leave_request(&gone).await.unwrap();
        store.create_leave_request(&kept).await.unwrap();

        store.delete_leave_request(&gone.id).await.unwrap();

        let remaining = FileStore::new(dir.path()).list_all_leave_requests().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, kept.id);
        assert!(matches!(
            store.delete_leave_request(&gone.id).await,
            Err(PersistenceError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_missing_request_is_not_found() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());

        let result = store.update_leave_request(&leave_for("U1")).await;
        assert!(matches!(result, Err(PersistenceError::NotFound { .. })));
    }

    #[test]
    fn test_write_atomically_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/dir/data.json");

        write_atomically(&path, b"[]").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }
}
