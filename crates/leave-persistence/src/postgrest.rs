//! Backend for a hosted Postgres REST interface (Supabase).
//!
//! Rows map one-to-one onto the model structs: `profiles`,
//! `telegram_users` and `leave_requests`.

use async_trait::async_trait;
use leave_models::{AccountLink, LeaveRequest, LeaveRequestId, UserId, UserProfile};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{PersistenceError, Result};
use crate::repository::LeaveRepository;

const PROFILES: &str = "profiles";
const LINKS: &str = "telegram_users";
const LEAVE_REQUESTS: &str = "leave_requests";

/// Postgres error code for unique-constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

/// Talks to `{base_url}/rest/v1/<table>` with a service-role key.
#[derive(Clone)]
pub struct PostgrestStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl PostgrestStore {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url, api_key)
    }

    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}/rest/v1/{}", self.base_url, table))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let response = self
            .request(Method::GET, table)
            .query(&[("select", "*")])
            .query(filters)
            .send()
            .await?;
        let response = check(response, table, "select").await?;
        Ok(response.json().await?)
    }

    async fn select_one<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, String)],
    ) -> Result<Option<T>> {
        let mut filters = filters.to_vec();
        filters.push(("limit", "1".to_string()));
        Ok(self.select(table, &filters).await?.into_iter().next())
    }
}

/// Maps non-2xx answers onto [`PersistenceError`].
async fn check(response: Response, kind: &str, id: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let parsed: Option<Value> = serde_json::from_str(&body).ok();
    let code = parsed
        .as_ref()
        .and_then(|v| v["code"].as_str())
        .unwrap_or_default();

    if status == StatusCode::CONFLICT || code == UNIQUE_VIOLATION {
        return Err(PersistenceError::conflict(kind, id));
    }

    let message = parsed
        .as_ref()
        .and_then(|v| v["message"].as_str())
        .map(str::to_string)
        .unwrap_or(body);
    warn!(status = status.as_u16(), table = kind, error = %message, "Backend rejected request");
    Err(PersistenceError::Backend {
        status: status.as_u16(),
        message,
    })
}

fn eq(value: impl ToString) -> String {
    format!("eq.{}", value.to_string())
}

/// `in.("a","b")` list filter.
fn in_list(values: &[impl ToString]) -> String {
    let quoted: Vec<String> = values
        .iter()
        .map(|v| format!("\"{}\"", v.to_string().replace('"', "\\\"")))
        .collect();
    format!("in.({})", quoted.join(","))
}

/// `ilike` pattern that matches `value` literally.
fn ilike_exact(value: &str) -> String {
    let mut pattern = String::from("ilike.");
    for c in value.trim().chars() {
        if matches!(c, '%' | '_' | '*' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern
}

#[async_trait]
impl LeaveRepository for PostgrestStore {
    async fn find_profile(&self, user_id: &UserId) -> Result<Option<UserProfile>> {
        self.select_one(PROFILES, &[("id", eq(user_id))]).await
    }

    async fn find_profiles(&self, user_ids: &[UserId]) -> Result<Vec<UserProfile>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.select(PROFILES, &[("id", in_list(user_ids))]).await
    }

    async fn find_profile_by_email(&self, email: &str) -> Result<Option<UserProfile>> {
        let rows: Vec<UserProfile> = self
            .select(PROFILES, &[("email", ilike_exact(email))])
            .await?;
        Ok(rows.into_iter().find(|p| p.has_email(email)))
    }

    async fn find_account_link(&self, telegram_user_id: i64) -> Result<Option<AccountLink>> {
        self.select_one(LINKS, &[("telegram_user_id", eq(telegram_user_id))])
            .await
    }

    async fn insert_account_link(&self, link: &AccountLink) -> Result<()> {
        let response = self
            .request(Method::POST, LINKS)
            .header("Prefer", "return=minimal")
            .json(link)
            .send()
            .await?;
        check(response, "account link", &link.telegram_user_id.to_string()).await?;
        debug!(telegram_user_id = link.telegram_user_id, "Inserted account link");
        Ok(())
    }

    async fn save_account_link(&self, link: &AccountLink) -> Result<AccountLink> {
        let mut row = link.clone();
        if let Some(existing) = self.find_account_link(link.telegram_user_id).await? {
            row.id = existing.id;
            row.created_at = existing.created_at;
        }

        let response = self
            .request(Method::POST, LINKS)
            .query(&[("on_conflict", "telegram_user_id")])
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&row)
            .send()
            .await?;
        let response = check(response, "account link", &row.telegram_user_id.to_string()).await?;
        let saved: Vec<AccountLink> = response.json().await?;
        Ok(saved.into_iter().next().unwrap_or(row))
    }

    async fn create_leave_request(&self, request: &LeaveRequest) -> Result<LeaveRequest> {
        let response = self
            .request(Method::POST, LEAVE_REQUESTS)
            .header("Prefer", "return=representation")
            .json(request)
            .send()
            .await?;
        let response = check(response, "leave request", request.id.as_str()).await?;
        let rows: Vec<LeaveRequest> = response.json().await?;
        rows.into_iter().next().ok_or_else(|| PersistenceError::Backend {
            status: 200,
            message: "insert returned no rows".to_string(),
        })
    }

    async fn get_leave_request(&self, id: &LeaveRequestId) -> Result<Option<LeaveRequest>> {
        self.select_one(LEAVE_REQUESTS, &[("id", eq(id))]).await
    }

    async fn update_leave_request(&self, request: &LeaveRequest) -> Result<()> {
        let response = self
            .request(Method::PATCH, LEAVE_REQUESTS)
            .query(&[("id", eq(&request.id))])
            .header("Prefer", "return=representation")
            .json(request)
            .send()
            .await?;
        let response = check(response, "leave request", request.id.as_str()).await?;
        let rows: Vec<Value> = response.json().await?;
        if rows.is_empty() {
            return Err(PersistenceError::not_found("leave request", &request.id));
        }
        Ok(())
    }

    async fn delete_leave_request(&self, id: &LeaveRequestId) -> Result<()> {
        let response = self
            .request(Method::DELETE, LEAVE_REQUESTS)
            .query(&[("id", eq(id))])
            .header("Prefer", "return=representation")
            .send()
            .await?;
        let response = check(response, "leave request", id.as_str()).await?;
        let rows: Vec<Value> = response.json().await?;
        if rows.is_empty() {
            return Err(PersistenceError::not_found("leave request", id));
        }
        debug!(id = %id, "Deleted leave request");
        Ok(())
    }

    async fn list_leave_requests(&self, user_id: &UserId) -> Result<Vec<LeaveRequest>> {
        self.select(
            LEAVE_REQUESTS,
            &[
                ("user_id", eq(user_id)),
                ("order", "submitted_at.desc".to_string()),
            ],
        )
        .await
    }

    async fn list_all_leave_requests(&self) -> Result<Vec<LeaveRequest>> {
        self.select(LEAVE_REQUESTS, &[("order", "submitted_at.desc".to_string())])
            .await
    }
}
