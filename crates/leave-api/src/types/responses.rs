//! Response DTOs for the API.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use leave_models::{
    HalfDayPeriod, LeaveRequest, LeaveStats, LeaveStatus, LeaveType, UserId, UserProfile,
};
use serde::Serialize;

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Webhook acknowledgement.
#[derive(Debug, Clone, Serialize)]
pub struct AckResponse {
    pub ok: bool,
}

/// Answer to `GET` on an endpoint that only accepts `POST`.
#[derive(Debug, Clone, Serialize)]
pub struct EndpointInfo {
    pub message: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SetupUserResponse {
    pub success: bool,
    pub mapping_id: String,
    pub message: String,
}

/// Usage text for `GET /telegram/setup-user`.
#[derive(Debug, Clone, Serialize)]
pub struct SetupUserUsage {
    pub message: String,
    pub usage: String,
    pub required_fields: Vec<&'static str>,
    pub optional_fields: Vec<&'static str>,
}

/// One leave request as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct LeaveRequestView {
    pub id: String,
    pub user_id: String,
    pub leave_type: LeaveType,
    pub selected_dates: Vec<NaiveDate>,
    pub days: u32,
    /// `0.5` for half-day requests, else `days`.
    pub display_days: f64,
    pub reason: String,
    pub status: LeaveStatus,
    pub is_half_day: bool,
    pub half_day_period: Option<HalfDayPeriod>,
    pub submitted_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub approved_by: Option<String>,
    pub approved_by_name: Option<String>,
    /// Requester display name; only on the all-requests view.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
}

impl LeaveRequestView {
    /// Adds who submitted the request.
    ///
    /// Without a profile the name falls back to a short id and the email
    /// to the raw user id.
    pub fn with_requester(mut self, profile: Option<&UserProfile>) -> Self {
        let name = profile
            .and_then(|p| p.full_name.as_deref())
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .or_else(|| {
                profile
                    .and_then(|p| p.email.split('@').next())
                    .filter(|local| !local.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| {
                let short: String = self.user_id.chars().take(8).collect();
                format!("User {}", short)
            });
        let email = profile
            .map(|p| p.email.clone())
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| self.user_id.clone());

        self.user_name = Some(name);
        self.user_email = Some(email);
        self
    }
}

impl From<&LeaveRequest> for LeaveRequestView {
    fn from(request: &LeaveRequest) -> Self {
        Self {
            id: request.id.as_str().to_string(),
            user_id: request.user_id.as_str().to_string(),
            leave_type: request.leave_type,
            selected_dates: request.selected_dates.clone(),
            days: request.days,
            display_days: request.effective_days(),
            reason: request.reason.clone(),
            status: request.status,
            is_half_day: request.is_half_day,
            half_day_period: request.half_day_period,
            submitted_at: request.submitted_at,
            approved_at: request.approved_at,
            approved_by: request.approved_by.clone(),
            approved_by_name: request.approved_by_name.clone(),
            user_name: None,
            user_email: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaveRequestListResponse {
    pub leave_requests: Vec<LeaveRequestView>,
    pub total: usize,
}

impl LeaveRequestListResponse {
    pub fn from_requests(requests: &[LeaveRequest]) -> Self {
        Self {
            leave_requests: requests.iter().map(LeaveRequestView::from).collect(),
            total: requests.len(),
        }
    }

    /// Like [`from_requests`](Self::from_requests), with requester details
    /// looked up in `profiles`.
    pub fn with_requesters(
        requests: &[LeaveRequest],
        profiles: &HashMap<UserId, UserProfile>,
    ) -> Self {
        Self {
            leave_requests: requests
                .iter()
                .map(|r| LeaveRequestView::from(r).with_requester(profiles.get(&r.user_id)))
                .collect(),
            total: requests.len(),
        }
    }
}

/// Confirmation of a deletion.
#[derive(Debug, Clone, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

/// Per-user usage totals.
#[derive(Debug, Clone, Serialize)]
pub struct LeaveStatsResponse {
    pub user_id: String,
    pub personal_used: f64,
    pub vacation_used: f64,
    pub sick_used: f64,
    pub pending: usize,
}

impl LeaveStatsResponse {
    pub fn new(user_id: &str, stats: LeaveStats) -> Self {
        Self {
            user_id: user_id.to_string(),
            personal_used: stats.personal_used,
            vacation_used: stats.vacation_used,
            sick_used: stats.sick_used,
            pending: stats.pending,
        }
    }
}
