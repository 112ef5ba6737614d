//! Request DTOs for the API.

use leave_models::HalfDayPeriod;
use serde::Deserialize;

/// Body of `POST /telegram/setup-user`.
///
/// Required fields are optional here so that missing ones produce a 400
/// with a clear message instead of a generic parse failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SetupUserRequest {
    pub telegram_user_id: Option<i64>,
    pub user_email: Option<String>,
    pub telegram_username: Option<String>,
    pub telegram_first_name: Option<String>,
    pub telegram_last_name: Option<String>,
}

/// Body of the approve/reject endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct DecisionRequest {
    /// Id of the deciding manager.
    pub approved_by: String,
    #[serde(default)]
    pub approved_by_name: Option<String>,
}

/// Body of `POST /api/leave-requests`.
///
/// `end_date` defaults to `start_date`; `leave_type` is normalized the same
/// way as bot-submitted requests.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLeaveRequest {
    pub user_id: String,
    pub leave_type: String,
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub is_half_day: bool,
    #[serde(default)]
    pub half_day_period: Option<HalfDayPeriod>,
}

/// Query of `DELETE /api/leave-requests/:id`: who is asking.
#[derive(Debug, Clone, Deserialize)]
pub struct RequesterQuery {
    pub user_id: String,
}
