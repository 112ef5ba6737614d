//! Leave request handlers for the web app.

use std::collections::{HashMap, HashSet};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use leave_core::{normalize_leave_type, DateSpan};
use leave_models::{LeaveRequest, LeaveRequestId, LeaveStats, UserId};
use tracing::{info, warn};

use crate::error::{ApiError, Result};
use crate::state::AppState;
use crate::types::{
    CreateLeaveRequest, DecisionRequest, LeaveRequestListResponse, LeaveRequestView,
    LeaveStatsResponse, RequesterQuery, SuccessResponse,
};

/// GET /api/users/:id/leave-requests - A user's requests, newest first.
pub async fn list_user_leave_requests(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<LeaveRequestListResponse>> {
    let requests = state.repo.list_leave_requests(&UserId::from(user_id)).await?;
    Ok(Json(LeaveRequestListResponse::from_requests(&requests)))
}

/// GET /api/users/:id/leave-stats - Usage totals per leave type.
pub async fn user_leave_stats(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<LeaveStatsResponse>> {
    let requests = state
        .repo
        .list_leave_requests(&UserId::from(user_id.as_str()))
        .await?;
    let stats = LeaveStats::from_requests(&requests);
    Ok(Json(LeaveStatsResponse::new(&user_id, stats)))
}

/// GET /api/leave-requests - Every request, newest first, with requester
/// names and emails.
pub async fn list_leave_requests(
    State(state): State<AppState>,
) -> Result<Json<LeaveRequestListResponse>> {
    let requests = state.repo.list_all_leave_requests().await?;

    let mut seen = HashSet::new();
    let user_ids: Vec<UserId> = requests
        .iter()
        .filter(|r| seen.insert(&r.user_id))
        .map(|r| r.user_id.clone())
        .collect();
    let profiles = match state.repo.find_profiles(&user_ids).await {
        Ok(profiles) => profiles,
        Err(e) => {
            warn!(error = %e, "Profile lookup failed; listing requests without names");
            Vec::new()
        }
    };
    let profiles: HashMap<UserId, _> = profiles.into_iter().map(|p| (p.id.clone(), p)).collect();

    Ok(Json(LeaveRequestListResponse::with_requesters(
        &requests, &profiles,
    )))
}

/// POST /api/leave-requests - Submit a request from the web app.
pub async fn create_leave_request(
    State(state): State<AppState>,
    Json(req): Json<CreateLeaveRequest>,
) -> Result<(StatusCode, Json<LeaveRequestView>)> {
    let user_id = req.user_id.trim();
    if user_id.is_empty() {
        return Err(ApiError::BadRequest("user_id is required".to_string()));
    }
    let user_id = UserId::from(user_id);
    if state.repo.find_profile(&user_id).await?.is_none() {
        return Err(ApiError::NotFound(format!(
            "user profile not found: {}",
            user_id
        )));
    }

    let end = req.end_date.as_deref().unwrap_or(&req.start_date);
    let span =
        DateSpan::parse(&req.start_date, end).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let reason = req.reason.as_deref().map(str::trim).unwrap_or_default();

    let mut request = LeaveRequest::new(
        user_id,
        normalize_leave_type(&req.leave_type),
        span.dates(),
        span.days(),
        reason,
    );
    if req.is_half_day {
        let period = req.half_day_period.ok_or_else(|| {
            ApiError::BadRequest("half_day_period is required for half-day leave".to_string())
        })?;
        if span.days() != 1 {
            return Err(ApiError::BadRequest(
                "half-day leave must cover a single date".to_string(),
            ));
        }
        request = request.with_half_day(period);
    }

    let stored = state.repo.create_leave_request(&request).await?;
    info!(
        user_id = %stored.user_id,
        request_id = %stored.id,
        leave_type = %stored.leave_type,
        days = stored.days,
        "Leave request submitted from web"
    );
    Ok((StatusCode::CREATED, Json(LeaveRequestView::from(&stored))))
}

/// DELETE /api/leave-requests/:id?user_id=... - Withdraw a pending request.
///
/// Only the requester may delete, and only while the request is pending.
pub async fn delete_leave_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(requester): Query<RequesterQuery>,
) -> Result<Json<SuccessResponse>> {
    let request_id = LeaveRequestId::from(id.as_str());
    let request = state
        .repo
        .get_leave_request(&request_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("leave request not found: {}", id)))?;

    if request.user_id.as_str() != requester.user_id.trim() {
        return Err(ApiError::Forbidden(
            "only the requester can delete a leave request".to_string(),
        ));
    }
    if !request.is_pending() {
        return Err(ApiError::BadRequest(format!(
            "only pending requests can be deleted, this one is {}",
            request.status
        )));
    }

    state.repo.delete_leave_request(&request.id).await?;
    info!(request_id = %request.id, user_id = %request.user_id, "Leave request deleted");

    Ok(Json(SuccessResponse {
        success: true,
        message: "Leave request deleted".to_string(),
    }))
}

/// POST /api/leave-requests/:id/approve
pub async fn approve_leave_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<DecisionRequest>,
) -> Result<Json<LeaveRequestView>> {
    decide(&state, &id, req, |request, by, name| request.approve(by, name)).await
}

/// POST /api/leave-requests/:id/reject
pub async fn reject_leave_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<DecisionRequest>,
) -> Result<Json<LeaveRequestView>> {
    decide(&state, &id, req, |request, by, name| request.reject(by, name)).await
}

async fn decide<F>(
    state: &AppState,
    id: &str,
    req: DecisionRequest,
    transition: F,
) -> Result<Json<LeaveRequestView>>
where
    F: FnOnce(&mut LeaveRequest, String, String) -> std::result::Result<(), leave_models::TransitionError>,
{
    let approved_by = req.approved_by.trim().to_string();
    if approved_by.is_empty() {
        return Err(ApiError::BadRequest("approved_by is required".to_string()));
    }
    let approved_by_name = req
        .approved_by_name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| approved_by.clone());

    let request_id = LeaveRequestId::from(id);
    let mut request = state
        .repo
        .get_leave_request(&request_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("leave request not found: {}", id)))?;

    transition(&mut request, approved_by, approved_by_name)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    state.repo.update_leave_request(&request).await?;

    info!(
        request_id = %request.id,
        status = %request.status,
        approved_by = ?request.approved_by,
        "Leave request decided"
    );
    Ok(Json(LeaveRequestView::from(&request)))
}
