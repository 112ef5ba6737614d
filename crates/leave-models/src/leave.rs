//! Leave requests and their derived statistics.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids::{LeaveRequestId, UserId};
use crate::intent::HalfDayPeriod;

/// Canonical leave categories, serialized as their persisted labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LeaveType {
    #[default]
    #[serde(rename = "Personal Leave", alias = "Personal")]
    Personal,
    #[serde(rename = "Sick Leave", alias = "Sick")]
    Sick,
    #[serde(rename = "Vacation Leave", alias = "Vacation")]
    Vacation,
}

impl LeaveType {
    /// All categories, in display order.
    pub const ALL: [LeaveType; 3] = [LeaveType::Personal, LeaveType::Sick, LeaveType::Vacation];

    /// The persisted label, e.g. `"Sick Leave"`.
    pub fn label(&self) -> &'static str {
        match self {
            LeaveType::Personal => "Personal Leave",
            LeaveType::Sick => "Sick Leave",
            LeaveType::Vacation => "Vacation Leave",
        }
    }
}

impl fmt::Display for LeaveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Approval status of a leave request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LeaveStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl LeaveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveStatus::Pending => "pending",
            LeaveStatus::Approved => "approved",
            LeaveStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a status transition is not allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionError {
    pub from: LeaveStatus,
    pub to: LeaveStatus,
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot move leave request from {} to {}", self.from, self.to)
    }
}

impl std::error::Error for TransitionError {}

/// A persisted leave request.
///
/// `days` is always the full inclusive calendar span, also for half-day
/// requests; see [`LeaveRequest::effective_days`] for the displayed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveRequest {
    pub id: LeaveRequestId,
    pub user_id: UserId,
    pub leave_type: LeaveType,
    pub selected_dates: Vec<NaiveDate>,
    pub days: u32,
    pub reason: String,
    pub status: LeaveStatus,
    #[serde(default)]
    pub is_half_day: bool,
    #[serde(default)]
    pub half_day_period: Option<HalfDayPeriod>,
    pub submitted_at: DateTime<Utc>,
    #[serde(default)]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub approved_by: Option<String>,
    #[serde(default)]
    pub approved_by_name: Option<String>,
}

impl LeaveRequest {
    /// Creates a new pending full-day request.
    pub fn new(
        user_id: UserId,
        leave_type: LeaveType,
        selected_dates: Vec<NaiveDate>,
        days: u32,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            id: LeaveRequestId::new(),
            user_id,
            leave_type,
            selected_dates,
            days,
            reason: reason.into(),
            status: LeaveStatus::Pending,
            is_half_day: false,
            half_day_period: None,
            submitted_at: Utc::now(),
            approved_at: None,
            approved_by: None,
            approved_by_name: None,
        }
    }

    /// Marks the request as covering only `period` of the day.
    pub fn with_half_day(mut self, period: HalfDayPeriod) -> Self {
        self.is_half_day = true;
        self.half_day_period = Some(period);
        self
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.selected_dates.first().copied()
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.selected_dates.last().copied()
    }

    /// Days as shown to people: `0.5` for a half-day request.
    pub fn effective_days(&self) -> f64 {
        if self.is_half_day {
            0.5
        } else {
            f64::from(self.days)
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == LeaveStatus::Pending
    }

    /// Approves a pending request.
    pub fn approve(
        &mut self,
        approved_by: impl Into<String>,
        approved_by_name: impl Into<String>,
    ) -> Result<(), TransitionError> {
        self.decide(LeaveStatus::Approved, approved_by.into(), approved_by_name.into())
    }

    /// Rejects a pending request.
    pub fn reject(
        &mut self,
        rejected_by: impl Into<String>,
        rejected_by_name: impl Into<String>,
    ) -> Result<(), TransitionError> {
        self.decide(LeaveStatus::Rejected, rejected_by.into(), rejected_by_name.into())
    }

    fn decide(&mut self, to: LeaveStatus, by: String, name: String) -> Result<(), TransitionError> {
        if self.status != LeaveStatus::Pending {
            return Err(TransitionError {
                from: self.status,
                to,
            });
        }
        self.status = to;
        self.approved_at = Some(Utc::now());
        self.approved_by = Some(by);
        self.approved_by_name = Some(name);
        Ok(())
    }
}

/// Per-user usage summary.
///
/// Day totals include approved and pending requests; `pending` counts
/// requests still awaiting a decision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct LeaveStats {
    pub personal_used: f64,
    pub vacation_used: f64,
    pub sick_used: f64,
    pub pending: usize,
}

impl LeaveStats {
    /// Summarizes a set of requests.
    pub fn from_requests<'a>(requests: impl IntoIterator<Item = &'a LeaveRequest>) -> Self {
        let mut stats = Self::default();
        for request in requests {
            if request.status == LeaveStatus::Rejected {
                continue;
            }
            let days = request.effective_days();
            match request.leave_type {
                LeaveType::Personal => stats.personal_used += days,
                LeaveType::Vacation => stats.vacation_used += days,
                LeaveType::Sick => stats.sick_used += days,
            }
            if request.is_pending() {
                stats.pending += 1;
            }
        }
        stats
    }
}
