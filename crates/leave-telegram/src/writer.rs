//! Turns an accepted intent into a stored leave request.

use std::sync::Arc;

use leave_core::normalizer::{normalize_leave_type, DateSpan, NormalizeError};
use leave_core::PipelineConfig;
use leave_models::{Intent, LeaveRequest, ParsedIntent, UserId};
use leave_persistence::{LeaveRepository, PersistenceError};
use thiserror::Error;
use tracing::{error, info};

/// Reason stored when the message gave none.
pub const DEFAULT_REASON: &str = "Submitted via Telegram";

/// Why a leave request was not written.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("intent is {0}, not leave_request")]
    NotALeaveRequest(Intent),

    #[error("confidence {confidence} below {min}")]
    LowConfidence { confidence: f64, min: f64 },

    #[error("start or end date missing")]
    MissingDates,

    #[error(transparent)]
    InvalidDates(#[from] NormalizeError),

    #[error("half-day request without a period")]
    MissingHalfDayPeriod,

    /// The store failed; the request was not saved.
    #[error("failed to save leave request: {0}")]
    Persistence(#[from] PersistenceError),
}

impl WriteError {
    /// True for precondition failures, where nothing was attempted.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, WriteError::Persistence(_))
    }
}

/// Validates intents and persists leave requests.
#[derive(Clone)]
pub struct LeaveWriter {
    repo: Arc<dyn LeaveRepository>,
    config: PipelineConfig,
}

impl LeaveWriter {
    pub fn new(repo: Arc<dyn LeaveRepository>, config: PipelineConfig) -> Self {
        Self { repo, config }
    }

    /// Builds the request `intent` describes, without saving it.
    pub fn build(&self, user_id: &UserId, intent: &ParsedIntent) -> Result<LeaveRequest, WriteError> {
        if intent.intent != Intent::LeaveRequest {
            return Err(WriteError::NotALeaveRequest(intent.intent));
        }
        if !self.config.accepts(intent.confidence) {
            return Err(WriteError::LowConfidence {
                confidence: intent.confidence,
                min: self.config.min_confidence,
            });
        }
        if intent.is_missing_half_day_period() {
            return Err(WriteError::MissingHalfDayPeriod);
        }
        let (Some(start), Some(end)) = (intent.start_date.as_deref(), intent.end_date.as_deref())
        else {
            return Err(WriteError::MissingDates);
        };

        let span = DateSpan::parse(start, end)?;
        let leave_type = normalize_leave_type(intent.leave_type.as_deref().unwrap_or_default());
        let reason = intent
            .reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_REASON);

        let request = LeaveRequest::new(
            user_id.clone(),
            leave_type,
            span.dates(),
            span.days(),
            reason,
        );
        Ok(match (intent.is_half_day(), intent.half_day_period) {
            (true, Some(period)) => request.with_half_day(period),
            _ => request,
        })
    }

    /// Validates `intent` and stores the resulting request.
    ///
    /// Storage failures are returned as [`WriteError::Persistence`] and must
    /// not be reported to the user as success.
    pub async fn create_leave_request(
        &self,
        user_id: &UserId,
        intent: &ParsedIntent,
    ) -> Result<LeaveRequest, WriteError> {
        let request = self.build(user_id, intent)?;
        match self.repo.create_leave_request(&request).await {
            Ok(stored) => {
                info!(
                    user_id = %stored.user_id,
                    request_id = %stored.id,
                    leave_type = %stored.leave_type,
                    days = stored.days,
                    "Leave request created"
                );
                Ok(stored)
            }
            Err(e) => {
                error!(user_id = %user_id, error = %e, "Failed to create leave request");
                Err(WriteError::Persistence(e))
            }
        }
    }
}
