//! Structured result of classifying a chat message.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The classified purpose of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// A complete leave request with absolute dates.
    LeaveRequest,
    /// A leave request missing a usable date or half-day period.
    IncompleteRequest,
    /// Anything else.
    #[default]
    #[serde(other)]
    Unknown,
}

impl Intent {
    /// Wire name, as used in the model contract.
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::LeaveRequest => "leave_request",
            Intent::IncompleteRequest => "incomplete_request",
            Intent::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "leave_request" => Ok(Intent::LeaveRequest),
            "incomplete_request" => Ok(Intent::IncompleteRequest),
            "unknown" => Ok(Intent::Unknown),
            other => Err(format!("invalid intent: {}", other)),
        }
    }
}

/// Which half of the day a half-day leave covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HalfDayPeriod {
    Morning,
    Afternoon,
}

impl HalfDayPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HalfDayPeriod::Morning => "morning",
            HalfDayPeriod::Afternoon => "afternoon",
        }
    }

    /// Label used in user-facing text.
    pub fn label(&self) -> &'static str {
        match self {
            HalfDayPeriod::Morning => "Morning",
            HalfDayPeriod::Afternoon => "Afternoon",
        }
    }
}

impl fmt::Display for HalfDayPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HalfDayPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "morning" | "am" => Ok(HalfDayPeriod::Morning),
            "afternoon" | "pm" => Ok(HalfDayPeriod::Afternoon),
            other => Err(format!("invalid half-day period: {}", other)),
        }
    }
}

/// Transient output of the intent parser.
///
/// Dates and leave type are kept as the model returned them; the normalizer
/// turns them into domain values when a request is written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ParsedIntent {
    pub intent: Intent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leave_type: Option<String>,
    /// Model confidence in `[0, 1]`.
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_half_day: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub half_day_period: Option<HalfDayPeriod>,
}

impl ParsedIntent {
    /// The soft-fail value: `{intent: unknown, confidence: 0}`.
    pub fn unknown() -> Self {
        Self::default()
    }

    /// A full-day leave request over `start..=end`.
    pub fn leave_request(start: &str, end: &str, leave_type: &str, confidence: f64) -> Self {
        Self {
            intent: Intent::LeaveRequest,
            start_date: Some(start.to_string()),
            end_date: Some(end.to_string()),
            leave_type: Some(leave_type.to_string()),
            confidence,
            ..Self::default()
        }
    }

    /// An incomplete request.
    pub fn incomplete(confidence: f64) -> Self {
        Self {
            intent: Intent::IncompleteRequest,
            confidence,
            ..Self::default()
        }
    }

    /// Sets the reason.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Marks the request as half-day.
    pub fn with_half_day(mut self, period: Option<HalfDayPeriod>) -> Self {
        self.is_half_day = Some(true);
        self.half_day_period = period;
        self
    }

    pub fn is_half_day(&self) -> bool {
        self.is_half_day.unwrap_or(false)
    }

    /// True when flagged half-day but no period was given.
    pub fn is_missing_half_day_period(&self) -> bool {
        self.is_half_day() && self.half_day_period.is_none()
    }

    /// Downgrades to `incomplete_request` when the half-day period is missing.
    pub fn enforce_half_day_period(mut self) -> Self {
        if self.is_missing_half_day_period() {
            self.intent = Intent::IncompleteRequest;
        }
        self
    }
}
