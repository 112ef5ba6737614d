//! Core data models for the leave bot.
//!
//! This crate provides the types shared by the Telegram pipeline, the
//! persistence backends and the HTTP API: chat identities and the account
//! links that bind them to application users, the structured intent returned
//! by the language model, and persisted leave requests.

pub mod chat;
pub mod ids;
pub mod intent;
pub mod leave;
pub mod link;
pub mod locale;
pub mod profile;

// Re-export main types
pub use chat::ChatIdentity;
pub use ids::{LeaveRequestId, LinkId, UserId};
pub use intent::{HalfDayPeriod, Intent, ParsedIntent};
pub use leave::{LeaveRequest, LeaveStats, LeaveStatus, LeaveType, TransitionError};
pub use link::AccountLink;
pub use locale::Locale;
pub use profile::UserProfile;
