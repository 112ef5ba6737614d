//! Core logic for the leave bot.
//!
//! - [`config`]: state directory and environment-file locations
//! - [`settings`]: runtime settings read from the environment, including the
//!   [`PipelineConfig`] policy constants
//! - [`model`]: the [`TextModel`] seam and its Gemini implementation
//! - [`intent_parser`]: turns a chat message into a [`ParsedIntent`](leave_models::ParsedIntent)
//! - [`normalizer`]: canonical leave types and inclusive date spans

pub mod config;
pub mod intent_parser;
pub mod model;
pub mod normalizer;
pub mod settings;

pub use intent_parser::{parse_model_output, IntentParser};
pub use model::{GeminiClient, ModelError, TextModel};
pub use normalizer::{normalize_leave_type, parse_date, DateSpan, NormalizeError};
pub use settings::{GeminiSettings, PipelineConfig, Settings, SupabaseSettings, TelegramSettings};
