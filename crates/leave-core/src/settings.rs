//! Runtime settings read from environment variables.

use leave_models::Locale;
use tracing::warn;

pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
pub const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Minimum confidence for a parsed intent to become a leave request.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.7;

/// Policy constants of the webhook pipeline.
///
/// The dispatcher reads `min_confidence`; the intent parser reads
/// `reject_relative_dates` to pick its prompt wording.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    pub min_confidence: f64,
    pub reject_relative_dates: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            reject_relative_dates: true,
        }
    }
}

impl PipelineConfig {
    /// Returns true when `confidence` passes the gate.
    pub fn accepts(&self, confidence: f64) -> bool {
        confidence >= self.min_confidence
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TelegramSettings {
    pub bot_token: Option<String>,
    pub api_url: String,
    /// Used to accept `/command@username` addressing.
    pub bot_username: Option<String>,
    /// Language of bot replies.
    pub locale: Locale,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeminiSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub api_url: String,
}

/// Hosted database credentials; both values are required.
#[derive(Debug, Clone, PartialEq)]
pub struct SupabaseSettings {
    pub url: String,
    pub service_role_key: String,
}

/// Everything the server needs from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub telegram: TelegramSettings,
    pub gemini: GeminiSettings,
    pub supabase: Option<SupabaseSettings>,
    pub pipeline: PipelineConfig,
}

impl Settings {
    /// Reads settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let supabase = match (get("SUPABASE_URL"), get("SUPABASE_SERVICE_ROLE_KEY")) {
            (Some(url), Some(service_role_key)) => Some(SupabaseSettings {
                url,
                service_role_key,
            }),
            (Some(_), None) => {
                warn!("SUPABASE_URL set without SUPABASE_SERVICE_ROLE_KEY, using file storage");
                None
            }
            _ => None,
        };

        let min_confidence = match get("LEAVEBOT_MIN_CONFIDENCE") {
            Some(raw) => match raw.trim().parse::<f64>() {
                Ok(v) if (0.0..=1.0).contains(&v) => v,
                _ => {
                    warn!(value = %raw, "Invalid LEAVEBOT_MIN_CONFIDENCE, using default");
                    DEFAULT_MIN_CONFIDENCE
                }
            },
            None => DEFAULT_MIN_CONFIDENCE,
        };

        let allow_relative = get("LEAVEBOT_ALLOW_RELATIVE_DATES")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let locale = match get("LEAVEBOT_LOCALE") {
            Some(raw) => raw.parse().unwrap_or_else(|e: String| {
                warn!(error = %e, "Invalid LEAVEBOT_LOCALE, using English");
                Locale::default()
            }),
            None => Locale::default(),
        };

        Self {
            telegram: TelegramSettings {
                bot_token: get("TELEGRAM_BOT_TOKEN"),
                api_url: get("TELEGRAM_API_URL")
                    .unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.to_string()),
                bot_username: get("TELEGRAM_BOT_USERNAME")
                    .map(|u| u.trim_start_matches('@').to_string()),
                locale,
            },
            gemini: GeminiSettings {
                api_key: get("GOOGLE_AI_API_KEY"),
                model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
                api_url: get("GEMINI_API_URL").unwrap_or_else(|| DEFAULT_GEMINI_API_URL.to_string()),
            },
            supabase,
            pipeline: PipelineConfig {
                min_confidence,
                reject_relative_dates: !allow_relative,
            },
        }
    }
}
