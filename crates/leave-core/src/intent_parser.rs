//! Natural-language leave message parsing.
//!
//! The model is asked for a single JSON object. Whatever comes back is
//! validated here; any failure along the way yields
//! [`ParsedIntent::unknown`] so the caller never sees a model error.

use std::sync::{Arc, OnceLock};

use chrono::{Local, NaiveDate};
use leave_models::{HalfDayPeriod, Intent, ParsedIntent};
use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::model::TextModel;
use crate::settings::PipelineConfig;

const PROMPT_HEADER: &str = r#"You parse Thai or English chat messages about taking leave from work.

Reply with exactly one JSON object and nothing else:
{
  "intent": "leave_request" | "incomplete_request" | "unknown",
  "start_date": "YYYY-MM-DD" or null,
  "end_date": "YYYY-MM-DD" or null,
  "reason": string or null,
  "leave_type": "Personal" | "Sick" | "Vacation" | "Other",
  "confidence": number between 0.0 and 1.0,
  "is_half_day": true | false,
  "half_day_period": "morning" | "afternoon" | null
}

Rules:
- A single-day request uses the same start_date and end_date.
- Half-day phrasing ("half day", "morning off", "ลาครึ่งวัน") sets is_half_day to true.
  If the message does not say morning or afternoon, answer "incomplete_request".
- Messages that are not about leave are "unknown" with low confidence."#;

const REJECT_RELATIVE: &str = r#"- Only absolute calendar dates count ("20/11/2025", "15-17 November 2025").
  Relative phrases such as "today", "tomorrow", "next Monday" or "this month"
  are NOT dates: answer "incomplete_request" with null start_date and end_date."#;

const EXAMPLES: &str = r#"Examples:
- "Sick leave on 20/11/2025" -> {"intent": "leave_request", "start_date": "2025-11-20", "end_date": "2025-11-20", "reason": "sick", "leave_type": "Sick", "confidence": 0.95, "is_half_day": false, "half_day_period": null}
- "Vacation 15-17 Nov 2025, family trip" -> {"intent": "leave_request", "start_date": "2025-11-15", "end_date": "2025-11-17", "reason": "family trip", "leave_type": "Vacation", "confidence": 0.9, "is_half_day": false, "half_day_period": null}
- "Half day off on 3 Dec 2025" -> {"intent": "incomplete_request", "start_date": "2025-12-03", "end_date": "2025-12-03", "leave_type": "Personal", "confidence": 0.8, "is_half_day": true, "half_day_period": null}
- "What's for lunch?" -> {"intent": "unknown", "confidence": 0.1}"#;

/// Builds the instruction prompt for `text`.
///
/// When relative dates are allowed the model resolves them against `today`
/// instead of rejecting them.
pub fn build_prompt(text: &str, config: &PipelineConfig, today: NaiveDate) -> String {
    let date_rule = if config.reject_relative_dates {
        REJECT_RELATIVE.to_string()
    } else {
        format!(
            "- Resolve relative phrases (\"today\", \"tomorrow\", weekdays) against today's date, {}.",
            today.format("%Y-%m-%d")
        )
    };
    // JSON-quote the message so embedded quotes cannot end the string early.
    let quoted = serde_json::to_string(text).unwrap_or_else(|_| format!("\"{}\"", text));

    format!(
        "{}\n{}\n\n{}\n\nMessage: {}\n\nNo text outside the JSON object.",
        PROMPT_HEADER, date_rule, EXAMPLES, quoted
    )
}

fn fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| Regex::new(r"```(?:json)?\n?|\n?```").expect("valid regex"))
}

/// Removes Markdown code fences around a model answer.
pub fn strip_code_fences(raw: &str) -> String {
    fence_regex().replace_all(raw, "").trim().to_string()
}

fn optional_text(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("null"))
        .map(str::to_string)
}

/// Validates a raw model answer.
///
/// Returns `None` when the answer is not a JSON object, has no `intent`,
/// or has a non-numeric `confidence`. Unrecognized intent names read as
/// `unknown`; a half-day without a period is downgraded to
/// `incomplete_request`.
pub fn parse_model_output(raw: &str) -> Option<ParsedIntent> {
    let cleaned = strip_code_fences(raw);
    let value: Value = serde_json::from_str(&cleaned).ok()?;
    if !value.is_object() {
        return None;
    }

    let intent = optional_text(&value["intent"])?
        .parse::<Intent>()
        .unwrap_or(Intent::Unknown);
    let confidence = value["confidence"].as_f64()?.clamp(0.0, 1.0);

    let parsed = ParsedIntent {
        intent,
        start_date: optional_text(&value["start_date"]),
        end_date: optional_text(&value["end_date"]),
        reason: optional_text(&value["reason"]),
        leave_type: optional_text(&value["leave_type"]),
        confidence,
        is_half_day: value["is_half_day"].as_bool(),
        half_day_period: optional_text(&value["half_day_period"])
            .and_then(|p| p.parse::<HalfDayPeriod>().ok()),
    };
    Some(parsed.enforce_half_day_period())
}

/// Classifies chat messages with a text model.
#[derive(Clone)]
pub struct IntentParser {
    model: Arc<dyn TextModel>,
    config: PipelineConfig,
}

impl IntentParser {
    pub fn new(model: Arc<dyn TextModel>, config: PipelineConfig) -> Self {
        Self { model, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Parses `text`, resolving any relative-date wording against today.
    pub async fn parse(&self, text: &str) -> ParsedIntent {
        self.parse_on(text, Local::now().date_naive()).await
    }

    /// Parses `text` as if today were `today`.
    pub async fn parse_on(&self, text: &str, today: NaiveDate) -> ParsedIntent {
        let prompt = build_prompt(text, &self.config, today);

        let raw = match self.model.generate(&prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(model = %self.model.name(), error = %e, "Intent model call failed");
                return ParsedIntent::unknown();
            }
        };

        match parse_model_output(&raw) {
            Some(parsed) => {
                debug!(
                    intent = %parsed.intent,
                    confidence = parsed.confidence,
                    "Parsed message"
                );
                parsed
            }
            None => {
                warn!(response = %raw, "Unusable intent model response");
                ParsedIntent::unknown()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 10).unwrap()
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("  {} "), "{}");
    }

    #[test]
    fn test_parse_complete_request() {
        let raw = r#"```json
{"intent":"leave_request","start_date":"2025-11-20","end_date":"2025-11-20","leave_type":"Sick","confidence":0.95}
```"#;
        let parsed = parse_model_output(raw).unwrap();
        assert_eq!(parsed.intent, Intent::LeaveRequest);
        assert_eq!(parsed.start_date.as_deref(), Some("2025-11-20"));
        assert_eq!(parsed.leave_type.as_deref(), Some("Sick"));
        assert_eq!(parsed.confidence, 0.95);
        assert!(!parsed.is_half_day());
    }

    #[test]
    fn test_missing_intent_or_confidence_is_rejected() {
        assert!(parse_model_output(r#"{"confidence":0.9}"#).is_none());
        assert!(parse_model_output(r#"{"intent":"leave_request","confidence":"high"}"#).is_none());
        assert!(parse_model_output(r#"{"intent":"leave_request"}"#).is_none());
        assert!(parse_model_output("Sure! Here is the JSON").is_none());
        assert!(parse_model_output("[1,2]").is_none());
    }

    #[test]
    fn test_unrecognized_intent_reads_as_unknown() {
        let parsed = parse_model_output(r#"{"intent":"greeting","confidence":0.9}"#).unwrap();
        assert_eq!(parsed.intent, Intent::Unknown);
    }

    #[test]
    fn test_half_day_without_period_is_downgraded() {
        let raw = r#"{"intent":"leave_request","start_date":"2025-12-03","end_date":"2025-12-03","confidence":0.9,"is_half_day":true,"half_day_period":null}"#;
        let parsed = parse_model_output(raw).unwrap();
        assert_eq!(parsed.intent, Intent::IncompleteRequest);

        let with_period = raw.replace("\"half_day_period\":null", "\"half_day_period\":\"Morning\"");
        let parsed = parse_model_output(&with_period).unwrap();
        assert_eq!(parsed.intent, Intent::LeaveRequest);
        assert_eq!(parsed.half_day_period, Some(HalfDayPeriod::Morning));
    }

    #[test]
    fn test_null_strings_are_absent() {
        let raw = r#"{"intent":"incomplete_request","start_date":"null","end_date":null,"confidence":0.6}"#;
        let parsed = parse_model_output(raw).unwrap();
        assert!(parsed.start_date.is_none());
        assert!(parsed.end_date.is_none());
    }

    #[test]
    fn test_prompt_policy_clauses() {
        let strict = build_prompt("leave tomorrow", &PipelineConfig::default(), today());
        assert!(strict.contains("are NOT dates"));
        assert!(strict.contains("Message: \"leave tomorrow\""));

        let relaxed = PipelineConfig {
            reject_relative_dates: false,
            ..PipelineConfig::default()
        };
        let prompt = build_prompt("leave tomorrow", &relaxed, today());
        assert!(!prompt.contains("are NOT dates"));
        assert!(prompt.contains("2025-11-10"));
    }

    #[test]
    fn test_prompt_quotes_message() {
        let prompt = build_prompt("say \"hi\"", &PipelineConfig::default(), today());
        assert!(prompt.contains(r#"Message: "say \"hi\"""#));
    }
}
