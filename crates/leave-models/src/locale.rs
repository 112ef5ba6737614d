//! Language of user-facing bot replies.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Th,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Th => "th",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = String;

    /// Accepts language codes and English names, e.g. `th`, `th-TH`, `thai`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        let code = lowered.split(['-', '_']).next().unwrap_or_default();
        match code {
            "en" | "english" => Ok(Locale::En),
            "th" | "thai" => Ok(Locale::Th),
            _ => Err(format!("unsupported locale: {}", s.trim())),
        }
    }
}
