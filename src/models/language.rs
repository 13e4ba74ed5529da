use serde::{Deserialize, Serialize};

/// Response language requested for provider-generated text.
///
/// The deterministic engines always answer in English.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "hi")]
    Hindi,
    #[serde(rename = "ta")]
    Tamil,
    #[serde(rename = "ur")]
    Urdu,
    #[serde(rename = "ml")]
    Malayalam,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Hindi => "hi",
            Language::Tamil => "ta",
            Language::Urdu => "ur",
            Language::Malayalam => "ml",
        }
    }

    /// Name used inside provider prompts.
    pub fn prompt_name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Hindi => "Hindi (हिंदी)",
            Language::Tamil => "Tamil (தமிழ்)",
            Language::Urdu => "Urdu (اردو)",
            Language::Malayalam => "Malayalam (മലയാളം)",
        }
    }

    /// Unknown codes fall back to English.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_lowercase().as_str() {
            "hi" => Language::Hindi,
            "ta" => Language::Tamil,
            "ur" => Language::Urdu,
            "ml" => Language::Malayalam,
            _ => Language::English,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}
