use std::path::PathBuf;
use std::time::Duration;

use crate::models::Language;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Keys shipped in sample env files; treated the same as no key at all.
const PLACEHOLDER_KEYS: &[&str] = &[
    "your-openai-api-key-here",
    "your-api-key",
    "your_api_key",
    "changeme",
    "sk-...",
];

/// Settings for the external text-generation provider.
#[derive(Debug, Clone)]
pub struct AiSettings {
    pub enabled: bool,
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl AiSettings {
    /// Read settings from the process environment. Missing or malformed
    /// values fall back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            enabled: lookup("RISK_REPORT_AI_ENABLED")
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.enabled),
            api_key: non_empty("OPENAI_API_KEY"),
            model: non_empty("OPENAI_MODEL").unwrap_or(defaults.model),
            base_url: non_empty("OPENAI_BASE_URL").unwrap_or(defaults.base_url),
            timeout: lookup("OPENAI_TIMEOUT_SECS")
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        }
    }

    /// A key is present and not one of the sample placeholders.
    pub fn has_usable_credential(&self) -> bool {
        self.api_key.as_deref().is_some_and(is_real_credential)
    }
}

pub fn is_real_credential(key: &str) -> bool {
    let key = key.trim();
    !key.is_empty()
        && !PLACEHOLDER_KEYS
            .iter()
            .any(|placeholder| key.eq_ignore_ascii_case(placeholder))
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Per-deployment settings for the report pipeline.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub plots_dir: PathBuf,
    pub language: Language,
    /// The caller asked for the AI path.
    pub use_ai: bool,
    /// Chart files older than this are swept before each report.
    pub chart_ttl: Option<Duration>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            plots_dir: PathBuf::from("static/plots"),
            language: Language::default(),
            use_ai: false,
            chart_ttl: None,
        }
    }
}
