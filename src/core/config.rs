//! Runtime configuration and tuning constants
//!
//! Everything the bot needs from the environment is read once at startup into
//! [`Config`]. `.env` files are loaded by `main` through `dotenvy` before
//! [`Config::from_env`] runs. Tuning constants live in small sub-modules, the
//! same way the timeouts and cache lifetimes are grouped below.

use secrecy::{ExposeSecret, SecretString};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

use crate::core::error::{AppError, AppResult};

/// Environment variables that must be non-empty for the bot to start
pub const REQUIRED_VARS: [&str; 7] = [
    "BOT_TOKEN",
    "AIRTABLE_API_KEY",
    "AIRTABLE_BASE_ID",
    "VIDEOS_TABLE_ID",
    "USERS_TABLE_ID",
    "MESSAGES_TABLE_ID",
    "MISTRAL_API_KEY",
];

/// Deployment environment, read from `ENVIRONMENT`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(format!("Unknown environment: {}", other)),
        }
    }
}

/// Airtable connection settings
#[derive(Debug, Clone)]
pub struct AirtableConfig {
    pub api_key: SecretString,
    pub base_id: String,
    pub videos_table: String,
    pub users_table: String,
    pub messages_table: String,
    /// Read from AIRTABLE_API_URL, default https://api.airtable.com
    pub api_url: Url,
}

/// Mistral AI connection settings
#[derive(Debug, Clone)]
pub struct MistralConfig {
    pub api_key: SecretString,
    /// Read from MISTRAL_API_URL, default https://api.mistral.ai
    pub api_url: Url,
}

/// Course pacing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CourseSettings {
    /// Pause between sending a video and asking its question
    pub video_wait: Duration,
    /// Number of videos after which a learner moves to the next level
    pub max_videos_per_level: u32,
}

impl Default for CourseSettings {
    fn default() -> Self {
        Self {
            video_wait: Duration::from_secs(course::VIDEO_WAIT_SECS),
            max_videos_per_level: course::MAX_VIDEOS_PER_LEVEL,
        }
    }
}

/// Complete bot configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: SecretString,
    /// Custom Bot API server, read from BOT_API_URL
    pub bot_api_url: Option<Url>,
    pub airtable: AirtableConfig,
    pub mistral: MistralConfig,
    /// `tracing` filter directive, read from LOG_LEVEL
    pub log_level: String,
    pub environment: Environment,
    /// Log file used in production, read from LOG_FILE_PATH
    pub log_file_path: Option<PathBuf>,
    pub course: CourseSettings,
}

impl Config {
    /// Reads the configuration from process environment variables
    ///
    /// Missing required variables are not an error here, see [`Config::validate`].
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup
    ///
    /// # Errors
    /// Returns `AppError::Config` when an optional value is present but malformed.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| -> Option<String> {
            lookup(key).and_then(|value| {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            })
        };
        let required = |key: &str| get(key).unwrap_or_default();

        let parse_url = |key: &str, default: &str| -> AppResult<Url> {
            let raw = get(key).unwrap_or_else(|| default.to_string());
            Url::parse(&raw).map_err(|e| AppError::Config(format!("{} is not a valid URL: {}", key, e)))
        };

        let bot_api_url = match get("BOT_API_URL") {
            Some(raw) => Some(
                Url::parse(&raw).map_err(|e| AppError::Config(format!("BOT_API_URL is not a valid URL: {}", e)))?,
            ),
            None => None,
        };

        let environment = match get("ENVIRONMENT") {
            Some(raw) => raw.parse().map_err(AppError::Config)?,
            None => Environment::default(),
        };

        let video_wait_secs = match get("VIDEO_WAIT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|e| AppError::Config(format!("VIDEO_WAIT_SECS must be a number of seconds: {}", e)))?,
            None => course::VIDEO_WAIT_SECS,
        };

        let max_videos_per_level = match get("MAX_VIDEOS_PER_LEVEL") {
            Some(raw) => match raw.parse::<u32>() {
                Ok(0) | Err(_) => {
                    return Err(AppError::Config(format!(
                        "MAX_VIDEOS_PER_LEVEL must be a positive integer, got '{}'",
                        raw
                    )));
                }
                Ok(n) => n,
            },
            None => course::MAX_VIDEOS_PER_LEVEL,
        };

        Ok(Self {
            bot_token: SecretString::from(required("BOT_TOKEN")),
            bot_api_url,
            airtable: AirtableConfig {
                api_key: SecretString::from(required("AIRTABLE_API_KEY")),
                base_id: required("AIRTABLE_BASE_ID"),
                videos_table: required("VIDEOS_TABLE_ID"),
                users_table: required("USERS_TABLE_ID"),
                messages_table: required("MESSAGES_TABLE_ID"),
                api_url: parse_url("AIRTABLE_API_URL", network::AIRTABLE_API_URL)?,
            },
            mistral: MistralConfig {
                api_key: SecretString::from(required("MISTRAL_API_KEY")),
                api_url: parse_url("MISTRAL_API_URL", network::MISTRAL_API_URL)?,
            },
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            environment,
            log_file_path: get("LOG_FILE_PATH").map(PathBuf::from),
            course: CourseSettings {
                video_wait: Duration::from_secs(video_wait_secs),
                max_videos_per_level,
            },
        })
    }

    /// Names of required variables that are empty
    pub fn missing_vars(&self) -> Vec<&'static str> {
        let values = [
            self.bot_token.expose_secret(),
            self.airtable.api_key.expose_secret(),
            self.airtable.base_id.as_str(),
            self.airtable.videos_table.as_str(),
            self.airtable.users_table.as_str(),
            self.airtable.messages_table.as_str(),
            self.mistral.api_key.expose_secret(),
        ];

        REQUIRED_VARS
            .iter()
            .zip(values)
            .filter(|(_, value)| value.is_empty())
            .map(|(name, _)| *name)
            .collect()
    }

    /// Checks that all required configuration is present
    ///
    /// # Errors
    /// Returns `AppError::Config` naming every missing variable.
    pub fn validate(&self) -> AppResult<()> {
        let missing = self.missing_vars();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::Config(format!(
                "missing required environment variables: {}",
                missing.join(", ")
            )))
        }
    }
}

/// Course pacing defaults
pub mod course {
    /// Seconds to wait after sending a video before asking its question
    pub const VIDEO_WAIT_SECS: u64 = 10;

    /// Videos per level before the learner is promoted
    pub const MAX_VIDEOS_PER_LEVEL: u32 = 2;
}

/// Pauses between consecutive bot messages
pub mod timing {
    use super::Duration;

    /// Between welcome title and description
    pub const WELCOME_DESCRIPTION_DELAY_MS: u64 = 1000;

    /// Between welcome description and placement question
    pub const WELCOME_QUESTION_DELAY_MS: u64 = 2000;

    /// Between video description and video link
    pub const VIDEO_LINK_DELAY_MS: u64 = 2000;

    /// Between "let's continue" and the next video
    pub const NEXT_VIDEO_DELAY_MS: u64 = 1000;

    pub fn welcome_description_delay() -> Duration {
        Duration::from_millis(WELCOME_DESCRIPTION_DELAY_MS)
    }

    pub fn welcome_question_delay() -> Duration {
        Duration::from_millis(WELCOME_QUESTION_DELAY_MS)
    }

    pub fn video_link_delay() -> Duration {
        Duration::from_millis(VIDEO_LINK_DELAY_MS)
    }

    pub fn next_video_delay() -> Duration {
        Duration::from_millis(NEXT_VIDEO_DELAY_MS)
    }
}

/// Cache lifetimes
pub mod cache {
    use super::Duration;

    /// Catalog queries (10 minutes)
    pub const VIDEOS_TTL_SECS: u64 = 600;

    /// User records (5 minutes)
    pub const USERS_TTL_SECS: u64 = 300;

    /// Rendered course overviews (5 minutes)
    pub const OVERVIEW_TTL_SECS: u64 = 300;

    /// Welcome texts (1 hour)
    pub const WELCOME_TTL_SECS: u64 = 3600;

    /// Upper bound of entries per cache
    pub const MAX_ENTRIES: u64 = 10_000;

    pub fn videos_ttl() -> Duration {
        Duration::from_secs(VIDEOS_TTL_SECS)
    }

    pub fn users_ttl() -> Duration {
        Duration::from_secs(USERS_TTL_SECS)
    }

    pub fn overview_ttl() -> Duration {
        Duration::from_secs(OVERVIEW_TTL_SECS)
    }

    pub fn welcome_ttl() -> Duration {
        Duration::from_secs(WELCOME_TTL_SECS)
    }
}

/// Network configuration
pub mod network {
    use super::Duration;

    pub const AIRTABLE_API_URL: &str = "https://api.airtable.com";
    pub const MISTRAL_API_URL: &str = "https://api.mistral.ai";

    /// Timeout for Airtable requests (in seconds)
    pub const AIRTABLE_TIMEOUT_SECS: u64 = 30;

    /// Timeout for Mistral AI requests (in seconds)
    pub const MISTRAL_TIMEOUT_SECS: u64 = 60;

    /// Timeout for Telegram Bot API requests (in seconds)
    pub const TELEGRAM_TIMEOUT_SECS: u64 = 60;

    pub fn airtable_timeout() -> Duration {
        Duration::from_secs(AIRTABLE_TIMEOUT_SECS)
    }

    pub fn mistral_timeout() -> Duration {
        Duration::from_secs(MISTRAL_TIMEOUT_SECS)
    }

    pub fn telegram_timeout() -> Duration {
        Duration::from_secs(TELEGRAM_TIMEOUT_SECS)
    }
}

/// Mistral model selection
pub mod models {
    /// Model used to classify placement answers
    pub const PLACEMENT_MODEL: &str = "ministral-8b-2410";
    pub const PLACEMENT_MAX_TOKENS: u32 = 2;
    pub const PLACEMENT_TEMPERATURE: f32 = 0.1;

    /// Model used to discuss answers to video questions
    pub const ASSESSMENT_MODEL: &str = "mistral-small-latest";
    pub const ASSESSMENT_MAX_TOKENS: u32 = 200;
    pub const ASSESSMENT_TEMPERATURE: f32 = 0.7;
}

/// Logging thresholds
pub mod logging {
    /// Operations slower than this are reported with a warning
    pub const SLOW_OPERATION_MS: u128 = 100;
}
