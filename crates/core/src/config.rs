//! Client configuration
//!
//! Built from `TASKDECK_*` environment variables with sensible defaults.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api";
pub const DEFAULT_DATA_DIR: &str = ".taskdeck";
pub const SESSION_FILE: &str = "session.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the task API, without a trailing slash
    pub api_url: String,
    /// Directory holding the session file
    pub data_dir: PathBuf,
    /// Per-request timeout; `None` leaves requests pending until they finish
    pub timeout: Option<Duration>,
    /// Pre-answer confirmation prompts with yes
    pub assume_yes: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            timeout: None,
            assume_yes: false,
        }
    }
}

impl ClientConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let api_url = lookup("TASKDECK_API_URL")
            .filter(|url| !url.trim().is_empty())
            .map(|url| normalize_url(&url))
            .unwrap_or(defaults.api_url);

        let data_dir = lookup("TASKDECK_DATA_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let timeout = lookup("TASKDECK_TIMEOUT_SECS")
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        let assume_yes = env_flag(lookup("TASKDECK_ASSUME_YES"), false);

        Self {
            api_url,
            data_dir,
            timeout,
            assume_yes,
        }
    }

    pub fn with_api_url(mut self, api_url: impl AsRef<str>) -> Self {
        self.api_url = normalize_url(api_url.as_ref());
        self
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    /// Location of the persisted session token
    pub fn session_path(&self) -> PathBuf {
        self.data_dir.join(SESSION_FILE)
    }
}

fn normalize_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn env_flag(raw: Option<String>, default: bool) -> bool {
    match raw {
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        None => default,
    }
}
