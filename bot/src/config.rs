use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_CONFIG_PATH: &str = "init.json";
pub const API_URL_ENV: &str = "BOT_API_URL";
pub const CONFIG_PATH_ENV: &str = "BOT_CONFIG";

/// What the driver does when one simulated user's sequence fails.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FailurePolicy {
    /// Stop the whole run on the first failure.
    #[default]
    Abort,
    /// Log and count the failure, then move on to the next user.
    ContinueWithNextUser,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotConfig {
    pub number_of_users: usize,
    #[serde(rename = "maxPostPerUser")]
    pub max_posts_per_user: usize,
    pub max_likes_per_user: usize,
    #[serde(default)]
    pub on_failure: FailurePolicy,
}

impl BotConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        config.validate()
    }

    fn validate(self) -> Result<Self, ConfigError> {
        for (field, value) in [
            ("numberOfUsers", self.number_of_users),
            ("maxPostPerUser", self.max_posts_per_user),
            ("maxLikesPerUser", self.max_likes_per_user),
        ] {
            if value == 0 {
                return Err(ConfigError::NotPositive { field });
            }
        }
        Ok(self)
    }
}

/// Process-wide settings supplied at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub api_url: String,
    pub config_path: PathBuf,
}

impl RunSettings {
    #[must_use]
    pub fn new(api_url: impl Into<String>, config_path: impl Into<PathBuf>) -> Self {
        Self {
            api_url: api_url.into(),
            config_path: config_path.into(),
        }
    }

    #[must_use]
    pub fn from_env() -> Self {
        Self::new(
            std::env::var(API_URL_ENV).unwrap_or_else(|_| DEFAULT_API_URL.to_owned()),
            std::env::var_os(CONFIG_PATH_ENV)
                .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from),
        )
    }
}
