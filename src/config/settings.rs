use crate::config::env::{self, EnvKey};
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

pub const DEFAULT_TELEGRAM_API_BASE: &str = "http://127.0.0.1:8081";
pub const DEFAULT_MEGADL_BIN: &str = "megadl";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} env var is required")]
    Missing(&'static str),
    #[error("{key} is not a valid URL")]
    InvalidUrl {
        key: &'static str,
        #[source]
        source: url::ParseError,
    },
    #[error("TASK_ENDPOINT requires a non-empty TASK_SECRET")]
    EndpointWithoutSecret,
}

/// Process-wide settings, read once at startup and never mutated.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server_port: u16,
    pub bot_token: String,
    /// Empty means every `/task/process` call is rejected.
    pub task_secret: String,
    pub telegram_api_base: String,
    pub megadl_bin: PathBuf,
    pub scratch_root: PathBuf,
    /// When set, jobs are handed to this endpoint instead of running in-process.
    pub task_endpoint: Option<Url>,
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        let bot_token = env::get_opt(EnvKey::BotToken)
            .ok_or(ConfigError::Missing(EnvKey::BotToken.as_str()))?;

        let telegram_api_base = env::get_or(EnvKey::TelegramApiBase, DEFAULT_TELEGRAM_API_BASE);
        Url::parse(&telegram_api_base).map_err(|source| ConfigError::InvalidUrl {
            key: EnvKey::TelegramApiBase.as_str(),
            source,
        })?;

        let task_endpoint = env::get_opt(EnvKey::TaskEndpoint)
            .map(|raw| Url::parse(&raw))
            .transpose()
            .map_err(|source| ConfigError::InvalidUrl {
                key: EnvKey::TaskEndpoint.as_str(),
                source,
            })?;

        Self {
            server_port: env::get_parsed(EnvKey::ServerPort, 3000),
            bot_token,
            task_secret: env::get_or(EnvKey::TaskSecret, ""),
            telegram_api_base: telegram_api_base.trim_end_matches('/').to_string(),
            megadl_bin: PathBuf::from(env::get_or(EnvKey::MegadlBin, DEFAULT_MEGADL_BIN)),
            scratch_root: env::get_opt(EnvKey::ScratchDir)
                .map(PathBuf::from)
                .unwrap_or_else(std::env::temp_dir),
            task_endpoint,
        }
        .validated()
    }

    /// Remote dispatch against a fail-closed task endpoint could never succeed.
    fn validated(self) -> Result<Self, ConfigError> {
        if self.task_endpoint.is_some() && !self.task_secret_configured() {
            return Err(ConfigError::EndpointWithoutSecret);
        }
        Ok(self)
    }

    /// Whether `/task/process` can ever accept a call.
    pub fn task_secret_configured(&self) -> bool {
        !self.task_secret.is_empty()
    }
}

#[cfg(test)]
impl AppConfig {
    pub fn for_tests(telegram_api_base: &str, scratch_root: PathBuf) -> Self {
        Self {
            server_port: 0,
            bot_token: "123:TEST".to_string(),
            task_secret: "s3cret".to_string(),
            telegram_api_base: telegram_api_base.trim_end_matches('/').to_string(),
            megadl_bin: PathBuf::from(DEFAULT_MEGADL_BIN),
            scratch_root,
            task_endpoint: None,
        }
    }
}
