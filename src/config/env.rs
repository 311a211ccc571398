use std::env;
use std::str::FromStr;

pub enum EnvKey {
    ServerPort,
    BotToken,
    TaskSecret,
    TelegramApiBase,
    MegadlBin,
    ScratchDir,
    TaskEndpoint,
}

impl EnvKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvKey::ServerPort => "APP_PORT",
            EnvKey::BotToken => "BOT_TOKEN",
            EnvKey::TaskSecret => "TASK_SECRET",
            EnvKey::TelegramApiBase => "TELEGRAM_API_BASE",
            EnvKey::MegadlBin => "MEGADL_BIN",
            EnvKey::ScratchDir => "SCRATCH_DIR",
            EnvKey::TaskEndpoint => "TASK_ENDPOINT",
        }
    }
}

pub fn get(key: EnvKey) -> Result<String, env::VarError> {
    env::var(key.as_str())
}

/// Like [`get`], but an empty value counts as unset.
pub fn get_opt(key: EnvKey) -> Option<String> {
    get(key).ok().filter(|v| !v.trim().is_empty())
}

pub fn get_or(key: EnvKey, default: &str) -> String {
    env::var(key.as_str()).unwrap_or_else(|_| default.to_string())
}

pub fn get_parsed<T: FromStr>(key: EnvKey, default: T) -> T {
    match get(key) {
        Ok(val) => val.parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}
