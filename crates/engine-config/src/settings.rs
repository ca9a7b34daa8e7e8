//! Scroll settings: built-in defaults, overlaid by an optional JSON file,
//! overlaid by `SCROLL_*` environment variables.

use crate::error::SettingsError;
use model::pagination::cursor::{DEFAULT_MAX_TOKEN_LEN, TokenEncoding};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, path::Path, str::FromStr};
use tracing::debug;

pub const ENV_ID_FIELD: &str = "SCROLL_ID_FIELD";
pub const ENV_DEFAULT_LIMIT: &str = "SCROLL_DEFAULT_LIMIT";
pub const ENV_TOKEN_ENCODING: &str = "SCROLL_TOKEN_ENCODING";
pub const ENV_MAX_TOKEN_LEN: &str = "SCROLL_MAX_TOKEN_LEN";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollSettings {
    /// Unique identifier field used as tiebreaker and default sort.
    pub id_field: String,
    /// Page size applied when a scroll call sets no limit of its own.
    pub default_limit: Option<u64>,
    /// Encoding of cursors issued from the start position.
    pub encoding: TokenEncoding,
    /// Longest token accepted from a client, in bytes.
    pub max_token_len: usize,
}

impl Default for ScrollSettings {
    fn default() -> Self {
        ScrollSettings {
            id_field: "id".to_string(),
            default_limit: None,
            encoding: TokenEncoding::Plain,
            max_token_len: DEFAULT_MAX_TOKEN_LEN,
        }
    }
}

impl ScrollSettings {
    /// Loads settings from `path` (if given) and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// Like [`ScrollSettings::load`], reading overrides through `env`.
    pub fn load_with<F>(path: Option<&Path>, env: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
                debug!("Loaded scroll settings from {}", path.display());
                serde_json::from_str(&text)?
            }
            None => ScrollSettings::default(),
        };

        if let Some(id_field) = env(ENV_ID_FIELD) {
            settings.id_field = id_field;
        }
        if let Some(limit) = env(ENV_DEFAULT_LIMIT) {
            settings.default_limit = Some(parse(ENV_DEFAULT_LIMIT, &limit)?);
        }
        if let Some(encoding) = env(ENV_TOKEN_ENCODING) {
            settings.encoding = parse(ENV_TOKEN_ENCODING, &encoding)?;
        }
        if let Some(max) = env(ENV_MAX_TOKEN_LEN) {
            settings.max_token_len = parse(ENV_MAX_TOKEN_LEN, &max)?;
        }

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.id_field.trim().is_empty() {
            return Err(invalid("id_field", "must not be empty"));
        }
        if self.default_limit == Some(0) {
            return Err(invalid("default_limit", "must be positive"));
        }
        if self.max_token_len == 0 {
            return Err(invalid("max_token_len", "must be positive"));
        }
        Ok(())
    }
}

fn parse<T>(key: &str, raw: &str) -> Result<T, SettingsError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim()
        .parse()
        .map_err(|e: T::Err| invalid(key, &e.to_string()))
}

fn invalid(key: &str, message: &str) -> SettingsError {
    SettingsError::InvalidValue {
        key: key.to_string(),
        message: message.to_string(),
    }
}
