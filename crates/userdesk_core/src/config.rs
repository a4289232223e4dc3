//! Process configuration resolved from the environment and `.env`.
//!
//! # Responsibility
//! - Read `DATABASE_URL` and optional logging settings.
//! - Translate database URLs into a `StoreLocation`.
//!
//! # Invariants
//! - Real process environment wins over values from `.env`.
//! - Resolution never touches the database.

use crate::db::StoreLocation;
use crate::logging::default_log_level;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
pub const LOG_LEVEL_VAR: &str = "USERDESK_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "USERDESK_LOG_DIR";

const SQLITE_SCHEME: &str = "sqlite:";
const MEMORY_PATH: &str = ":memory:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Empty(&'static str),
    UnsupportedScheme(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(key) => write!(f, "required setting `{key}` is not set"),
            Self::Empty(key) => write!(f, "setting `{key}` must not be empty"),
            Self::UnsupportedScheme(url) => write!(
                f,
                "unsupported database url `{url}`; expected sqlite:///<path> or a file path"
            ),
        }
    }
}

impl Error for ConfigError {}

/// Resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database_url: String,
    pub log_level: String,
    /// Logging stays off when unset.
    pub log_dir: Option<PathBuf>,
}

impl Settings {
    /// Loads `.env` from the working directory when present, then reads the
    /// process environment. `database_url`, when given, replaces
    /// `DATABASE_URL` from both sources.
    pub fn from_env(database_url: Option<&str>) -> Result<Self, ConfigError> {
        // A missing `.env` is normal; the variables may come from the shell.
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| match database_url {
            Some(url) if key == DATABASE_URL_VAR => Some(url.to_string()),
            _ => std::env::var(key).ok(),
        })
    }

    /// Builds settings from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup(DATABASE_URL_VAR)
            .ok_or(ConfigError::Missing(DATABASE_URL_VAR))?
            .trim()
            .to_string();
        if database_url.is_empty() {
            return Err(ConfigError::Empty(DATABASE_URL_VAR));
        }

        let log_level = lookup(LOG_LEVEL_VAR)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| default_log_level().to_string());

        let log_dir = lookup(LOG_DIR_VAR)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            database_url,
            log_level,
            log_dir,
        })
    }

    pub fn store_location(&self) -> Result<StoreLocation, ConfigError> {
        parse_database_url(&self.database_url)
    }
}

/// Parses a database URL into a store location.
///
/// Accepted forms:
/// - `sqlite:///users.db` (relative) and `sqlite:////var/users.db` (absolute)
/// - `sqlite://`, `sqlite:///:memory:`, `:memory:` (in-memory)
/// - a bare file path
pub fn parse_database_url(url: &str) -> Result<StoreLocation, ConfigError> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Empty(DATABASE_URL_VAR));
    }
    if trimmed == MEMORY_PATH {
        return Ok(StoreLocation::Memory);
    }

    let Some(rest) = trimmed.strip_prefix(SQLITE_SCHEME) else {
        if has_url_scheme(trimmed) {
            return Err(ConfigError::UnsupportedScheme(trimmed.to_string()));
        }
        return Ok(StoreLocation::File(PathBuf::from(trimmed)));
    };

    let Some(authority_and_path) = rest.strip_prefix("//") else {
        return Err(ConfigError::UnsupportedScheme(trimmed.to_string()));
    };
    // Only an empty authority is meaningful for SQLite.
    let path = match authority_and_path.strip_prefix('/') {
        Some(path) => path,
        None if authority_and_path.is_empty() => return Ok(StoreLocation::Memory),
        None => return Err(ConfigError::UnsupportedScheme(trimmed.to_string())),
    };
    let path = path.split('?').next().unwrap_or_default();

    if path.is_empty() || path == MEMORY_PATH {
        return Ok(StoreLocation::Memory);
    }
    Ok(StoreLocation::File(PathBuf::from(path)))
}

fn has_url_scheme(value: &str) -> bool {
    match value.split_once("://") {
        Some((scheme, _)) => {
            !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}
