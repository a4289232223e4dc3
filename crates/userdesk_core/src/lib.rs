//! Core domain logic for userdesk: the user record store, repository and
//! use-case service behind any presentation layer.
//! This crate is the single source of truth for user record invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{parse_database_url, ConfigError, Settings};
pub use db::{DbError, StoreLocation, StoreOptions, UserStore};
pub use logging::{
    default_log_level, flush_logging, init_logging, init_stderr_logging, logging_status, LogSink,
    LoggingError,
};
pub use model::user::{User, UserDraft, UserId, UserValidationError};
pub use repo::user_repo::{
    DeleteOutcome, RepoError, RepoResult, SqliteUserRepository, UpdateOutcome, UserRepository,
};
pub use service::user_service::{UserService, UserTable};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
