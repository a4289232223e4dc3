//! Explicit store handle with scoped per-call sessions.
//!
//! # Responsibility
//! - Bootstrap the database once (pragmas + migrations) at construction.
//! - Acquire a fresh connection and transaction for each unit of work and
//!   release both on every exit path.
//!
//! # Invariants
//! - A unit of work commits only when its closure returns `Ok`; any `Err`
//!   drops the transaction, which rolls it back.
//! - In-memory stores are private to one `UserStore`; an anchor connection
//!   keeps the shared-cache database alive until the store is dropped.

use super::open::{configure_connection, open_bootstrapped};
use super::{DbError, DbResult, StoreLocation, StoreOptions};
use log::{debug, error, info};
use rusqlite::{Connection, Transaction};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

static MEMORY_STORE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Handle to the `Users` record store.
///
/// Created once at process start and passed to the repository; dropping it
/// closes the store.
pub struct UserStore {
    location: StoreLocation,
    options: StoreOptions,
    target: PathBuf,
    _anchor: Option<Connection>,
}

impl UserStore {
    /// Opens (and migrates) the store at `location`.
    ///
    /// # Errors
    /// - `InvalidLocation` for an empty file path.
    /// - `Sqlite` / `UnsupportedSchemaVersion` from bootstrap.
    pub fn open(location: StoreLocation, options: StoreOptions) -> DbResult<Self> {
        let (target, anchor) = match &location {
            StoreLocation::File(path) => {
                if path.as_os_str().is_empty() {
                    return Err(DbError::InvalidLocation(
                        "database path cannot be empty".to_string(),
                    ));
                }
                // Bootstrap connection is closed right away; sessions reopen the file.
                open_bootstrapped(location.mode(), || Connection::open(path))?;
                (path.clone(), None)
            }
            StoreLocation::Memory => {
                let target = PathBuf::from(shared_memory_uri());
                let anchor = open_bootstrapped(location.mode(), || Connection::open(&target))?;
                (target, Some(anchor))
            }
        };

        Ok(Self {
            location,
            options,
            target,
            _anchor: anchor,
        })
    }

    /// Opens a file-backed store with default options.
    pub fn open_file(path: impl AsRef<Path>) -> DbResult<Self> {
        Self::open(
            StoreLocation::File(path.as_ref().to_path_buf()),
            StoreOptions::default(),
        )
    }

    /// Opens a private in-memory store with default options.
    pub fn open_in_memory() -> DbResult<Self> {
        Self::open(StoreLocation::Memory, StoreOptions::default())
    }

    /// Acquires a fresh configured connection. Dropping it closes it.
    pub fn connect(&self) -> DbResult<Connection> {
        let conn = Connection::open(&self.target).map_err(|err| {
            error!(
                "event=db_connect module=db status=error mode={} error_code=db_connect_failed error={}",
                self.location.mode(),
                err
            );
            DbError::from(err)
        })?;
        configure_connection(&conn)?;
        Ok(conn)
    }

    /// Runs `work` inside one connection + transaction.
    ///
    /// Commits when `work` returns `Ok`; otherwise the transaction is dropped
    /// (rolled back) and the error is returned unchanged. The connection is
    /// closed before this function returns in every case.
    ///
    /// # Side effects
    /// - Emits one `event=db_tx` log line tagged with `op`, status and duration.
    pub fn with_transaction<T, E, F>(&self, op: &str, work: F) -> Result<T, E>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T, E>,
        E: From<DbError> + Display,
    {
        let started_at = Instant::now();
        let result = self.run_in_transaction(work);
        match &result {
            Ok(_) => info!(
                "event=db_tx module=db op={} status=ok duration_ms={}",
                op,
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=db_tx module=db op={} status=error duration_ms={} error={}",
                op,
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }

    fn run_in_transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T, E>,
        E: From<DbError>,
    {
        let mut conn = self.connect()?;
        let tx = conn.transaction().map_err(DbError::from)?;
        let value = work(&tx)?;
        tx.commit().map_err(DbError::from)?;
        Ok(value)
    }

    /// Logs `sql` at `debug` when statement echo is enabled.
    pub fn echo(&self, sql: &str) {
        if self.options.echo_sql {
            debug!(
                "event=sql_echo module=db sql={}",
                sql.split_whitespace().collect::<Vec<_>>().join(" ")
            );
        }
    }
}

fn shared_memory_uri() -> String {
    let seq = MEMORY_STORE_SEQ.fetch_add(1, Ordering::Relaxed);
    format!(
        "file:userdesk-mem-{}-{}?mode=memory&cache=shared",
        std::process::id(),
        seq
    )
}
