//! User repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide list/get/create/update/delete/count over the `Users` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Each call is one independent unit of work on its own connection.
//! - Write paths accept only `UserDraft`, so trimmed non-empty values are
//!   enforced here as well as at the presentation boundary.
//! - Read paths reject invalid persisted rows instead of masking them.
//! - A missing id on update/delete is a `NotFound` outcome, not an error.

use crate::db::migrations::{latest_version, schema_version};
use crate::db::{DbError, UserStore};
use crate::model::user::{User, UserDraft, UserId, UserValidationError};
use log::info;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const USERS_TABLE: &str = "Users";
const USERS_REQUIRED_COLUMNS: &[&str] = &["id", "name", "email"];

const USER_LIST_SQL: &str = "SELECT id, name, email FROM Users ORDER BY id ASC;";
const USER_GET_SQL: &str = "SELECT id, name, email FROM Users WHERE id = ?1;";
const USER_INSERT_SQL: &str = "INSERT INTO Users (name, email) VALUES (?1, ?2);";
const USER_UPDATE_SQL: &str = "UPDATE Users SET name = ?1, email = ?2 WHERE id = ?3;";
const USER_DELETE_SQL: &str = "DELETE FROM Users WHERE id = ?1;";
const USER_COUNT_SQL: &str = "SELECT COUNT(*) FROM Users;";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for user persistence and query operations.
///
/// Look-up misses are deliberately absent: they are reported through
/// [`UpdateOutcome::NotFound`] and [`DeleteOutcome::NotFound`].
#[derive(Debug)]
pub enum RepoError {
    Validation(UserValidationError),
    /// Connection could not be opened or the transaction could not commit.
    StoreUnavailable(DbError),
    InvalidData(String),
    UninitializedStore {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::StoreUnavailable(err) => write!(f, "user store unavailable: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted user data: {message}"),
            Self::UninitializedStore {
                expected_version,
                actual_version,
            } => write!(
                f,
                "user store schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::StoreUnavailable(err) => Some(err),
            Self::InvalidData(_)
            | Self::UninitializedStore { .. }
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<UserValidationError> for RepoError {
    fn from(value: UserValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::StoreUnavailable(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::StoreUnavailable(DbError::Sqlite(value))
    }
}

/// Result of an update request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Row existed; carries the record as stored after the update.
    Updated(User),
    /// No row with this id; nothing changed.
    NotFound(UserId),
}

impl UpdateOutcome {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns the updated record, or `None` for the no-op outcome.
    pub fn updated(self) -> Option<User> {
        match self {
            Self::Updated(user) => Some(user),
            Self::NotFound(_) => None,
        }
    }
}

/// Result of a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted(UserId),
    NotFound(UserId),
}

impl DeleteOutcome {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Repository interface for user CRUD operations.
pub trait UserRepository {
    fn list_users(&self) -> RepoResult<Vec<User>>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    fn create_user(&self, draft: &UserDraft) -> RepoResult<User>;
    fn update_user(&self, id: UserId, draft: &UserDraft) -> RepoResult<UpdateOutcome>;
    fn delete_user(&self, id: UserId) -> RepoResult<DeleteOutcome>;
    fn count_users(&self) -> RepoResult<u64>;
}

/// SQLite-backed user repository over an injected store handle.
pub struct SqliteUserRepository<'store> {
    store: &'store UserStore,
}

impl<'store> SqliteUserRepository<'store> {
    /// Builds a repository after checking that the store carries the
    /// expected schema.
    ///
    /// # Errors
    /// - `UninitializedStore` when `user_version` differs from this binary.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` for a damaged schema.
    pub fn try_new(store: &'store UserStore) -> RepoResult<Self> {
        let conn = store.connect()?;
        ensure_user_schema(&conn)?;
        Ok(Self { store })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn list_users(&self) -> RepoResult<Vec<User>> {
        let users = self.store.with_transaction("user_list", |tx| -> RepoResult<Vec<User>> {
            self.store.echo(USER_LIST_SQL);
            let mut stmt = tx.prepare(USER_LIST_SQL)?;
            let mut rows = stmt.query([])?;
            let mut users = Vec::new();
            while let Some(row) = rows.next()? {
                users.push(parse_user_row(row)?);
            }
            Ok(users)
        })?;

        info!(
            "event=user_list module=repo status=ok count={}",
            users.len()
        );
        Ok(users)
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        self.store.with_transaction("user_get", |tx| -> RepoResult<Option<User>> {
            self.store.echo(USER_GET_SQL);
            select_user(tx, id)
        })
    }

    fn create_user(&self, draft: &UserDraft) -> RepoResult<User> {
        let user = self.store.with_transaction("user_create", |tx| -> RepoResult<User> {
            self.store.echo(USER_INSERT_SQL);
            tx.execute(USER_INSERT_SQL, params![draft.name(), draft.email()])?;
            let id = tx.last_insert_rowid();
            Ok(draft.clone().into_user(id))
        })?;

        info!("event=user_create module=repo status=ok id={}", user.id);
        Ok(user)
    }

    fn update_user(&self, id: UserId, draft: &UserDraft) -> RepoResult<UpdateOutcome> {
        let outcome = self.store.with_transaction("user_update", |tx| -> RepoResult<UpdateOutcome> {
            self.store.echo(USER_UPDATE_SQL);
            let changed = tx.execute(USER_UPDATE_SQL, params![draft.name(), draft.email(), id])?;
            if changed == 0 {
                return Ok(UpdateOutcome::NotFound(id));
            }

            // Re-read inside the same transaction so the caller sees stored values.
            self.store.echo(USER_GET_SQL);
            match select_user(tx, id)? {
                Some(user) => Ok(UpdateOutcome::Updated(user)),
                None => Err(RepoError::InvalidData(format!(
                    "user {id} vanished after update"
                ))),
            }
        })?;

        info!(
            "event=user_update module=repo status={} id={}",
            outcome_status(outcome.is_not_found()),
            id
        );
        Ok(outcome)
    }

    fn delete_user(&self, id: UserId) -> RepoResult<DeleteOutcome> {
        let outcome = self.store.with_transaction("user_delete", |tx| -> RepoResult<DeleteOutcome> {
            self.store.echo(USER_DELETE_SQL);
            let changed = tx.execute(USER_DELETE_SQL, [id])?;
            if changed == 0 {
                Ok(DeleteOutcome::NotFound(id))
            } else {
                Ok(DeleteOutcome::Deleted(id))
            }
        })?;

        info!(
            "event=user_delete module=repo status={} id={}",
            outcome_status(outcome.is_not_found()),
            id
        );
        Ok(outcome)
    }

    fn count_users(&self) -> RepoResult<u64> {
        self.store.with_transaction("user_count", |tx| -> RepoResult<u64> {
            self.store.echo(USER_COUNT_SQL);
            let count: i64 = tx.query_row(USER_COUNT_SQL, [], |row| row.get(0))?;
            u64::try_from(count)
                .map_err(|_| RepoError::InvalidData(format!("negative user count `{count}`")))
        })
    }
}

fn select_user(conn: &Connection, id: UserId) -> RepoResult<Option<User>> {
    let mut stmt = conn.prepare(USER_GET_SQL)?;
    let row = stmt
        .query_row([id], |row| {
            Ok((
                row.get::<_, i64>("id")?,
                row.get::<_, String>("name")?,
                row.get::<_, String>("email")?,
            ))
        })
        .optional()?;

    match row {
        Some((id, name, email)) => Ok(Some(checked_user(User { id, name, email })?)),
        None => Ok(None),
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let user = User {
        id: row.get("id")?,
        name: row.get("name")?,
        email: row.get("email")?,
    };
    checked_user(user)
}

fn checked_user(user: User) -> RepoResult<User> {
    user.validate().map_err(|err| {
        RepoError::InvalidData(format!("row {} in {USERS_TABLE}: {err}", user.id))
    })?;
    Ok(user)
}

fn outcome_status(not_found: bool) -> &'static str {
    if not_found {
        "not_found"
    } else {
        "ok"
    }
}

fn ensure_user_schema(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = schema_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedStore {
            expected_version,
            actual_version,
        });
    }

    let table_exists: bool = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
        );",
        [USERS_TABLE],
        |row| row.get(0),
    )?;
    if !table_exists {
        return Err(RepoError::MissingRequiredTable(USERS_TABLE));
    }

    let mut stmt = conn.prepare(&format!("PRAGMA table_info({USERS_TABLE});"))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>("name"))?
        .collect::<Result<Vec<_>, _>>()?;
    for &required in USERS_REQUIRED_COLUMNS {
        if !columns.iter().any(|column| column == required) {
            return Err(RepoError::MissingRequiredColumn {
                table: USERS_TABLE,
                column: required,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{outcome_status, DeleteOutcome, UpdateOutcome};
    use crate::model::user::User;

    #[test]
    fn outcome_helpers_distinguish_no_op() {
        let user = User {
            id: 1,
            name: "Ana".to_string(),
            email: "ana@x.com".to_string(),
        };
        assert!(!UpdateOutcome::Updated(user.clone()).is_not_found());
        assert_eq!(UpdateOutcome::Updated(user.clone()).updated(), Some(user));
        assert_eq!(UpdateOutcome::NotFound(9).updated(), None);
        assert!(DeleteOutcome::NotFound(9).is_not_found());
        assert!(!DeleteOutcome::Deleted(1).is_not_found());
    }

    #[test]
    fn outcome_status_labels() {
        assert_eq!(outcome_status(true), "not_found");
        assert_eq!(outcome_status(false), "ok");
    }
}
