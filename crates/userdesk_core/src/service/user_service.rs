//! User use-case service.
//!
//! # Responsibility
//! - Provide stable CRUD entry points for presentation callers.
//! - Turn raw form input into validated drafts before delegating.
//!
//! # Invariants
//! - Service APIs never bypass repository persistence contracts.
//! - Service layer remains storage-agnostic.

use crate::model::user::{User, UserDraft, UserId};
use crate::repo::user_repo::{DeleteOutcome, RepoResult, UpdateOutcome, UserRepository};
use serde::Serialize;

/// Use-case service wrapper for user CRUD operations.
pub struct UserService<R: UserRepository> {
    repo: R,
}

/// Everything a user table view renders in one refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserTable {
    pub users: Vec<User>,
    pub total: u64,
}

impl<R: UserRepository> UserService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn list_users(&self) -> RepoResult<Vec<User>> {
        self.repo.list_users()
    }

    pub fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        self.repo.get_user(id)
    }

    pub fn count_users(&self) -> RepoResult<u64> {
        self.repo.count_users()
    }

    /// Creates a user from raw form input.
    ///
    /// # Contract
    /// - Trims both fields; blank input fails with `RepoError::Validation`
    ///   before any store access.
    /// - Returns the stored record including its assigned id.
    pub fn add_user(&self, name: &str, email: &str) -> RepoResult<User> {
        let draft = UserDraft::new(name, email)?;
        self.repo.create_user(&draft)
    }

    /// Overwrites name and email of an existing user.
    ///
    /// Returns `UpdateOutcome::NotFound` unchanged when `id` is absent.
    pub fn edit_user(&self, id: UserId, name: &str, email: &str) -> RepoResult<UpdateOutcome> {
        let draft = UserDraft::new(name, email)?;
        self.repo.update_user(id, &draft)
    }

    /// Hard-deletes a user; a missing id is a no-op.
    pub fn remove_user(&self, id: UserId) -> RepoResult<DeleteOutcome> {
        self.repo.delete_user(id)
    }

    /// Lists users and derives the total from the same read.
    pub fn snapshot(&self) -> RepoResult<UserTable> {
        let users = self.repo.list_users()?;
        let total = users.len() as u64;
        Ok(UserTable { users, total })
    }
}
