//! Domain model for user records.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep input validation next to the shapes it protects.
//!
//! # Invariants
//! - Every persisted user is identified by a store-assigned `UserId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod user;
