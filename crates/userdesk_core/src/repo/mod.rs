//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service/presentation code.
//!
//! # Invariants
//! - Repository writes accept only validated `UserDraft` values.
//! - Repository APIs return tagged no-op outcomes (`NotFound`) separately
//!   from store failures (`StoreUnavailable`).

pub mod user_repo;
