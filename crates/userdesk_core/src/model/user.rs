//! User domain model.
//!
//! # Responsibility
//! - Define the single persisted entity (`User`) and its write-side input
//!   (`UserDraft`).
//! - Normalize and validate name/email before they reach the store.
//!
//! # Invariants
//! - `id` is assigned by the store, immutable and never reused.
//! - `name` and `email` are non-empty after trimming surrounding whitespace.
//! - Email format is not validated beyond non-emptiness.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned identifier of a user row.
pub type UserId = i64;

/// Persisted user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

impl User {
    /// Checks the persisted shape of a record read back from storage.
    ///
    /// # Errors
    /// - `InvalidId` when `id` is not positive.
    /// - `EmptyName` / `EmptyEmail` when a field is blank after trimming.
    pub fn validate(&self) -> Result<(), UserValidationError> {
        if self.id <= 0 {
            return Err(UserValidationError::InvalidId(self.id));
        }
        if self.name.trim().is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        if self.email.trim().is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        Ok(())
    }
}

/// Validated name/email pair accepted by create and update paths.
///
/// Fields are private so a draft can only be obtained through
/// [`UserDraft::new`], which guarantees trimmed, non-empty values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDraft {
    name: String,
    email: String,
}

impl UserDraft {
    /// Trims both fields and rejects blanks.
    ///
    /// `name` is checked before `email`.
    pub fn new(
        name: impl AsRef<str>,
        email: impl AsRef<str>,
    ) -> Result<Self, UserValidationError> {
        let name = name.as_ref().trim();
        if name.is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        let email = email.as_ref().trim();
        if email.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        Ok(Self {
            name: name.to_owned(),
            email: email.to_owned(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Materializes the draft into a record with the given id.
    pub fn into_user(self, id: UserId) -> User {
        User {
            id,
            name: self.name,
            email: self.email,
        }
    }
}

/// Validation failure for user input or persisted user state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyName,
    EmptyEmail,
    InvalidId(UserId),
}

impl Display for UserValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::InvalidId(id) => write!(f, "user id must be positive, got {id}"),
        }
    }
}

impl Error for UserValidationError {}

#[cfg(test)]
mod tests {
    use super::{User, UserDraft, UserValidationError};

    #[test]
    fn draft_trims_surrounding_whitespace() {
        let draft = UserDraft::new("  Ana ", "\tana@x.com\n").expect("draft should be valid");
        assert_eq!(draft.name(), "Ana");
        assert_eq!(draft.email(), "ana@x.com");
    }

    #[test]
    fn draft_rejects_blank_name_before_email() {
        let err = UserDraft::new("   ", "").expect_err("blank fields must be rejected");
        assert_eq!(err, UserValidationError::EmptyName);
    }

    #[test]
    fn draft_rejects_blank_email() {
        let err = UserDraft::new("Ana", "  ").expect_err("blank email must be rejected");
        assert_eq!(err, UserValidationError::EmptyEmail);
    }

    #[test]
    fn draft_keeps_inner_whitespace_and_any_email_shape() {
        let draft = UserDraft::new("Ana  B", "not-an-email").expect("format is not checked");
        assert_eq!(draft.name(), "Ana  B");
        assert_eq!(draft.email(), "not-an-email");
    }

    #[test]
    fn into_user_keeps_fields() {
        let user = UserDraft::new("Ana", "ana@x.com")
            .expect("draft should be valid")
            .into_user(7);
        assert_eq!(
            user,
            User {
                id: 7,
                name: "Ana".to_string(),
                email: "ana@x.com".to_string(),
            }
        );
    }

    #[test]
    fn validate_rejects_corrupt_records() {
        let mut user = User {
            id: 1,
            name: "Ana".to_string(),
            email: "ana@x.com".to_string(),
        };
        assert!(user.validate().is_ok());

        user.email = " ".to_string();
        assert_eq!(user.validate(), Err(UserValidationError::EmptyEmail));

        user.id = 0;
        assert_eq!(user.validate(), Err(UserValidationError::InvalidId(0)));
    }

    #[test]
    fn user_serializes_with_plain_field_names() {
        let user = User {
            id: 3,
            name: "Ana".to_string(),
            email: "ana@x.com".to_string(),
        };
        let json = serde_json::to_value(&user).expect("user should serialize");
        assert_eq!(json["id"], 3);
        assert_eq!(json["name"], "Ana");
        assert_eq!(json["email"], "ana@x.com");
    }
}
