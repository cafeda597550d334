//! User domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::DomainError;

/// Unique identifier for a User.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a new random UserId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a UserId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Returns the UUID value.
    pub fn into_uuid(self) -> Uuid {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A registered principal that can authenticate and own payments.
///
/// `password_hash` is the stored credential hash, never a plaintext secret.
/// Hashing happens in the application layer before a `User` is built.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique identifier
    pub id: UserId,
    /// Unique login email, stored as received (case-sensitive)
    pub email: String,
    /// Argon2 credential hash
    pub password_hash: String,
    /// Optional display name
    pub full_name: Option<String>,
    /// Inactive users cannot authenticate
    pub is_active: bool,
    /// Superusers pass every ownership check
    pub is_superuser: bool,
    /// When the user was created
    pub created_at: DateTime<Utc>,
    /// When the user was last updated
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Validates an email address.
    ///
    /// The rule is shared by creation and update paths: the address must
    /// contain an `@` and must not be blank.
    pub fn validate_email(email: &str) -> Result<(), DomainError> {
        if email.trim().is_empty() || !email.contains('@') {
            return Err(DomainError::ValidationError(format!(
                "Invalid email address: {:?}",
                email
            )));
        }
        Ok(())
    }

    /// Creates a new active, non-superuser account.
    pub fn new(
        email: String,
        password_hash: String,
        full_name: Option<String>,
    ) -> Result<Self, DomainError> {
        Self::validate_email(&email)?;

        let now = Utc::now();
        Ok(Self {
            id: UserId::new(),
            email,
            password_hash,
            full_name,
            is_active: true,
            is_superuser: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// Reconstructs a user from database fields.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: UserId,
        email: String,
        password_hash: String,
        full_name: Option<String>,
        is_active: bool,
        is_superuser: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email,
            password_hash,
            full_name,
            is_active,
            is_superuser,
            created_at,
            updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_creation_defaults() {
        let user = User::new("a@x.com".into(), "$argon2id$fake".into(), None).unwrap();
        assert!(user.is_active);
        assert!(!user.is_superuser);
        assert_eq!(user.email, "a@x.com");
    }

    #[test]
    fn test_validate_email() {
        assert!(User::validate_email("a@x.com").is_ok());
        assert!(matches!(
            User::validate_email("not-an-email"),
            Err(DomainError::ValidationError(_))
        ));
        assert!(matches!(
            User::validate_email("   "),
            Err(DomainError::ValidationError(_))
        ));
    }

    #[test]
    fn test_invalid_email_fails() {
        assert!(matches!(
            User::new("not-an-email".into(), "h".into(), None),
            Err(DomainError::ValidationError(_))
        ));
        assert!(matches!(
            User::new("   ".into(), "h".into(), None),
            Err(DomainError::ValidationError(_))
        ));
    }
}
