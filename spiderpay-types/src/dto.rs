//! Data Transfer Objects (DTOs) for requests and responses.
//!
//! Partial-update (PATCH) bodies use an explicit change-set encoding: a
//! missing field means "leave unchanged". For nullable columns the field is
//! a double `Option`, so `null` in the body means "clear this field" and is
//! never confused with "don't touch it".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::domain::{Currency, Payment, PaymentId, PaymentStatus, User, UserId};

/// Deserializes a present-but-possibly-null field into `Some(Option<T>)`.
/// Combined with `#[serde(default)]`, an absent field stays `None`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ─────────────────────────────────────────────────────────────────────────────
// Auth DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Credentials for `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "alice@example.com")]
    pub email: String,
    pub password: String,
}

/// Bearer token issued after a successful login.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    /// Always "bearer"
    #[serde(default = "bearer")]
    pub token_type: String,
}

fn bearer() -> String {
    "bearer".to_string()
}

impl TokenResponse {
    pub fn new(access_token: String) -> Self {
        Self {
            access_token,
            token_type: bearer(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// User DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to register a new user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    /// Unique login email
    #[schema(example = "alice@example.com")]
    pub email: String,
    /// Plaintext password, minimum 8 characters (hashed before storage)
    pub password: String,
    /// Optional display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

/// Change set for `PATCH /users/{id}`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// `null` clears the display name
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    pub full_name: Option<Option<String>>,
    /// New plaintext password (re-hashed before storage)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_superuser: Option<bool>,
}

impl UpdateUserRequest {
    /// True if the change set touches nothing.
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.full_name.is_none()
            && self.password.is_none()
            && self.is_active.is_none()
            && self.is_superuser.is_none()
    }
}

/// Public view of a user; never exposes the credential hash.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: UserId,
    #[schema(example = "alice@example.com")]
    pub email: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            is_active: user.is_active,
            is_superuser: user.is_superuser,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Payment DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to create a payment. The owner comes from the bearer token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatePaymentRequest {
    /// Amount in the smallest currency unit (1000 = 10.00)
    #[schema(example = 1000)]
    pub amount: i64,
    pub currency: Currency,
    /// Optional human-readable description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Change set for `PATCH /payments/{id}`.
///
/// `description` is the only publicly patchable field; an empty change set
/// is a no-op, not an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdatePaymentRequest {
    /// `null` clears the description
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
}

impl UpdatePaymentRequest {
    /// True if the change set touches nothing.
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
    }
}

/// API view of a payment record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaymentResponse {
    pub id: PaymentId,
    pub user_id: UserId,
    /// Amount in the smallest currency unit
    #[schema(example = 1000)]
    pub amount: i64,
    pub currency: Currency,
    pub status: PaymentStatus,
    pub description: Option<String>,
    #[schema(example = "mock")]
    pub gateway: String,
    pub gateway_payment_id: Option<String>,
    pub error_message: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Payment> for PaymentResponse {
    fn from(payment: Payment) -> Self {
        Self {
            id: payment.id,
            user_id: payment.user_id,
            amount: payment.amount.minor(),
            currency: payment.amount.currency(),
            status: payment.status,
            description: payment.description,
            gateway: payment.gateway,
            gateway_payment_id: payment.gateway_payment_id,
            error_message: payment.error_message,
            metadata: payment.metadata,
            created_at: payment.created_at,
            updated_at: payment.updated_at,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Pagination
// ─────────────────────────────────────────────────────────────────────────────

/// Query parameters for list endpoints.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct PageParams {
    /// Records to skip
    #[serde(default)]
    pub skip: i64,
    /// Maximum records to return (capped at 200 by the boundary)
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: default_limit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_patch_fields_stay_untouched() {
        let patch: UpdatePaymentRequest = serde_json::from_str("{}").unwrap();
        assert!(patch.is_empty());
        assert_eq!(patch.description, None);
    }

    #[test]
    fn test_null_patch_field_means_clear() {
        let patch: UpdatePaymentRequest =
            serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert!(!patch.is_empty());
        assert_eq!(patch.description, Some(None));
    }

    #[test]
    fn test_set_patch_field() {
        let patch: UpdatePaymentRequest =
            serde_json::from_str(r#"{"description": "lunch"}"#).unwrap();
        assert_eq!(patch.description, Some(Some("lunch".to_string())));
    }

    #[test]
    fn test_page_params_defaults() {
        let page: PageParams = serde_json::from_str("{}").unwrap();
        assert_eq!(page.skip, 0);
        assert_eq!(page.limit, 100);
    }
}
