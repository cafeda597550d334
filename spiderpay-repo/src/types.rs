//! Shared database row types with feature-gated fields for SQLite and
//! PostgreSQL.
//!
//! SQLite stores ids and timestamps as strings and booleans as integers;
//! PostgreSQL uses native UUID / TIMESTAMPTZ / BOOLEAN / JSONB columns.

use sqlx::FromRow;

use spiderpay_types::{
    Currency, Money, Payment, PaymentId, PaymentStatus, RepoError, User, UserId,
};

#[cfg(feature = "postgres")]
use chrono::{DateTime, Utc};
#[cfg(feature = "postgres")]
use uuid::Uuid;

// ─────────────────────────────────────────────────────────────────────────────
// Row structs
// ─────────────────────────────────────────────────────────────────────────────

/// User row from database.
#[derive(FromRow)]
pub struct DbUser {
    #[cfg(feature = "postgres")]
    pub id: Uuid,
    #[cfg(all(feature = "sqlite", not(feature = "postgres")))]
    pub id: String,

    pub email: String,
    pub password_hash: String,
    pub full_name: Option<String>,

    #[cfg(feature = "postgres")]
    pub is_active: bool,
    #[cfg(all(feature = "sqlite", not(feature = "postgres")))]
    pub is_active: i64,

    #[cfg(feature = "postgres")]
    pub is_superuser: bool,
    #[cfg(all(feature = "sqlite", not(feature = "postgres")))]
    pub is_superuser: i64,

    #[cfg(feature = "postgres")]
    pub created_at: DateTime<Utc>,
    #[cfg(all(feature = "sqlite", not(feature = "postgres")))]
    pub created_at: String,

    #[cfg(feature = "postgres")]
    pub updated_at: DateTime<Utc>,
    #[cfg(all(feature = "sqlite", not(feature = "postgres")))]
    pub updated_at: String,
}

/// Payment row from database.
#[derive(FromRow)]
pub struct DbPayment {
    #[cfg(feature = "postgres")]
    pub id: Uuid,
    #[cfg(all(feature = "sqlite", not(feature = "postgres")))]
    pub id: String,

    #[cfg(feature = "postgres")]
    pub user_id: Uuid,
    #[cfg(all(feature = "sqlite", not(feature = "postgres")))]
    pub user_id: String,

    pub amount: i64,
    pub currency: String,
    pub status: String,
    pub description: Option<String>,
    pub gateway: String,
    pub gateway_payment_id: Option<String>,
    pub error_message: Option<String>,

    #[cfg(feature = "postgres")]
    pub metadata: Option<serde_json::Value>,
    #[cfg(all(feature = "sqlite", not(feature = "postgres")))]
    pub metadata: Option<String>,

    #[cfg(feature = "postgres")]
    pub created_at: DateTime<Utc>,
    #[cfg(all(feature = "sqlite", not(feature = "postgres")))]
    pub created_at: String,

    #[cfg(feature = "postgres")]
    pub updated_at: DateTime<Utc>,
    #[cfg(all(feature = "sqlite", not(feature = "postgres")))]
    pub updated_at: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Parsing helpers
// ─────────────────────────────────────────────────────────────────────────────

pub fn parse_status(s: &str) -> Result<PaymentStatus, RepoError> {
    s.parse().map_err(RepoError::Database)
}

#[cfg(all(feature = "sqlite", not(feature = "postgres")))]
fn parse_uuid(s: &str) -> Result<uuid::Uuid, RepoError> {
    uuid::Uuid::parse_str(s).map_err(|e| RepoError::Database(e.to_string()))
}

#[cfg(all(feature = "sqlite", not(feature = "postgres")))]
fn parse_timestamp(s: &str) -> Result<chrono::DateTime<chrono::Utc>, RepoError> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .map_err(|e| RepoError::Database(e.to_string()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Domain conversion
// ─────────────────────────────────────────────────────────────────────────────

impl DbUser {
    /// Convert database row to domain User.
    pub fn into_domain(self) -> Result<User, RepoError> {
        #[cfg(feature = "postgres")]
        let (id, is_active, is_superuser, created_at, updated_at) = (
            UserId::from_uuid(self.id),
            self.is_active,
            self.is_superuser,
            self.created_at,
            self.updated_at,
        );

        #[cfg(all(feature = "sqlite", not(feature = "postgres")))]
        let (id, is_active, is_superuser, created_at, updated_at) = (
            UserId::from_uuid(parse_uuid(&self.id)?),
            self.is_active != 0,
            self.is_superuser != 0,
            parse_timestamp(&self.created_at)?,
            parse_timestamp(&self.updated_at)?,
        );

        Ok(User::from_parts(
            id,
            self.email,
            self.password_hash,
            self.full_name,
            is_active,
            is_superuser,
            created_at,
            updated_at,
        ))
    }
}

impl DbPayment {
    /// Convert database row to domain Payment.
    pub fn into_domain(self) -> Result<Payment, RepoError> {
        let currency = Currency::new(&self.currency).map_err(RepoError::Domain)?;
        let amount = Money::new(self.amount, currency).map_err(RepoError::Domain)?;
        let status = parse_status(&self.status)?;

        #[cfg(feature = "postgres")]
        let (id, user_id, metadata, created_at, updated_at) = (
            PaymentId::from_uuid(self.id),
            UserId::from_uuid(self.user_id),
            self.metadata,
            self.created_at,
            self.updated_at,
        );

        #[cfg(all(feature = "sqlite", not(feature = "postgres")))]
        let (id, user_id, metadata, created_at, updated_at) = {
            let metadata = self
                .metadata
                .as_deref()
                .map(serde_json::from_str)
                .transpose()
                .map_err(|e| RepoError::Database(e.to_string()))?;

            (
                PaymentId::from_uuid(parse_uuid(&self.id)?),
                UserId::from_uuid(parse_uuid(&self.user_id)?),
                metadata,
                parse_timestamp(&self.created_at)?,
                parse_timestamp(&self.updated_at)?,
            )
        };

        Ok(Payment::from_parts(
            id,
            user_id,
            amount,
            status,
            self.description,
            self.gateway,
            self.gateway_payment_id,
            self.error_message,
            metadata,
            created_at,
            updated_at,
        ))
    }
}
