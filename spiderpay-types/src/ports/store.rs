//! Persistence port trait.
//!
//! This is the primary port in the hexagonal architecture.
//! Adapters (Postgres, SQLite, in-memory test doubles) implement this trait.

use crate::domain::{Payment, PaymentId, User, UserId};
use crate::error::RepoError;

/// Durable storage for identity and payment records.
///
/// Every method is one unit of work: the adapter commits the mutation before
/// returning. Updates are full read-modify-write — the caller passes the
/// complete entity and the adapter writes all mutable columns, stamping
/// `updated_at`. No optimistic-concurrency token exists, so concurrent
/// updates to the same record are last-write-wins.
#[async_trait::async_trait]
pub trait PaymentStore: Send + Sync + 'static {
    // ─────────────────────────────────────────────────────────────────────────
    // User operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Persists a new user. Fails with `Conflict` on a duplicate email.
    async fn insert_user(&self, user: &User) -> Result<User, RepoError>;

    /// Gets a user by ID.
    async fn find_user(&self, id: UserId) -> Result<Option<User>, RepoError>;

    /// Gets a user by exact email.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// Lists users ordered by creation time, most recent first.
    async fn list_users(&self, skip: i64, limit: i64) -> Result<Vec<User>, RepoError>;

    /// Writes back all mutable user columns. Fails with `NotFound` if the
    /// user no longer exists.
    async fn update_user(&self, user: &User) -> Result<User, RepoError>;

    /// Deletes a user and every payment it owns, in one transaction.
    /// Returns false if the user did not exist.
    async fn delete_user(&self, id: UserId) -> Result<bool, RepoError>;

    // ─────────────────────────────────────────────────────────────────────────
    // Payment operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Persists a new payment record.
    async fn insert_payment(&self, payment: &Payment) -> Result<Payment, RepoError>;

    /// Gets a payment by ID.
    async fn find_payment(&self, id: PaymentId) -> Result<Option<Payment>, RepoError>;

    /// Lists payments ordered by creation time, most recent first.
    /// No ownership filter is applied here.
    async fn list_payments(&self, skip: i64, limit: i64) -> Result<Vec<Payment>, RepoError>;

    /// Writes back all mutable payment columns. Fails with `NotFound` if the
    /// payment no longer exists.
    async fn update_payment(&self, payment: &Payment) -> Result<Payment, RepoError>;
}
