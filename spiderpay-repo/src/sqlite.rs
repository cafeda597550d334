//! SQLite store adapter.

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::SqliteConnectOptions;
use std::str::FromStr;

use spiderpay_types::{Payment, PaymentId, PaymentStore, RepoError, User, UserId};

use crate::types::{DbPayment, DbUser};

fn db_err(e: sqlx::Error) -> RepoError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepoError::Conflict("Email already registered".into())
        }
        _ => RepoError::Database(e.to_string()),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// SQLite store
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite store implementation.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Creates a new SQLite store with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            let path = path.split('?').next().unwrap_or(path);
            if path != ":memory:" {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;

        sqlx::query(include_str!("../migrations/0001_create_users.sql"))
            .execute(&pool)
            .await?;
        sqlx::query(include_str!("../migrations/0002_create_payments.sql"))
            .execute(&pool)
            .await?;

        Ok(Self { pool })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Store implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl PaymentStore for SqliteStore {
    async fn insert_user(&self, user: &User) -> Result<User, RepoError> {
        sqlx::query(
            r#"INSERT INTO users (id, email, password_hash, full_name, is_active, is_superuser, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(user.id.to_string())
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(user.is_active as i64)
        .bind(user.is_superuser as i64)
        .bind(user.created_at.to_rfc3339())
        .bind(user.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(user.clone())
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, RepoError> {
        let row: Option<DbUser> = sqlx::query_as(r#"SELECT * FROM users WHERE id = ?"#)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(DbUser::into_domain).transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let row: Option<DbUser> = sqlx::query_as(r#"SELECT * FROM users WHERE email = ?"#)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(DbUser::into_domain).transpose()
    }

    async fn list_users(&self, skip: i64, limit: i64) -> Result<Vec<User>, RepoError> {
        let rows: Vec<DbUser> = sqlx::query_as(
            r#"SELECT * FROM users ORDER BY created_at DESC LIMIT ? OFFSET ?"#,
        )
        .bind(limit)
        .bind(skip)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(DbUser::into_domain).collect()
    }

    async fn update_user(&self, user: &User) -> Result<User, RepoError> {
        let updated_at = chrono::Utc::now();

        let result = sqlx::query(
            r#"UPDATE users
               SET email = ?, password_hash = ?, full_name = ?, is_active = ?, is_superuser = ?, updated_at = ?
               WHERE id = ?"#,
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(user.is_active as i64)
        .bind(user.is_superuser as i64)
        .bind(updated_at.to_rfc3339())
        .bind(user.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }

        let mut updated = user.clone();
        updated.updated_at = updated_at;
        Ok(updated)
    }

    async fn delete_user(&self, id: UserId) -> Result<bool, RepoError> {
        let id_str = id.to_string();

        let mut db_tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        // Owner-cascade: remove owned payments before the user row.
        sqlx::query(r#"DELETE FROM payments WHERE user_id = ?"#)
            .bind(&id_str)
            .execute(&mut *db_tx)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        let result = sqlx::query(r#"DELETE FROM users WHERE id = ?"#)
            .bind(&id_str)
            .execute(&mut *db_tx)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        db_tx
            .commit()
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert_payment(&self, payment: &Payment) -> Result<Payment, RepoError> {
        let metadata = payment
            .metadata
            .as_ref()
            .map(|m| m.to_string());

        sqlx::query(
            r#"INSERT INTO payments (id, user_id, amount, currency, status, description, gateway, gateway_payment_id, error_message, metadata, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(payment.id.to_string())
        .bind(payment.user_id.to_string())
        .bind(payment.amount.minor())
        .bind(payment.amount.currency().as_str())
        .bind(payment.status.to_string())
        .bind(&payment.description)
        .bind(&payment.gateway)
        .bind(&payment.gateway_payment_id)
        .bind(&payment.error_message)
        .bind(metadata)
        .bind(payment.created_at.to_rfc3339())
        .bind(payment.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(payment.clone())
    }

    async fn find_payment(&self, id: PaymentId) -> Result<Option<Payment>, RepoError> {
        let row: Option<DbPayment> = sqlx::query_as(r#"SELECT * FROM payments WHERE id = ?"#)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(DbPayment::into_domain).transpose()
    }

    async fn list_payments(&self, skip: i64, limit: i64) -> Result<Vec<Payment>, RepoError> {
        let rows: Vec<DbPayment> = sqlx::query_as(
            r#"SELECT * FROM payments ORDER BY created_at DESC LIMIT ? OFFSET ?"#,
        )
        .bind(limit)
        .bind(skip)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.into_iter().map(DbPayment::into_domain).collect()
    }

    async fn update_payment(&self, payment: &Payment) -> Result<Payment, RepoError> {
        let updated_at = chrono::Utc::now();
        let metadata = payment
            .metadata
            .as_ref()
            .map(|m| m.to_string());

        let result = sqlx::query(
            r#"UPDATE payments
               SET status = ?, description = ?, gateway_payment_id = ?, error_message = ?, metadata = ?, updated_at = ?
               WHERE id = ?"#,
        )
        .bind(payment.status.to_string())
        .bind(&payment.description)
        .bind(&payment.gateway_payment_id)
        .bind(&payment.error_message)
        .bind(metadata)
        .bind(updated_at.to_rfc3339())
        .bind(payment.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }

        let mut updated = payment.clone();
        updated.updated_at = updated_at;
        Ok(updated)
    }
}
