//! PostgreSQL store adapter.

use async_trait::async_trait;
use sqlx::PgPool;

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
// PostgreSQL store
// ─────────────────────────────────────────────────────────────────────────────

/// PostgreSQL store implementation.
pub struct PostgresStore {
    pool: PgPool,
}

/// Executes SQL statements from a migration file, splitting by semicolons.
async fn execute_migration(pool: &PgPool, sql: &str, name: &str) -> Result<(), anyhow::Error> {
    for statement in sql.split(';') {
        let stmt = statement.trim();
        if !stmt.is_empty() {
            sqlx::query(stmt)
                .execute(pool)
                .await
                .map_err(|e| anyhow::anyhow!("Migration {} failed: {}", name, e))?;
        }
    }
    Ok(())
}

/// Runs all database migrations.
async fn run_migrations(pool: &PgPool) -> Result<(), anyhow::Error> {
    execute_migration(
        pool,
        include_str!("../migrations/0001_create_users_pg.sql"),
        "0001",
    )
    .await?;

    execute_migration(
        pool,
        include_str!("../migrations/0002_create_payments_pg.sql"),
        "0002",
    )
    .await?;

    Ok(())
}

impl PostgresStore {
    /// Creates a new PostgreSQL store with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Store implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl PaymentStore for PostgresStore {
    async fn insert_user(&self, user: &User) -> Result<User, RepoError> {
        sqlx::query(
            r#"INSERT INTO users (id, email, password_hash, full_name, is_active, is_superuser, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"#,
        )
        .bind(user.id.into_uuid())
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(user.is_active)
        .bind(user.is_superuser)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(user.clone())
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, RepoError> {
        let row: Option<DbUser> = sqlx::query_as(r#"SELECT * FROM users WHERE id = $1"#)
            .bind(id.into_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(DbUser::into_domain).transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let row: Option<DbUser> = sqlx::query_as(r#"SELECT * FROM users WHERE email = $1"#)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(DbUser::into_domain).transpose()
    }

    async fn list_users(&self, skip: i64, limit: i64) -> Result<Vec<User>, RepoError> {
        let rows: Vec<DbUser> = sqlx::query_as(
            r#"SELECT * FROM users ORDER BY created_at DESC LIMIT $1 OFFSET $2"#,
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
               SET email = $1, password_hash = $2, full_name = $3, is_active = $4, is_superuser = $5, updated_at = $6
               WHERE id = $7"#,
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(user.is_active)
        .bind(user.is_superuser)
        .bind(updated_at)
        .bind(user.id.into_uuid())
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
        let uuid = id.into_uuid();

        let mut db_tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        // Owner-cascade: remove owned payments before the user row.
        sqlx::query(r#"DELETE FROM payments WHERE user_id = $1"#)
            .bind(uuid)
            .execute(&mut *db_tx)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        let result = sqlx::query(r#"DELETE FROM users WHERE id = $1"#)
            .bind(uuid)
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
        sqlx::query(
            r#"INSERT INTO payments (id, user_id, amount, currency, status, description, gateway, gateway_payment_id, error_message, metadata, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)"#,
        )
        .bind(payment.id.into_uuid())
        .bind(payment.user_id.into_uuid())
        .bind(payment.amount.minor())
        .bind(payment.amount.currency().as_str())
        .bind(payment.status.to_string())
        .bind(&payment.description)
        .bind(&payment.gateway)
        .bind(&payment.gateway_payment_id)
        .bind(&payment.error_message)
        .bind(&payment.metadata)
        .bind(payment.created_at)
        .bind(payment.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(payment.clone())
    }

    async fn find_payment(&self, id: PaymentId) -> Result<Option<Payment>, RepoError> {
        let row: Option<DbPayment> = sqlx::query_as(r#"SELECT * FROM payments WHERE id = $1"#)
            .bind(id.into_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(DbPayment::into_domain).transpose()
    }

    async fn list_payments(&self, skip: i64, limit: i64) -> Result<Vec<Payment>, RepoError> {
        let rows: Vec<DbPayment> = sqlx::query_as(
            r#"SELECT * FROM payments ORDER BY created_at DESC LIMIT $1 OFFSET $2"#,
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

        let result = sqlx::query(
            r#"UPDATE payments
               SET status = $1, description = $2, gateway_payment_id = $3, error_message = $4, metadata = $5, updated_at = $6
               WHERE id = $7"#,
        )
        .bind(payment.status.to_string())
        .bind(&payment.description)
        .bind(&payment.gateway_payment_id)
        .bind(&payment.error_message)
        .bind(&payment.metadata)
        .bind(updated_at)
        .bind(payment.id.into_uuid())
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
