//! User account application service.

use std::sync::Arc;

use spiderpay_types::{
    AppError, CreateUserRequest, PaymentStore, UpdateUserRequest, User, UserId,
};

use crate::security;

/// Minimum accepted plaintext password length.
const MIN_PASSWORD_LEN: usize = 8;

fn check_password(password: &str) -> Result<(), AppError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

/// Application service for user registration, authentication, and
/// account management.
///
/// Generic over `S: PaymentStore` - the adapter is injected at compile time,
/// so tests run against an in-memory store and production against SQL.
pub struct UserService<S: PaymentStore> {
    store: Arc<S>,
}

impl<S: PaymentStore> Clone for UserService<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: PaymentStore> UserService<S> {
    /// Creates a new user service backed by the given store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Registers a new account.
    ///
    /// The plaintext password is hashed before any store call; a `User`
    /// holding a plaintext secret never exists. Duplicate emails conflict.
    pub async fn register(&self, req: CreateUserRequest) -> Result<User, AppError> {
        check_password(&req.password)?;

        if self
            .store
            .find_user_by_email(&req.email)
            .await
            .map_err(AppError::from)?
            .is_some()
        {
            return Err(AppError::Conflict("Email already registered".into()));
        }

        let password_hash = security::hash_password(&req.password)?;
        let user = User::new(req.email, password_hash, req.full_name)?;

        // The unique index still backstops the lookup above under races.
        self.store.insert_user(&user).await.map_err(Into::into)
    }

    /// Verifies credentials and returns the account.
    ///
    /// Unknown email and wrong password produce the same error, so the
    /// response does not reveal which emails are registered.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, AppError> {
        let user = self
            .store
            .find_user_by_email(email)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::Unauthorized("Incorrect email or password".into()))?;

        if !security::verify_password(password, &user.password_hash) {
            return Err(AppError::Unauthorized("Incorrect email or password".into()));
        }

        if !user.is_active {
            return Err(AppError::Unauthorized("Inactive user".into()));
        }

        Ok(user)
    }

    /// Gets a user by ID.
    pub async fn get(&self, id: UserId) -> Result<User, AppError> {
        self.store
            .find_user(id)
            .await
            .map_err(AppError::from)
            .and_then(|opt| opt.ok_or_else(|| AppError::NotFound(format!("User {}", id))))
    }

    /// Lists users ordered by creation time, newest first.
    pub async fn list(&self, skip: i64, limit: i64) -> Result<Vec<User>, AppError> {
        self.store.list_users(skip, limit).await.map_err(Into::into)
    }

    /// Applies a change set to a user.
    ///
    /// Absent fields are left unchanged; `full_name: null` clears the
    /// display name. An empty change set returns the current record
    /// without a store write.
    pub async fn update(&self, id: UserId, patch: UpdateUserRequest) -> Result<User, AppError> {
        let mut user = self.get(id).await?;

        if patch.is_empty() {
            return Ok(user);
        }

        if let Some(email) = patch.email {
            User::validate_email(&email)?;
            user.email = email;
        }
        if let Some(full_name) = patch.full_name {
            user.full_name = full_name;
        }
        if let Some(password) = patch.password {
            check_password(&password)?;
            user.password_hash = security::hash_password(&password)?;
        }
        if let Some(is_active) = patch.is_active {
            user.is_active = is_active;
        }
        if let Some(is_superuser) = patch.is_superuser {
            user.is_superuser = is_superuser;
        }

        self.store.update_user(&user).await.map_err(Into::into)
    }

    /// Deletes a user and, with it, every payment the user owns.
    pub async fn delete(&self, id: UserId) -> Result<(), AppError> {
        let deleted = self.store.delete_user(id).await.map_err(AppError::from)?;
        if !deleted {
            return Err(AppError::NotFound(format!("User {}", id)));
        }
        Ok(())
    }
}
