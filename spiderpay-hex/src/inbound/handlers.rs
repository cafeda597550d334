//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use spiderpay_types::{
    AppError, CreatePaymentRequest, CreateUserRequest, LoginRequest, PageParams, PaymentId,
    PaymentResponse, PaymentStore, TokenResponse, UpdatePaymentRequest, UpdateUserRequest,
    UserId, UserResponse,
};

use super::auth::CurrentUser;
use crate::security::TokenIssuer;
use crate::{PaymentService, UserService};

/// Hard cap on list page sizes, regardless of the requested limit.
pub const MAX_PAGE_LIMIT: i64 = 200;

/// Application state shared across handlers.
pub struct AppState<S: PaymentStore> {
    pub users: UserService<S>,
    pub payments: PaymentService<S>,
    pub tokens: TokenIssuer,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = serde_json::json!({
            "error": message,
            "code": status.as_u16()
        });

        (status, Json(body)).into_response()
    }
}

/// Clamps page parameters to sane bounds.
fn page_bounds(page: PageParams) -> (i64, i64) {
    (page.skip.max(0), page.limit.clamp(0, MAX_PAGE_LIMIT))
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Auth
// ─────────────────────────────────────────────────────────────────────────────

/// Exchange credentials for a bearer token.
#[tracing::instrument(skip(state, req), fields(email = %req.email))]
pub async fn login<S: PaymentStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.users.authenticate(&req.email, &req.password).await?;
    let token = state.tokens.issue(user.id)?;
    Ok(Json(TokenResponse::new(token)))
}

// ─────────────────────────────────────────────────────────────────────────────
// Users
// ─────────────────────────────────────────────────────────────────────────────

/// Register a new user.
#[tracing::instrument(skip(state, req), fields(email = %req.email))]
pub async fn create_user<S: PaymentStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.users.register(req).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// List users.
#[tracing::instrument(skip(state))]
pub async fn list_users<S: PaymentStore>(
    State(state): State<Arc<AppState<S>>>,
    Query(page): Query<PageParams>,
) -> Result<impl IntoResponse, ApiError> {
    let (skip, limit) = page_bounds(page);
    let users = state.users.list(skip, limit).await?;
    let response: Vec<UserResponse> = users.into_iter().map(Into::into).collect();
    Ok(Json(response))
}

/// Get user by ID.
#[tracing::instrument(skip(state), fields(user_id = %id))]
pub async fn get_user<S: PaymentStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id: UserId = id
        .parse()
        .map_err(|_| AppError::Validation("Invalid user ID".into()))?;

    let user = state.users.get(user_id).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Apply a partial update to a user.
#[tracing::instrument(skip(state, patch), fields(user_id = %id))]
pub async fn update_user<S: PaymentStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(patch): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id: UserId = id
        .parse()
        .map_err(|_| AppError::Validation("Invalid user ID".into()))?;

    let user = state.users.update(user_id, patch).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Delete a user and all payments the user owns.
#[tracing::instrument(skip(state), fields(user_id = %id))]
pub async fn delete_user<S: PaymentStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id: UserId = id
        .parse()
        .map_err(|_| AppError::Validation("Invalid user ID".into()))?;

    state.users.delete(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ─────────────────────────────────────────────────────────────────────────────
// Payments
// ─────────────────────────────────────────────────────────────────────────────

/// Create a payment owned by the authenticated user.
#[tracing::instrument(skip(state, current, req), fields(owner = %current.0.id, amount = req.amount))]
pub async fn create_payment<S: PaymentStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<CreatePaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let payment = state.payments.create(current.0.id, req).await?;
    Ok((StatusCode::CREATED, Json(PaymentResponse::from(payment))))
}

/// List payments.
#[tracing::instrument(skip(state, current), fields(requester = %current.0.id))]
pub async fn list_payments<S: PaymentStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(current): Extension<CurrentUser>,
    Query(page): Query<PageParams>,
) -> Result<impl IntoResponse, ApiError> {
    let (skip, limit) = page_bounds(page);
    let payments = state.payments.list(skip, limit).await?;
    let response: Vec<PaymentResponse> = payments.into_iter().map(Into::into).collect();
    Ok(Json(response))
}

/// Get a payment by ID (owner or superuser only).
#[tracing::instrument(skip(state, current), fields(payment_id = %id, requester = %current.0.id))]
pub async fn get_payment<S: PaymentStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let payment_id: PaymentId = id
        .parse()
        .map_err(|_| AppError::Validation("Invalid payment ID".into()))?;

    let payment = state.payments.get_authorized(&current.0, payment_id).await?;
    Ok(Json(PaymentResponse::from(payment)))
}

/// Apply a partial update to a payment (owner or superuser only).
#[tracing::instrument(skip(state, current, patch), fields(payment_id = %id, requester = %current.0.id))]
pub async fn update_payment<S: PaymentStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(patch): Json<UpdatePaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let payment_id: PaymentId = id
        .parse()
        .map_err(|_| AppError::Validation("Invalid payment ID".into()))?;

    let payment = state
        .payments
        .update_description(&current.0, payment_id, patch)
        .await?;
    Ok(Json(PaymentResponse::from(payment)))
}
