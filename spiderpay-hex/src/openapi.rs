//! OpenAPI specification and documentation.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use spiderpay_types::domain::{Currency, PaymentId, PaymentStatus, UserId};
use spiderpay_types::dto::{
    CreatePaymentRequest, CreateUserRequest, LoginRequest, PaymentResponse, TokenResponse,
    UpdatePaymentRequest, UpdateUserRequest, UserResponse,
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};

// Dummy functions to generate path documentation
// These are not the actual handlers, just for OpenAPI path generation

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = inline(serde_json::Value), example = json!({"status": "healthy"}))
    )
)]
async fn health() {}

/// Exchange credentials for a bearer token
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 401, description = "Incorrect credentials or inactive user")
    )
)]
async fn login() {}

/// Register a new user
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User registered", body = UserResponse),
        (status = 400, description = "Invalid email or password too short"),
        (status = 409, description = "Email already registered")
    )
)]
async fn create_user() {}

/// List users
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    params(
        ("skip" = Option<i64>, Query, description = "Records to skip"),
        ("limit" = Option<i64>, Query, description = "Maximum records to return (capped at 200)")
    ),
    responses(
        (status = 200, description = "List of users", body = Vec<UserResponse>)
    )
)]
async fn list_users() {}

/// Get user by ID
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    params(
        ("id" = UserId, Path, description = "User ID (UUID)")
    ),
    responses(
        (status = 200, description = "User details", body = UserResponse),
        (status = 404, description = "User not found")
    )
)]
async fn get_user() {}

/// Apply a partial update to a user
#[utoipa::path(
    patch,
    path = "/users/{id}",
    tag = "users",
    request_body = UpdateUserRequest,
    params(
        ("id" = UserId, Path, description = "User ID (UUID)")
    ),
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 400, description = "Invalid field value"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email already registered")
    )
)]
async fn update_user() {}

/// Delete a user and all payments the user owns
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    params(
        ("id" = UserId, Path, description = "User ID (UUID)")
    ),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "User not found")
    )
)]
async fn delete_user() {}

/// Create a payment owned by the authenticated user
#[utoipa::path(
    post,
    path = "/payments",
    tag = "payments",
    request_body = CreatePaymentRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Payment created in PENDING", body = PaymentResponse),
        (status = 400, description = "Non-positive amount or invalid currency"),
        (status = 401, description = "Unauthorized")
    )
)]
async fn create_payment() {}

/// List payments
#[utoipa::path(
    get,
    path = "/payments",
    tag = "payments",
    security(("bearer_auth" = [])),
    params(
        ("skip" = Option<i64>, Query, description = "Records to skip"),
        ("limit" = Option<i64>, Query, description = "Maximum records to return (capped at 200)")
    ),
    responses(
        (status = 200, description = "List of payments", body = Vec<PaymentResponse>),
        (status = 401, description = "Unauthorized")
    )
)]
async fn list_payments() {}

/// Get a payment by ID (owner or superuser only)
#[utoipa::path(
    get,
    path = "/payments/{id}",
    tag = "payments",
    security(("bearer_auth" = [])),
    params(
        ("id" = PaymentId, Path, description = "Payment ID (UUID)")
    ),
    responses(
        (status = 200, description = "Payment details", body = PaymentResponse),
        (status = 403, description = "Not the owner and not a superuser"),
        (status = 404, description = "Payment not found"),
        (status = 401, description = "Unauthorized")
    )
)]
async fn get_payment() {}

/// Apply a partial update to a payment (owner or superuser only)
#[utoipa::path(
    patch,
    path = "/payments/{id}",
    tag = "payments",
    request_body = UpdatePaymentRequest,
    security(("bearer_auth" = [])),
    params(
        ("id" = PaymentId, Path, description = "Payment ID (UUID)")
    ),
    responses(
        (status = 200, description = "Updated payment", body = PaymentResponse),
        (status = 403, description = "Not the owner and not a superuser"),
        (status = 404, description = "Payment not found"),
        (status = 401, description = "Unauthorized")
    )
)]
async fn update_payment() {}

/// OpenAPI documentation for the SpiderPay API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "SpiderPay API",
        version = "1.0.0",
        description = "A simulated payments backend with user accounts and payment records.\n\n## Authentication\n\nPayments endpoints require a bearer token. Register via `POST /users`, then exchange your credentials at `POST /auth/login` and include the token in the `Authorization` header:\n\n```\nAuthorization: Bearer <access_token>\n```",
        license(name = "MIT"),
    ),
    paths(
        health,
        login,
        create_user,
        list_users,
        get_user,
        update_user,
        delete_user,
        create_payment,
        list_payments,
        get_payment,
        update_payment,
    ),
    components(
        schemas(
            LoginRequest,
            TokenResponse,
            CreateUserRequest,
            UpdateUserRequest,
            UserResponse,
            CreatePaymentRequest,
            UpdatePaymentRequest,
            PaymentResponse,
            PaymentStatus,
            Currency,
            UserId,
            PaymentId,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Credential exchange"),
        (name = "users", description = "User registration and account management"),
        (name = "payments", description = "Payment record operations"),
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for Bearer token authentication.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}
