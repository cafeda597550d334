//! Authentication middleware for bearer token validation.

use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use spiderpay_types::{PaymentStore, User};

use super::handlers::AppState;

/// The authenticated user, inserted into request extensions by
/// [`auth_middleware`] and extracted by protected handlers.
#[derive(Clone)]
pub struct CurrentUser(pub Arc<User>);

/// Extracts the token from an `Authorization: Bearer <token>` header.
fn extract_bearer_token(auth_header: Option<&str>) -> Option<&str> {
    auth_header?.strip_prefix("Bearer ")
}

/// Authentication middleware for the payments routes.
///
/// This middleware:
/// 1. Extracts the bearer token from the Authorization header
/// 2. Verifies its signature and expiry
/// 3. Loads the user the token names, rejecting inactive accounts
/// 4. Inserts [`CurrentUser`] into the request extensions
///
/// Any failure yields 401; the payload never names which check failed.
pub async fn auth_middleware<S: PaymentStore>(
    State(state): State<Arc<AppState<S>>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok());

    let token = match extract_bearer_token(auth_header) {
        Some(token) if !token.is_empty() => token,
        _ => return unauthorized_response("Missing or invalid Authorization header"),
    };

    let user_id = match state.tokens.verify(token) {
        Some(id) => id,
        None => return unauthorized_response("Invalid or expired token"),
    };

    match state.users.get(user_id).await {
        Ok(user) if user.is_active => {
            request.extensions_mut().insert(CurrentUser(Arc::new(user)));
            next.run(request).await
        }
        Ok(_) => unauthorized_response("Inactive user"),
        Err(e) => {
            // A token naming a deleted user is still just unauthorized.
            tracing::debug!("Token user lookup failed: {}", e);
            unauthorized_response("Invalid or expired token")
        }
    }
}

fn unauthorized_response(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "error": message,
            "code": 401
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(
            extract_bearer_token(Some("Bearer eyJhbGciOi")),
            Some("eyJhbGciOi")
        );
    }

    #[test]
    fn test_extract_bearer_token_missing_scheme() {
        assert_eq!(extract_bearer_token(Some("eyJhbGciOi")), None);
        assert_eq!(extract_bearer_token(Some("Basic dXNlcjpwdw==")), None);
    }

    #[test]
    fn test_extract_bearer_token_none() {
        assert_eq!(extract_bearer_token(None), None);
    }
}
