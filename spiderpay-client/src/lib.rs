//! # SpiderPay Client SDK
//!
//! A typed Rust client for the SpiderPay API.

use reqwest::Client;
use serde::de::DeserializeOwned;

use spiderpay_types::{
    CreatePaymentRequest, CreateUserRequest, Currency, LoginRequest, PaymentId, PaymentResponse,
    TokenResponse, UpdatePaymentRequest, UpdateUserRequest, UserId, UserResponse,
};

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// SpiderPay API client.
///
/// Users endpoints work without a token; payments endpoints require one,
/// obtained from [`SpiderPayClient::login`] and attached via
/// [`SpiderPayClient::with_token`].
pub struct SpiderPayClient {
    base_url: String,
    token: Option<String>,
    http: Client,
}

impl SpiderPayClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            http: Client::new(),
        }
    }

    /// Sets the bearer token for authentication.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Checks if the API is healthy.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let resp = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        Ok(resp.status().is_success())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Auth
    // ─────────────────────────────────────────────────────────────────────────

    /// Exchanges credentials for a bearer token.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenResponse, ClientError> {
        let req = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.post("/auth/login", &req).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Users
    // ─────────────────────────────────────────────────────────────────────────

    /// Registers a new user.
    pub async fn register_user(
        &self,
        email: &str,
        password: &str,
        full_name: Option<String>,
    ) -> Result<UserResponse, ClientError> {
        let req = CreateUserRequest {
            email: email.to_string(),
            password: password.to_string(),
            full_name,
        };
        self.post("/users", &req).await
    }

    /// Gets a user by ID.
    pub async fn get_user(&self, id: UserId) -> Result<UserResponse, ClientError> {
        self.get(&format!("/users/{}", id)).await
    }

    /// Lists users.
    pub async fn list_users(&self) -> Result<Vec<UserResponse>, ClientError> {
        self.get("/users").await
    }

    /// Applies a change set to a user.
    pub async fn update_user(
        &self,
        id: UserId,
        patch: &UpdateUserRequest,
    ) -> Result<UserResponse, ClientError> {
        self.patch(&format!("/users/{}", id), patch).await
    }

    /// Deletes a user and all payments the user owns.
    pub async fn delete_user(&self, id: UserId) -> Result<(), ClientError> {
        let resp = self
            .authed(self.http.delete(format!("{}/users/{}", self.base_url, id)))
            .send()
            .await?;
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(self.api_error(resp).await)
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Payments
    // ─────────────────────────────────────────────────────────────────────────

    /// Creates a payment owned by the authenticated user.
    pub async fn create_payment(
        &self,
        amount: i64,
        currency: Currency,
        description: Option<String>,
    ) -> Result<PaymentResponse, ClientError> {
        let req = CreatePaymentRequest {
            amount,
            currency,
            description,
        };
        self.post("/payments", &req).await
    }

    /// Gets a payment by ID.
    pub async fn get_payment(&self, id: PaymentId) -> Result<PaymentResponse, ClientError> {
        self.get(&format!("/payments/{}", id)).await
    }

    /// Lists payments.
    pub async fn list_payments(&self) -> Result<Vec<PaymentResponse>, ClientError> {
        self.get("/payments").await
    }

    /// Applies a change set to a payment.
    pub async fn update_payment(
        &self,
        id: PaymentId,
        patch: &UpdatePaymentRequest,
    ) -> Result<PaymentResponse, ClientError> {
        self.patch(&format!("/payments/{}", id), patch).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Plumbing
    // ─────────────────────────────────────────────────────────────────────────

    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let req = self.authed(self.http.get(format!("{}{}", self.base_url, path)));
        let resp = req.send().await?;
        self.handle_response(resp).await
    }

    async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let req = self.authed(
            self.http
                .post(format!("{}{}", self.base_url, path))
                .json(body),
        );
        let resp = req.send().await?;
        self.handle_response(resp).await
    }

    async fn patch<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let req = self.authed(
            self.http
                .patch(format!("{}{}", self.base_url, path))
                .json(body),
        );
        let resp = req.send().await?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        if resp.status().is_success() {
            let body = resp.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            Err(self.api_error(resp).await)
        }
    }

    async fn api_error(&self, resp: reqwest::Response) -> ClientError {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
            .unwrap_or(body);
        ClientError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = SpiderPayClient::new("http://localhost:3000");
        assert_eq!(client.base_url, "http://localhost:3000");
        assert!(client.token.is_none());
    }

    #[test]
    fn test_client_with_trailing_slash() {
        let client = SpiderPayClient::new("http://localhost:3000/");
        assert_eq!(client.base_url, "http://localhost:3000");
    }

    #[test]
    fn test_with_token() {
        let client = SpiderPayClient::new("http://localhost:3000").with_token("tok");
        assert_eq!(client.token.as_deref(), Some("tok"));
    }
}
