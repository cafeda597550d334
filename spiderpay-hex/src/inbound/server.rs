//! HTTP Server configuration and startup.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use spiderpay_types::PaymentStore;

use super::auth::auth_middleware;
use super::handlers::{self, AppState};
use super::rate_limit::{DEFAULT_REQUESTS_PER_MINUTE, RateLimiterState, rate_limit_middleware};
use crate::openapi::ApiDoc;
use crate::security::TokenIssuer;
use crate::{PaymentService, UserService};

/// HTTP Server for the SpiderPay API.
pub struct HttpServer<S: PaymentStore> {
    state: Arc<AppState<S>>,
    rate_limiter: Arc<RateLimiterState>,
}

impl<S: PaymentStore> HttpServer<S> {
    /// Creates a new HTTP server with the given services and the default
    /// rate limit.
    pub fn new(
        users: UserService<S>,
        payments: PaymentService<S>,
        tokens: TokenIssuer,
    ) -> Self {
        Self::with_rate_limit(users, payments, tokens, DEFAULT_REQUESTS_PER_MINUTE)
    }

    /// Creates a new HTTP server with custom rate limiting.
    pub fn with_rate_limit(
        users: UserService<S>,
        payments: PaymentService<S>,
        tokens: TokenIssuer,
        requests_per_minute: u32,
    ) -> Self {
        // The limiter verifies tokens itself so it can key buckets on the
        // user id even on routes the auth middleware does not cover.
        let rate_limiter = Arc::new(RateLimiterState::new(
            tokens.clone(),
            requests_per_minute,
            Duration::from_secs(60),
        ));
        Self {
            state: Arc::new(AppState {
                users,
                payments,
                tokens,
            }),
            rate_limiter,
        }
    }

    /// Builds the Axum router with all routes.
    ///
    /// Only the payments routes sit behind the bearer-token middleware;
    /// health, login, and the users CRUD are open.
    pub fn router(&self) -> Router {
        // Build HTTP metrics layer (uses globally set MeterProvider)
        let metrics = axum_otel_metrics::HttpMetricsLayerBuilder::new().build();

        let payments = Router::new()
            .route("/payments", post(handlers::create_payment::<S>))
            .route("/payments", get(handlers::list_payments::<S>))
            .route("/payments/{id}", get(handlers::get_payment::<S>))
            .route("/payments/{id}", patch(handlers::update_payment::<S>))
            .route_layer(middleware::from_fn_with_state(
                self.state.clone(),
                auth_middleware::<S>,
            ));

        Router::new()
            .route("/health", get(handlers::health))
            .route("/auth/login", post(handlers::login::<S>))
            .route("/users", post(handlers::create_user::<S>))
            .route("/users", get(handlers::list_users::<S>))
            .route("/users/{id}", get(handlers::get_user::<S>))
            .route("/users/{id}", patch(handlers::update_user::<S>))
            .route("/users/{id}", axum::routing::delete(handlers::delete_user::<S>))
            .merge(payments)
            .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
            .layer(metrics)
            .layer(middleware::from_fn_with_state(
                self.rate_limiter.clone(),
                rate_limit_middleware,
            ))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Runs the server on the given address with graceful shutdown.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
