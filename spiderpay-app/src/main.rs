//! # SpiderPay Application
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Initialize the store adapter
//! - Create the user and payment services
//! - Start the HTTP server

mod config;

use std::sync::Arc;

use opentelemetry::global;
use opentelemetry_sdk::{propagation::TraceContextPropagator, trace as sdktrace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spiderpay_hex::{HttpServer, PaymentService, TokenIssuer, UserService};
use spiderpay_repo::build_repo;

fn init_tracer() -> (sdktrace::Tracer, sdktrace::SdkTracerProvider) {
    global::set_text_map_propagator(TraceContextPropagator::new());

    // Use gRPC exporter with batch processing (non-blocking)
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .build()
        .expect("failed to create OTLP span exporter");

    let provider = sdktrace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .build();

    global::set_tracer_provider(provider.clone());

    use opentelemetry::trace::TracerProvider as _;
    (provider.tracer("spiderpay-service"), provider)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize OpenTelemetry tracing
    let (otel_tracer, otel_provider) = init_tracer();
    let telemetry = tracing_opentelemetry::layer().with_tracer(otel_tracer);

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,spiderpay_app=debug,spiderpay_hex=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(telemetry)
        .init();

    // Load configuration
    let config = config::Config::from_env()?;

    tracing::info!("Starting SpiderPay server on port {}", config.port);
    tracing::info!("Using database: {}", config.database_url);
    tracing::info!("Active gateway: {}", config.active_gateway);

    // Build store (handles connection and migration)
    let store = Arc::new(build_repo(&config.database_url).await?);

    // Create the application services
    let users = UserService::new(store.clone());
    let payments = PaymentService::new(store, config.active_gateway.clone());
    let tokens = TokenIssuer::new(
        config.secret_key.as_bytes(),
        chrono::Duration::minutes(config.token_ttl_minutes),
    );

    // Create and run the HTTP server
    let server = match config.rate_limit_per_minute {
        Some(requests_per_minute) => {
            HttpServer::with_rate_limit(users, payments, tokens, requests_per_minute)
        }
        None => HttpServer::new(users, payments, tokens),
    };
    let addr = format!("0.0.0.0:{}", config.port);

    server.run(&addr).await?;

    // Ensure traces are flushed before exit
    let _ = otel_provider.shutdown();
    Ok(())
}
