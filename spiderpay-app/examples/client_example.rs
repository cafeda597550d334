//! Client example demonstrating full user and payment flows against a
//! running server.
//!
//! Run with: cargo run -p spiderpay-app --example client_example --no-default-features --features sqlite

use std::net::SocketAddr;
use std::sync::Arc;

use spiderpay_client::SpiderPayClient;
use spiderpay_hex::{HttpServer, PaymentService, TokenIssuer, UserService};
use spiderpay_repo::build_repo;
use spiderpay_types::{Currency, UpdatePaymentRequest};
use tempfile::tempdir;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt().with_env_filter("info").init();

    // Find an available port
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr: SocketAddr = listener.local_addr()?;
    let port = addr.port();
    drop(listener);

    // Use a temp file-backed SQLite DB
    let tmp = tempdir()?;
    let db_path = tmp.path().join("spiderpay.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

    println!("🚀 Starting server on port {port}...");
    println!("   Database: {db_url}");

    // Build store (handles connection and migration)
    let store = Arc::new(build_repo(&db_url).await?);

    // Start server in background
    let server = HttpServer::new(
        UserService::new(store.clone()),
        PaymentService::new(store, "mock".to_string()),
        TokenIssuer::with_default_ttl(b"client-example-secret"),
    );
    let router = server.router();

    let server_addr = format!("127.0.0.1:{port}");
    tokio::spawn(async move {
        axum::serve(
            TcpListener::bind(&server_addr).await.unwrap(),
            router.into_make_service(),
        )
        .await
        .unwrap();
    });

    // Wait for server to start
    tokio::time::sleep(std::time::Duration::from_millis(500)).await;

    // Create client
    let base_url = format!("http://127.0.0.1:{port}");
    let client = SpiderPayClient::new(&base_url);

    // ─────────────────────────────────────────────────────────────────────────
    // Demo: Full payment flow
    // ─────────────────────────────────────────────────────────────────────────

    // Health check
    let healthy = client.health().await?;
    println!("✅ Server healthy: {healthy}");

    // Payments require a token
    let response = client
        .create_payment(1000, Currency::new("USD")?, None)
        .await;
    assert!(response.is_err());
    println!("✅ Unauthorized without token: {}", response.unwrap_err());

    // Register and log in
    let alice = client
        .register_user("alice@example.com", "correct-horse-battery", Some("Alice".into()))
        .await?;
    println!("✅ Registered user: {} (id={})", alice.email, alice.id);

    let token = client
        .login("alice@example.com", "correct-horse-battery")
        .await?;
    println!("✅ Logged in, token type: {}", token.token_type);

    let client = client.with_token(token.access_token);

    // Create payments
    let coffee = client
        .create_payment(450, Currency::new("USD")?, Some("coffee".into()))
        .await?;
    println!(
        "✅ Created payment: {} {} [{}] (id={})",
        coffee.amount, coffee.currency, coffee.status, coffee.id
    );

    let lunch = client
        .create_payment(1825, Currency::new("EUR")?, Some("lunch".into()))
        .await?;
    println!("✅ Created payment: {} {} (id={})", lunch.amount, lunch.currency, lunch.id);

    // Read one back
    let fetched = client.get_payment(coffee.id).await?;
    println!(
        "✅ Fetched payment {}: description={:?}",
        fetched.id, fetched.description
    );

    // Patch the description
    let patched = client
        .update_payment(
            coffee.id,
            &UpdatePaymentRequest {
                description: Some(Some("espresso".into())),
            },
        )
        .await?;
    println!("✅ Patched description: {:?}", patched.description);

    // List everything
    let payments = client.list_payments().await?;
    println!("✅ Listed {} payments", payments.len());

    println!("\n🎉 Demo complete!");
    Ok(())
}
