//! SpiderPay CLI
//!
//! Command-line interface for the SpiderPay API.

use anyhow::Result;
use clap::{Parser, Subcommand};

use spiderpay_client::SpiderPayClient;
use spiderpay_types::{
    Currency, PaymentId, UpdatePaymentRequest, UpdateUserRequest, UserId,
};

#[derive(Parser)]
#[command(name = "spiderpay")]
#[command(author, version, about = "SpiderPay API CLI client", long_about = None)]
struct Cli {
    /// Base URL of the SpiderPay API
    #[arg(
        long,
        env = "SPIDERPAY_API_URL",
        default_value = "http://localhost:3000"
    )]
    api_url: String,

    /// Bearer token for authenticated endpoints
    #[arg(long, env = "SPIDERPAY_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// User operations
    User {
        #[command(subcommand)]
        action: UserCommands,
    },
    /// Payment operations
    Payment {
        #[command(subcommand)]
        action: PaymentCommands,
    },
    /// Log in and print a bearer token
    Login {
        /// Login email
        #[arg(long)]
        email: String,
        /// Password
        #[arg(long)]
        password: String,
    },
    /// Check API health
    Health,
}

#[derive(Subcommand)]
enum UserCommands {
    /// Register a new user
    Register {
        /// Login email
        #[arg(long)]
        email: String,
        /// Password (minimum 8 characters)
        #[arg(long)]
        password: String,
        /// Optional display name
        #[arg(long)]
        full_name: Option<String>,
    },
    /// Get user details
    Get {
        /// User ID (UUID)
        id: String,
    },
    /// List users
    List,
    /// Update a user
    Update {
        /// User ID (UUID)
        id: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        full_name: Option<String>,
        /// Clear the display name
        #[arg(long, conflicts_with = "full_name")]
        clear_full_name: bool,
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        active: Option<bool>,
        #[arg(long)]
        superuser: Option<bool>,
    },
    /// Delete a user and all payments the user owns
    Delete {
        /// User ID (UUID)
        id: String,
    },
}

#[derive(Subcommand)]
enum PaymentCommands {
    /// Create a payment
    Create {
        /// Amount in the smallest currency unit (1000 = 10.00)
        #[arg(long)]
        amount: i64,
        /// Currency code (three letters, e.g. USD)
        #[arg(long, default_value = "USD")]
        currency: String,
        /// Optional description
        #[arg(long)]
        description: Option<String>,
    },
    /// Get payment details
    Get {
        /// Payment ID (UUID)
        id: String,
    },
    /// List payments
    List,
    /// Update a payment's description
    Update {
        /// Payment ID (UUID)
        id: String,
        #[arg(long)]
        description: Option<String>,
        /// Clear the description
        #[arg(long, conflicts_with = "description")]
        clear_description: bool,
    },
}

fn parse_currency(s: &str) -> Result<Currency> {
    Currency::new(s).map_err(|e| anyhow::anyhow!("{}", e))
}

fn parse_user_id(s: &str) -> Result<UserId> {
    s.parse().map_err(|_| anyhow::anyhow!("Invalid user ID: {}", s))
}

fn parse_payment_id(s: &str) -> Result<PaymentId> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("Invalid payment ID: {}", s))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut client = SpiderPayClient::new(&cli.api_url);
    if let Some(token) = cli.token {
        client = client.with_token(token);
    }

    match cli.command {
        Commands::Health => {
            let healthy = client.health().await?;
            if healthy {
                println!("✓ API is healthy");
            } else {
                println!("✗ API is not healthy");
                std::process::exit(1);
            }
        }

        Commands::Login { email, password } => {
            let token = client.login(&email, &password).await?;
            println!("{}", token.access_token);
        }

        Commands::User { action } => match action {
            UserCommands::Register {
                email,
                password,
                full_name,
            } => {
                let user = client.register_user(&email, &password, full_name).await?;
                println!("{}", serde_json::to_string_pretty(&user)?);
            }
            UserCommands::Get { id } => {
                let user_id = parse_user_id(&id)?;
                let user = client.get_user(user_id).await?;
                println!("{}", serde_json::to_string_pretty(&user)?);
            }
            UserCommands::List => {
                let users = client.list_users().await?;
                println!("{}", serde_json::to_string_pretty(&users)?);
            }
            UserCommands::Update {
                id,
                email,
                full_name,
                clear_full_name,
                password,
                active,
                superuser,
            } => {
                let user_id = parse_user_id(&id)?;
                let patch = UpdateUserRequest {
                    email,
                    full_name: if clear_full_name {
                        Some(None)
                    } else {
                        full_name.map(Some)
                    },
                    password,
                    is_active: active,
                    is_superuser: superuser,
                };
                let user = client.update_user(user_id, &patch).await?;
                println!("{}", serde_json::to_string_pretty(&user)?);
            }
            UserCommands::Delete { id } => {
                let user_id = parse_user_id(&id)?;
                client.delete_user(user_id).await?;
                println!("✓ User deleted");
            }
        },

        Commands::Payment { action } => match action {
            PaymentCommands::Create {
                amount,
                currency,
                description,
            } => {
                let currency = parse_currency(&currency)?;
                let payment = client.create_payment(amount, currency, description).await?;
                println!("{}", serde_json::to_string_pretty(&payment)?);
            }
            PaymentCommands::Get { id } => {
                let payment_id = parse_payment_id(&id)?;
                let payment = client.get_payment(payment_id).await?;
                println!("{}", serde_json::to_string_pretty(&payment)?);
            }
            PaymentCommands::List => {
                let payments = client.list_payments().await?;
                println!("{}", serde_json::to_string_pretty(&payments)?);
            }
            PaymentCommands::Update {
                id,
                description,
                clear_description,
            } => {
                let payment_id = parse_payment_id(&id)?;
                let patch = UpdatePaymentRequest {
                    description: if clear_description {
                        Some(None)
                    } else {
                        description.map(Some)
                    },
                };
                let payment = client.update_payment(payment_id, &patch).await?;
                println!("{}", serde_json::to_string_pretty(&payment)?);
            }
        },
    }

    Ok(())
}
