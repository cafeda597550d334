//! # SpiderPay Hex
//!
//! Application service layer and HTTP adapter for the SpiderPay service.
//!
//! ## Architecture
//!
//! - `service/` - Application services (orchestrate domain operations)
//! - `security` - Password hashing and bearer token issuance
//! - `inbound/` - HTTP adapter (Axum server)
//! - `openapi` - OpenAPI document served at `/docs`
//!
//! Services are generic over `S: PaymentStore`, allowing different store
//! implementations to be injected.

pub mod inbound;
pub mod openapi;
pub mod security;
pub mod service;


pub use inbound::HttpServer;
pub use security::TokenIssuer;
pub use service::{PaymentService, UserService};
