//! Domain models for the SpiderPay service.

pub mod money;
pub mod payment;
pub mod user;

pub use money::{Currency, Money};
pub use payment::{Payment, PaymentId, PaymentStatus};
pub use user::{User, UserId};
