//! Application services.
//!
//! Orchestrate domain operations through the store port. Contain NO
//! infrastructure logic - pure business orchestration.

mod payments;
mod users;

pub use payments::PaymentService;
pub use users::UserService;
