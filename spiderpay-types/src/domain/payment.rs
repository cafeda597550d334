//! Payment domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::money::Money;
use super::user::UserId;

/// Unique identifier for a Payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct PaymentId(Uuid);

impl PaymentId {
    /// Creates a new random PaymentId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a PaymentId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Returns the UUID value.
    pub fn into_uuid(self) -> Uuid {
        self.0
    }
}

impl Default for PaymentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PaymentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PaymentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Lifecycle status of a payment.
///
/// The intended flow is PENDING → PROCESSING → {APPROVED | FAILED},
/// APPROVED → {REFUNDED | CHARGEBACK}, and any non-terminal state →
/// CANCELED. Transitions are driven by the gateway; the service does not
/// enforce a transition table (see `PaymentService::update_status`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Processing,
    Approved,
    Failed,
    Canceled,
    Refunded,
    Chargeback,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Processing => "PROCESSING",
            PaymentStatus::Approved => "APPROVED",
            PaymentStatus::Failed => "FAILED",
            PaymentStatus::Canceled => "CANCELED",
            PaymentStatus::Refunded => "REFUNDED",
            PaymentStatus::Chargeback => "CHARGEBACK",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(PaymentStatus::Pending),
            "PROCESSING" => Ok(PaymentStatus::Processing),
            "APPROVED" => Ok(PaymentStatus::Approved),
            "FAILED" => Ok(PaymentStatus::Failed),
            "CANCELED" => Ok(PaymentStatus::Canceled),
            "REFUNDED" => Ok(PaymentStatus::Refunded),
            "CHARGEBACK" => Ok(PaymentStatus::Chargeback),
            _ => Err(format!("Unknown payment status: {}", s)),
        }
    }
}

/// One payment attempt and its gateway linkage.
///
/// Ownership (`user_id`) is immutable after creation and gates read/patch
/// access. Only `description` is mutable through the public partial-update
/// path; status and gateway fields change via [`Payment::record_status`].
#[derive(Debug, Clone)]
pub struct Payment {
    /// Unique identifier
    pub id: PaymentId,
    /// Owning user (immutable after creation)
    pub user_id: UserId,
    /// Amount and currency
    pub amount: Money,
    /// Current lifecycle status
    pub status: PaymentStatus,
    /// Optional human-readable description
    pub description: Option<String>,
    /// Name of the gateway this payment was routed to
    pub gateway: String,
    /// Identifier assigned by the external gateway, once known
    pub gateway_payment_id: Option<String>,
    /// Last gateway error, if any
    pub error_message: Option<String>,
    /// Free-form gateway/application metadata
    pub metadata: Option<serde_json::Value>,
    /// When the payment was created
    pub created_at: DateTime<Utc>,
    /// When the payment was last updated
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    /// Creates a new payment in PENDING for the given owner and gateway.
    pub fn new(
        user_id: UserId,
        amount: Money,
        description: Option<String>,
        gateway: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: PaymentId::new(),
            user_id,
            amount,
            status: PaymentStatus::Pending,
            description,
            gateway,
            gateway_payment_id: None,
            error_message: None,
            metadata: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Reconstructs a payment from database fields.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: PaymentId,
        user_id: UserId,
        amount: Money,
        status: PaymentStatus,
        description: Option<String>,
        gateway: String,
        gateway_payment_id: Option<String>,
        error_message: Option<String>,
        metadata: Option<serde_json::Value>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            amount,
            status,
            description,
            gateway,
            gateway_payment_id,
            error_message,
            metadata,
            created_at,
            updated_at,
        }
    }

    /// True if `user_id` owns this payment.
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }

    /// Records a status reported by the gateway, stamping the gateway
    /// reference and error message only when provided.
    ///
    /// Deliberately permissive: any status may follow any other, since
    /// gateway reconciliation is the authority on ordering.
    pub fn record_status(
        &mut self,
        status: PaymentStatus,
        gateway_payment_id: Option<String>,
        error_message: Option<String>,
    ) {
        self.status = status;
        if let Some(reference) = gateway_payment_id {
            self.gateway_payment_id = Some(reference);
        }
        if let Some(message) = error_message {
            self.error_message = Some(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Currency;

    fn usd(minor: i64) -> Money {
        Money::new(minor, Currency::new("USD").unwrap()).unwrap()
    }

    #[test]
    fn test_new_payment_is_pending_and_owned_by_creator() {
        let owner = UserId::new();
        let payment = Payment::new(owner, usd(1000), Some("coffee".into()), "mock".into());

        assert_eq!(payment.status, PaymentStatus::Pending);
        assert!(payment.is_owned_by(owner));
        assert!(!payment.is_owned_by(UserId::new()));
        assert!(payment.gateway_payment_id.is_none());
        assert!(payment.error_message.is_none());
    }

    #[test]
    fn test_record_status_keeps_existing_gateway_fields_when_absent() {
        let mut payment = Payment::new(UserId::new(), usd(500), None, "mock".into());

        payment.record_status(
            PaymentStatus::Processing,
            Some("gw_123".into()),
            None,
        );
        assert_eq!(payment.status, PaymentStatus::Processing);
        assert_eq!(payment.gateway_payment_id.as_deref(), Some("gw_123"));

        payment.record_status(PaymentStatus::Approved, None, None);
        assert_eq!(payment.status, PaymentStatus::Approved);
        // Absent means "leave unchanged", not "clear".
        assert_eq!(payment.gateway_payment_id.as_deref(), Some("gw_123"));
    }

    #[test]
    fn test_status_round_trips_through_strings() {
        for status in [
            PaymentStatus::Pending,
            PaymentStatus::Processing,
            PaymentStatus::Approved,
            PaymentStatus::Failed,
            PaymentStatus::Canceled,
            PaymentStatus::Refunded,
            PaymentStatus::Chargeback,
        ] {
            let parsed: PaymentStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("SETTLED".parse::<PaymentStatus>().is_err());
    }
}
