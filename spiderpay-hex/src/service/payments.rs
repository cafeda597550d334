//! Payment application service.

use std::sync::Arc;

use spiderpay_types::{
    AppError, CreatePaymentRequest, Money, Payment, PaymentId, PaymentStatus, PaymentStore,
    UpdatePaymentRequest, User, UserId,
};

/// Application service for payment operations.
///
/// Generic over `S: PaymentStore`; `gateway` names the configured payment
/// gateway and is stamped onto every new payment.
pub struct PaymentService<S: PaymentStore> {
    store: Arc<S>,
    gateway: String,
}

impl<S: PaymentStore> Clone for PaymentService<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            gateway: self.gateway.clone(),
        }
    }
}

impl<S: PaymentStore> PaymentService<S> {
    /// Creates a new payment service routing to the named gateway.
    pub fn new(store: Arc<S>, gateway: String) -> Self {
        Self { store, gateway }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Creates a payment owned by `owner`, in PENDING.
    ///
    /// Amount and currency are validated before anything is persisted, so a
    /// rejected request leaves no record behind.
    pub async fn create(
        &self,
        owner: UserId,
        req: CreatePaymentRequest,
    ) -> Result<Payment, AppError> {
        let amount = Money::new(req.amount, req.currency)?;
        let payment = Payment::new(owner, amount, req.description, self.gateway.clone());

        let payment = self
            .store
            .insert_payment(&payment)
            .await
            .map_err(AppError::from)?;

        // A gateway charge call would go here, followed by update_status
        // with the gateway's verdict. Until then the record stays PENDING.

        Ok(payment)
    }

    /// Gets a payment by ID without an ownership check. Callers at the HTTP
    /// boundary go through [`PaymentService::get_authorized`] instead.
    pub async fn get(&self, id: PaymentId) -> Result<Payment, AppError> {
        self.store
            .find_payment(id)
            .await
            .map_err(AppError::from)
            .and_then(|opt| opt.ok_or_else(|| AppError::NotFound(format!("Payment {}", id))))
    }

    /// Lists payments ordered by creation time, newest first.
    ///
    /// Intentionally unfiltered: every authenticated user sees all records,
    /// only single-record reads enforce ownership.
    pub async fn list(&self, skip: i64, limit: i64) -> Result<Vec<Payment>, AppError> {
        self.store
            .list_payments(skip, limit)
            .await
            .map_err(Into::into)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Access control
    // ─────────────────────────────────────────────────────────────────────────

    /// Checks that `requester` may read or modify `payment`: the owner and
    /// superusers pass, everyone else is forbidden.
    pub fn authorize_access(&self, requester: &User, payment: &Payment) -> Result<(), AppError> {
        if payment.is_owned_by(requester.id) || requester.is_superuser {
            return Ok(());
        }
        Err(AppError::Forbidden("Not enough permissions".into()))
    }

    /// Gets a payment, enforcing the ownership check.
    pub async fn get_authorized(
        &self,
        requester: &User,
        id: PaymentId,
    ) -> Result<Payment, AppError> {
        let payment = self.get(id).await?;
        self.authorize_access(requester, &payment)?;
        Ok(payment)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Updates
    // ─────────────────────────────────────────────────────────────────────────

    /// Applies a public change set to a payment, after the ownership check.
    ///
    /// `description` is the only publicly patchable field; `null` clears it.
    /// An empty change set is a no-op returning the current record.
    pub async fn update_description(
        &self,
        requester: &User,
        id: PaymentId,
        patch: UpdatePaymentRequest,
    ) -> Result<Payment, AppError> {
        let mut payment = self.get_authorized(requester, id).await?;

        if patch.is_empty() {
            return Ok(payment);
        }

        if let Some(description) = patch.description {
            payment.description = description;
        }

        self.store.update_payment(&payment).await.map_err(Into::into)
    }

    /// Records a gateway-reported status, stamping the gateway reference and
    /// error message when provided.
    ///
    /// Internal operation for gateway reconciliation, not exposed over HTTP.
    /// Any status may follow any other; the gateway is the authority.
    pub async fn update_status(
        &self,
        id: PaymentId,
        status: PaymentStatus,
        gateway_payment_id: Option<String>,
        error_message: Option<String>,
    ) -> Result<Payment, AppError> {
        let mut payment = self.get(id).await?;
        payment.record_status(status, gateway_payment_id, error_message);

        self.store.update_payment(&payment).await.map_err(Into::into)
    }
}
