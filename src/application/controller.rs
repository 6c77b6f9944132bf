use crate::domain::payment::{
    Amount, Payment, PaymentDetails, PaymentId, PaymentMethod, PaymentStatus,
};
use crate::domain::ports::{PaymentGatewayBox, PaymentRepositoryBox};
use crate::error::{PaymentError, Result};
use rust_decimal::Decimal;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

/// Failure reason recorded when the gateway turns a payment down.
pub const GATEWAY_DECLINED: &str = "payment gateway declined the transaction";
/// Failure reason recorded when the gateway does not answer in time.
pub const GATEWAY_TIMED_OUT: &str = "payment gateway timed out";

/// Settings for [`PaymentController`].
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerConfig {
    /// Upper bound on a single gateway attempt. An attempt that takes longer
    /// fails the payment.
    pub gateway_timeout: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            gateway_timeout: Duration::from_secs(5),
        }
    }
}

/// Orchestrates the payment lifecycle.
///
/// `PaymentController` sequences entity transitions with repository writes and
/// the gateway call. Its public operations never return errors: rejected
/// transitions, unknown ids and storage failures are logged and reported as
/// `false`, `None` or an empty list.
///
/// Every operation holds the controller's operation lock from the first read
/// to the last write, so a controller shared between tasks applies them one
/// at a time.
pub struct PaymentController {
    repository: PaymentRepositoryBox,
    gateway: PaymentGatewayBox,
    config: ControllerConfig,
    op_lock: Mutex<()>,
}

impl PaymentController {
    /// Creates a new `PaymentController` with the default configuration.
    ///
    /// # Arguments
    ///
    /// * `repository` - The store that owns the payment records.
    /// * `gateway` - The processor consulted by [`Self::process_payment`].
    pub fn new(repository: PaymentRepositoryBox, gateway: PaymentGatewayBox) -> Self {
        Self::with_config(repository, gateway, ControllerConfig::default())
    }

    pub fn with_config(
        repository: PaymentRepositoryBox,
        gateway: PaymentGatewayBox,
        config: ControllerConfig,
    ) -> Self {
        Self {
            repository,
            gateway,
            config,
            op_lock: Mutex::new(()),
        }
    }

    /// Creates a pending payment.
    ///
    /// Returns `None` without touching the repository when `amount` is not
    /// positive.
    #[instrument(skip(self))]
    pub async fn create_payment(
        &self,
        order_id: u32,
        user_id: u32,
        amount: Decimal,
        method: PaymentMethod,
        transaction_id: Option<String>,
    ) -> Option<Payment> {
        let result = self
            .try_create(order_id, user_id, amount, method, transaction_id)
            .await;
        if let Ok(payment) = &result {
            info!(payment_id = payment.payment_id, "payment created");
        }
        settle("create", None, result)
    }

    /// Runs a pending payment through the gateway.
    ///
    /// Returns the gateway outcome: `true` when the payment completed, `false`
    /// when it failed, timed out, does not exist or was not pending.
    #[instrument(skip(self))]
    pub async fn process_payment(&self, payment_id: PaymentId) -> bool {
        settle("process", Some(payment_id), self.try_process(payment_id).await).unwrap_or(false)
    }

    #[instrument(skip(self))]
    pub async fn complete_payment(&self, payment_id: PaymentId) -> bool {
        let result = self.transition(payment_id, Payment::complete).await;
        settle("complete", Some(payment_id), result).is_some()
    }

    #[instrument(skip(self))]
    pub async fn refund_payment(&self, payment_id: PaymentId) -> bool {
        let result = self.transition(payment_id, Payment::refund).await;
        settle("refund", Some(payment_id), result).is_some()
    }

    #[instrument(skip(self))]
    pub async fn cancel_payment(&self, payment_id: PaymentId) -> bool {
        let result = self.transition(payment_id, Payment::cancel).await;
        settle("cancel", Some(payment_id), result).is_some()
    }

    /// Attaches details to a payment, replacing any it already had.
    #[instrument(skip(self, details))]
    pub async fn attach_details(&self, payment_id: PaymentId, details: PaymentDetails) -> bool {
        let result = self
            .transition(payment_id, move |payment| {
                payment.details = Some(details);
                Ok(())
            })
            .await;
        settle("attach details to", Some(payment_id), result).is_some()
    }

    pub async fn get_payment(&self, payment_id: PaymentId) -> Option<Payment> {
        let result = self.repository.find_by_id(payment_id).await;
        settle("look up", Some(payment_id), result).flatten()
    }

    pub async fn list_payments(&self) -> Vec<Payment> {
        settle("list", None, self.repository.find_all().await).unwrap_or_default()
    }

    pub async fn list_payments_by_user(&self, user_id: u32) -> Vec<Payment> {
        let result = self.repository.find_by_user_id(user_id).await;
        settle("list", None, result).unwrap_or_default()
    }

    pub async fn list_payments_by_order(&self, order_id: u32) -> Vec<Payment> {
        let result = self.repository.find_by_order_id(order_id).await;
        settle("list", None, result).unwrap_or_default()
    }

    pub async fn list_payments_by_status(&self, status: PaymentStatus) -> Vec<Payment> {
        let result = self.repository.find_by_status(status).await;
        settle("list", None, result).unwrap_or_default()
    }

    async fn try_create(
        &self,
        order_id: u32,
        user_id: u32,
        amount: Decimal,
        method: PaymentMethod,
        transaction_id: Option<String>,
    ) -> Result<Payment> {
        let amount = Amount::new(amount)?;

        let _guard = self.op_lock.lock().await;
        let payment_id = self.repository.next_id().await?;
        let payment = Payment::new(payment_id, order_id, user_id, amount, method, transaction_id);
        self.repository.save(payment).await
    }

    async fn try_process(&self, payment_id: PaymentId) -> Result<bool> {
        let _guard = self.op_lock.lock().await;

        let mut payment = self.load(payment_id).await?;
        payment.process()?;
        let mut payment = self.persist(payment).await?;
        debug!(payment_id, "payment is processing");

        let outcome =
            tokio::time::timeout(self.config.gateway_timeout, self.gateway.attempt(&payment)).await;
        let approved = match outcome {
            Ok(true) => {
                payment.complete()?;
                true
            }
            Ok(false) => {
                record_failure(&mut payment, GATEWAY_DECLINED);
                false
            }
            Err(_) => {
                record_failure(&mut payment, GATEWAY_TIMED_OUT);
                false
            }
        };

        let payment = self.persist(payment).await?;
        info!(payment_id, status = %payment.status, "payment processed");
        Ok(approved)
    }

    /// Loads a payment, applies `action` to it and stores the result.
    ///
    /// Nothing is written when `action` fails.
    async fn transition<F>(&self, payment_id: PaymentId, action: F) -> Result<Payment>
    where
        F: FnOnce(&mut Payment) -> Result<()> + Send,
    {
        let _guard = self.op_lock.lock().await;

        let mut payment = self.load(payment_id).await?;
        action(&mut payment)?;
        let payment = self.persist(payment).await?;
        debug!(payment_id, status = %payment.status, "payment updated");
        Ok(payment)
    }

    async fn load(&self, payment_id: PaymentId) -> Result<Payment> {
        self.repository
            .find_by_id(payment_id)
            .await?
            .ok_or(PaymentError::NotFound(payment_id))
    }

    async fn persist(&self, payment: Payment) -> Result<Payment> {
        let payment_id = payment.payment_id;
        self.repository
            .update(payment)
            .await?
            .ok_or(PaymentError::NotFound(payment_id))
    }
}

fn record_failure(payment: &mut Payment, reason: &str) {
    if !payment.fail(reason) {
        warn!(
            payment_id = payment.payment_id,
            reason, "payment has no details, failure reason not stored"
        );
    }
}

/// Turns an operation result into the controller's total API, logging the
/// error it swallows.
fn settle<T>(operation: &str, payment_id: Option<PaymentId>, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(
            e @ (PaymentError::InvalidAmount
            | PaymentError::InvalidTransition { .. }
            | PaymentError::NotFound(_)),
        ) => {
            warn!(?payment_id, "cannot {operation} payment: {e}");
            None
        }
        Err(e) => {
            error!(?payment_id, "failed to {operation} payment: {e}");
            None
        }
    }
}
