use super::payment::{Payment, PaymentId, PaymentStatus};
use crate::error::Result;
use async_trait::async_trait;

/// Storage for payments, keyed by sequential ids.
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Allocates the next id. Ids are unique and strictly increasing.
    async fn next_id(&self) -> Result<PaymentId>;
    async fn save(&self, payment: Payment) -> Result<Payment>;
    async fn find_by_id(&self, payment_id: PaymentId) -> Result<Option<Payment>>;
    /// Replaces a stored payment. Returns `None` if the id is not stored.
    async fn update(&self, payment: Payment) -> Result<Option<Payment>>;
    async fn find_by_user_id(&self, user_id: u32) -> Result<Vec<Payment>>;
    async fn find_by_order_id(&self, order_id: u32) -> Result<Vec<Payment>>;
    async fn find_by_status(&self, status: PaymentStatus) -> Result<Vec<Payment>>;
    async fn find_all(&self) -> Result<Vec<Payment>>;
    async fn delete(&self, payment_id: PaymentId) -> Result<bool>;
}

/// The external processor that decides whether a payment goes through.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn attempt(&self, payment: &Payment) -> bool;
}

/// Any synchronous predicate over a payment can stand in for a gateway.
#[async_trait]
impl<F> PaymentGateway for F
where
    F: Fn(&Payment) -> bool + Send + Sync,
{
    async fn attempt(&self, payment: &Payment) -> bool {
        self(payment)
    }
}

pub type PaymentRepositoryBox = Box<dyn PaymentRepository>;
pub type PaymentGatewayBox = Box<dyn PaymentGateway>;
