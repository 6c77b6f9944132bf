use crate::domain::payment::{Payment, PaymentId, PaymentStatus};
use crate::domain::ports::PaymentRepository;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::RwLock;

/// A thread-safe in-memory payment repository.
///
/// Owns the payment table and the id counter. Cloning shares both, so every
/// clone sees the same payments and draws from the same id sequence.
#[derive(Clone)]
pub struct InMemoryPaymentRepository {
    payments: Arc<RwLock<BTreeMap<PaymentId, Payment>>>,
    next_id: Arc<AtomicU32>,
}

impl Default for InMemoryPaymentRepository {
    fn default() -> Self {
        Self {
            payments: Arc::new(RwLock::new(BTreeMap::new())),
            next_id: Arc::new(AtomicU32::new(1)),
        }
    }
}

impl InMemoryPaymentRepository {
    /// Creates a new, empty repository whose first id is 1.
    pub fn new() -> Self {
        Self::default()
    }

    async fn filtered<P>(&self, predicate: P) -> Vec<Payment>
    where
        P: Fn(&Payment) -> bool,
    {
        let payments = self.payments.read().await;
        payments.values().filter(|p| predicate(*p)).cloned().collect()
    }
}

#[async_trait]
impl PaymentRepository for InMemoryPaymentRepository {
    async fn next_id(&self) -> Result<PaymentId> {
        Ok(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    async fn save(&self, payment: Payment) -> Result<Payment> {
        let mut payments = self.payments.write().await;
        payments.insert(payment.payment_id, payment.clone());
        Ok(payment)
    }

    async fn find_by_id(&self, payment_id: PaymentId) -> Result<Option<Payment>> {
        let payments = self.payments.read().await;
        Ok(payments.get(&payment_id).cloned())
    }

    async fn update(&self, payment: Payment) -> Result<Option<Payment>> {
        let mut payments = self.payments.write().await;
        match payments.get_mut(&payment.payment_id) {
            Some(stored) => {
                *stored = payment.clone();
                Ok(Some(payment))
            }
            None => Ok(None),
        }
    }

    async fn find_by_user_id(&self, user_id: u32) -> Result<Vec<Payment>> {
        Ok(self.filtered(|p| p.user_id == user_id).await)
    }

    async fn find_by_order_id(&self, order_id: u32) -> Result<Vec<Payment>> {
        Ok(self.filtered(|p| p.order_id == order_id).await)
    }

    async fn find_by_status(&self, status: PaymentStatus) -> Result<Vec<Payment>> {
        Ok(self.filtered(|p| p.status == status).await)
    }

    async fn find_all(&self) -> Result<Vec<Payment>> {
        let payments = self.payments.read().await;
        Ok(payments.values().cloned().collect())
    }

    async fn delete(&self, payment_id: PaymentId) -> Result<bool> {
        let mut payments = self.payments.write().await;
        Ok(payments.remove(&payment_id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::{Amount, PaymentMethod};
    use rust_decimal_macros::dec;

    fn payment(id: PaymentId, order_id: u32, user_id: u32) -> Payment {
        Payment::new(
            id,
            order_id,
            user_id,
            Amount::new(dec!(10.0)).unwrap(),
            PaymentMethod::Cash,
            None,
        )
    }

    #[tokio::test]
    async fn test_next_id_is_sequential() {
        let store = InMemoryPaymentRepository::new();
        assert_eq!(store.next_id().await.unwrap(), 1);
        assert_eq!(store.next_id().await.unwrap(), 2);

        let shared = store.clone();
        assert_eq!(shared.next_id().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_save_and_find() {
        let store = InMemoryPaymentRepository::new();
        let saved = store.save(payment(1, 1, 1)).await.unwrap();

        let retrieved = store.find_by_id(1).await.unwrap().unwrap();
        assert_eq!(retrieved, saved);
        assert!(store.find_by_id(2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_existing_only() {
        let store = InMemoryPaymentRepository::new();
        let mut stored = store.save(payment(1, 1, 1)).await.unwrap();

        stored.process().unwrap();
        let updated = store.update(stored.clone()).await.unwrap();
        assert_eq!(updated, Some(stored));
        assert_eq!(
            store.find_by_id(1).await.unwrap().unwrap().status,
            PaymentStatus::Processing
        );

        let missing = store.update(payment(7, 1, 1)).await.unwrap();
        assert!(missing.is_none());
        assert!(store.find_by_id(7).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_queries() {
        let store = InMemoryPaymentRepository::new();
        store.save(payment(1, 100, 1)).await.unwrap();
        store.save(payment(2, 100, 2)).await.unwrap();
        let mut cancelled = payment(3, 200, 1);
        cancelled.cancel().unwrap();
        store.save(cancelled).await.unwrap();

        let by_user: Vec<_> = store
            .find_by_user_id(1)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.payment_id)
            .collect();
        assert_eq!(by_user, vec![1, 3]);

        assert_eq!(store.find_by_order_id(100).await.unwrap().len(), 2);
        assert_eq!(
            store
                .find_by_status(PaymentStatus::Cancelled)
                .await
                .unwrap()
                .len(),
            1
        );
        assert_eq!(store.find_all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = InMemoryPaymentRepository::new();
        store.save(payment(1, 1, 1)).await.unwrap();

        assert!(store.delete(1).await.unwrap());
        assert!(!store.delete(1).await.unwrap());
        assert!(store.find_all().await.unwrap().is_empty());
    }
}
