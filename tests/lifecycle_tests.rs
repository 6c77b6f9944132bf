use paylane::application::controller::PaymentController;
use paylane::domain::payment::{Payment, PaymentMethod, PaymentStatus};
use paylane::domain::ports::PaymentRepository;
use paylane::infrastructure::in_memory::InMemoryPaymentRepository;
use rust_decimal_macros::dec;

fn controller_with(approve: bool) -> (PaymentController, InMemoryPaymentRepository) {
    let repository = InMemoryPaymentRepository::new();
    let controller = PaymentController::new(
        Box::new(repository.clone()),
        Box::new(move |_: &Payment| approve),
    );
    (controller, repository)
}

#[tokio::test]
async fn test_create_and_process_scenario() {
    for approve in [true, false] {
        let (controller, repository) = controller_with(approve);

        let payment = controller
            .create_payment(1, 1, dec!(100.0), PaymentMethod::CreditCard, None)
            .await
            .unwrap();
        assert_eq!(payment.status, PaymentStatus::Pending);
        assert_eq!(payment.amount.value(), dec!(100.0));

        assert_eq!(controller.process_payment(payment.payment_id).await, approve);

        let stored = repository.find_all().await.unwrap();
        assert_eq!(stored.len(), 1);
        let expected = if approve {
            PaymentStatus::Completed
        } else {
            PaymentStatus::Failed
        };
        assert_eq!(stored[0].status, expected);
        assert_eq!(stored[0].is_successful(), approve);
    }
}

#[tokio::test]
async fn test_negative_amount_scenario() {
    let (controller, repository) = controller_with(true);

    let payment = controller
        .create_payment(1, 1, dec!(-5.0), PaymentMethod::CreditCard, None)
        .await;

    assert!(payment.is_none());
    assert!(repository.find_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_refund_pending_scenario() {
    let (controller, _) = controller_with(true);
    let payment = controller
        .create_payment(1, 1, dec!(20), PaymentMethod::Cash, None)
        .await
        .unwrap();

    assert!(!controller.refund_payment(payment.payment_id).await);
    assert_eq!(
        controller.get_payment(payment.payment_id).await.unwrap().status,
        PaymentStatus::Pending
    );
}

#[tokio::test]
async fn test_full_lifecycle_by_user_and_status() {
    let (controller, _) = controller_with(true);

    let mut ids = Vec::new();
    for user_id in [1, 1, 2] {
        let payment = controller
            .create_payment(10, user_id, dec!(5), PaymentMethod::BankTransfer, None)
            .await
            .unwrap();
        ids.push(payment.payment_id);
    }
    assert_eq!(ids, vec![1, 2, 3]);

    assert!(controller.process_payment(1).await);
    assert!(controller.refund_payment(1).await);
    assert!(controller.cancel_payment(2).await);

    assert_eq!(controller.list_payments_by_user(1).await.len(), 2);
    assert_eq!(controller.list_payments_by_user(2).await.len(), 1);
    assert_eq!(
        controller
            .list_payments_by_status(PaymentStatus::Refunded)
            .await[0]
            .payment_id,
        1
    );
    assert_eq!(
        controller
            .list_payments_by_status(PaymentStatus::Pending)
            .await[0]
            .payment_id,
        3
    );
    assert!(
        controller
            .list_payments_by_status(PaymentStatus::Completed)
            .await
            .is_empty()
    );
}
