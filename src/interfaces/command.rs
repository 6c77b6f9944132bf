use crate::application::controller::PaymentController;
use crate::domain::payment::{PaymentId, PaymentMethod};
use crate::error::{PaymentError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum CommandType {
    Create,
    Process,
    Complete,
    Refund,
    Cancel,
}

/// One row of a command script, as read from the input.
///
/// Which columns are required depends on `command`; see [`Command`].
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct CommandRecord {
    pub command: CommandType,
    pub payment: Option<PaymentId>,
    pub order: Option<u32>,
    pub user: Option<u32>,
    pub amount: Option<Decimal>,
    pub method: Option<PaymentMethod>,
    pub reference: Option<String>,
}

/// A validated request for the payment controller.
#[derive(Debug, PartialEq, Clone)]
pub enum Command {
    Create {
        order_id: u32,
        user_id: u32,
        amount: Decimal,
        method: PaymentMethod,
        transaction_id: Option<String>,
    },
    Process(PaymentId),
    Complete(PaymentId),
    Refund(PaymentId),
    Cancel(PaymentId),
}

fn required<T>(value: Option<T>, command: CommandType, column: &str) -> Result<T> {
    value.ok_or_else(|| {
        PaymentError::InvalidCommand(format!("{command:?} requires a `{column}` value"))
    })
}

impl TryFrom<CommandRecord> for Command {
    type Error = PaymentError;

    fn try_from(record: CommandRecord) -> Result<Self> {
        let kind = record.command;
        let command = match kind {
            CommandType::Create => Command::Create {
                order_id: required(record.order, kind, "order")?,
                user_id: required(record.user, kind, "user")?,
                amount: required(record.amount, kind, "amount")?,
                method: required(record.method, kind, "method")?,
                transaction_id: record.reference,
            },
            CommandType::Process => Command::Process(required(record.payment, kind, "payment")?),
            CommandType::Complete => Command::Complete(required(record.payment, kind, "payment")?),
            CommandType::Refund => Command::Refund(required(record.payment, kind, "payment")?),
            CommandType::Cancel => Command::Cancel(required(record.payment, kind, "payment")?),
        };
        Ok(command)
    }
}

impl Command {
    /// Runs the command against `controller` and reports whether it was applied.
    ///
    /// For `Process` this is the gateway outcome.
    pub async fn execute(self, controller: &PaymentController) -> bool {
        match self {
            Command::Create {
                order_id,
                user_id,
                amount,
                method,
                transaction_id,
            } => controller
                .create_payment(order_id, user_id, amount, method, transaction_id)
                .await
                .is_some(),
            Command::Process(id) => controller.process_payment(id).await,
            Command::Complete(id) => controller.complete_payment(id).await,
            Command::Refund(id) => controller.refund_payment(id).await,
            Command::Cancel(id) => controller.cancel_payment(id).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::{Payment, PaymentStatus};
    use crate::infrastructure::in_memory::InMemoryPaymentRepository;
    use rust_decimal_macros::dec;

    fn record(command: CommandType) -> CommandRecord {
        CommandRecord {
            command,
            payment: None,
            order: None,
            user: None,
            amount: None,
            method: None,
            reference: None,
        }
    }

    #[test]
    fn test_create_requires_all_columns() {
        let mut create = record(CommandType::Create);
        create.order = Some(1);
        create.user = Some(2);
        create.amount = Some(dec!(9.99));
        assert!(matches!(
            Command::try_from(create.clone()),
            Err(PaymentError::InvalidCommand(msg)) if msg.contains("method")
        ));

        create.method = Some(PaymentMethod::Paypal);
        assert_eq!(
            Command::try_from(create).unwrap(),
            Command::Create {
                order_id: 1,
                user_id: 2,
                amount: dec!(9.99),
                method: PaymentMethod::Paypal,
                transaction_id: None,
            }
        );
    }

    #[test]
    fn test_transition_commands_require_payment() {
        assert!(Command::try_from(record(CommandType::Refund)).is_err());

        let mut cancel = record(CommandType::Cancel);
        cancel.payment = Some(3);
        assert_eq!(Command::try_from(cancel).unwrap(), Command::Cancel(3));
    }

    #[tokio::test]
    async fn test_execute_script() {
        let repository = InMemoryPaymentRepository::new();
        let controller =
            PaymentController::new(Box::new(repository), Box::new(|_: &Payment| true));

        let create = Command::Create {
            order_id: 1,
            user_id: 1,
            amount: dec!(50),
            method: PaymentMethod::DebitCard,
            transaction_id: None,
        };
        assert!(create.execute(&controller).await);
        assert!(!Command::Refund(1).execute(&controller).await);
        assert!(Command::Process(1).execute(&controller).await);
        assert!(Command::Refund(1).execute(&controller).await);
        assert!(!Command::Cancel(1).execute(&controller).await);

        let payment = controller.get_payment(1).await.unwrap();
        assert_eq!(payment.status, PaymentStatus::Refunded);
    }
}
