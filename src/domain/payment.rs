use crate::error::{PaymentError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type PaymentId = u32;

/// Represents a positive monetary amount for a payment.
///
/// Construction fails for zero or negative values, so a `Payment` can never
/// hold a non-positive amount.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(PaymentError::InvalidAmount)
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = PaymentError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    CreditCard,
    DebitCard,
    Paypal,
    BankTransfer,
    Cash,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
    Refunded,
    Cancelled,
}

/// A state-machine operation on a payment.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Transition {
    Process,
    Complete,
    Fail,
    Refund,
    Cancel,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Processing => "processing",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
            PaymentStatus::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Transition::Process => "process",
            Transition::Complete => "complete",
            Transition::Fail => "fail",
            Transition::Refund => "refund",
            Transition::Cancel => "cancel",
        };
        f.write_str(name)
    }
}

impl PaymentStatus {
    /// Returns the status reached by applying `transition`, or
    /// `InvalidTransition` if the current status does not allow it.
    ///
    /// `Fail` is accepted from every status: a gateway can report failure
    /// at any point of the lifecycle.
    pub fn apply(self, transition: Transition) -> Result<PaymentStatus> {
        use PaymentStatus::*;

        let next = match (self, transition) {
            (Pending, Transition::Process) => Processing,
            (Processing, Transition::Complete) => Completed,
            (_, Transition::Fail) => Failed,
            (Completed, Transition::Refund) => Refunded,
            (Pending | Processing, Transition::Cancel) => Cancelled,
            (from, transition) => {
                return Err(PaymentError::InvalidTransition { from, transition });
            }
        };
        Ok(next)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PaymentStatus::Failed | PaymentStatus::Refunded | PaymentStatus::Cancelled
        )
    }
}

/// Optional extra information attached to a payment.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Default)]
pub struct PaymentDetails {
    pub card_last_four: Option<String>,
    pub billing_address: Option<String>,
    pub error_message: Option<String>,
}

/// A payment and its position in the lifecycle.
///
/// Status only changes through the transition methods below, each of which
/// leaves the payment untouched when the transition is not allowed.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Payment {
    /// Identifier assigned by the repository.
    pub payment_id: PaymentId,
    pub order_id: u32,
    pub user_id: u32,
    pub amount: Amount,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    /// Reference of the payment on the external processor, if known.
    pub transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Set when the payment completes.
    pub processed_at: Option<DateTime<Utc>>,
    /// Set when the payment is refunded.
    pub refunded_at: Option<DateTime<Utc>>,
    pub details: Option<PaymentDetails>,
}

impl Payment {
    pub fn new(
        payment_id: PaymentId,
        order_id: u32,
        user_id: u32,
        amount: Amount,
        method: PaymentMethod,
        transaction_id: Option<String>,
    ) -> Self {
        Self {
            payment_id,
            order_id,
            user_id,
            amount,
            method,
            status: PaymentStatus::Pending,
            transaction_id,
            created_at: Utc::now(),
            processed_at: None,
            refunded_at: None,
            details: None,
        }
    }

    /// Moves a pending payment to processing.
    pub fn process(&mut self) -> Result<()> {
        self.status = self.status.apply(Transition::Process)?;
        Ok(())
    }

    /// Completes a payment that is being processed and stamps `processed_at`.
    pub fn complete(&mut self) -> Result<()> {
        self.status = self.status.apply(Transition::Complete)?;
        self.processed_at = Some(Utc::now());
        Ok(())
    }

    /// Marks the payment as failed.
    ///
    /// The reason is kept only when the payment already carries details.
    /// Returns whether it was kept.
    pub fn fail(&mut self, reason: &str) -> bool {
        self.status = PaymentStatus::Failed;
        match self.details.as_mut() {
            Some(details) => {
                details.error_message = Some(reason.to_string());
                true
            }
            None => false,
        }
    }

    /// Refunds a completed payment and stamps `refunded_at`.
    pub fn refund(&mut self) -> Result<()> {
        self.status = self.status.apply(Transition::Refund)?;
        self.refunded_at = Some(Utc::now());
        Ok(())
    }

    /// Cancels a payment that has not reached a final outcome yet.
    pub fn cancel(&mut self) -> Result<()> {
        self.status = self.status.apply(Transition::Cancel)?;
        Ok(())
    }

    pub fn is_successful(&self) -> bool {
        self.status == PaymentStatus::Completed
    }
}
