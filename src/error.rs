use crate::domain::payment::{PaymentId, PaymentStatus, Transition};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Amount must be positive")]
    InvalidAmount,
    #[error("Cannot {transition} a payment that is {from}")]
    InvalidTransition {
        from: PaymentStatus,
        transition: Transition,
    },
    #[error("Payment {0} not found")]
    NotFound(PaymentId),
    #[error("Invalid command: {0}")]
    InvalidCommand(String),
    #[error("Storage error: {0}")]
    StorageError(String),
}

pub type Result<T> = std::result::Result<T, PaymentError>;
