use crate::domain::payment::{Payment, PaymentId, PaymentMethod, PaymentStatus};
use crate::error::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct PaymentRow<'a> {
    payment: PaymentId,
    order: u32,
    user: u32,
    amount: Decimal,
    method: PaymentMethod,
    status: PaymentStatus,
    reference: Option<&'a str>,
    created_at: String,
    processed_at: Option<String>,
    refunded_at: Option<String>,
    error: Option<&'a str>,
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

impl<'a> From<&'a Payment> for PaymentRow<'a> {
    fn from(payment: &'a Payment) -> Self {
        Self {
            payment: payment.payment_id,
            order: payment.order_id,
            user: payment.user_id,
            amount: payment.amount.value().normalize(),
            method: payment.method,
            status: payment.status,
            reference: payment.transaction_id.as_deref(),
            created_at: timestamp(&payment.created_at),
            processed_at: payment.processed_at.as_ref().map(timestamp),
            refunded_at: payment.refunded_at.as_ref().map(timestamp),
            error: payment
                .details
                .as_ref()
                .and_then(|details| details.error_message.as_deref()),
        }
    }
}

/// Writes payments as CSV, one row per payment.
pub struct PaymentWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> PaymentWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    /// Writes the header followed by every payment, then flushes.
    pub fn write_payments<'a, I>(&mut self, payments: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a Payment>,
    {
        for payment in payments {
            self.writer.serialize(PaymentRow::from(payment))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
