//! Payment gateway.

use std::time::Duration;

use async_trait::async_trait;
use mockall::automock;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::orders::PaymentMethod;

/// Default simulated payment latency.
pub const DEFAULT_PAYMENT_DELAY: Duration = Duration::from_millis(2_000);

/// Payment failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    /// The payment was refused.
    #[error("payment declined: {0}")]
    Declined(String),

    /// The processor couldn't be reached.
    #[error("payment processor unavailable: {0}")]
    Unavailable(String),
}

/// A charge to collect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    /// Amount to charge, fee included and discount taken off.
    pub amount: Decimal,

    /// How the buyer pays.
    pub method: PaymentMethod,

    /// Buyer name.
    pub payer_name: String,

    /// Buyer e-mail.
    pub payer_email: String,
}

/// A collected charge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentReceipt {
    /// Processor reference.
    pub transaction_id: String,

    /// Amount charged.
    pub amount: Decimal,

    /// How the buyer paid.
    pub method: PaymentMethod,
}

/// Collects payments.
#[automock]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Charge the buyer.
    async fn charge(&self, request: PaymentRequest) -> Result<PaymentReceipt, PaymentError>;
}

/// Approves every charge after an artificial delay.
#[derive(Debug, Clone)]
pub struct SimulatedPaymentGateway {
    delay: Duration,
}

impl SimulatedPaymentGateway {
    /// Use the given latency.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Respond immediately.
    #[must_use]
    pub const fn instant() -> Self {
        Self::new(Duration::ZERO)
    }
}

impl Default for SimulatedPaymentGateway {
    fn default() -> Self {
        Self::new(DEFAULT_PAYMENT_DELAY)
    }
}

#[async_trait]
impl PaymentGateway for SimulatedPaymentGateway {
    async fn charge(&self, request: PaymentRequest) -> Result<PaymentReceipt, PaymentError> {
        tokio::time::sleep(self.delay).await;

        let transaction_id = format!("sim_txn_{}", Uuid::now_v7());

        info!(
            amount = %request.amount,
            method = %request.method,
            transaction_id = %transaction_id,
            "simulated payment approved"
        );

        Ok(PaymentReceipt {
            transaction_id,
            amount: request.amount,
            method: request.method,
        })
    }
}
