//! Payment processor boundary
//!
//! The engine emits charge and refund requests and consumes confirmations;
//! the card-capture UI and exactly-once delivery are the processor's
//! concern (its own idempotency keys, consumed as an opaque dependency).

use async_trait::async_trait;
use thiserror::Error;

pub const CURRENCY: &str = "EUR";

/// Charge request for an order total
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeRequest {
    pub order_id: i64,
    pub amount: f64,
    pub currency: &'static str,
}

/// Refund request against a prior charge
#[derive(Debug, Clone, PartialEq)]
pub struct RefundRequest {
    pub order_id: i64,
    pub amount: f64,
    pub currency: &'static str,
    /// Processor reference of the original charge, when known
    pub charge_reference: Option<String>,
}

/// Confirmation returned by the processor
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessorReceipt {
    /// Processor transaction id, stored on the ledger row
    pub reference: String,
}

/// Processor-side failures
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProcessorError {
    /// Declined; reason is safe to surface to the user
    #[error("{0}")]
    Rejected(String),

    /// Transport/availability failure; retryable by the caller
    #[error("Payment processor unavailable: {0}")]
    Unavailable(String),
}

/// External payment processor
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    async fn charge(&self, req: ChargeRequest) -> Result<ProcessorReceipt, ProcessorError>;
    async fn refund(&self, req: RefundRequest) -> Result<ProcessorReceipt, ProcessorError>;
}

/// Development processor: confirms everything with a generated reference.
///
/// Production deployments inject a real gateway implementation.
#[derive(Debug, Default, Clone)]
pub struct NullProcessor;

#[async_trait]
impl PaymentProcessor for NullProcessor {
    async fn charge(&self, req: ChargeRequest) -> Result<ProcessorReceipt, ProcessorError> {
        tracing::info!(order_id = req.order_id, amount = req.amount, "NullProcessor charge");
        Ok(ProcessorReceipt {
            reference: format!("null-ch-{}", shared::util::snowflake_id()),
        })
    }

    async fn refund(&self, req: RefundRequest) -> Result<ProcessorReceipt, ProcessorError> {
        tracing::info!(order_id = req.order_id, amount = req.amount, "NullProcessor refund");
        Ok(ProcessorReceipt {
            reference: format!("null-rf-{}", shared::util::snowflake_id()),
        })
    }
}
