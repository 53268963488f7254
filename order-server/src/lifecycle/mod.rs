//! Order Lifecycle Manager
//!
//! Two orthogonal state machines on one order, plus the refund ledger
//! built on top of them:
//!
//! - Status: `PENDING → CONFIRMED → DELIVERED`, `CANCELLED` reachable from
//!   `PENDING`/`CONFIRMED`; `DELIVERED` and `CANCELLED` are terminal.
//! - Payment: `PENDING → PAID → REFUNDED`, `FAILED` from `PENDING`,
//!   `CREDIT_ACCOUNT` for house accounts. The cached field is a
//!   materialized view over the append-only ledger and is recomputed
//!   wholesale on every ledger append.

pub mod manager;

pub use manager::{OrderLifecycle, RefundLocks};

use crate::checkout::pricing::{MONEY_TOLERANCE, to_decimal, to_f64};
use rust_decimal::Decimal;
use shared::models::{LedgerEntryStatus, OrderStatus, Payment, PaymentStatus};
use thiserror::Error;

/// Illegal lifecycle transitions
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Order status cannot change from {from:?} to {to:?}")]
    InvalidStatus { from: OrderStatus, to: OrderStatus },

    #[error("Payment status cannot change from {from:?} to {to:?}")]
    InvalidPayment {
        from: PaymentStatus,
        to: PaymentStatus,
    },
}

/// Whether a fulfillment status transition is legal
pub fn status_transition_allowed(from: OrderStatus, to: OrderStatus) -> bool {
    use OrderStatus::*;
    matches!(
        (from, to),
        (Pending, Confirmed) | (Pending, Cancelled) | (Confirmed, Delivered) | (Confirmed, Cancelled)
    )
}

pub fn check_status_transition(from: OrderStatus, to: OrderStatus) -> Result<(), TransitionError> {
    if status_transition_allowed(from, to) {
        Ok(())
    } else {
        Err(TransitionError::InvalidStatus { from, to })
    }
}

/// Whether a payment status transition is legal.
///
/// `FAILED → PAID` is allowed: a later processor confirmation supersedes a
/// failed attempt, since the ledger is authoritative.
pub fn payment_transition_allowed(from: PaymentStatus, to: PaymentStatus) -> bool {
    use PaymentStatus::*;
    matches!(
        (from, to),
        (Pending, Paid)
            | (Pending, Failed)
            | (Pending, CreditAccount)
            | (Failed, Paid)
            | (Paid, Refunded)
    )
}

pub fn check_payment_transition(
    from: PaymentStatus,
    to: PaymentStatus,
) -> Result<(), TransitionError> {
    if payment_transition_allowed(from, to) {
        Ok(())
    } else {
        Err(TransitionError::InvalidPayment { from, to })
    }
}

/// Sum of refunded amounts over the ledger
pub fn refunded_total(ledger: &[Payment]) -> Decimal {
    ledger
        .iter()
        .filter(|p| p.status == LedgerEntryStatus::Refunded)
        .map(|p| to_decimal(p.amount).abs())
        .sum()
}

/// Remaining refundable balance for an order
pub fn max_refundable(total_amount: f64, ledger: &[Payment]) -> f64 {
    to_f64((to_decimal(total_amount) - refunded_total(ledger)).max(Decimal::ZERO))
}

/// Recompute the cached payment status from the ledger.
///
/// The ledger is the source of truth; this is the materialized view,
/// recomputed in full rather than incrementally patched. House-account
/// orders carry no processor rows and keep their state.
pub fn derive_payment_status(
    current: PaymentStatus,
    total_amount: f64,
    ledger: &[Payment],
) -> PaymentStatus {
    if current == PaymentStatus::CreditAccount {
        return PaymentStatus::CreditAccount;
    }

    let total = to_decimal(total_amount);
    let refunded = refunded_total(ledger);
    let charged: Decimal = ledger
        .iter()
        .filter(|p| p.status == LedgerEntryStatus::Completed)
        .map(|p| to_decimal(p.amount))
        .sum();

    if refunded > Decimal::ZERO && refunded >= total - MONEY_TOLERANCE {
        PaymentStatus::Refunded
    } else if charged > Decimal::ZERO && charged >= total - MONEY_TOLERANCE {
        // Partial refund leaves the order PAID
        PaymentStatus::Paid
    } else if ledger
        .iter()
        .any(|p| p.status == LedgerEntryStatus::Failed)
    {
        PaymentStatus::Failed
    } else {
        PaymentStatus::Pending
    }
}
