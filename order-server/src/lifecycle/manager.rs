//! Lifecycle service: status transitions, processor-driven payment, and
//! the refund ledger.
//!
//! Refund issuance is serialized per order: a per-order async mutex spans
//! the whole compute-maxRefundable → processor call → ledger append
//! sequence, so two concurrent refunds can never jointly exceed the
//! refundable balance.

use crate::checkout::pricing::{MONEY_TOLERANCE, to_decimal, to_f64};
use crate::db::repository::{order, payment};
use crate::processor::{ChargeRequest, CURRENCY, PaymentProcessor, ProcessorError, RefundRequest};
use crate::utils::{AppError, AppResult};
use dashmap::DashMap;
use shared::models::{LedgerEntryStatus, Order, OrderStatus, Payment, PaymentStatus};
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::{check_status_transition, derive_payment_status, max_refundable, refunded_total};

/// Per-order mutual exclusion for refund issuance
#[derive(Debug, Default)]
pub struct RefundLocks {
    locks: DashMap<i64, Arc<Mutex<()>>>,
}

impl RefundLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn for_order(&self, order_id: i64) -> Arc<Mutex<()>> {
        self.locks
            .entry(order_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

/// Owns an order's status and payment-status machines and the refund
/// ledger built on top of them
#[derive(Clone)]
pub struct OrderLifecycle {
    pool: SqlitePool,
    processor: Arc<dyn PaymentProcessor>,
    refund_locks: Arc<RefundLocks>,
}

impl OrderLifecycle {
    pub fn new(
        pool: SqlitePool,
        processor: Arc<dyn PaymentProcessor>,
        refund_locks: Arc<RefundLocks>,
    ) -> Self {
        Self {
            pool,
            processor,
            refund_locks,
        }
    }

    async fn load(&self, order_id: i64) -> AppResult<Order> {
        order::find_by_id(&self.pool, order_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Order {order_id} not found")))
    }

    /// Admin status transition; terminal states reject everything
    pub async fn set_status(&self, order_id: i64, new_status: OrderStatus) -> AppResult<Order> {
        let existing = self.load(order_id).await?;
        check_status_transition(existing.status, new_status)
            .map_err(|e| AppError::BusinessRule(e.to_string()))?;

        let updated = order::update_status(&self.pool, order_id, new_status).await?;
        tracing::info!(
            order_id,
            order_number = %updated.order_number,
            from = ?existing.status,
            to = ?new_status,
            "Order status changed"
        );
        Ok(updated)
    }

    /// Charge the order total through the processor and record the
    /// confirmation in the ledger.
    ///
    /// Allowed while the payment status is PENDING or FAILED (a later
    /// confirmation supersedes a failed attempt). The ledger never records
    /// a successful charge the processor did not confirm.
    pub async fn confirm_payment(
        &self,
        order_id: i64,
        method: Option<String>,
    ) -> AppResult<(Order, Payment)> {
        let existing = self.load(order_id).await?;

        if existing.status == OrderStatus::Cancelled {
            return Err(AppError::BusinessRule(format!(
                "Order {} is cancelled and cannot be paid",
                existing.order_number
            )));
        }
        match existing.payment_status {
            PaymentStatus::Pending | PaymentStatus::Failed => {}
            PaymentStatus::Paid => {
                return Err(AppError::BusinessRule(format!(
                    "Order {} is already paid",
                    existing.order_number
                )));
            }
            other => {
                return Err(AppError::BusinessRule(format!(
                    "Order {} cannot be charged (payment status {other:?})",
                    existing.order_number
                )));
            }
        }

        let method = method
            .or_else(|| existing.payment_method.clone())
            .unwrap_or_else(|| "card".to_string());

        let receipt = self
            .processor
            .charge(ChargeRequest {
                order_id,
                amount: existing.total_amount,
                currency: CURRENCY,
            })
            .await;

        let receipt = match receipt {
            Ok(receipt) => receipt,
            Err(ProcessorError::Rejected(reason)) => {
                // Record the failed attempt; the ledger keeps the audit
                // trail and the derived status becomes FAILED
                let append = payment::append(
                    &self.pool,
                    payment::NewLedgerEntry {
                        order_id,
                        amount: existing.total_amount,
                        method: method.clone(),
                        status: LedgerEntryStatus::Failed,
                        reference: None,
                        notes: Some(reason.clone()),
                    },
                )
                .await;
                if let Err(e) = append {
                    tracing::warn!(order_id, error = %e, "Could not record failed charge attempt");
                } else {
                    self.refresh_payment_status(&existing, Some(&method)).await?;
                }
                return Err(AppError::ProcessorRejected(reason));
            }
            Err(e @ ProcessorError::Unavailable(_)) => {
                return Err(AppError::Internal(e.to_string()));
            }
        };

        let entry = payment::append(
            &self.pool,
            payment::NewLedgerEntry {
                order_id,
                amount: existing.total_amount,
                method: method.clone(),
                status: LedgerEntryStatus::Completed,
                reference: Some(receipt.reference),
                notes: None,
            },
        )
        .await
        .map_err(|e| {
            // The processor confirmed but we failed to write: inconsistent
            // state, must be reconciled by hand. Retrying the charge
            // blindly risks double-charging.
            tracing::error!(
                order_id,
                error = %e,
                "RECONCILIATION ALERT: processor confirmed charge but ledger append failed"
            );
            AppError::Internal("Payment recorded by processor but not locally".to_string())
        })?;

        let updated = self.refresh_payment_status(&existing, Some(&method)).await?;
        tracing::info!(
            order_id,
            order_number = %updated.order_number,
            amount = entry.amount,
            "Payment confirmed"
        );
        Ok((updated, entry))
    }

    /// Mark a house-account order; it is never charged through the
    /// processor
    pub async fn mark_credit_account(&self, order_id: i64) -> AppResult<Order> {
        let existing = self.load(order_id).await?;
        if existing.payment_status != PaymentStatus::Pending {
            return Err(AppError::BusinessRule(format!(
                "Order {} cannot move to a credit account (payment status {:?})",
                existing.order_number, existing.payment_status
            )));
        }
        Ok(order::update_payment_state(
            &self.pool,
            order_id,
            PaymentStatus::CreditAccount,
            Some("credit_account"),
        )
        .await?)
    }

    /// Issue a refund against a paid order.
    ///
    /// Holds the per-order lock across the maxRefundable computation, the
    /// processor call, and the ledger append. The cached payment status is
    /// recomputed from the ledger afterwards: it flips to REFUNDED only
    /// when the order is fully refunded (within a one-cent tolerance),
    /// otherwise it stays PAID.
    pub async fn refund(
        &self,
        order_id: i64,
        amount: f64,
        notes: Option<String>,
    ) -> AppResult<(Order, Payment)> {
        let lock = self.refund_locks.for_order(order_id);
        let _serialized = lock.lock().await;

        let existing = self.load(order_id).await?;

        if existing.payment_status != PaymentStatus::Paid {
            return Err(AppError::BusinessRule(format!(
                "Only paid orders can be refunded (order {} is {:?})",
                existing.order_number, existing.payment_status
            )));
        }
        if !amount.is_finite() || amount <= 0.0 {
            return Err(AppError::Validation(
                "Refund amount must be positive".to_string(),
            ));
        }

        let ledger = payment::list_by_order(&self.pool, order_id).await?;
        let remaining = to_decimal(existing.total_amount) - refunded_total(&ledger);
        if to_decimal(amount) > remaining + MONEY_TOLERANCE {
            return Err(AppError::BusinessRule(format!(
                "Refund of {:.2} exceeds the refundable balance of {:.2}",
                amount,
                to_f64(remaining)
            )));
        }

        let charge_reference = ledger
            .iter()
            .rev()
            .find(|p| p.status == LedgerEntryStatus::Completed)
            .and_then(|p| p.reference.clone());
        let method = existing
            .payment_method
            .clone()
            .unwrap_or_else(|| "card".to_string());

        let receipt = self
            .processor
            .refund(RefundRequest {
                order_id,
                amount,
                currency: CURRENCY,
                charge_reference,
            })
            .await
            .map_err(|e| match e {
                ProcessorError::Rejected(reason) => AppError::ProcessorRejected(reason),
                unavailable => AppError::Internal(unavailable.to_string()),
            })?;

        let entry = payment::append(
            &self.pool,
            payment::NewLedgerEntry {
                order_id,
                amount: -amount,
                method,
                status: LedgerEntryStatus::Refunded,
                reference: Some(receipt.reference),
                notes,
            },
        )
        .await
        .map_err(|e| {
            tracing::error!(
                order_id,
                error = %e,
                "RECONCILIATION ALERT: processor confirmed refund but ledger append failed"
            );
            AppError::Internal("Refund recorded by processor but not locally".to_string())
        })?;

        let updated = self.refresh_payment_status(&existing, None).await?;
        let ledger = payment::list_by_order(&self.pool, order_id).await?;
        tracing::info!(
            order_id,
            order_number = %updated.order_number,
            amount,
            remaining = max_refundable(updated.total_amount, &ledger),
            "Refund issued"
        );
        Ok((updated, entry))
    }

    /// Recompute the cached payment status from the full ledger
    async fn refresh_payment_status(
        &self,
        existing: &Order,
        method: Option<&str>,
    ) -> AppResult<Order> {
        let ledger = payment::list_by_order(&self.pool, existing.id).await?;
        let derived = derive_payment_status(existing.payment_status, existing.total_amount, &ledger);
        Ok(order::update_payment_state(&self.pool, existing.id, derived, method).await?)
    }
}
