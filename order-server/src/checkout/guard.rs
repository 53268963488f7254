//! Checkout Concurrency Guard
//!
//! Client-side half of the duplicate-order-suppression contract: a
//! checkout session holds an in-memory "creation in flight or done" flag
//! that is set synchronously *before* the create call is issued, cleared
//! only on a definitive, retryable failure, and never cleared on success.
//! Storefront clients and in-process callers drive their create through
//! [`CheckoutGuard::submit`]; the authoritative server-side guarantee is
//! the checkout-session idempotency key on the orders table.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};

/// Per-checkout-session submission flag
#[derive(Debug, Default)]
pub struct CheckoutGuard {
    engaged: AtomicBool,
}

/// Result of driving one submission attempt through the guard
#[derive(Debug, PartialEq)]
pub enum SubmitOutcome<T, E> {
    /// The create call succeeded; the guard stays engaged for the rest of
    /// the session
    Submitted(T),
    /// A submission is already in flight or done for this session
    AlreadySubmitted,
    /// Preconditions were not met; the flag was cleared without issuing
    /// any call
    PreconditionsUnmet,
    /// The call failed; the flag was cleared so the user can retry
    Failed(E),
}

impl CheckoutGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically set the flag; false if already engaged
    pub fn try_engage(&self) -> bool {
        self.engaged
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Clear the flag — only valid after a retryable failure
    pub fn release(&self) {
        self.engaged.store(false, Ordering::SeqCst);
    }

    pub fn is_engaged(&self) -> bool {
        self.engaged.load(Ordering::SeqCst)
    }

    /// Run one submission attempt under the guard protocol:
    /// set-lock → check preconditions (clear + bail if unmet, no call) →
    /// issue the call → on success stay locked, on error clear for retry.
    pub async fn submit<T, E, Fut>(
        &self,
        preconditions_met: bool,
        op: impl FnOnce() -> Fut,
    ) -> SubmitOutcome<T, E>
    where
        Fut: Future<Output = Result<T, E>>,
    {
        if !self.try_engage() {
            return SubmitOutcome::AlreadySubmitted;
        }
        if !preconditions_met {
            self.release();
            return SubmitOutcome::PreconditionsUnmet;
        }
        match op().await {
            Ok(value) => SubmitOutcome::Submitted(value),
            Err(e) => {
                self.release();
                SubmitOutcome::Failed(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicU32;

    #[tokio::test]
    async fn test_success_leaves_guard_engaged() {
        let guard = CheckoutGuard::new();
        let outcome: SubmitOutcome<i32, ()> = guard.submit(true, || async { Ok(1) }).await;
        assert_eq!(outcome, SubmitOutcome::Submitted(1));
        assert!(guard.is_engaged());

        // Re-evaluation after success must not create a second order
        let outcome: SubmitOutcome<i32, ()> = guard.submit(true, || async { Ok(2) }).await;
        assert_eq!(outcome, SubmitOutcome::AlreadySubmitted);
    }

    #[tokio::test]
    async fn test_failure_releases_for_retry() {
        let guard = CheckoutGuard::new();
        let outcome: SubmitOutcome<(), &str> =
            guard.submit(true, || async { Err("network down") }).await;
        assert_eq!(outcome, SubmitOutcome::Failed("network down"));
        assert!(!guard.is_engaged());

        let outcome: SubmitOutcome<i32, &str> = guard.submit(true, || async { Ok(7) }).await;
        assert_eq!(outcome, SubmitOutcome::Submitted(7));
    }

    #[tokio::test]
    async fn test_unmet_preconditions_skip_the_call() {
        let guard = CheckoutGuard::new();
        let calls = Arc::new(AtomicU32::new(0));
        let calls2 = calls.clone();
        let outcome: SubmitOutcome<(), ()> = guard
            .submit(false, move || {
                calls2.fetch_add(1, Ordering::SeqCst);
                async { Ok(()) }
            })
            .await;
        assert_eq!(outcome, SubmitOutcome::PreconditionsUnmet);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!guard.is_engaged());
    }

    #[tokio::test]
    async fn test_concurrent_attempts_submit_at_most_once() {
        let guard = Arc::new(CheckoutGuard::new());
        let created = Arc::new(AtomicU32::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let guard = guard.clone();
            let created = created.clone();
            handles.push(tokio::spawn(async move {
                guard
                    .submit(true, || async {
                        created.fetch_add(1, Ordering::SeqCst);
                        Ok::<_, ()>(())
                    })
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(created.load(Ordering::SeqCst), 1);
    }
}
