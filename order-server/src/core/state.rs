use std::sync::Arc;

use sqlx::SqlitePool;

use crate::checkout::CheckoutService;
use crate::core::Config;
use crate::db::DbService;
use crate::lifecycle::{OrderLifecycle, RefundLocks};
use crate::processor::{NullProcessor, PaymentProcessor};

/// Server state — shared references held by every handler
///
/// Cloning is shallow (pool and `Arc`s), so handlers can take the state
/// by value.
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Config,
    /// SQLite connection pool
    pub db: SqlitePool,
    /// Payment processor boundary (real gateway in production)
    pub processor: Arc<dyn PaymentProcessor>,
    /// Per-order refund serialization
    pub refund_locks: Arc<RefundLocks>,
}

impl ServerState {
    pub fn new(config: Config, db: SqlitePool, processor: Arc<dyn PaymentProcessor>) -> Self {
        Self {
            config,
            db,
            processor,
            refund_locks: Arc::new(RefundLocks::new()),
        }
    }

    /// Initialize server state: working directory, database, services.
    ///
    /// # Panics
    ///
    /// Panics when the database cannot be initialized.
    pub async fn initialize(config: &Config) -> Self {
        config
            .ensure_work_dir()
            .expect("Failed to create work directory");

        let db_path = config.database_path();
        let db_service = DbService::new(&db_path.to_string_lossy())
            .await
            .expect("Failed to initialize database");

        // No gateway wired in yet: every charge/refund is confirmed locally
        let processor: Arc<dyn PaymentProcessor> = Arc::new(NullProcessor);

        Self::new(config.clone(), db_service.pool, processor)
    }

    /// Checkout engine bound to this state
    pub fn checkout(&self) -> CheckoutService {
        CheckoutService::new(self.db.clone())
    }

    /// Lifecycle manager bound to this state
    pub fn lifecycle(&self) -> OrderLifecycle {
        OrderLifecycle::new(
            self.db.clone(),
            self.processor.clone(),
            self.refund_locks.clone(),
        )
    }
}
