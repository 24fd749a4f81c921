//! Transaction runner.
//!
//! Wraps a caller-supplied unit of work in one database transaction:
//! nothing the unit does is visible outside until commit, and a failed unit
//! leaves the database exactly as it was.

use crate::error::{StoreError, StoreResult};
use crate::SqlStore;
use futures::future::BoxFuture;
use sqlx::SqliteConnection;

impl SqlStore {
    /// Run `work` inside a database transaction.
    ///
    /// One connection is checked out of the pool for the whole transaction and
    /// returned on every exit path. If the unit of work fails, the transaction
    /// is rolled back and the unit's error is returned; should the rollback
    /// itself fail too, both failures surface together as
    /// [`StoreError::Rollback`]. On success the commit failure, if any, is the
    /// single failure of the call.
    ///
    /// Dropping the returned future mid-flight (caller cancellation) drops the
    /// open `sqlx` transaction, which rolls it back; no transaction is ever
    /// left open.
    pub async fn run_transaction<T, F>(&self, work: F) -> StoreResult<T>
    where
        T: Send,
        F: for<'c> FnOnce(&'c mut SqliteConnection) -> BoxFuture<'c, StoreResult<T>> + Send,
    {
        let mut tx = self.pool().begin().await?;

        match work(&mut *tx).await {
            Ok(value) => {
                tx.commit().await?;
                Ok(value)
            }
            Err(err) => match tx.rollback().await {
                Ok(()) => Err(err),
                Err(rollback_err) => {
                    tracing::error!(
                        error = %err,
                        rollback_error = %rollback_err,
                        "rollback failed after transaction error"
                    );
                    Err(StoreError::Rollback {
                        source: Box::new(err),
                        rollback: rollback_err,
                    })
                }
            },
        }
    }
}
