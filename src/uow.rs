//! # Unit of Work
//!
//! Scoped transactions. Work either runs inside [`UnitOfWork::run`], which
//! commits when the closure succeeds and rolls back when it fails, or
//! inside a [`UnitOfWorkScope`] obtained from [`UnitOfWork::begin`], which
//! rolls back when dropped without an explicit commit.
//!
//! Repositories accept the transaction as their connection, so every
//! operation issued through it shares the same commit or rollback.

use std::fmt;
use std::future::Future;
use std::ops::Deref;
use std::pin::Pin;

use sea_orm::{DatabaseConnection, DatabaseTransaction, DbErr, TransactionTrait};
use tracing::{debug, error};

/// Boxed future returned by unit-of-work closures.
pub type WorkFuture<'c, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'c>>;

/// Opens transactions on a shared connection pool.
#[derive(Clone, Debug)]
pub struct UnitOfWork {
    db: DatabaseConnection,
}

impl UnitOfWork {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Runs `work` in a fresh transaction.
    ///
    /// On `Ok` the transaction commits and the value is returned. On `Err`
    /// the failure is logged, the transaction rolls back and the closure's
    /// own error is returned unchanged. A failed commit surfaces as the
    /// storage error converted into `E`.
    pub async fn run<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: for<'c> FnOnce(&'c DatabaseTransaction) -> WorkFuture<'c, T, E>,
        E: From<DbErr> + fmt::Display,
    {
        let txn = self.db.begin().await?;
        let outcome = work(&txn).await;

        match outcome {
            Ok(value) => {
                txn.commit().await?;
                debug!("Unit of work committed");
                Ok(value)
            }
            Err(err) => {
                error!(error = %err, "Unit of work failed; rolling back");
                if let Err(rollback_err) = txn.rollback().await {
                    error!(error = %rollback_err, "Rollback failed");
                }
                Err(err)
            }
        }
    }

    /// Opens a transaction scope for callers that prefer explicit control.
    pub async fn begin(&self) -> Result<UnitOfWorkScope, DbErr> {
        let txn = self.db.begin().await?;
        Ok(UnitOfWorkScope { txn })
    }
}

/// An open transaction. Dereferences to [`DatabaseTransaction`] so it can be
/// handed straight to a repository constructor.
///
/// Dropping the scope without calling [`UnitOfWorkScope::commit`] discards
/// everything written through it.
pub struct UnitOfWorkScope {
    txn: DatabaseTransaction,
}

impl UnitOfWorkScope {
    pub async fn commit(self) -> Result<(), DbErr> {
        self.txn.commit().await?;
        debug!("Unit of work committed");
        Ok(())
    }

    pub async fn rollback(self) -> Result<(), DbErr> {
        self.txn.rollback().await?;
        debug!("Unit of work rolled back");
        Ok(())
    }
}

impl Deref for UnitOfWorkScope {
    type Target = DatabaseTransaction;

    fn deref(&self) -> &Self::Target {
        &self.txn
    }
}

impl fmt::Debug for UnitOfWorkScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitOfWorkScope").finish_non_exhaustive()
    }
}
