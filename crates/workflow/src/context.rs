//! Shared context for workflow operations

use crate::approval::ApprovalTally;
use crate::bid::BidWorkflow;
use crate::error::WorkflowResult;
use crate::review::ReviewLedger;
use crate::tender::TenderWorkflow;
use sqlx::pool::PoolConnection;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tenderhub_persistence::Database;

/// Context for workflow operations - owns database access.
///
/// Mutating operations run inside one transaction obtained from
/// [`ServiceContext::begin`]; dropping it without commit rolls back.
/// The transaction takes SQLite's write lock before its first read, so
/// concurrent writers queue on the busy timeout instead of failing with
/// "database is locked" at their first write.
#[derive(Clone)]
pub struct ServiceContext {
    pool: SqlitePool,
}

impl ServiceContext {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub(crate) async fn begin(&self) -> WorkflowResult<Transaction<'static, Sqlite>> {
        Ok(self.pool.begin_with("BEGIN IMMEDIATE").await?)
    }

    /// Connection for read-only operations
    pub(crate) async fn acquire(&self) -> WorkflowResult<PoolConnection<Sqlite>> {
        Ok(self.pool.acquire().await?)
    }

    pub fn tenders(&self) -> TenderWorkflow<'_> {
        TenderWorkflow::new(self)
    }

    pub fn bids(&self) -> BidWorkflow<'_> {
        BidWorkflow::new(self)
    }

    pub fn approvals(&self) -> ApprovalTally<'_> {
        ApprovalTally::new(self)
    }

    pub fn reviews(&self) -> ReviewLedger<'_> {
        ReviewLedger::new(self)
    }
}
