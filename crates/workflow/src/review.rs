//! Review ledger - reviewer feedback keyed by (bid, reviewer).

use crate::context::ServiceContext;
use crate::error::WorkflowResult;
use sqlx::SqliteConnection;
use tenderhub_core::{BidReview, Pagination, ReviewFilter};
use tenderhub_persistence::ReviewRepo;

pub struct ReviewLedger<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ReviewLedger<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Store `text` as `user_id`'s review of the bid, replacing any earlier one
    pub async fn add_review(&self, bid_id: &str, user_id: &str, text: &str) -> WorkflowResult<()> {
        let mut conn = self.ctx.acquire().await?;
        record(&mut conn, bid_id, user_id, text).await
    }

    /// Reviews matching `filter`, most recently updated first
    pub async fn list_reviews(
        &self,
        filter: &ReviewFilter,
        page: Pagination,
    ) -> WorkflowResult<Vec<BidReview>> {
        let mut conn = self.ctx.acquire().await?;
        matching(&mut conn, filter, page).await
    }
}

pub(crate) async fn record(
    conn: &mut SqliteConnection,
    bid_id: &str,
    user_id: &str,
    text: &str,
) -> WorkflowResult<()> {
    ReviewRepo::upsert(conn, bid_id, user_id, text).await?;
    tracing::info!(bid_id, reviewer = user_id, "Review recorded");
    Ok(())
}

pub(crate) async fn matching(
    conn: &mut SqliteConnection,
    filter: &ReviewFilter,
    page: Pagination,
) -> WorkflowResult<Vec<BidReview>> {
    Ok(ReviewRepo::list(conn, filter, page).await?)
}
