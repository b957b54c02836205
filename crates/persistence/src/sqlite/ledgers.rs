//! Per-bid ledgers keyed by (bid, user): approval votes and reviews.
//! A repeated write by the same user replaces the previous entry.

use crate::error::PersistenceResult;
use crate::sqlite::schema::{convert_all, ApprovalRow, ReviewRow};
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};
use tenderhub_core::{BidApproval, BidReview, Decision, Pagination, ReviewFilter, Tally};

// ============================================================================
// Approval Repository
// ============================================================================

/// Repository for table `bid_approvals`
pub struct ApprovalRepo;

impl ApprovalRepo {
    /// Record `user_id`'s decision, replacing any earlier vote
    pub async fn upsert(
        conn: &mut SqliteConnection,
        bid_id: &str,
        user_id: &str,
        decision: Decision,
    ) -> PersistenceResult<()> {
        sqlx::query(
            r#"
            INSERT INTO bid_approvals (bid_id, user_id, decision, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(bid_id, user_id) DO UPDATE SET
                decision = excluded.decision,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(bid_id)
        .bind(user_id)
        .bind(decision.as_str())
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// Current vote counts for a bid
    pub async fn tally(conn: &mut SqliteConnection, bid_id: &str) -> PersistenceResult<Tally> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT decision, COUNT(*) FROM bid_approvals WHERE bid_id = ? GROUP BY decision",
        )
        .bind(bid_id)
        .fetch_all(&mut *conn)
        .await?;

        let mut tally = Tally::default();
        for (decision, count) in rows {
            match Decision::from_str(&decision) {
                Some(Decision::Approve) => tally.approvals = count,
                Some(Decision::Reject) => tally.rejections = count,
                None => {
                    tracing::warn!(bid_id, decision = %decision, "Ignoring unknown vote value");
                }
            }
        }
        Ok(tally)
    }

    pub async fn list_for_bid(
        conn: &mut SqliteConnection,
        bid_id: &str,
    ) -> PersistenceResult<Vec<BidApproval>> {
        let rows = sqlx::query_as::<_, ApprovalRow>(
            "SELECT * FROM bid_approvals WHERE bid_id = ? ORDER BY updated_at, user_id",
        )
        .bind(bid_id)
        .fetch_all(&mut *conn)
        .await?;
        convert_all(rows)
    }

    pub async fn count(conn: &mut SqliteConnection) -> PersistenceResult<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM bid_approvals")
            .fetch_one(&mut *conn)
            .await?;
        Ok(row.0)
    }
}

// ============================================================================
// Review Repository
// ============================================================================

/// Repository for table `bid_reviews`
pub struct ReviewRepo;

impl ReviewRepo {
    /// Record feedback; `created_at` survives an overwrite
    pub async fn upsert(
        conn: &mut SqliteConnection,
        bid_id: &str,
        user_id: &str,
        text: &str,
    ) -> PersistenceResult<()> {
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO bid_reviews (bid_id, user_id, text, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(bid_id, user_id) DO UPDATE SET
                text = excluded.text,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(bid_id)
        .bind(user_id)
        .bind(text)
        .bind(now)
        .bind(now)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// Reviews matching `filter`, most recently updated first
    pub async fn list(
        conn: &mut SqliteConnection,
        filter: &ReviewFilter,
        page: Pagination,
    ) -> PersistenceResult<Vec<BidReview>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            r#"
            SELECT r.bid_id, r.user_id, r.text, r.created_at, r.updated_at
            FROM bid_reviews AS r
            INNER JOIN bids AS b ON b.id = r.bid_id
            WHERE 1 = 1
            "#,
        );

        if let Some(tender_id) = &filter.tender_id {
            qb.push(" AND b.tender_id = ").push_bind(tender_id.clone());
        }
        if let Some(reviewer) = &filter.reviewer_user_id {
            qb.push(" AND r.user_id = ").push_bind(reviewer.clone());
        }
        if let Some(author) = &filter.author_user_id {
            qb.push(" AND b.author_user_id = ").push_bind(author.clone());
        }

        qb.push(" ORDER BY r.updated_at DESC, r.bid_id, r.user_id LIMIT ")
            .push_bind(page.sql_limit())
            .push(" OFFSET ")
            .push_bind(page.sql_offset());

        let rows = qb
            .build_query_as::<ReviewRow>()
            .fetch_all(&mut *conn)
            .await?;
        Ok(rows.into_iter().map(BidReview::from).collect())
    }

    pub async fn count(conn: &mut SqliteConnection) -> PersistenceResult<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM bid_reviews")
            .fetch_one(&mut *conn)
            .await?;
        Ok(row.0)
    }
}
