//! Bid repository: current rows in `bids`, snapshots in `bid_versions`.

use crate::error::{PersistenceError, PersistenceResult};
use crate::sqlite::schema::{convert_all, BidRow};
use crate::sqlite::versioned::VersionedRepo;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Connection, SqliteConnection};
use tenderhub_core::{Bid, Pagination};

/// Repository for tables `bids` and `bid_versions`
pub struct BidRepo;

impl BidRepo {
    pub async fn get_by_id(conn: &mut SqliteConnection, id: &str) -> PersistenceResult<Bid> {
        Self::find_by_id(conn, id)
            .await?
            .ok_or_else(|| PersistenceError::not_found("Bid", id))
    }

    /// Bids whose `author_id` is the given user, ordered by name
    pub async fn list_by_author(
        conn: &mut SqliteConnection,
        author_id: &str,
        page: Pagination,
    ) -> PersistenceResult<Vec<Bid>> {
        let rows = sqlx::query_as::<_, BidRow>(
            "SELECT * FROM bids WHERE author_id = ? ORDER BY name, id LIMIT ? OFFSET ?",
        )
        .bind(author_id)
        .bind(page.sql_limit())
        .bind(page.sql_offset())
        .fetch_all(&mut *conn)
        .await?;
        convert_all(rows)
    }

    /// All bids on a tender, ordered by name
    pub async fn list_by_tender(
        conn: &mut SqliteConnection,
        tender_id: &str,
        page: Pagination,
    ) -> PersistenceResult<Vec<Bid>> {
        let rows = sqlx::query_as::<_, BidRow>(
            "SELECT * FROM bids WHERE tender_id = ? ORDER BY name, id LIMIT ? OFFSET ?",
        )
        .bind(tender_id)
        .bind(page.sql_limit())
        .bind(page.sql_offset())
        .fetch_all(&mut *conn)
        .await?;
        convert_all(rows)
    }

    /// Maintenance only: removes the bid with its log, votes and reviews
    pub async fn delete(conn: &mut SqliteConnection, id: &str) -> PersistenceResult<()> {
        let result = sqlx::query("DELETE FROM bids WHERE id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("Bid", id));
        }
        Ok(())
    }

    pub async fn count(conn: &mut SqliteConnection) -> PersistenceResult<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM bids")
            .fetch_one(&mut *conn)
            .await?;
        Ok(row.0)
    }

    async fn append_version(conn: &mut SqliteConnection, b: &Bid) -> PersistenceResult<()> {
        sqlx::query(
            r#"
            INSERT INTO bid_versions
                (id, version, tender_id, author_type, author_id, author_user_id, author_organization_id,
                 status, name, description, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&b.id)
        .bind(b.version)
        .bind(&b.tender_id)
        .bind(b.author_type.as_str())
        .bind(&b.author_id)
        .bind(&b.author_user_id)
        .bind(&b.author_organization_id)
        .bind(b.status.as_str())
        .bind(&b.name)
        .bind(&b.description)
        .bind(b.created_at)
        .bind(b.updated_at)
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            PersistenceError::from_insert(e, "BidVersion", &format!("{}@{}", b.id, b.version))
        })?;
        Ok(())
    }
}

#[async_trait]
impl VersionedRepo for BidRepo {
    type Entity = Bid;

    async fn insert(conn: &mut SqliteConnection, b: &Bid) -> PersistenceResult<()> {
        let mut tx = conn.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO bids
                (id, version, tender_id, author_type, author_id, author_user_id, author_organization_id,
                 status, name, description, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&b.id)
        .bind(b.version)
        .bind(&b.tender_id)
        .bind(b.author_type.as_str())
        .bind(&b.author_id)
        .bind(&b.author_user_id)
        .bind(&b.author_organization_id)
        .bind(b.status.as_str())
        .bind(&b.name)
        .bind(&b.description)
        .bind(b.created_at)
        .bind(b.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| PersistenceError::from_insert(e, "Bid", &b.id))?;

        Self::append_version(&mut tx, b).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn find_by_id(conn: &mut SqliteConnection, id: &str) -> PersistenceResult<Option<Bid>> {
        let row = sqlx::query_as::<_, BidRow>("SELECT * FROM bids WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        row.map(Bid::try_from).transpose()
    }

    async fn update(
        conn: &mut SqliteConnection,
        bid: &mut Bid,
        bump_version: bool,
    ) -> PersistenceResult<()> {
        let mut next = bid.clone();
        if bump_version {
            next.version += 1;
        }
        next.updated_at = Utc::now();

        let mut tx = conn.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE bids
            SET version = ?, status = ?, name = ?, description = ?, updated_at = ?
            WHERE id = ? AND version = ?
            "#,
        )
        .bind(next.version)
        .bind(next.status.as_str())
        .bind(&next.name)
        .bind(&next.description)
        .bind(next.updated_at)
        .bind(&next.id)
        .bind(bid.version)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(match Self::find_by_id(&mut tx, &bid.id).await? {
                Some(_) => PersistenceError::version_conflict("Bid", &bid.id, bid.version),
                None => PersistenceError::not_found("Bid", &bid.id),
            });
        }

        if bump_version {
            Self::append_version(&mut tx, &next).await?;
        }

        tx.commit().await?;
        *bid = next;
        Ok(())
    }

    async fn list_versions(
        conn: &mut SqliteConnection,
        id: &str,
        version: Option<i64>,
    ) -> PersistenceResult<Vec<Bid>> {
        let rows = sqlx::query_as::<_, BidRow>(
            r#"
            SELECT * FROM bid_versions
            WHERE id = ? AND (? IS NULL OR version = ?)
            ORDER BY updated_at DESC, version DESC
            "#,
        )
        .bind(id)
        .bind(version)
        .bind(version)
        .fetch_all(&mut *conn)
        .await?;
        convert_all(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::directory::{MembershipRepo, OrganizationRepo, UserRepo};
    use crate::sqlite::pool::memory_pool;
    use crate::sqlite::tenders::TenderRepo;
    use sqlx::Sqlite;
    use tenderhub_core::{
        BidDraft, BidStatus, Organization, OrganizationType, ServiceType, Tender, TenderDraft, User,
    };

    async fn seeded() -> sqlx::pool::PoolConnection<Sqlite> {
        let pool = memory_pool().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        UserRepo::insert(&mut conn, &User::new("u-1", "alice")).await.unwrap();
        UserRepo::insert(&mut conn, &User::new("u-2", "bob")).await.unwrap();
        OrganizationRepo::insert(&mut conn, &Organization::new("org-1", "Acme", OrganizationType::Llc))
            .await
            .unwrap();
        MembershipRepo::add_member(&mut conn, "org-1", "u-1").await.unwrap();
        let tender = Tender::from_draft(
            "t-1",
            "u-1",
            TenderDraft::new("org-1", ServiceType::Delivery, "Trucks"),
        );
        TenderRepo::insert(&mut conn, &tender).await.unwrap();
        conn
    }

    fn bid(id: &str, name: &str, author: &str) -> Bid {
        Bid::from_draft(id, BidDraft::by_user("t-1", author, name), None)
    }

    #[tokio::test]
    async fn test_insert_and_update_log() {
        let mut conn = seeded().await;
        let mut b = bid("b-1", "Offer", "u-2");
        BidRepo::insert(&mut conn, &b).await.unwrap();

        b.status = BidStatus::Published;
        BidRepo::update(&mut conn, &mut b, true).await.unwrap();
        assert_eq!(b.version, 2);

        let stored = BidRepo::get_by_id(&mut conn, "b-1").await.unwrap();
        assert_eq!(stored.status, BidStatus::Published);
        assert_eq!(stored.author_user_id.as_deref(), Some("u-2"));

        let log = BidRepo::list_versions(&mut conn, "b-1", None).await.unwrap();
        assert_eq!(log.iter().map(|b| b.version).collect::<Vec<_>>(), vec![2, 1]);
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_already_exists() {
        let mut conn = seeded().await;
        let b = bid("b-1", "Offer", "u-2");
        BidRepo::insert(&mut conn, &b).await.unwrap();

        let err = BidRepo::insert(&mut conn, &b).await.unwrap_err();
        assert!(matches!(err, PersistenceError::AlreadyExists { .. }));
        // the failed insert must not leave a stray log row behind
        let log = BidRepo::list_versions(&mut conn, "b-1", None).await.unwrap();
        assert_eq!(log.len(), 1);
    }

    #[tokio::test]
    async fn test_listing() {
        let mut conn = seeded().await;
        BidRepo::insert(&mut conn, &bid("b-1", "Zeta", "u-2")).await.unwrap();
        BidRepo::insert(&mut conn, &bid("b-2", "Alpha", "u-2")).await.unwrap();
        BidRepo::insert(&mut conn, &bid("b-3", "Mid", "u-1")).await.unwrap();

        let mine = BidRepo::list_by_author(&mut conn, "u-2", Pagination::unlimited())
            .await
            .unwrap();
        assert_eq!(
            mine.iter().map(|b| b.name.as_str()).collect::<Vec<_>>(),
            vec!["Alpha", "Zeta"]
        );

        let on_tender = BidRepo::list_by_tender(&mut conn, "t-1", Pagination::new(2, 0))
            .await
            .unwrap();
        assert_eq!(on_tender.len(), 2);
        assert_eq!(BidRepo::count(&mut conn).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_deleting_tender_cascades_to_bids() {
        let mut conn = seeded().await;
        BidRepo::insert(&mut conn, &bid("b-1", "Offer", "u-2")).await.unwrap();

        TenderRepo::delete(&mut conn, "t-1").await.unwrap();
        assert!(BidRepo::find_by_id(&mut conn, "b-1").await.unwrap().is_none());
        assert!(BidRepo::list_versions(&mut conn, "b-1", None).await.unwrap().is_empty());
    }
}
