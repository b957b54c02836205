//! Tender repository: current rows in `tenders`, snapshots in
//! `tender_versions`.

use crate::error::{PersistenceError, PersistenceResult};
use crate::sqlite::schema::{convert_all, TenderRow};
use crate::sqlite::versioned::VersionedRepo;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Connection, QueryBuilder, Sqlite, SqliteConnection};
use tenderhub_core::{Pagination, ServiceType, Tender};

/// Filters for tender listing
#[derive(Debug, Clone, Default)]
pub struct TenderFilter {
    /// Empty means any service type
    pub service_types: Vec<ServiceType>,
    pub author_user_id: Option<String>,
}

impl TenderFilter {
    pub fn service_types(service_types: &[ServiceType]) -> Self {
        Self {
            service_types: service_types.to_vec(),
            author_user_id: None,
        }
    }

    pub fn author(user_id: &str) -> Self {
        Self {
            service_types: Vec::new(),
            author_user_id: Some(user_id.to_string()),
        }
    }
}

/// Repository for tables `tenders` and `tender_versions`
pub struct TenderRepo;

impl TenderRepo {
    /// Tenders matching `filter`, ordered by name
    pub async fn list(
        conn: &mut SqliteConnection,
        filter: &TenderFilter,
        page: Pagination,
    ) -> PersistenceResult<Vec<Tender>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM tenders WHERE 1 = 1");

        if !filter.service_types.is_empty() {
            qb.push(" AND service_type IN (");
            let mut separated = qb.separated(", ");
            for service_type in &filter.service_types {
                separated.push_bind(service_type.as_str());
            }
            separated.push_unseparated(")");
        }
        if let Some(author) = &filter.author_user_id {
            qb.push(" AND author_user_id = ").push_bind(author.clone());
        }

        qb.push(" ORDER BY name, id LIMIT ")
            .push_bind(page.sql_limit())
            .push(" OFFSET ")
            .push_bind(page.sql_offset());

        let rows = qb
            .build_query_as::<TenderRow>()
            .fetch_all(&mut *conn)
            .await?;
        convert_all(rows)
    }

    pub async fn get_by_id(conn: &mut SqliteConnection, id: &str) -> PersistenceResult<Tender> {
        Self::find_by_id(conn, id)
            .await?
            .ok_or_else(|| PersistenceError::not_found("Tender", id))
    }

    /// Maintenance only: removes the tender with its log, bids, votes and reviews
    pub async fn delete(conn: &mut SqliteConnection, id: &str) -> PersistenceResult<()> {
        let result = sqlx::query("DELETE FROM tenders WHERE id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("Tender", id));
        }
        Ok(())
    }

    pub async fn count(conn: &mut SqliteConnection) -> PersistenceResult<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tenders")
            .fetch_one(&mut *conn)
            .await?;
        Ok(row.0)
    }

    async fn append_version(conn: &mut SqliteConnection, t: &Tender) -> PersistenceResult<()> {
        sqlx::query(
            r#"
            INSERT INTO tender_versions
                (id, version, organization_id, author_user_id, status, service_type, name, description, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&t.id)
        .bind(t.version)
        .bind(&t.organization_id)
        .bind(&t.author_user_id)
        .bind(t.status.as_str())
        .bind(t.service_type.as_str())
        .bind(&t.name)
        .bind(&t.description)
        .bind(t.created_at)
        .bind(t.updated_at)
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            PersistenceError::from_insert(e, "TenderVersion", &format!("{}@{}", t.id, t.version))
        })?;
        Ok(())
    }
}

#[async_trait]
impl VersionedRepo for TenderRepo {
    type Entity = Tender;

    async fn insert(conn: &mut SqliteConnection, t: &Tender) -> PersistenceResult<()> {
        let mut tx = conn.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO tenders
                (id, version, organization_id, author_user_id, status, service_type, name, description, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&t.id)
        .bind(t.version)
        .bind(&t.organization_id)
        .bind(&t.author_user_id)
        .bind(t.status.as_str())
        .bind(t.service_type.as_str())
        .bind(&t.name)
        .bind(&t.description)
        .bind(t.created_at)
        .bind(t.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| PersistenceError::from_insert(e, "Tender", &t.id))?;

        Self::append_version(&mut tx, t).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn find_by_id(
        conn: &mut SqliteConnection,
        id: &str,
    ) -> PersistenceResult<Option<Tender>> {
        let row = sqlx::query_as::<_, TenderRow>("SELECT * FROM tenders WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        row.map(Tender::try_from).transpose()
    }

    async fn update(
        conn: &mut SqliteConnection,
        tender: &mut Tender,
        bump_version: bool,
    ) -> PersistenceResult<()> {
        let mut next = tender.clone();
        if bump_version {
            next.version += 1;
        }
        next.updated_at = Utc::now();

        let mut tx = conn.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE tenders
            SET version = ?, status = ?, service_type = ?, name = ?, description = ?, updated_at = ?
            WHERE id = ? AND version = ?
            "#,
        )
        .bind(next.version)
        .bind(next.status.as_str())
        .bind(next.service_type.as_str())
        .bind(&next.name)
        .bind(&next.description)
        .bind(next.updated_at)
        .bind(&next.id)
        .bind(tender.version)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(match Self::find_by_id(&mut tx, &tender.id).await? {
                Some(_) => PersistenceError::version_conflict("Tender", &tender.id, tender.version),
                None => PersistenceError::not_found("Tender", &tender.id),
            });
        }

        if bump_version {
            Self::append_version(&mut tx, &next).await?;
        }

        tx.commit().await?;
        *tender = next;
        Ok(())
    }

    async fn list_versions(
        conn: &mut SqliteConnection,
        id: &str,
        version: Option<i64>,
    ) -> PersistenceResult<Vec<Tender>> {
        let rows = sqlx::query_as::<_, TenderRow>(
            r#"
            SELECT * FROM tender_versions
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
