//! Storage contract shared by Tender and Bid: a current row plus an
//! append-only log of snapshots, one per version number.
//!
//! Both `insert` and `update` run inside their own savepoint so the row
//! write and the log append land together even when the caller did not
//! open a transaction. The version bump is a compare-and-swap on the
//! previous version: two writers can never claim the same number.

use crate::error::PersistenceResult;
use async_trait::async_trait;
use sqlx::SqliteConnection;
use tenderhub_core::Versioned;

#[async_trait]
pub trait VersionedRepo: Send + Sync {
    type Entity: Versioned + Send + Sync;

    /// Persist a new entity at version 1 and append log row 1
    async fn insert(conn: &mut SqliteConnection, entity: &Self::Entity) -> PersistenceResult<()>;

    async fn find_by_id(
        conn: &mut SqliteConnection,
        id: &str,
    ) -> PersistenceResult<Option<Self::Entity>>;

    /// Persist the current row.
    ///
    /// With `bump_version` the version is incremented before writing and a
    /// log row carrying the new version is appended; without it the row is
    /// rewritten in place and the log is untouched. On success `entity`
    /// reflects what was stored.
    async fn update(
        conn: &mut SqliteConnection,
        entity: &mut Self::Entity,
        bump_version: bool,
    ) -> PersistenceResult<()>;

    /// Historical snapshots, newest-updated first, optionally only `version`
    async fn list_versions(
        conn: &mut SqliteConnection,
        id: &str,
        version: Option<i64>,
    ) -> PersistenceResult<Vec<Self::Entity>>;

    /// Snapshot stored for exactly `version`
    async fn get_version(
        conn: &mut SqliteConnection,
        id: &str,
        version: i64,
    ) -> PersistenceResult<Option<Self::Entity>> {
        let mut rows = Self::list_versions(conn, id, Some(version)).await?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        })
    }
}
