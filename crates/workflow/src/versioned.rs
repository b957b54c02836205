//! Rollback policy shared by tenders and bids.
//!
//! Rollback never decrements: the snapshot's content is written as a new
//! version on top of the current one.

use crate::error::{WorkflowError, WorkflowResult};
use sqlx::SqliteConnection;
use tenderhub_core::Versioned;
use tenderhub_persistence::VersionedRepo;

/// How a rollback request resolves against the current entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RollbackTarget {
    /// Target is the current version; nothing to write
    Current,
    /// Target is an older version to replay
    Past(i64),
}

/// Classify `target` against `current`, failing with `NoVersion` when it
/// is outside `[1, current.version]`.
pub(crate) fn rollback_target<E: Versioned>(current: &E, target: i64) -> WorkflowResult<RollbackTarget> {
    if target == current.version() {
        Ok(RollbackTarget::Current)
    } else if current.has_version(target) {
        Ok(RollbackTarget::Past(target))
    } else {
        Err(WorkflowError::no_version(E::ENTITY, current.id(), target))
    }
}

/// Write the content of snapshot `target` as version `current.version + 1`
pub(crate) async fn replay<R>(
    conn: &mut SqliteConnection,
    current: &R::Entity,
    target: i64,
) -> WorkflowResult<R::Entity>
where
    R: VersionedRepo,
{
    let entity = <R::Entity as Versioned>::ENTITY;
    let snapshot = R::get_version(conn, current.id(), target)
        .await?
        .ok_or_else(|| WorkflowError::no_version(entity, current.id(), target))?;

    let mut working = current.rolled_back_to(&snapshot);
    R::update(conn, &mut working, true).await?;

    tracing::info!(
        entity,
        id = current.id(),
        from = target,
        version = working.version(),
        "Rolled back"
    );
    Ok(working)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tenderhub_core::{Organization, OrganizationType, ServiceType, Tender, TenderDraft, User};
    use tenderhub_persistence::{memory_pool, OrganizationRepo, TenderRepo, UserRepo};

    fn tender_at(version: i64) -> Tender {
        let mut t = Tender::from_draft("t-1", "u-1", TenderDraft::new("org-1", ServiceType::Delivery, "x"));
        t.version = version;
        t
    }

    #[test]
    fn test_rollback_target() {
        let t = tender_at(3);
        assert_eq!(rollback_target(&t, 3).unwrap(), RollbackTarget::Current);
        assert_eq!(rollback_target(&t, 1).unwrap(), RollbackTarget::Past(1));
        assert!(matches!(
            rollback_target(&t, 0),
            Err(WorkflowError::NoVersion { version: 0, .. })
        ));
        assert!(matches!(
            rollback_target(&t, 4),
            Err(WorkflowError::NoVersion { version: 4, .. })
        ));
    }

    #[tokio::test]
    async fn test_replay_writes_snapshot_as_new_version() {
        let pool = memory_pool().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();
        UserRepo::insert(&mut conn, &User::new("u-1", "alice")).await.unwrap();
        OrganizationRepo::insert(&mut conn, &Organization::new("org-1", "Acme", OrganizationType::Llc))
            .await
            .unwrap();

        let mut tender = tender_at(1);
        TenderRepo::insert(&mut conn, &tender).await.unwrap();
        tender.name = "renamed".to_string();
        TenderRepo::update(&mut conn, &mut tender, true).await.unwrap();
        assert_eq!(tender.version, 2);

        let restored = replay::<TenderRepo>(&mut conn, &tender, 1).await.unwrap();
        assert_eq!(restored.version, 3);
        assert_eq!(restored.name, "x");

        let stored = TenderRepo::get_by_id(&mut conn, "t-1").await.unwrap();
        assert_eq!(stored.version, 3);
        assert_eq!(stored.name, "x");
        assert_eq!(TenderRepo::list_versions(&mut conn, "t-1", None).await.unwrap().len(), 3);
    }
}
