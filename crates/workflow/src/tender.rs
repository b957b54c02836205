//! Tender workflow - creation, visibility, status, edits and rollback.
//!
//! Status rule: any requested status is accepted until the tender is
//! Closed; after that only Closed itself is. Closing does not create a new
//! version, every other status change does.

use crate::authz::AuthorizationResolver;
use crate::context::ServiceContext;
use crate::error::{WorkflowError, WorkflowResult};
use crate::versioned::{replay, rollback_target, RollbackTarget};
use sqlx::SqliteConnection;
use tenderhub_core::{
    Pagination, ServiceType, Tender, TenderDraft, TenderPatch, TenderStatus, User,
};
use tenderhub_persistence::{TenderFilter, TenderRepo, VersionedRepo};
use uuid::Uuid;

/// Fetch a tender or fail with `NoTender`
pub(crate) async fn load_tender(conn: &mut SqliteConnection, tender_id: &str) -> WorkflowResult<Tender> {
    TenderRepo::find_by_id(conn, tender_id)
        .await?
        .ok_or_else(|| WorkflowError::NoTender(tender_id.to_string()))
}

/// Members of the owning organization see everything; others see only
/// published tenders.
pub(crate) async fn can_view(conn: &mut SqliteConnection, user: &User, tender: &Tender) -> WorkflowResult<bool> {
    if tender.is_published() {
        return Ok(true);
    }
    AuthorizationResolver::is_member(conn, &user.id, &tender.organization_id).await
}

async fn require_member(
    conn: &mut SqliteConnection,
    user: &User,
    tender: &Tender,
    action: &'static str,
) -> WorkflowResult<()> {
    if AuthorizationResolver::is_member(conn, &user.id, &tender.organization_id).await? {
        Ok(())
    } else {
        Err(WorkflowError::forbidden(&user.username, action))
    }
}

/// Tender Workflow - operations on tenders
pub struct TenderWorkflow<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> TenderWorkflow<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create a tender on behalf of a member of `draft.organization_id`
    pub async fn create(&self, username: &str, draft: TenderDraft) -> WorkflowResult<Tender> {
        tracing::debug!(op = "tender.create", username, organization_id = %draft.organization_id);
        let mut tx = self.ctx.begin().await?;

        let user = AuthorizationResolver::resolve_user(&mut tx, username).await?;
        if !AuthorizationResolver::is_member(&mut tx, &user.id, &draft.organization_id).await? {
            return Err(WorkflowError::forbidden(username, "create tenders for this organization"));
        }

        let tender = Tender::from_draft(&Uuid::new_v4().to_string(), &user.id, draft);
        TenderRepo::insert(&mut tx, &tender).await?;
        tx.commit().await?;

        tracing::info!(tender_id = %tender.id, author = %user.id, "Tender created");
        Ok(tender)
    }

    /// All tenders, optionally restricted to some service types. No identity required.
    pub async fn list(
        &self,
        service_types: &[ServiceType],
        page: Pagination,
    ) -> WorkflowResult<Vec<Tender>> {
        tracing::debug!(op = "tender.list", ?service_types, limit = page.limit, offset = page.offset);
        let mut conn = self.ctx.acquire().await?;
        let filter = TenderFilter::service_types(service_types);
        Ok(TenderRepo::list(&mut conn, &filter, page).await?)
    }

    /// Tenders authored by `username`
    pub async fn list_mine(&self, username: &str, page: Pagination) -> WorkflowResult<Vec<Tender>> {
        tracing::debug!(op = "tender.list_mine", username);
        let mut conn = self.ctx.acquire().await?;
        let user = AuthorizationResolver::resolve_user(&mut conn, username).await?;
        Ok(TenderRepo::list(&mut conn, &TenderFilter::author(&user.id), page).await?)
    }

    pub async fn get_status(&self, username: &str, tender_id: &str) -> WorkflowResult<TenderStatus> {
        tracing::debug!(op = "tender.get_status", username, tender_id);
        let mut conn = self.ctx.acquire().await?;

        let user = AuthorizationResolver::resolve_user(&mut conn, username).await?;
        let tender = load_tender(&mut conn, tender_id).await?;
        if !can_view(&mut conn, &user, &tender).await? {
            return Err(WorkflowError::forbidden(username, "view this tender"));
        }
        Ok(tender.status)
    }

    pub async fn set_status(
        &self,
        username: &str,
        tender_id: &str,
        status: TenderStatus,
    ) -> WorkflowResult<Tender> {
        tracing::debug!(op = "tender.set_status", username, tender_id, status = %status);
        let mut tx = self.ctx.begin().await?;

        let user = AuthorizationResolver::resolve_user(&mut tx, username).await?;
        let mut tender = load_tender(&mut tx, tender_id).await?;
        if tender.is_closed() && !status.is_closed() {
            return Err(WorkflowError::tender_finalized(tender_id));
        }
        require_member(&mut tx, &user, &tender, "change tender status").await?;

        let previous = tender.status;
        tender.status = status;
        TenderRepo::update(&mut tx, &mut tender, !status.is_closed()).await?;
        tx.commit().await?;

        tracing::info!(tender_id, from = %previous, to = %status, version = tender.version, "Tender status changed");
        Ok(tender)
    }

    /// Apply the fields present in `patch` as a new version
    pub async fn edit(
        &self,
        username: &str,
        tender_id: &str,
        patch: &TenderPatch,
    ) -> WorkflowResult<Tender> {
        tracing::debug!(op = "tender.edit", username, tender_id);
        let mut tx = self.ctx.begin().await?;

        let user = AuthorizationResolver::resolve_user(&mut tx, username).await?;
        let mut tender = load_tender(&mut tx, tender_id).await?;
        require_member(&mut tx, &user, &tender, "edit this tender").await?;
        if tender.is_closed() {
            return Err(WorkflowError::tender_finalized(tender_id));
        }

        tender.apply(patch);
        TenderRepo::update(&mut tx, &mut tender, true).await?;
        tx.commit().await?;

        tracing::info!(tender_id, version = tender.version, "Tender edited");
        Ok(tender)
    }

    /// Replay the content of `version` as a new version.
    ///
    /// Asking for the current version returns the tender untouched, even
    /// when it is closed.
    pub async fn rollback(&self, username: &str, tender_id: &str, version: i64) -> WorkflowResult<Tender> {
        tracing::debug!(op = "tender.rollback", username, tender_id, version);
        let mut tx = self.ctx.begin().await?;

        let user = AuthorizationResolver::resolve_user(&mut tx, username).await?;
        let tender = load_tender(&mut tx, tender_id).await?;
        require_member(&mut tx, &user, &tender, "roll back this tender").await?;

        let target = match rollback_target(&tender, version)? {
            RollbackTarget::Current => return Ok(tender),
            RollbackTarget::Past(target) => target,
        };
        if tender.is_closed() {
            return Err(WorkflowError::tender_finalized(tender_id));
        }

        let restored = replay::<TenderRepo>(&mut tx, &tender, target).await?;
        tx.commit().await?;
        Ok(restored)
    }

    /// Version log of a tender, newest first; members only
    pub async fn versions(
        &self,
        username: &str,
        tender_id: &str,
        version: Option<i64>,
    ) -> WorkflowResult<Vec<Tender>> {
        tracing::debug!(op = "tender.versions", username, tender_id, ?version);
        let mut conn = self.ctx.acquire().await?;

        let user = AuthorizationResolver::resolve_user(&mut conn, username).await?;
        let tender = load_tender(&mut conn, tender_id).await?;
        require_member(&mut conn, &user, &tender, "view tender history").await?;

        Ok(TenderRepo::list_versions(&mut conn, tender_id, version).await?)
    }
}
