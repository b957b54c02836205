//! Bid workflow - creation, visibility, edits, rollback, manual status
//! changes and reviewer feedback.
//!
//! Approved and Rejected are terminal for edits, rollback and manual
//! status changes. Votes are handled by [`crate::approval::ApprovalTally`].

use crate::approval::{close_tender, current_tally, load_bid, required_approvals};
use crate::authz::AuthorizationResolver;
use crate::context::ServiceContext;
use crate::error::{WorkflowError, WorkflowResult};
use crate::review;
use crate::tender::{can_view, load_tender};
use crate::versioned::{replay, rollback_target, RollbackTarget};
use sqlx::SqliteConnection;
use tenderhub_core::{
    AuthorType, Bid, BidDraft, BidPatch, BidReview, BidStatus, Pagination, ReviewFilter, User,
};
use tenderhub_persistence::{BidRepo, VersionedRepo};
use uuid::Uuid;

async fn require_edit_rights(
    conn: &mut SqliteConnection,
    user: &User,
    bid: &Bid,
    action: &'static str,
) -> WorkflowResult<()> {
    if AuthorizationResolver::can_edit(conn, user, bid).await? {
        Ok(())
    } else {
        Err(WorkflowError::forbidden(&user.username, action))
    }
}

fn require_open(bid: &Bid) -> WorkflowResult<()> {
    if bid.is_final() {
        Err(WorkflowError::bid_finalized(&bid.id))
    } else {
        Ok(())
    }
}

/// Bid Workflow - operations on bids
pub struct BidWorkflow<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> BidWorkflow<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create a bid against a published tender.
    ///
    /// A user author must exist and lends the bid their first organization;
    /// an organization author must exist. Tenders that are not published
    /// are reported as missing.
    pub async fn create(&self, draft: BidDraft) -> WorkflowResult<Bid> {
        tracing::debug!(
            op = "bid.create",
            tender_id = %draft.tender_id,
            author_type = %draft.author_type,
            author_id = %draft.author_id
        );
        let mut tx = self.ctx.begin().await?;

        let member_of = match draft.author_type {
            AuthorType::User => {
                let author = AuthorizationResolver::resolve_user_id(&mut tx, &draft.author_id).await?;
                AuthorizationResolver::organization_of(&mut tx, &author.id).await?
            }
            AuthorType::Organization => {
                AuthorizationResolver::resolve_organization(&mut tx, &draft.author_id).await?;
                None
            }
        };

        let tender = load_tender(&mut tx, &draft.tender_id).await?;
        if !tender.is_published() {
            tracing::warn!(tender_id = %tender.id, status = %tender.status, "Refused: tender not published");
            return Err(WorkflowError::NoTender(tender.id));
        }

        let bid = Bid::from_draft(&Uuid::new_v4().to_string(), draft, member_of);
        BidRepo::insert(&mut tx, &bid).await?;
        tx.commit().await?;

        tracing::info!(bid_id = %bid.id, tender_id = %bid.tender_id, "Bid created");
        Ok(bid)
    }

    /// Bids whose author id is the user's id
    pub async fn list_mine(&self, username: &str, page: Pagination) -> WorkflowResult<Vec<Bid>> {
        tracing::debug!(op = "bid.list_mine", username);
        let mut conn = self.ctx.acquire().await?;
        let user = AuthorizationResolver::resolve_user(&mut conn, username).await?;
        Ok(BidRepo::list_by_author(&mut conn, &user.id, page).await?)
    }

    pub async fn list_for_tender(
        &self,
        username: &str,
        tender_id: &str,
        page: Pagination,
    ) -> WorkflowResult<Vec<Bid>> {
        tracing::debug!(op = "bid.list_for_tender", username, tender_id);
        let mut conn = self.ctx.acquire().await?;

        let user = AuthorizationResolver::resolve_user(&mut conn, username).await?;
        let tender = load_tender(&mut conn, tender_id).await?;
        if !can_view(&mut conn, &user, &tender).await? {
            return Err(WorkflowError::forbidden(username, "view bids on this tender"));
        }
        Ok(BidRepo::list_by_tender(&mut conn, tender_id, page).await?)
    }

    pub async fn get_status(&self, username: &str, bid_id: &str) -> WorkflowResult<BidStatus> {
        tracing::debug!(op = "bid.get_status", username, bid_id);
        let mut conn = self.ctx.acquire().await?;

        let user = AuthorizationResolver::resolve_user(&mut conn, username).await?;
        let bid = load_bid(&mut conn, bid_id).await?;
        if user.id == bid.author_id {
            return Ok(bid.status);
        }

        let tender = load_tender(&mut conn, &bid.tender_id).await?;
        if !can_view(&mut conn, &user, &tender).await? {
            return Err(WorkflowError::forbidden(username, "view this bid"));
        }
        Ok(bid.status)
    }

    pub async fn edit(&self, username: &str, bid_id: &str, patch: &BidPatch) -> WorkflowResult<Bid> {
        tracing::debug!(op = "bid.edit", username, bid_id);
        let mut tx = self.ctx.begin().await?;

        let user = AuthorizationResolver::resolve_user(&mut tx, username).await?;
        let mut bid = load_bid(&mut tx, bid_id).await?;
        require_open(&bid)?;
        require_edit_rights(&mut tx, &user, &bid, "edit this bid").await?;

        bid.apply(patch);
        BidRepo::update(&mut tx, &mut bid, true).await?;
        tx.commit().await?;

        tracing::info!(bid_id, version = bid.version, "Bid edited");
        Ok(bid)
    }

    /// Replay the content of `version` as a new version
    pub async fn rollback(&self, username: &str, bid_id: &str, version: i64) -> WorkflowResult<Bid> {
        tracing::debug!(op = "bid.rollback", username, bid_id, version);
        let mut tx = self.ctx.begin().await?;

        let user = AuthorizationResolver::resolve_user(&mut tx, username).await?;
        let bid = load_bid(&mut tx, bid_id).await?;
        require_open(&bid)?;
        require_edit_rights(&mut tx, &user, &bid, "roll back this bid").await?;

        let target = match rollback_target(&bid, version)? {
            RollbackTarget::Current => return Ok(bid),
            RollbackTarget::Past(target) => target,
        };

        let restored = replay::<BidRepo>(&mut tx, &bid, target).await?;
        tx.commit().await?;
        Ok(restored)
    }

    /// Manual status change.
    ///
    /// Approving or rejecting requires membership in the tender's
    /// organization, and approving additionally requires a satisfied
    /// quorum with no rejection on record. Other statuses require edit
    /// rights. Always creates a new version.
    pub async fn set_status(&self, username: &str, bid_id: &str, status: BidStatus) -> WorkflowResult<Bid> {
        tracing::debug!(op = "bid.set_status", username, bid_id, status = %status);
        let mut tx = self.ctx.begin().await?;

        let user = AuthorizationResolver::resolve_user(&mut tx, username).await?;
        let mut bid = load_bid(&mut tx, bid_id).await?;
        require_open(&bid)?;

        let mut approved_tender = None;
        if status.is_final() {
            let tender = load_tender(&mut tx, &bid.tender_id).await?;
            if !AuthorizationResolver::is_member(&mut tx, &user.id, &tender.organization_id).await? {
                return Err(WorkflowError::forbidden(username, "decide on bids for this tender"));
            }
            if status == BidStatus::Approved {
                let (tally, employees) = current_tally(&mut tx, bid_id, &tender.organization_id).await?;
                if tally.rejections > 0 {
                    return Err(WorkflowError::bid_finalized(bid_id));
                }
                if !tally.quorum_reached(employees) {
                    return Err(WorkflowError::quorum_not_reached(
                        bid_id,
                        tally.approvals,
                        required_approvals(employees),
                    ));
                }
                approved_tender = Some(tender);
            }
        } else {
            require_edit_rights(&mut tx, &user, &bid, "change bid status").await?;
        }

        let previous = bid.status;
        bid.status = status;
        BidRepo::update(&mut tx, &mut bid, true).await?;
        if let Some(mut tender) = approved_tender {
            close_tender(&mut tx, &mut tender).await?;
        }
        tx.commit().await?;

        tracing::info!(bid_id, from = %previous, to = %status, version = bid.version, "Bid status changed");
        Ok(bid)
    }

    /// Leave feedback on a bid as a member of the tender's organization.
    /// The bid itself is returned unchanged.
    pub async fn feedback(&self, username: &str, bid_id: &str, text: &str) -> WorkflowResult<Bid> {
        tracing::debug!(op = "bid.feedback", username, bid_id);
        let mut tx = self.ctx.begin().await?;

        let user = AuthorizationResolver::resolve_user(&mut tx, username).await?;
        let bid = load_bid(&mut tx, bid_id).await?;
        let tender = load_tender(&mut tx, &bid.tender_id).await?;
        if !AuthorizationResolver::is_member(&mut tx, &user.id, &tender.organization_id).await? {
            return Err(WorkflowError::forbidden(username, "review bids for this tender"));
        }

        review::record(&mut tx, bid_id, &user.id, text).await?;
        tx.commit().await?;
        Ok(bid)
    }

    /// Version log of a bid, newest first; requires edit rights
    pub async fn versions(
        &self,
        username: &str,
        bid_id: &str,
        version: Option<i64>,
    ) -> WorkflowResult<Vec<Bid>> {
        tracing::debug!(op = "bid.versions", username, bid_id, ?version);
        let mut conn = self.ctx.acquire().await?;

        let user = AuthorizationResolver::resolve_user(&mut conn, username).await?;
        let bid = load_bid(&mut conn, bid_id).await?;
        require_edit_rights(&mut conn, &user, &bid, "view bid history").await?;

        Ok(BidRepo::list_versions(&mut conn, bid_id, version).await?)
    }

    /// Reviews left on bids authored by `author_username`, visible to
    /// members of the organization owning `tender_id`
    pub async fn author_reviews(
        &self,
        requester_username: &str,
        author_username: &str,
        tender_id: &str,
        page: Pagination,
    ) -> WorkflowResult<Vec<BidReview>> {
        tracing::debug!(op = "bid.author_reviews", requester_username, author_username, tender_id);
        let mut conn = self.ctx.acquire().await?;

        let requester = AuthorizationResolver::resolve_user(&mut conn, requester_username).await?;
        let author = AuthorizationResolver::resolve_user(&mut conn, author_username).await?;
        let tender = load_tender(&mut conn, tender_id).await?;
        if !AuthorizationResolver::is_member(&mut conn, &requester.id, &tender.organization_id).await? {
            return Err(WorkflowError::forbidden(requester_username, "read reviews for this tender"));
        }

        let filter = ReviewFilter::default().for_author(&author.id);
        review::matching(&mut conn, &filter, page).await
    }
}
