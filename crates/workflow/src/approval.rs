//! Approval tally - decision submission and the approval cascade.
//!
//! Each employee of the tender's organization holds one vote per bid; a
//! later vote replaces the earlier one. After every vote the bid's outcome
//! is recomputed: one rejection vetoes, otherwise quorum approves. Both
//! automatic transitions rewrite the bid in place without a new version.
//!
//! A bid reaching Approved closes its tender. That rule lives here only,
//! in [`close_tender`], and is shared with the manual status path.

use crate::authz::AuthorizationResolver;
use crate::context::ServiceContext;
use crate::error::{WorkflowError, WorkflowResult};
use crate::tender::load_tender;
use sqlx::SqliteConnection;
use tenderhub_core::{
    Bid, BidApproval, BidStatus, Decision, Tally, TallyOutcome, Tender, TenderStatus, QUORUM,
};
use tenderhub_persistence::{ApprovalRepo, BidRepo, MembershipRepo, TenderRepo, VersionedRepo};

/// Fetch a bid or fail with `NoBid`
pub(crate) async fn load_bid(conn: &mut SqliteConnection, bid_id: &str) -> WorkflowResult<Bid> {
    BidRepo::find_by_id(conn, bid_id)
        .await?
        .ok_or_else(|| WorkflowError::NoBid(bid_id.to_string()))
}

/// Close the tender of a freshly approved bid, without a version bump
pub(crate) async fn close_tender(conn: &mut SqliteConnection, tender: &mut Tender) -> WorkflowResult<()> {
    if tender.is_closed() {
        return Ok(());
    }
    let previous = tender.status;
    tender.status = TenderStatus::Closed;
    TenderRepo::update(conn, tender, false).await?;
    tracing::info!(tender_id = %tender.id, from = %previous, "Tender closed by approved bid");
    Ok(())
}

/// Vote counts for a bid together with the owning organization's size
pub(crate) async fn current_tally(
    conn: &mut SqliteConnection,
    bid_id: &str,
    organization_id: &str,
) -> WorkflowResult<(Tally, i64)> {
    let tally = ApprovalRepo::tally(conn, bid_id).await?;
    let employees = MembershipRepo::employee_count(conn, organization_id).await?;
    Ok((tally, employees))
}

/// Approvals needed for an organization of `employee_count` members
pub fn required_approvals(employee_count: i64) -> i64 {
    QUORUM.min(employee_count)
}

/// Approval Tally - decision submission on bids
pub struct ApprovalTally<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ApprovalTally<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Record `username`'s decision on a bid and apply its consequences.
    ///
    /// Returns the bid as it stands after the vote; it stays Published
    /// while quorum is not reached.
    pub async fn submit_decision(
        &self,
        username: &str,
        bid_id: &str,
        decision: Decision,
    ) -> WorkflowResult<Bid> {
        tracing::debug!(op = "bid.submit_decision", username, bid_id, decision = %decision);
        let mut tx = self.ctx.begin().await?;

        let user = AuthorizationResolver::resolve_user(&mut tx, username).await?;
        let mut bid = load_bid(&mut tx, bid_id).await?;
        if !bid.status.accepts_decisions() {
            return Err(WorkflowError::forbidden(username, "decide on an unpublished bid"));
        }
        let opposing = match bid.status {
            BidStatus::Approved => decision != Decision::Approve,
            BidStatus::Rejected => decision != Decision::Reject,
            _ => false,
        };
        if opposing {
            return Err(WorkflowError::bid_finalized(bid_id));
        }

        let mut tender = load_tender(&mut tx, &bid.tender_id).await?;
        if !AuthorizationResolver::is_member(&mut tx, &user.id, &tender.organization_id).await? {
            return Err(WorkflowError::forbidden(username, "decide on bids for this tender"));
        }

        ApprovalRepo::upsert(&mut tx, bid_id, &user.id, decision).await?;
        let (tally, employees) = current_tally(&mut tx, bid_id, &tender.organization_id).await?;
        tracing::debug!(bid_id, approvals = tally.approvals, rejections = tally.rejections, employees, "Tally");

        let previous = bid.status;
        match tally.evaluate(employees) {
            TallyOutcome::Rejected if previous != BidStatus::Rejected => {
                bid.status = BidStatus::Rejected;
                BidRepo::update(&mut tx, &mut bid, false).await?;
            }
            TallyOutcome::Approved if previous != BidStatus::Approved => {
                bid.status = BidStatus::Approved;
                BidRepo::update(&mut tx, &mut bid, false).await?;
                close_tender(&mut tx, &mut tender).await?;
            }
            _ => {}
        }
        tx.commit().await?;

        if bid.status != previous {
            tracing::info!(bid_id, from = %previous, to = %bid.status, "Bid decided by vote");
        } else {
            tracing::info!(bid_id, decision = %decision, "Vote recorded");
        }
        Ok(bid)
    }

    /// Votes recorded on a bid; members of the tender's organization only
    pub async fn votes(&self, username: &str, bid_id: &str) -> WorkflowResult<Vec<BidApproval>> {
        tracing::debug!(op = "bid.votes", username, bid_id);
        let mut conn = self.ctx.acquire().await?;

        let user = AuthorizationResolver::resolve_user(&mut conn, username).await?;
        let bid = load_bid(&mut conn, bid_id).await?;
        let tender = load_tender(&mut conn, &bid.tender_id).await?;
        if !AuthorizationResolver::is_member(&mut conn, &user.id, &tender.organization_id).await? {
            return Err(WorkflowError::forbidden(username, "view votes on this bid"));
        }
        Ok(ApprovalRepo::list_for_bid(&mut conn, bid_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_approvals() {
        assert_eq!(required_approvals(1), 1);
        assert_eq!(required_approvals(2), 2);
        assert_eq!(required_approvals(3), 3);
        assert_eq!(required_approvals(10), 3);
    }
}
