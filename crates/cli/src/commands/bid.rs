//! Bid commands

use anyhow::Result;
use tenderhub_core::{BidDraft, BidPatch};
use tenderhub_persistence::Database;
use tenderhub_workflow::ServiceContext;

use super::print_json;
use crate::BidAction;

/// Handle bid subcommands
pub async fn handle(db: &Database, action: BidAction) -> Result<()> {
    let ctx = ServiceContext::new(db);
    let bids = ctx.bids();

    match action {
        BidAction::Create {
            tender,
            author_type,
            author_id,
            name,
            description,
        } => {
            let draft = BidDraft::new(&tender, author_type.to_core_type(), &author_id, &name)
                .with_description(&description);
            print_json(&bids.create(draft).await?)?;
        }
        BidAction::Mine { username, page } => {
            print_json(&bids.list_mine(&username, page.to_pagination()).await?)?;
        }
        BidAction::List {
            username,
            tender_id,
            page,
        } => {
            let list = bids
                .list_for_tender(&username, &tender_id, page.to_pagination())
                .await?;
            print_json(&list)?;
        }
        BidAction::Status { username, bid_id } => {
            print_json(&bids.get_status(&username, &bid_id).await?)?;
        }
        BidAction::SetStatus {
            username,
            bid_id,
            status,
        } => {
            print_json(&bids.set_status(&username, &bid_id, status.to_core_type()).await?)?;
        }
        BidAction::Edit {
            username,
            bid_id,
            name,
            description,
        } => {
            let patch = BidPatch { name, description };
            print_json(&bids.edit(&username, &bid_id, &patch).await?)?;
        }
        BidAction::Rollback {
            username,
            bid_id,
            target_version,
        } => {
            print_json(&bids.rollback(&username, &bid_id, target_version).await?)?;
        }
        BidAction::Decide {
            username,
            bid_id,
            decision,
        } => {
            let bid = ctx
                .approvals()
                .submit_decision(&username, &bid_id, decision.to_core_type())
                .await?;
            print_json(&bid)?;
        }
        BidAction::Votes { username, bid_id } => {
            print_json(&ctx.approvals().votes(&username, &bid_id).await?)?;
        }
        BidAction::Feedback {
            username,
            bid_id,
            text,
        } => {
            print_json(&bids.feedback(&username, &bid_id, &text).await?)?;
        }
        BidAction::Versions {
            username,
            bid_id,
            at_version,
        } => {
            print_json(&bids.versions(&username, &bid_id, at_version).await?)?;
        }
        BidAction::Reviews {
            requester,
            author,
            tender_id,
            page,
        } => {
            let reviews = bids
                .author_reviews(&requester, &author, &tender_id, page.to_pagination())
                .await?;
            print_json(&reviews)?;
        }
    }

    Ok(())
}
