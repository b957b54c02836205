//! Bid lifecycle: authorship, edit rights, finality, manual status and
//! reviewer feedback.

mod common;

use common::{user_id, Fixture};
use tenderhub_core::{
    AuthorType, BidDraft, BidPatch, BidStatus, Decision, Pagination, ReviewFilter, ServiceType,
    TenderDraft, TenderStatus,
};
use tenderhub_persistence::ApprovalRepo;
use tenderhub_workflow::{ErrorKind, WorkflowError};

fn describe(text: &str) -> BidPatch {
    BidPatch {
        description: Some(text.to_string()),
        ..BidPatch::default()
    }
}

#[tokio::test]
async fn test_create_by_user_derives_organization() {
    let fx = Fixture::new().await;
    fx.org_with("acme", &["alice"]).await;
    fx.org_with("globex", &["bob"]).await;
    let tender = fx.published_tender("alice", "acme", "Trucks").await;

    let bid = fx
        .ctx
        .bids()
        .create(BidDraft::by_user(&tender.id, &user_id("bob"), "Offer"))
        .await
        .unwrap();
    assert_eq!(bid.version, 1);
    assert_eq!(bid.status, BidStatus::Created);
    assert_eq!(bid.author_user_id.as_deref(), Some(user_id("bob").as_str()));
    assert_eq!(bid.author_organization_id.as_deref(), Some("globex"));
    assert_eq!(fx.bid_log(&bid.id).await.len(), 1);

    let by_org = fx
        .ctx
        .bids()
        .create(BidDraft::by_organization(&tender.id, "globex", "Corporate offer"))
        .await
        .unwrap();
    assert_eq!(by_org.author_type, AuthorType::Organization);
    assert_eq!(by_org.author_user_id, None);
    assert_eq!(by_org.author_organization_id.as_deref(), Some("globex"));
}

#[tokio::test]
async fn test_create_rejects_unknown_authors_and_hidden_tenders() {
    let fx = Fixture::new().await;
    fx.org_with("acme", &["alice"]).await;
    fx.user("bob").await;
    let published = fx.published_tender("alice", "acme", "Trucks").await;
    let draft_tender = fx
        .ctx
        .tenders()
        .create("alice", TenderDraft::new("acme", ServiceType::Delivery, "Secret"))
        .await
        .unwrap();

    let err = fx
        .ctx
        .bids()
        .create(BidDraft::by_user(&published.id, "user-ghost", "Offer"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidUser);

    let err = fx
        .ctx
        .bids()
        .create(BidDraft::by_organization(&published.id, "ghost-org", "Offer"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidUser);

    let err = fx
        .ctx
        .bids()
        .create(BidDraft::by_user(&draft_tender.id, &user_id("bob"), "Offer"))
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::NoTender(_)));

    let err = fx
        .ctx
        .bids()
        .create(BidDraft::by_user("missing", &user_id("bob"), "Offer"))
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::NoTender(_)));

    // a user without any organization may still bid
    let bid = fx
        .ctx
        .bids()
        .create(BidDraft::by_user(&published.id, &user_id("bob"), "Offer"))
        .await
        .unwrap();
    assert_eq!(bid.author_organization_id, None);
}

#[tokio::test]
async fn test_edit_rights() {
    let fx = Fixture::new().await;
    fx.org_with("acme", &["alice"]).await;
    fx.org_with("globex", &["bob", "carol"]).await;
    fx.user("mallory").await;
    let tender = fx.published_tender("alice", "acme", "Trucks").await;
    let bid = fx.published_bid("bob", &tender.id, "Offer").await;

    // author, then colleague
    let edited = fx.ctx.bids().edit("bob", &bid.id, &describe("by bob")).await.unwrap();
    assert_eq!(edited.version, 3);
    let edited = fx.ctx.bids().edit("carol", &bid.id, &describe("by carol")).await.unwrap();
    assert_eq!(edited.version, 4);
    assert_eq!(edited.name, "Offer");

    let err = fx.ctx.bids().edit("mallory", &bid.id, &describe("x")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);
    let err = fx.ctx.bids().edit("alice", &bid.id, &describe("x")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    let org_bid = fx
        .ctx
        .bids()
        .create(BidDraft::by_organization(&tender.id, "globex", "Corporate"))
        .await
        .unwrap();
    fx.ctx.bids().edit("carol", &org_bid.id, &describe("ok")).await.unwrap();
    let err = fx.ctx.bids().edit("mallory", &org_bid.id, &describe("x")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    let err = fx.ctx.bids().edit("bob", "missing", &describe("x")).await.unwrap_err();
    assert!(matches!(err, WorkflowError::NoBid(_)));
}

#[tokio::test]
async fn test_finalized_bid_rejects_edit_and_rollback() {
    let fx = Fixture::new().await;
    fx.org_with("acme", &["alice"]).await;
    fx.org_with("globex", &["bob"]).await;
    let tender = fx.published_tender("alice", "acme", "Trucks").await;
    let bid = fx.published_bid("bob", &tender.id, "Offer").await;

    let approved = fx
        .ctx
        .approvals()
        .submit_decision("alice", &bid.id, Decision::Approve)
        .await
        .unwrap();
    assert_eq!(approved.status, BidStatus::Approved);

    let err = fx.ctx.bids().edit("bob", &bid.id, &describe("late")).await.unwrap_err();
    assert!(matches!(err, WorkflowError::BidFinalized(_)));

    let err = fx.ctx.bids().rollback("bob", &bid.id, 1).await.unwrap_err();
    assert!(matches!(err, WorkflowError::BidFinalized(_)));

    let err = fx
        .ctx
        .bids()
        .set_status("bob", &bid.id, BidStatus::Canceled)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::BidFinalized(_)));

    let stored = fx.stored_bid(&bid.id).await;
    assert_eq!(stored.version, bid.version);
    assert_eq!(stored.description, "offer");
    assert_eq!(stored.status, BidStatus::Approved);
}

#[tokio::test]
async fn test_bid_rollback() {
    let fx = Fixture::new().await;
    fx.org_with("acme", &["alice"]).await;
    fx.org_with("globex", &["bob"]).await;
    let tender = fx.published_tender("alice", "acme", "Trucks").await;
    let bid = fx.published_bid("bob", &tender.id, "Offer").await;
    fx.ctx
        .bids()
        .edit(
            "bob",
            &bid.id,
            &BidPatch {
                name: Some("Better offer".to_string()),
                description: Some("cheaper".to_string()),
            },
        )
        .await
        .unwrap();

    // version 1 was Created with the original text
    let restored = fx.ctx.bids().rollback("bob", &bid.id, 1).await.unwrap();
    assert_eq!(restored.version, 4);
    assert_eq!(restored.name, "Offer");
    assert_eq!(restored.status, BidStatus::Created);

    let same = fx.ctx.bids().rollback("bob", &bid.id, 4).await.unwrap();
    assert_eq!(same.version, 4);

    let err = fx.ctx.bids().rollback("bob", &bid.id, 5).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoVersion);

    assert_eq!(fx.bid_log(&bid.id).await.len(), 4);
}

#[tokio::test]
async fn test_manual_status_rules() {
    let fx = Fixture::new().await;
    fx.org_with("acme", &["alice", "dave", "erin", "frank"]).await;
    fx.org_with("globex", &["bob"]).await;
    let tender = fx.published_tender("alice", "acme", "Trucks").await;
    let bid = fx.published_bid("bob", &tender.id, "Offer").await;

    // the author cannot approve their own bid
    let err = fx
        .ctx
        .bids()
        .set_status("bob", &bid.id, BidStatus::Approved)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    // members cannot use non-decision statuses unless they can edit
    let err = fx
        .ctx
        .bids()
        .set_status("alice", &bid.id, BidStatus::Canceled)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    let err = fx
        .ctx
        .bids()
        .set_status("alice", &bid.id, BidStatus::Approved)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::QuorumNotReached { approvals: 0, required: 3, .. }
    ));

    // votes recorded directly leave the bid Published with quorum met
    {
        let mut conn = fx.db.pool().acquire().await.unwrap();
        for voter in ["alice", "dave", "erin"] {
            ApprovalRepo::upsert(&mut conn, &bid.id, &user_id(voter), Decision::Approve)
                .await
                .unwrap();
        }
    }

    let approved = fx
        .ctx
        .bids()
        .set_status("alice", &bid.id, BidStatus::Approved)
        .await
        .unwrap();
    assert_eq!(approved.status, BidStatus::Approved);
    assert_eq!(approved.version, bid.version + 1);
    assert_eq!(fx.stored_tender(&tender.id).await.status, TenderStatus::Closed);
    assert_eq!(fx.stored_tender(&tender.id).await.version, tender.version);
}

#[tokio::test]
async fn test_manual_approval_blocked_by_rejection() {
    let fx = Fixture::new().await;
    fx.org_with("acme", &["alice"]).await;
    fx.org_with("globex", &["bob"]).await;
    let tender = fx.published_tender("alice", "acme", "Trucks").await;
    let bid = fx.published_bid("bob", &tender.id, "Offer").await;

    {
        let mut conn = fx.db.pool().acquire().await.unwrap();
        ApprovalRepo::upsert(&mut conn, &bid.id, &user_id("alice"), Decision::Reject)
            .await
            .unwrap();
    }

    let err = fx
        .ctx
        .bids()
        .set_status("alice", &bid.id, BidStatus::Approved)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::BidFinalized(_)));

    // rejecting manually has no quorum gate
    let rejected = fx
        .ctx
        .bids()
        .set_status("alice", &bid.id, BidStatus::Rejected)
        .await
        .unwrap();
    assert_eq!(rejected.status, BidStatus::Rejected);
    assert_eq!(rejected.version, bid.version + 1);
    assert_eq!(fx.stored_tender(&tender.id).await.status, TenderStatus::Published);
}

#[tokio::test]
async fn test_author_can_cancel() {
    let fx = Fixture::new().await;
    fx.org_with("acme", &["alice"]).await;
    fx.org_with("globex", &["bob"]).await;
    let tender = fx.published_tender("alice", "acme", "Trucks").await;
    let bid = fx.published_bid("bob", &tender.id, "Offer").await;

    let canceled = fx
        .ctx
        .bids()
        .set_status("bob", &bid.id, BidStatus::Canceled)
        .await
        .unwrap();
    assert_eq!(canceled.status, BidStatus::Canceled);
    assert_eq!(canceled.version, 3);
    assert_eq!(fx.bid_log(&bid.id).await[0].status, BidStatus::Canceled);
}

#[tokio::test]
async fn test_status_and_listing_visibility() {
    let fx = Fixture::new().await;
    fx.org_with("acme", &["alice"]).await;
    fx.org_with("globex", &["bob"]).await;
    fx.user("mallory").await;
    let tender = fx.published_tender("alice", "acme", "Trucks").await;
    let bid = fx.published_bid("bob", &tender.id, "Offer").await;

    assert_eq!(
        fx.ctx.bids().get_status("bob", &bid.id).await.unwrap(),
        BidStatus::Published
    );
    assert_eq!(
        fx.ctx.bids().get_status("mallory", &bid.id).await.unwrap(),
        BidStatus::Published
    );
    assert_eq!(
        fx.ctx
            .bids()
            .list_for_tender("mallory", &tender.id, Pagination::unlimited())
            .await
            .unwrap()
            .len(),
        1
    );

    fx.ctx
        .tenders()
        .set_status("alice", &tender.id, TenderStatus::Closed)
        .await
        .unwrap();

    // closed tender: only members and the author still see the bid
    assert_eq!(
        fx.ctx.bids().get_status("bob", &bid.id).await.unwrap(),
        BidStatus::Published
    );
    assert_eq!(
        fx.ctx.bids().get_status("alice", &bid.id).await.unwrap(),
        BidStatus::Published
    );
    let err = fx.ctx.bids().get_status("mallory", &bid.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);
    let err = fx
        .ctx
        .bids()
        .list_for_tender("mallory", &tender.id, Pagination::unlimited())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    let mine = fx.ctx.bids().list_mine("bob", Pagination::unlimited()).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert!(fx
        .ctx
        .bids()
        .list_mine("mallory", Pagination::unlimited())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_feedback_and_author_reviews() {
    let fx = Fixture::new().await;
    fx.org_with("acme", &["alice", "dave"]).await;
    fx.org_with("globex", &["bob"]).await;
    fx.user("mallory").await;
    let tender = fx.published_tender("alice", "acme", "Trucks").await;
    let bid = fx.published_bid("bob", &tender.id, "Offer").await;

    let returned = fx.ctx.bids().feedback("alice", &bid.id, "too pricey").await.unwrap();
    assert_eq!(returned.version, bid.version);
    fx.ctx.bids().feedback("alice", &bid.id, "acceptable").await.unwrap();
    fx.ctx.bids().feedback("dave", &bid.id, "fine").await.unwrap();
    assert_eq!(fx.stored_bid(&bid.id).await.version, bid.version);

    let err = fx.ctx.bids().feedback("mallory", &bid.id, "spam").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    let reviews = fx
        .ctx
        .bids()
        .author_reviews("alice", "bob", &tender.id, Pagination::unlimited())
        .await
        .unwrap();
    assert_eq!(reviews.len(), 2);
    assert!(reviews
        .iter()
        .any(|r| r.user_id == user_id("alice") && r.text == "acceptable"));

    let err = fx
        .ctx
        .bids()
        .author_reviews("mallory", "bob", &tender.id, Pagination::unlimited())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    let err = fx
        .ctx
        .bids()
        .author_reviews("alice", "ghost", &tender.id, Pagination::unlimited())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidUser);
}

#[tokio::test]
async fn test_version_history_requires_edit_rights() {
    let fx = Fixture::new().await;
    fx.org_with("acme", &["alice"]).await;
    fx.org_with("globex", &["bob"]).await;
    let tender = fx.published_tender("alice", "acme", "Trucks").await;
    let bid = fx.published_bid("bob", &tender.id, "Offer").await;

    let history = fx.ctx.bids().versions("bob", &bid.id, None).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].status, BidStatus::Published);

    let err = fx.ctx.bids().versions("alice", &bid.id, None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);
}

#[tokio::test]
async fn test_review_ledger_filters() {
    let fx = Fixture::new().await;
    fx.org_with("acme", &["alice", "dave"]).await;
    fx.org_with("globex", &["bob", "carol"]).await;
    let tender = fx.published_tender("alice", "acme", "Trucks").await;
    let other = fx.published_tender("alice", "acme", "Cranes").await;
    let bob_bid = fx.published_bid("bob", &tender.id, "Offer").await;
    let carol_bid = fx.published_bid("carol", &other.id, "Counter").await;

    let ledger = fx.ctx.reviews();
    ledger.add_review(&bob_bid.id, &user_id("alice"), "first").await.unwrap();
    ledger.add_review(&bob_bid.id, &user_id("alice"), "second").await.unwrap();
    ledger.add_review(&bob_bid.id, &user_id("dave"), "ok").await.unwrap();
    ledger.add_review(&carol_bid.id, &user_id("dave"), "meh").await.unwrap();

    let all = ledger
        .list_reviews(&ReviewFilter::default(), Pagination::unlimited())
        .await
        .unwrap();
    assert_eq!(all.len(), 3);

    let on_tender = ledger
        .list_reviews(&ReviewFilter::default().for_tender(&tender.id), Pagination::unlimited())
        .await
        .unwrap();
    assert_eq!(on_tender.len(), 2);
    assert!(on_tender.iter().any(|r| r.text == "second"));

    let by_dave = ledger
        .list_reviews(
            &ReviewFilter::default().by_reviewer(&user_id("dave")),
            Pagination::new(1, 0),
        )
        .await
        .unwrap();
    assert_eq!(by_dave.len(), 1);

    let for_carol = ledger
        .list_reviews(
            &ReviewFilter::default().for_author(&user_id("carol")),
            Pagination::unlimited(),
        )
        .await
        .unwrap();
    assert_eq!(for_carol.len(), 1);
    assert_eq!(for_carol[0].bid_id, carol_bid.id);
}
