//! Shared fixture: a migrated SQLite file in a temporary directory plus
//! helpers for seeding the directory and driving entities into shape.

#![allow(dead_code)]

use tempfile::TempDir;
use tenderhub_core::{
    Bid, BidDraft, BidStatus, Organization, OrganizationType, ServiceType, Tender, TenderDraft,
    TenderStatus, User,
};
use tenderhub_persistence::{
    BidRepo, Database, DatabaseConfig, MembershipRepo, OrganizationRepo, TenderRepo, UserRepo,
    VersionedRepo,
};
use tenderhub_workflow::ServiceContext;

pub struct Fixture {
    _dir: TempDir,
    pub db: Database,
    pub ctx: ServiceContext,
}

pub fn user_id(username: &str) -> String {
    format!("user-{}", username)
}

impl Fixture {
    pub async fn new() -> Self {
        Self::with_connections(1).await
    }

    pub async fn with_connections(max_connections: u32) -> Self {
        let dir = TempDir::new().unwrap();
        let url = format!("sqlite:{}", dir.path().join("tenderhub.db").display());
        let config = DatabaseConfig::new(url).with_max_connections(max_connections);
        let db = Database::connect(&config).await.unwrap();
        let ctx = ServiceContext::new(&db);
        Self { _dir: dir, db, ctx }
    }

    pub async fn user(&self, username: &str) -> User {
        let user = User::new(&user_id(username), username);
        let mut conn = self.db.pool().acquire().await.unwrap();
        UserRepo::insert(&mut conn, &user).await.unwrap();
        user
    }

    pub async fn org(&self, id: &str) -> Organization {
        let org = Organization::new(id, &format!("{} Ltd", id), OrganizationType::Llc);
        let mut conn = self.db.pool().acquire().await.unwrap();
        OrganizationRepo::insert(&mut conn, &org).await.unwrap();
        org
    }

    pub async fn join(&self, org_id: &str, username: &str) {
        let mut conn = self.db.pool().acquire().await.unwrap();
        MembershipRepo::add_member(&mut conn, org_id, &user_id(username))
            .await
            .unwrap();
    }

    /// Organization `org_id` with freshly created employees `usernames`
    pub async fn org_with(&self, org_id: &str, usernames: &[&str]) -> Organization {
        let org = self.org(org_id).await;
        for username in usernames {
            self.user(username).await;
            self.join(org_id, username).await;
        }
        org
    }

    /// Published tender of `org_id`, created by `author`
    pub async fn published_tender(&self, author: &str, org_id: &str, name: &str) -> Tender {
        let draft = TenderDraft::new(org_id, ServiceType::Construction, name)
            .with_description("initial");
        let tender = self.ctx.tenders().create(author, draft).await.unwrap();
        self.ctx
            .tenders()
            .set_status(author, &tender.id, TenderStatus::Published)
            .await
            .unwrap()
    }

    /// Published bid by user `author` on `tender_id`
    pub async fn published_bid(&self, author: &str, tender_id: &str, name: &str) -> Bid {
        let draft = BidDraft::by_user(tender_id, &user_id(author), name).with_description("offer");
        let bid = self.ctx.bids().create(draft).await.unwrap();
        self.ctx
            .bids()
            .set_status(author, &bid.id, BidStatus::Published)
            .await
            .unwrap()
    }

    pub async fn stored_tender(&self, id: &str) -> Tender {
        let mut conn = self.db.pool().acquire().await.unwrap();
        TenderRepo::get_by_id(&mut conn, id).await.unwrap()
    }

    pub async fn stored_bid(&self, id: &str) -> Bid {
        let mut conn = self.db.pool().acquire().await.unwrap();
        BidRepo::get_by_id(&mut conn, id).await.unwrap()
    }

    pub async fn tender_log(&self, id: &str) -> Vec<Tender> {
        let mut conn = self.db.pool().acquire().await.unwrap();
        TenderRepo::list_versions(&mut conn, id, None).await.unwrap()
    }

    pub async fn bid_log(&self, id: &str) -> Vec<Bid> {
        let mut conn = self.db.pool().acquire().await.unwrap();
        BidRepo::list_versions(&mut conn, id, None).await.unwrap()
    }
}
