//! SQLite persistence module
//!
//! Repository pattern for SQLite access. Every repository function takes a
//! `&mut SqliteConnection`, so callers decide whether it runs on a pooled
//! connection or inside their own transaction.

pub mod bids;
pub mod directory;
pub mod ledgers;
pub mod pool;
pub mod schema;
pub mod tenders;
pub mod versioned;

pub use bids::BidRepo;
pub use directory::{MembershipRepo, OrganizationRepo, UserRepo};
pub use ledgers::{ApprovalRepo, ReviewRepo};
pub use pool::{
    create_pool, init_database, memory_pool, run_migrations, DatabaseConfig, DEFAULT_DATABASE_URL,
};
pub use tenders::{TenderFilter, TenderRepo};
pub use versioned::VersionedRepo;
