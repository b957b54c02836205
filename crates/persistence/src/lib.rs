//! # TenderHub Persistence
//!
//! SQLite storage for the tender/bid workflow.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Database                             │
//! │  ┌────────────┐   ┌──────────────────┐   ┌────────────────┐  │
//! │  │ directory  │   │  versioned repos │   │    ledgers     │  │
//! │  │ users/orgs │   │  tenders + log   │   │ votes/reviews  │  │
//! │  │ members    │   │  bids + log      │   │                │  │
//! │  └────────────┘   └──────────────────┘   └────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tenderhub_persistence::{Database, DatabaseConfig, TenderRepo};
//!
//! let db = Database::connect(&DatabaseConfig::default()).await?;
//! let mut tx = db.pool().begin().await?;
//! let tender = TenderRepo::get_by_id(&mut tx, "…").await?;
//! tx.commit().await?;
//! ```

pub mod error;
pub mod sqlite;

pub use error::{PersistenceError, PersistenceResult};
pub use sqlite::schema::{ApprovalRow, BidRow, OrganizationRow, ReviewRow, TenderRow, UserRow};
pub use sqlite::{
    create_pool, init_database, memory_pool, run_migrations, ApprovalRepo, BidRepo,
    DatabaseConfig, MembershipRepo, OrganizationRepo, ReviewRepo, TenderFilter, TenderRepo,
    UserRepo, VersionedRepo, DEFAULT_DATABASE_URL,
};

use serde::Serialize;
use sqlx::SqlitePool;

/// Row counts per table, for status reporting
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableCounts {
    pub users: i64,
    pub organizations: i64,
    pub tenders: i64,
    pub bids: i64,
    pub votes: i64,
    pub reviews: i64,
}

/// Database facade
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (and by default migrate) the database described by `config`
    pub async fn connect(config: &DatabaseConfig) -> PersistenceResult<Self> {
        let pool = init_database(config).await?;
        Ok(Self { pool })
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn table_counts(&self) -> PersistenceResult<TableCounts> {
        let mut conn = self.pool.acquire().await?;
        let users = UserRepo::count(&mut conn).await?;
        let organizations = OrganizationRepo::count(&mut conn).await?;
        Ok(TableCounts {
            users,
            organizations,
            tenders: TenderRepo::count(&mut conn).await?,
            bids: BidRepo::count(&mut conn).await?,
            votes: ApprovalRepo::count(&mut conn).await?,
            reviews: ReviewRepo::count(&mut conn).await?,
        })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
