//! Database schema definitions
//!
//! Row types for sqlx mapping from SQLite tables.
//! Schema is defined in migrations/20261019000000_init.sql

use crate::error::{PersistenceError, PersistenceResult};
use chrono::{DateTime, Utc};
use tenderhub_core::{
    AuthorType, Bid, BidApproval, BidReview, BidStatus, Decision, Organization,
    OrganizationType, ServiceType, Tender, TenderStatus, User,
};

/// Row type for table `users`
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: String,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Row type for table `organizations`
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrganizationRow {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub org_type: String,
    pub created_at: DateTime<Utc>,
}

/// Row type for tables `tenders` and `tender_versions` (same columns)
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TenderRow {
    pub id: String,
    pub version: i64,
    pub organization_id: String,
    pub author_user_id: String,
    pub status: String,
    pub service_type: String,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row type for tables `bids` and `bid_versions` (same columns)
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BidRow {
    pub id: String,
    pub version: i64,
    pub tender_id: String,
    pub author_type: String,
    pub author_id: String,
    pub author_user_id: Option<String>,
    pub author_organization_id: Option<String>,
    pub status: String,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row type for table `bid_approvals`
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ApprovalRow {
    pub bid_id: String,
    pub user_id: String,
    pub decision: String,
    pub updated_at: DateTime<Utc>,
}

/// Row type for table `bid_reviews`
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReviewRow {
    pub bid_id: String,
    pub user_id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// === Conversion implementations ===

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
            created_at: row.created_at,
        }
    }
}

impl TryFrom<OrganizationRow> for Organization {
    type Error = PersistenceError;

    fn try_from(row: OrganizationRow) -> PersistenceResult<Self> {
        let org_type = OrganizationType::from_str(&row.org_type)
            .ok_or_else(|| PersistenceError::invalid_enum("org_type", &row.org_type))?;
        Ok(Self {
            id: row.id,
            name: row.name,
            description: row.description,
            org_type,
            created_at: row.created_at,
        })
    }
}

impl TryFrom<TenderRow> for Tender {
    type Error = PersistenceError;

    fn try_from(row: TenderRow) -> PersistenceResult<Self> {
        let status = TenderStatus::from_str(&row.status)
            .ok_or_else(|| PersistenceError::invalid_enum("tender.status", &row.status))?;
        let service_type = ServiceType::from_str(&row.service_type).ok_or_else(|| {
            PersistenceError::invalid_enum("tender.service_type", &row.service_type)
        })?;
        Ok(Self {
            id: row.id,
            version: row.version,
            organization_id: row.organization_id,
            author_user_id: row.author_user_id,
            status,
            service_type,
            name: row.name,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl TryFrom<BidRow> for Bid {
    type Error = PersistenceError;

    fn try_from(row: BidRow) -> PersistenceResult<Self> {
        let author_type = AuthorType::from_str(&row.author_type)
            .ok_or_else(|| PersistenceError::invalid_enum("bid.author_type", &row.author_type))?;
        let status = BidStatus::from_str(&row.status)
            .ok_or_else(|| PersistenceError::invalid_enum("bid.status", &row.status))?;
        Ok(Self {
            id: row.id,
            version: row.version,
            tender_id: row.tender_id,
            author_type,
            author_id: row.author_id,
            author_user_id: row.author_user_id,
            author_organization_id: row.author_organization_id,
            status,
            name: row.name,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl TryFrom<ApprovalRow> for BidApproval {
    type Error = PersistenceError;

    fn try_from(row: ApprovalRow) -> PersistenceResult<Self> {
        let decision = Decision::from_str(&row.decision)
            .ok_or_else(|| PersistenceError::invalid_enum("bid_approvals.decision", &row.decision))?;
        Ok(Self {
            bid_id: row.bid_id,
            user_id: row.user_id,
            decision,
            updated_at: row.updated_at,
        })
    }
}

impl From<ReviewRow> for BidReview {
    fn from(row: ReviewRow) -> Self {
        Self {
            bid_id: row.bid_id,
            user_id: row.user_id,
            text: row.text,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Convert a batch of rows, failing on the first bad one
pub(crate) fn convert_all<R, T>(rows: Vec<R>) -> PersistenceResult<Vec<T>>
where
    T: TryFrom<R, Error = PersistenceError>,
{
    rows.into_iter().map(T::try_from).collect()
}
