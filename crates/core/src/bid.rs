//! # Bid Module
//!
//! A proposal submitted against a published tender, authored either by a
//! user or by an organization.
//!
//! Status machine: `Created`, `Published`, `Canceled`, and the two final
//! outcomes `Approved` / `Rejected`.

use crate::versioned::Versioned;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who authored a bid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthorType {
    User,
    Organization,
}

impl AuthorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthorType::User => "User",
            AuthorType::Organization => "Organization",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "User" => Some(AuthorType::User),
            "Organization" => Some(AuthorType::Organization),
            _ => None,
        }
    }
}

impl fmt::Display for AuthorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Bid status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BidStatus {
    Created,
    Published,
    Canceled,
    Approved,
    Rejected,
}

impl BidStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BidStatus::Created => "Created",
            BidStatus::Published => "Published",
            BidStatus::Canceled => "Canceled",
            BidStatus::Approved => "Approved",
            BidStatus::Rejected => "Rejected",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Created" => Some(BidStatus::Created),
            "Published" => Some(BidStatus::Published),
            "Canceled" => Some(BidStatus::Canceled),
            "Approved" => Some(BidStatus::Approved),
            "Rejected" => Some(BidStatus::Rejected),
            _ => None,
        }
    }

    /// Approved or Rejected: no further edits or rollbacks
    pub fn is_final(&self) -> bool {
        matches!(self, BidStatus::Approved | BidStatus::Rejected)
    }

    /// Whether votes may be submitted while in this status
    pub fn accepts_decisions(&self) -> bool {
        !matches!(self, BidStatus::Created | BidStatus::Canceled)
    }
}

impl fmt::Display for BidStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Current state of a bid.
///
/// Exactly one of `author_user_id` / `author_organization_id` equals
/// `author_id`; for user-authored bids the organization is derived from the
/// author's membership and may be absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bid {
    pub id: String,
    pub version: i64,
    pub tender_id: String,
    pub author_type: AuthorType,
    pub author_id: String,
    #[serde(skip_serializing)]
    pub author_user_id: Option<String>,
    #[serde(skip_serializing)]
    pub author_organization_id: Option<String>,
    pub status: BidStatus,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub updated_at: DateTime<Utc>,
}

impl Bid {
    /// Materialize a draft as version 1 in status `Created`.
    ///
    /// `member_of` is the author's organization when the author is a user.
    pub fn from_draft(id: &str, draft: BidDraft, member_of: Option<String>) -> Self {
        let now = Utc::now();
        let (author_user_id, author_organization_id) = match draft.author_type {
            AuthorType::User => (Some(draft.author_id.clone()), member_of),
            AuthorType::Organization => (None, Some(draft.author_id.clone())),
        };
        Self {
            id: id.to_string(),
            version: 1,
            tender_id: draft.tender_id,
            author_type: draft.author_type,
            author_id: draft.author_id,
            author_user_id,
            author_organization_id,
            status: BidStatus::Created,
            name: draft.name,
            description: draft.description,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_final(&self) -> bool {
        self.status.is_final()
    }

    /// Apply only the fields present in `patch`
    pub fn apply(&mut self, patch: &BidPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
    }
}

impl Versioned for Bid {
    const ENTITY: &'static str = "Bid";

    fn id(&self) -> &str {
        &self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn set_version(&mut self, version: i64) {
        self.version = version;
    }

    fn restore_from(&mut self, snapshot: &Self) {
        self.status = snapshot.status;
        self.name = snapshot.name.clone();
        self.description = snapshot.description.clone();
    }
}

/// Input for bid creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidDraft {
    pub tender_id: String,
    pub author_type: AuthorType,
    /// User id or organization id, depending on `author_type`
    pub author_id: String,
    pub name: String,
    pub description: String,
}

impl BidDraft {
    pub fn by_user(tender_id: &str, user_id: &str, name: &str) -> Self {
        Self::new(tender_id, AuthorType::User, user_id, name)
    }

    pub fn by_organization(tender_id: &str, organization_id: &str, name: &str) -> Self {
        Self::new(tender_id, AuthorType::Organization, organization_id, name)
    }

    pub fn new(tender_id: &str, author_type: AuthorType, author_id: &str, name: &str) -> Self {
        Self {
            tender_id: tender_id.to_string(),
            author_type,
            author_id: author_id.to_string(),
            name: name.to_string(),
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }
}

/// Partial update of a bid. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidPatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl BidPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}
