//! # Approval Module
//!
//! Votes cast by employees of the tender's organization on a bid, and the
//! rule deciding the bid's outcome from the vote counts.
//!
//! - A single Reject vetoes the bid.
//! - Otherwise the bid is approved once `approvals >= QUORUM` or
//!   `approvals >= employee_count`, whichever comes first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Approvals needed in organizations with at least this many employees
pub const QUORUM: i64 = 3;

/// A voter's decision on a bid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decision {
    #[serde(rename = "Approved")]
    Approve,
    #[serde(rename = "Rejected")]
    Reject,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Approve => "Approved",
            Decision::Reject => "Rejected",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Approved" => Some(Decision::Approve),
            "Rejected" => Some(Decision::Reject),
            _ => None,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Latest vote of one user on one bid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidApproval {
    pub bid_id: String,
    pub user_id: String,
    pub decision: Decision,
    pub updated_at: DateTime<Utc>,
}

/// Outcome of evaluating a [`Tally`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TallyOutcome {
    /// Not enough approvals yet
    Pending,
    Approved,
    Rejected,
}

/// Vote counts for one bid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub approvals: i64,
    pub rejections: i64,
}

impl Tally {
    pub fn new(approvals: i64, rejections: i64) -> Self {
        Self {
            approvals,
            rejections,
        }
    }

    /// Whether the approvals alone satisfy the quorum for an organization
    /// of `employee_count` members. An empty tally never does.
    pub fn quorum_reached(&self, employee_count: i64) -> bool {
        self.approvals > 0 && (self.approvals >= QUORUM || self.approvals >= employee_count)
    }

    /// Veto first, then quorum; no votes at all stays pending.
    pub fn evaluate(&self, employee_count: i64) -> TallyOutcome {
        if self.rejections > 0 {
            TallyOutcome::Rejected
        } else if self.quorum_reached(employee_count) {
            TallyOutcome::Approved
        } else {
            TallyOutcome::Pending
        }
    }
}
