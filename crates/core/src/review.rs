//! Reviewer feedback on bids. One row per (bid, reviewer); repeat feedback
//! overwrites.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidReview {
    pub bid_id: String,
    /// Reviewer
    pub user_id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Optional filters for review listing. Empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewFilter {
    pub tender_id: Option<String>,
    pub reviewer_user_id: Option<String>,
    /// Author (user) of the reviewed bid
    pub author_user_id: Option<String>,
}

impl ReviewFilter {
    pub fn for_tender(mut self, tender_id: &str) -> Self {
        self.tender_id = Some(tender_id.to_string());
        self
    }

    pub fn by_reviewer(mut self, user_id: &str) -> Self {
        self.reviewer_user_id = Some(user_id.to_string());
        self
    }

    pub fn for_author(mut self, user_id: &str) -> Self {
        self.author_user_id = Some(user_id.to_string());
        self
    }
}
