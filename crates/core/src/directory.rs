//! # Directory Module
//!
//! Users and organizations. Both are seeded outside the workflow and are
//! immutable from its point of view; membership lives in persistence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Legal form of an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrganizationType {
    /// Individual entrepreneur
    #[serde(rename = "IE")]
    Ie,
    /// Limited liability company
    #[serde(rename = "LLC")]
    Llc,
    /// Joint-stock company
    #[serde(rename = "JSC")]
    Jsc,
}

impl OrganizationType {
    /// Code string stored in the DB
    pub fn as_str(&self) -> &'static str {
        match self {
            OrganizationType::Ie => "IE",
            OrganizationType::Llc => "LLC",
            OrganizationType::Jsc => "JSC",
        }
    }

    /// Parse from the stored code (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "IE" => Some(OrganizationType::Ie),
            "LLC" => Some(OrganizationType::Llc),
            "JSC" => Some(OrganizationType::Jsc),
            _ => None,
        }
    }
}

impl fmt::Display for OrganizationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A person able to act on tenders and bids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    /// Unique display name used to identify the caller
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: &str, username: &str) -> Self {
        Self {
            id: id.to_string(),
            username: username.to_string(),
            first_name: None,
            last_name: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_name(mut self, first_name: &str, last_name: &str) -> Self {
        self.first_name = Some(first_name.to_string());
        self.last_name = Some(last_name.to_string());
        self
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.username, self.id)
    }
}

/// An organization owning tenders and employing users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub org_type: OrganizationType,
    pub created_at: DateTime<Utc>,
}

impl Organization {
    pub fn new(id: &str, name: &str, org_type: OrganizationType) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
            org_type,
            created_at: Utc::now(),
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_organization_type_str() {
        assert_eq!(OrganizationType::Llc.as_str(), "LLC");
        assert_eq!(OrganizationType::from_str("jsc"), Some(OrganizationType::Jsc));
        assert_eq!(OrganizationType::from_str("GmbH"), None);
    }

    #[test]
    fn test_user_display() {
        let user = User::new("u-1", "alice").with_name("Alice", "Smith");
        assert_eq!(format!("{}", user), "alice (u-1)");
        assert_eq!(user.first_name.as_deref(), Some("Alice"));
    }
}
