//! # Tender Module
//!
//! A procurement request published by an organization.
//!
//! Status machine: `Created`, `Published`, `Closed`. Any status may be
//! requested while the tender is open; once `Closed` it never leaves that
//! state.

use crate::versioned::Versioned;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tender status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TenderStatus {
    Created,
    Published,
    /// Terminal: no edits, rollbacks or status changes
    Closed,
}

impl TenderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TenderStatus::Created => "Created",
            TenderStatus::Published => "Published",
            TenderStatus::Closed => "Closed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Created" => Some(TenderStatus::Created),
            "Published" => Some(TenderStatus::Published),
            "Closed" => Some(TenderStatus::Closed),
            _ => None,
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, TenderStatus::Closed)
    }
}

impl fmt::Display for TenderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of service a tender asks for.
///
/// Adding a variant needs no change in the workflow, only here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceType {
    Construction,
    Delivery,
    Manufacture,
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Construction => "Construction",
            ServiceType::Delivery => "Delivery",
            ServiceType::Manufacture => "Manufacture",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Construction" => Some(ServiceType::Construction),
            "Delivery" => Some(ServiceType::Delivery),
            "Manufacture" => Some(ServiceType::Manufacture),
            _ => None,
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Current state of a tender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tender {
    pub id: String,
    pub version: i64,
    pub organization_id: String,
    /// User who created the tender
    #[serde(skip_serializing)]
    pub author_user_id: String,
    pub status: TenderStatus,
    pub service_type: ServiceType,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub updated_at: DateTime<Utc>,
}

impl Tender {
    /// Materialize a draft as version 1 in status `Created`
    pub fn from_draft(id: &str, author_user_id: &str, draft: TenderDraft) -> Self {
        let now = Utc::now();
        Self {
            id: id.to_string(),
            version: 1,
            organization_id: draft.organization_id,
            author_user_id: author_user_id.to_string(),
            status: TenderStatus::Created,
            service_type: draft.service_type,
            name: draft.name,
            description: draft.description,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_published(&self) -> bool {
        self.status == TenderStatus::Published
    }

    pub fn is_closed(&self) -> bool {
        self.status.is_closed()
    }

    /// Apply only the fields present in `patch`
    pub fn apply(&mut self, patch: &TenderPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(service_type) = patch.service_type {
            self.service_type = service_type;
        }
    }
}

impl Versioned for Tender {
    const ENTITY: &'static str = "Tender";

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
        self.service_type = snapshot.service_type;
        self.name = snapshot.name.clone();
        self.description = snapshot.description.clone();
    }
}

/// Input for tender creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenderDraft {
    pub organization_id: String,
    pub service_type: ServiceType,
    pub name: String,
    pub description: String,
}

impl TenderDraft {
    pub fn new(organization_id: &str, service_type: ServiceType, name: &str) -> Self {
        Self {
            organization_id: organization_id.to_string(),
            service_type,
            name: name.to_string(),
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }
}

/// Partial update of a tender. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenderPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub service_type: Option<ServiceType>,
}

impl TenderPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.service_type.is_none()
    }
}
