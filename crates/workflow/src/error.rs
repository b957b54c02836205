//! Workflow errors
//!
//! Every refusal the engine can produce, plus `Internal` for anything the
//! store reports. Refusals are logged at `warn` where they are built.

use tenderhub_persistence::PersistenceError;
use thiserror::Error;

/// Coarse error classification for request-handling layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidUser,
    Forbidden,
    NotFound,
    NoVersion,
    Finalized,
    QuorumNotReached,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidUser => "InvalidUser",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::NoVersion => "NoVersion",
            ErrorKind::Finalized => "Finalized",
            ErrorKind::QuorumNotReached => "QuorumNotReached",
            ErrorKind::Internal => "Internal",
        }
    }
}

/// Workflow operation errors
#[derive(Debug, Error)]
pub enum WorkflowError {
    // === Identity ===
    #[error("Invalid user: {0}")]
    InvalidUser(String),

    #[error("Forbidden: {username} may not {action}")]
    Forbidden {
        username: String,
        action: &'static str,
    },

    // === Not found ===
    #[error("Tender not found: {0}")]
    NoTender(String),

    #[error("Bid not found: {0}")]
    NoBid(String),

    #[error("No version {version} for {entity} {id}")]
    NoVersion {
        entity: &'static str,
        id: String,
        version: i64,
    },

    // === Terminal states ===
    #[error("Tender is closed: {0}")]
    TenderFinalized(String),

    #[error("Bid is finalized: {0}")]
    BidFinalized(String),

    #[error("Quorum not reached for bid {bid_id}: {approvals} of {required} approvals")]
    QuorumNotReached {
        bid_id: String,
        approvals: i64,
        required: i64,
    },

    // === Wrapped errors ===
    #[error("Internal error: {0}")]
    Internal(#[from] PersistenceError),
}

/// Result type alias for workflow operations
pub type WorkflowResult<T> = Result<T, WorkflowError>;

impl From<sqlx::Error> for WorkflowError {
    fn from(err: sqlx::Error) -> Self {
        Self::Internal(PersistenceError::Database(err))
    }
}

impl WorkflowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidUser(_) => ErrorKind::InvalidUser,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::NoTender(_) | Self::NoBid(_) => ErrorKind::NotFound,
            Self::NoVersion { .. } => ErrorKind::NoVersion,
            Self::TenderFinalized(_) | Self::BidFinalized(_) => ErrorKind::Finalized,
            Self::QuorumNotReached { .. } => ErrorKind::QuorumNotReached,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn invalid_user(name: &str) -> Self {
        tracing::warn!(name, "Refused: unknown user or organization");
        Self::InvalidUser(name.to_string())
    }

    pub fn forbidden(username: &str, action: &'static str) -> Self {
        tracing::warn!(username, action, "Refused: forbidden");
        Self::Forbidden {
            username: username.to_string(),
            action,
        }
    }

    pub fn no_version(entity: &'static str, id: &str, version: i64) -> Self {
        tracing::warn!(entity, id, version, "Refused: no such version");
        Self::NoVersion {
            entity,
            id: id.to_string(),
            version,
        }
    }

    pub fn tender_finalized(tender_id: &str) -> Self {
        tracing::warn!(tender_id, "Refused: tender is closed");
        Self::TenderFinalized(tender_id.to_string())
    }

    pub fn bid_finalized(bid_id: &str) -> Self {
        tracing::warn!(bid_id, "Refused: bid is finalized");
        Self::BidFinalized(bid_id.to_string())
    }

    pub fn quorum_not_reached(bid_id: &str, approvals: i64, required: i64) -> Self {
        tracing::warn!(bid_id, approvals, required, "Refused: quorum not reached");
        Self::QuorumNotReached {
            bid_id: bid_id.to_string(),
            approvals,
            required,
        }
    }
}
