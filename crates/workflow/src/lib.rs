//! # TenderHub Workflow
//!
//! The tender/bid engine: status machines, forward-only rollback, quorum
//! approvals with veto and tender cascade, and the authorization rules
//! every operation consults.
//!
//! ## Components
//!
//! - [`AuthorizationResolver`]: users, memberships, colleagues, edit rights
//! - [`TenderWorkflow`]: tender lifecycle
//! - [`BidWorkflow`]: bid lifecycle, manual status, feedback
//! - [`ApprovalTally`]: votes and the approval cascade
//! - [`ReviewLedger`]: reviewer feedback
//!
//! Every operation runs in a single SQLite transaction and either commits
//! everything it wrote or nothing.
//!
//! ```rust,ignore
//! let ctx = ServiceContext::new(&db);
//! let tender = ctx.tenders().create("alice", draft).await?;
//! let bid = ctx.approvals().submit_decision("bob", &bid_id, Decision::Approve).await?;
//! ```

pub mod approval;
pub mod authz;
pub mod bid;
pub mod context;
pub mod error;
pub mod review;
pub mod tender;
mod versioned;

pub use approval::{required_approvals, ApprovalTally};
pub use authz::AuthorizationResolver;
pub use bid::BidWorkflow;
pub use context::ServiceContext;
pub use error::{ErrorKind, WorkflowError, WorkflowResult};
pub use review::ReviewLedger;
pub use tender::TenderWorkflow;
