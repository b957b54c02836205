//! # TenderHub Core
//!
//! Domain types for the tender/bid workflow engine.
//!
//! - [`directory`]: users, organizations
//! - [`tender`]: Tender, its status machine states, drafts and patches
//! - [`bid`]: Bid, authorship, drafts and patches
//! - [`approval`]: per-user votes and the quorum rule
//! - [`review`]: reviewer feedback on bids
//! - [`versioned`]: the contract shared by entities with a version log
//!
//! This crate performs no I/O.

pub mod approval;
pub mod bid;
pub mod directory;
pub mod pagination;
pub mod review;
pub mod tender;
pub mod versioned;

pub use approval::{BidApproval, Decision, Tally, TallyOutcome, QUORUM};
pub use bid::{AuthorType, Bid, BidDraft, BidPatch, BidStatus};
pub use directory::{Organization, OrganizationType, User};
pub use pagination::Pagination;
pub use review::{BidReview, ReviewFilter};
pub use tender::{ServiceType, Tender, TenderDraft, TenderPatch, TenderStatus};
pub use versioned::Versioned;
