//! # Versioned Module
//!
//! Contract for entities that keep a current row plus an append-only log of
//! snapshots keyed by version number (Tender, Bid).
//!
//! A version number only ever grows. Rolling back replays the content of an
//! old snapshot as a brand new version; see [`Versioned::rolled_back_to`].

/// Entity with a monotonically increasing version and a snapshot log.
pub trait Versioned: Clone {
    /// Entity name used in logs and errors ("Tender", "Bid")
    const ENTITY: &'static str;

    fn id(&self) -> &str;

    fn version(&self) -> i64;

    fn set_version(&mut self, version: i64);

    /// Copy every mutable field of `snapshot` onto `self`.
    ///
    /// Identity, authorship and creation time are left untouched.
    fn restore_from(&mut self, snapshot: &Self);

    /// Working copy carrying the content of `snapshot` and the version of
    /// `self`, ready to be persisted with a version bump.
    fn rolled_back_to(&self, snapshot: &Self) -> Self {
        let mut working = self.clone();
        working.restore_from(snapshot);
        working.set_version(self.version());
        working
    }

    /// Whether `target` names an existing version of this entity
    fn has_version(&self, target: i64) -> bool {
        target >= 1 && target <= self.version()
    }
}
