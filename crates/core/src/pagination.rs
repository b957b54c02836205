//! Limit/offset pagination for list operations.

use serde::{Deserialize, Serialize};

/// Page window. A `limit` of zero or less means "no limit".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
}

impl Pagination {
    pub fn new(limit: i64, offset: i64) -> Self {
        Self {
            limit,
            offset: offset.max(0),
        }
    }

    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Value for an SQLite `LIMIT` clause (`-1` is unbounded)
    pub fn sql_limit(&self) -> i64 {
        if self.limit <= 0 {
            -1
        } else {
            self.limit
        }
    }

    pub fn sql_offset(&self) -> i64 {
        self.offset.max(0)
    }
}
