//! Subpool lifecycle status.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a subpool is in the activation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "subpool_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SubPoolStatus {
    /// Waiting for its turn.
    Inactive,
    /// Currently handing out numbers.
    Active,
    /// Already had its turn in this lap.
    Used,
}

impl SubPoolStatus {
    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inactive => "inactive",
            Self::Active => "active",
            Self::Used => "used",
        }
    }
}

impl fmt::Display for SubPoolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
