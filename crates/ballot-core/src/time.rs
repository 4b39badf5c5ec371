//! Time types for ledger timestamps
//!
//! The ledger reasons in whole seconds (block timestamps); clock effects
//! report milliseconds.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Wall-clock reading in milliseconds since the Unix epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct PhysicalTime {
    /// Milliseconds since the Unix epoch
    pub ts_ms: u64,
}

impl PhysicalTime {
    /// Build from milliseconds
    pub fn from_millis(ts_ms: u64) -> Self {
        Self { ts_ms }
    }

    /// Build from whole seconds
    pub fn from_secs(secs: u64) -> Self {
        Self {
            ts_ms: secs.saturating_mul(1000),
        }
    }

    /// Whole seconds, truncating
    pub fn as_secs(&self) -> u64 {
        self.ts_ms / 1000
    }
}

impl fmt::Display for PhysicalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.ts_ms)
    }
}
