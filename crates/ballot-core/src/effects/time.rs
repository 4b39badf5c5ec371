//! Wall-clock time
//!
//! # Effect Classification
//!
//! - **Category**: Infrastructure Effect
//! - **Implementation**: `ballot-effects::RealTimeHandler`, `ballot-testkit::ManualClock`
//! - **Usage**: the ledger node stamps each transaction with the current time

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{PhysicalTime, VotingError};

/// Error type for time operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum TimeError {
    /// Clock not readable
    #[error("Time service unavailable")]
    ServiceUnavailable,
    /// Clock reading failed
    #[error("Operation failed: {reason}")]
    OperationFailed {
        /// Failure detail
        reason: String,
    },
}

impl From<TimeError> for VotingError {
    fn from(err: TimeError) -> Self {
        VotingError::internal(format!("clock: {err}"))
    }
}

/// Wall-clock readings
#[async_trait]
pub trait PhysicalTimeEffects: Send + Sync {
    /// Current time
    async fn physical_time(&self) -> Result<PhysicalTime, TimeError>;

    /// Current time in whole seconds
    async fn now_secs(&self) -> Result<u64, TimeError> {
        Ok(self.physical_time().await?.as_secs())
    }
}

#[async_trait]
impl<T: PhysicalTimeEffects + ?Sized> PhysicalTimeEffects for Arc<T> {
    async fn physical_time(&self) -> Result<PhysicalTime, TimeError> {
        (**self).physical_time().await
    }
}
