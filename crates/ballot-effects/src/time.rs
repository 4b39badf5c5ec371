//! System clock handler

use async_trait::async_trait;
use ballot_core::effects::{PhysicalTimeEffects, TimeError};
use ballot_core::PhysicalTime;
use std::time::{SystemTime, UNIX_EPOCH};

/// Real time handler for production use
///
/// Stateless; every reading goes to the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealTimeHandler;

impl RealTimeHandler {
    /// Create a new real time handler
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PhysicalTimeEffects for RealTimeHandler {
    async fn physical_time(&self) -> Result<PhysicalTime, TimeError> {
        let elapsed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| TimeError::OperationFailed {
                reason: format!("system clock before Unix epoch: {e}"),
            })?;
        Ok(PhysicalTime::from_millis(elapsed.as_millis() as u64))
    }
}
