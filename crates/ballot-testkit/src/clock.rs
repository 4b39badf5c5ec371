//! Manually advanced clock

use async_trait::async_trait;
use ballot_core::effects::{PhysicalTimeEffects, TimeError};
use ballot_core::PhysicalTime;
use std::sync::atomic::{AtomicU64, Ordering};

/// Clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    ms: AtomicU64,
}

impl ManualClock {
    /// Clock reading `secs` seconds since the Unix epoch
    pub fn at_secs(secs: u64) -> Self {
        Self {
            ms: AtomicU64::new(secs.saturating_mul(1000)),
        }
    }

    /// Move forward by `secs`
    pub fn advance_secs(&self, secs: u64) {
        self.ms.fetch_add(secs.saturating_mul(1000), Ordering::SeqCst);
    }

    /// Jump to `secs`
    pub fn set_secs(&self, secs: u64) {
        self.ms.store(secs.saturating_mul(1000), Ordering::SeqCst);
    }
}

#[async_trait]
impl PhysicalTimeEffects for ManualClock {
    async fn physical_time(&self) -> Result<PhysicalTime, TimeError> {
        Ok(PhysicalTime::from_millis(self.ms.load(Ordering::SeqCst)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn advances_only_when_told() {
        let clock = ManualClock::at_secs(100);
        assert_eq!(clock.now_secs().await.unwrap(), 100);
        clock.advance_secs(5);
        assert_eq!(clock.now_secs().await.unwrap(), 105);
        clock.set_secs(7);
        assert_eq!(clock.now_secs().await.unwrap(), 7);
    }
}
