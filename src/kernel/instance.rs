use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::MeterError;

/// Owner-held slot that allows a single live `RecordingController`.
///
/// The host integration layer keeps one slot and creates controllers
/// through it; a second creation while the first is alive is refused.
#[derive(Debug, Clone, Default)]
pub struct InstanceSlot {
    claimed: Arc<AtomicBool>,
}

/// Held by the live controller. Dropping it frees the slot.
#[derive(Debug)]
pub struct InstanceGuard {
    claimed: Arc<AtomicBool>,
}

impl InstanceSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claim(&self) -> Result<InstanceGuard, MeterError> {
        if self
            .claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Instance of RecordingController already exists, destroying");
            return Err(MeterError::DuplicateInstance);
        }
        Ok(InstanceGuard {
            claimed: self.claimed.clone(),
        })
    }

    pub fn is_claimed(&self) -> bool {
        self.claimed.load(Ordering::Acquire)
    }
}

impl Drop for InstanceGuard {
    fn drop(&mut self) {
        debug!("RecordingController destroyed");
        self.claimed.store(false, Ordering::Release);
    }
}
