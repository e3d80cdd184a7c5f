//! Counting gate for outbound requests.
//!
//! A fixed number of permits is shared by every worker. A permit is taken
//! before a request is sent and dropped as soon as the response status is
//! known, so at most `capacity` requests are in flight system-wide.

use std::sync::Arc;
use tokio::sync::{Semaphore, SemaphorePermit};

use crate::metrics::FETCHES_IN_FLIGHT;

use super::FetchError;

/// Snapshot of gate usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateStatus {
    pub capacity: usize,
    pub in_flight: usize,
}

/// Bounded counting semaphore around network fetches.
#[derive(Debug, Clone)]
pub struct FetchGate {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

/// Held while a request is in flight; releases its slot on drop.
pub struct FetchPermit<'a> {
    _permit: SemaphorePermit<'a>,
}

impl Drop for FetchPermit<'_> {
    fn drop(&mut self) {
        FETCHES_IN_FLIGHT.dec();
    }
}

impl FetchGate {
    /// Create a gate admitting `capacity` concurrent fetches (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Wait for a free slot.
    pub async fn acquire(&self) -> Result<FetchPermit<'_>, FetchError> {
        let permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| FetchError::GateClosed)?;
        FETCHES_IN_FLIGHT.inc();
        Ok(FetchPermit { _permit: permit })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn status(&self) -> GateStatus {
        GateStatus {
            capacity: self.capacity,
            in_flight: self.capacity - self.semaphore.available_permits(),
        }
    }
}
