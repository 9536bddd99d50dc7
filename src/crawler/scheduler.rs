//! Request throttling
//!
//! Bounds how many page requests are in flight and keeps a fixed minimum
//! spacing between request starts.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{AcquireError, Mutex, OwnedSemaphorePermit, Semaphore};
use tokio::time::{sleep_until, Instant};

/// Concurrency limit plus inter-request delay
pub struct RequestThrottle {
    /// Global semaphore for limiting concurrent fetches
    semaphore: Arc<Semaphore>,

    /// Minimum time between two request starts
    delay: Duration,

    /// Earliest instant the next request may start
    next_slot: Mutex<Option<Instant>>,
}

impl RequestThrottle {
    /// Creates a throttle; a zero limit is treated as 1
    pub fn new(max_concurrent: usize, delay: Duration) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
            delay,
            next_slot: Mutex::new(None),
        }
    }

    /// Requests that could start right now without waiting on the semaphore
    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Waits for a free slot and for the spacing delay to elapse
    ///
    /// The returned permit must be held for the duration of the request.
    pub async fn acquire(&self) -> Result<OwnedSemaphorePermit, AcquireError> {
        let permit = self.semaphore.clone().acquire_owned().await?;

        let mut next_slot = self.next_slot.lock().await;
        if let Some(at) = *next_slot {
            if at > Instant::now() {
                tracing::trace!("Throttling request for {:?}", at - Instant::now());
                sleep_until(at).await;
            }
        }
        *next_slot = Some(Instant::now() + self.delay);

        Ok(permit)
    }
}
