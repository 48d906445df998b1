use std::{future::Future, sync::Arc};

use tokio::sync::Semaphore;

/// Caps how many generation calls run at once.
///
/// Callers beyond the limit wait in arrival order (tokio's semaphore is
/// fair) and are let through as running tasks finish.
#[derive(Debug, Clone)]
pub struct GenerationQueue {
    permits: Arc<Semaphore>,
    capacity: usize,
}

impl GenerationQueue {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn in_flight(&self) -> usize {
        self.capacity - self.permits.available_permits()
    }

    /// Runs `task` once a slot is free.
    pub async fn run<F, T>(&self, task: F) -> T
    where
        F: Future<Output = T>,
    {
        let waiting = self.permits.available_permits() == 0;
        if waiting {
            tracing::debug!(capacity = self.capacity, "Generation queue full, waiting");
        }

        // the semaphore is never closed
        let _permit = self.permits.acquire().await;
        task.await
    }
}
