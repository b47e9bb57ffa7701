//! Monotonic-or-not counter

use std::sync::atomic::{AtomicI64, Ordering};

/// Signed counter that can be incremented and decremented
#[derive(Debug, Default)]
pub struct Counter {
    count: AtomicI64,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `n` to the count
    pub fn inc(&self, n: i64) {
        // Relaxed OK: independent counter
        self.count.fetch_add(n, Ordering::Relaxed);
    }

    /// Subtract `n` from the count
    pub fn dec(&self, n: i64) {
        self.count.fetch_sub(n, Ordering::Relaxed);
    }

    pub fn count(&self) -> i64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Reset the count to zero
    pub fn clear(&self) {
        self.count.store(0, Ordering::Relaxed);
    }
}
