//! Poison-tolerant lock acquisition
//!
//! Metric state must stay readable after a panicking writer, so every lock in
//! the workspace goes through these helpers: a poisoned guard is recovered,
//! a warning is logged with the resource name, and execution continues with
//! the data as the panicking thread left it.

use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Lock a mutex, recovering the guard if the mutex is poisoned
pub fn lock_or_recover<'a, T>(mutex: &'a Mutex<T>, resource: &'static str) -> MutexGuard<'a, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poison_err) => {
            tracing::warn!(resource, "Mutex poisoned, recovering data");
            poison_err.into_inner()
        }
    }
}

/// Acquire a shared read guard, recovering from poisoning
pub fn read_or_recover<'a, T>(
    lock: &'a RwLock<T>,
    resource: &'static str,
) -> RwLockReadGuard<'a, T> {
    match lock.read() {
        Ok(guard) => guard,
        Err(poison_err) => {
            tracing::warn!(resource, "RwLock poisoned during read, recovering data");
            poison_err.into_inner()
        }
    }
}

/// Acquire an exclusive write guard, recovering from poisoning
pub fn write_or_recover<'a, T>(
    lock: &'a RwLock<T>,
    resource: &'static str,
) -> RwLockWriteGuard<'a, T> {
    match lock.write() {
        Ok(guard) => guard,
        Err(poison_err) => {
            tracing::warn!(resource, "RwLock poisoned during write, recovering data");
            poison_err.into_inner()
        }
    }
}
