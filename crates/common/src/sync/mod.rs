//! Synchronization helpers
//!
//! - **[`lock`]**: poison-tolerant acquisition for `Mutex` and `RwLock`

pub mod lock;

pub use lock::{lock_or_recover, read_or_recover, write_or_recover};
