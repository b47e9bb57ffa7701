//! Shared building blocks for the dimetrics crates.
//!
//! - `time`: the [`Clock`] abstraction used by every time-dependent metric
//! - `sync`: poison-tolerant lock helpers
//! - `utils`: label macros for enum conversions

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

#[macro_use]
pub mod utils;
pub mod sync;
pub mod time;

pub use sync::{lock_or_recover, read_or_recover, write_or_recover};
pub use time::{Clock, MockClock, SharedClock, SystemClock};
