//! Time utilities and abstractions
//!
//! - **[`clock`]**: real and mock time sources for metric instances

pub mod clock;

pub use clock::{Clock, MockClock, SharedClock, SystemClock};
