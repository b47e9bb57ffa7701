//! Common utility macros

#[macro_use]
pub mod macros;
