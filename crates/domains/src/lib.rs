//! The central domain types and port definitions for the launchpad backend.
//!
//! Nothing in this crate performs I/O. Services depend on the traits in
//! [`ports`]; adapters implement them.

pub mod error;
pub mod models;
pub mod ports;

pub use error::*;
pub use models::*;
pub use ports::*;
