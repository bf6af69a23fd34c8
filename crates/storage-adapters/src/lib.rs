//! Entity Store adapters.
//!
//! `MemoryStore` is always available and backs the test suites and
//! database-less runs. `PgStore` is compiled with the `db-postgres` feature.

pub mod memory;
#[cfg(feature = "db-postgres")]
pub mod postgres;

pub use memory::MemoryStore;
#[cfg(feature = "db-postgres")]
pub use postgres::PgStore;
