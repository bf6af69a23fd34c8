//! # api-adapters
//!
//! HTTP surface of the launchpad backend. The axum router lives behind the
//! `web-axum` feature; the metrics registry is framework-agnostic.

pub mod metrics;

#[cfg(feature = "web-axum")]
pub mod envelope;
#[cfg(feature = "web-axum")]
pub mod error;
#[cfg(feature = "web-axum")]
pub mod extract;
#[cfg(feature = "web-axum")]
pub mod handlers;
#[cfg(feature = "web-axum")]
pub mod middleware;
#[cfg(feature = "web-axum")]
pub mod router;
#[cfg(feature = "web-axum")]
pub mod state;

pub use metrics::Metrics;
#[cfg(feature = "web-axum")]
pub use router::build_router;
#[cfg(feature = "web-axum")]
pub use state::AppState;
