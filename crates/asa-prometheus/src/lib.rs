//! Prometheus implementation of [`asa_core::MetricsBackend`].
//!
//! ```rust
//! use std::sync::Arc;
//! use asa_core::{AssignmentManager, InMemoryRuleStore, InMemoryRuntimes, InMemoryScenarios};
//! use asa_prometheus::PrometheusMetrics;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let metrics = PrometheusMetrics::new()?;
//! let manager = AssignmentManager::new(
//!     Arc::new(InMemoryRuleStore::new()),
//!     Arc::new(InMemoryScenarios::new()),
//!     Arc::new(InMemoryRuntimes::new()),
//! )
//! .with_metrics(Arc::new(metrics.clone()));
//!
//! // Serve `metrics.gather()` through `prometheus::TextEncoder` on a `/metrics` endpoint.
//! # let _ = manager;
//! # Ok(())
//! # }
//! ```
//!
//! No HTTP server is included.
mod backend;

pub use backend::PrometheusMetrics;
