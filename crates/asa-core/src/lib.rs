//! Automatic scenario assignment engine.
//!
//! Keeps the derived `scenarios` label of every runtime in a tenant consistent with the tenant's
//! `(scenario, selector)` rules. Entry point is [`AssignmentManager`]; persistence and the runtime
//! inventory are reached through the [`RuleStore`], [`ScenarioEnumeration`] and [`ResourceDirectory`] seams.
pub mod config;
pub mod directory;
pub mod error;
pub mod manager;
pub mod matcher;
pub mod metrics;
pub mod reconciler;
pub mod store;

pub use config::EngineConfig;
pub use directory::{InMemoryRuntimes, InMemoryScenarios, ResourceDirectory, ScenarioEnumeration};
pub use error::{BackendError, CoreError, StoreError};
pub use manager::AssignmentManager;
pub use metrics::{
    MetricsBackend, MetricsHandle, MutationOutcome, NoOpMetrics, ReconcileTrigger, noop_metrics,
};
pub use reconciler::{ReconcileError, ReconcileReport, Reconciler};
pub use store::{InMemoryRuleStore, RuleStore};
