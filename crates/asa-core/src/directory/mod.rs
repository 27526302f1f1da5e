//! External collaborators consumed by the engine.
//!
//! - [`ScenarioEnumeration`]: per-tenant allow-list of scenario names.
//! - [`ResourceDirectory`]: runtime inventory and writer of the derived `scenarios` label.
//!
//! In-memory implementations back tests and the demo daemon.
mod memory;
pub use memory::{InMemoryRuntimes, InMemoryScenarios};

use std::collections::BTreeSet;

use async_trait::async_trait;
use asa_model::{Runtime, RuntimeId, ScenarioName, TenantId};

use crate::error::BackendError;

/// Per-tenant allow-list of scenario names.
#[async_trait]
pub trait ScenarioEnumeration: Send + Sync + 'static {
    /// Returns `true` if `name` is currently defined for `tenant`.
    async fn is_valid_scenario(
        &self,
        tenant: &TenantId,
        name: &ScenarioName,
    ) -> Result<bool, BackendError>;

    /// Scenario carried by every runtime regardless of rules.
    fn default_scenario_name(&self) -> ScenarioName {
        ScenarioName::default_scenario()
    }
}

/// Runtime inventory of a tenant.
///
/// Returned runtimes are snapshots; they may be stale by the time they are used.
#[async_trait]
pub trait ResourceDirectory: Send + Sync + 'static {
    async fn list_resources(&self, tenant: &TenantId) -> Result<Vec<Runtime>, BackendError>;

    async fn get_resource(
        &self,
        tenant: &TenantId,
        id: &RuntimeId,
    ) -> Result<Option<Runtime>, BackendError>;

    /// Overwrite the derived `scenarios` label of one runtime.
    ///
    /// Fails with [`BackendError::RuntimeNotFound`] if the runtime no longer exists.
    async fn set_derived_scenarios(
        &self,
        tenant: &TenantId,
        id: &RuntimeId,
        scenarios: BTreeSet<ScenarioName>,
    ) -> Result<(), BackendError>;
}
