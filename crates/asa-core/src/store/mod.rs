//! Per-tenant persistence of automatic scenario assignments.
//!
//! Stores are plain CRUD: they enforce "one rule per scenario name" mechanically but hold no
//! business logic. Deciding between strict insert and upsert is up to the caller.
mod memory;
pub use memory::InMemoryRuleStore;

use async_trait::async_trait;
use asa_model::{AutomaticScenarioAssignment, LabelSelector, ScenarioName, TenantId};

use crate::error::StoreError;

/// Tenant-scoped rule storage.
///
/// Every method is atomic: on error the tenant's rule set is unchanged.
/// No method may observe or touch another tenant's rules.
#[async_trait]
pub trait RuleStore: Send + Sync + 'static {
    /// Strict add. Fails with [`StoreError::AlreadyExists`] if the scenario already has a rule.
    async fn insert(&self, rule: AutomaticScenarioAssignment) -> Result<(), StoreError>;

    /// Insert or replace the rule for `rule.scenario_name`, returning the replaced rule.
    ///
    /// A replaced rule keeps its position in [`RuleStore::list`] order.
    async fn upsert(
        &self,
        rule: AutomaticScenarioAssignment,
    ) -> Result<Option<AutomaticScenarioAssignment>, StoreError>;

    async fn get_for_scenario(
        &self,
        tenant: &TenantId,
        scenario: &ScenarioName,
    ) -> Result<Option<AutomaticScenarioAssignment>, StoreError>;

    /// Remove and return the rule for `scenario`, if any.
    async fn delete_for_scenario(
        &self,
        tenant: &TenantId,
        scenario: &ScenarioName,
    ) -> Result<Option<AutomaticScenarioAssignment>, StoreError>;

    /// Remove every rule whose selector equals `selector` as one batch.
    async fn delete_for_selector(
        &self,
        tenant: &TenantId,
        selector: &LabelSelector,
    ) -> Result<Vec<AutomaticScenarioAssignment>, StoreError>;

    /// All rules of the tenant in insertion order.
    async fn list(&self, tenant: &TenantId) -> Result<Vec<AutomaticScenarioAssignment>, StoreError>;

    /// Rules whose selector equals `selector`, in insertion order.
    async fn list_for_selector(
        &self,
        tenant: &TenantId,
        selector: &LabelSelector,
    ) -> Result<Vec<AutomaticScenarioAssignment>, StoreError>;

    /// Replace the tenant's whole rule set with `rules` (used to restore a snapshot).
    ///
    /// Fails with [`StoreError::Conflict`] if `rules` names a scenario twice or belongs to another tenant.
    async fn replace_all(
        &self,
        tenant: &TenantId,
        rules: Vec<AutomaticScenarioAssignment>,
    ) -> Result<(), StoreError>;
}
