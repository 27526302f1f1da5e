use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use dashmap::DashMap;

use asa_model::{
    LabelValue, Runtime, RuntimeId, SCENARIOS_LABEL_KEY, ScenarioName, TenantId,
};

use crate::{
    directory::{ResourceDirectory, ScenarioEnumeration},
    error::BackendError,
};

/// In-memory [`ScenarioEnumeration`].
///
/// The default scenario is implicitly defined for every tenant and cannot be removed.
#[derive(Debug, Default)]
pub struct InMemoryScenarios {
    tenants: DashMap<TenantId, BTreeSet<ScenarioName>>,
}

impl InMemoryScenarios {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the tenant's scenario list. The default scenario is always added.
    pub fn define<I, S>(&self, tenant: &TenantId, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<ScenarioName>,
    {
        let mut set: BTreeSet<ScenarioName> = names.into_iter().map(Into::into).collect();
        set.insert(ScenarioName::default_scenario());
        self.tenants.insert(tenant.clone(), set);
    }

    /// Remove one scenario name. Returns `false` for the default scenario or an unknown name.
    pub fn remove(&self, tenant: &TenantId, name: &ScenarioName) -> bool {
        if name.is_default() {
            return false;
        }
        self.tenants
            .get_mut(tenant)
            .is_some_and(|mut set| set.remove(name))
    }

    /// Defined scenario names of a tenant, sorted.
    pub fn list(&self, tenant: &TenantId) -> Vec<ScenarioName> {
        match self.tenants.get(tenant) {
            Some(set) => set.iter().cloned().collect(),
            None => vec![ScenarioName::default_scenario()],
        }
    }
}

#[async_trait]
impl ScenarioEnumeration for InMemoryScenarios {
    async fn is_valid_scenario(
        &self,
        tenant: &TenantId,
        name: &ScenarioName,
    ) -> Result<bool, BackendError> {
        if name.is_default() {
            return Ok(true);
        }
        Ok(self
            .tenants
            .get(tenant)
            .is_some_and(|set| set.contains(name)))
    }
}

/// In-memory [`ResourceDirectory`] with the label-editing surface of a runtime registry.
///
/// Plain label edits do not reconcile anything on their own; call
/// [`crate::AssignmentManager::on_runtime_labels_changed`] afterwards.
#[derive(Debug, Default)]
pub struct InMemoryRuntimes {
    tenants: DashMap<TenantId, BTreeMap<RuntimeId, Runtime>>,
}

impl InMemoryRuntimes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a runtime. It starts with the default scenario only.
    pub fn register(&self, tenant: &TenantId, mut runtime: Runtime) -> RuntimeId {
        runtime
            .labels
            .set_scenarios(&BTreeSet::from([ScenarioName::default_scenario()]));
        let id = runtime.id.clone();
        self.tenants
            .entry(tenant.clone())
            .or_default()
            .insert(id.clone(), runtime);
        id
    }

    /// Remove a runtime, returning its last snapshot.
    pub fn unregister(&self, tenant: &TenantId, id: &RuntimeId) -> Option<Runtime> {
        self.tenants.get_mut(tenant)?.remove(id)
    }

    /// Set a plain (non-derived) label.
    pub fn set_label(
        &self,
        tenant: &TenantId,
        id: &RuntimeId,
        key: &str,
        value: impl Into<LabelValue>,
    ) -> Result<(), BackendError> {
        Self::reject_derived(key)?;
        self.with_runtime(tenant, id, |rt| {
            rt.labels.insert(key, value);
        })
    }

    /// Remove a plain (non-derived) label.
    pub fn remove_label(
        &self,
        tenant: &TenantId,
        id: &RuntimeId,
        key: &str,
    ) -> Result<(), BackendError> {
        Self::reject_derived(key)?;
        self.with_runtime(tenant, id, |rt| {
            rt.labels.remove(key);
        })
    }

    /// Snapshot of one runtime.
    pub fn get(&self, tenant: &TenantId, id: &RuntimeId) -> Option<Runtime> {
        self.tenants.get(tenant)?.get(id).cloned()
    }

    fn reject_derived(key: &str) -> Result<(), BackendError> {
        if key == SCENARIOS_LABEL_KEY {
            return Err(BackendError::Rejected(format!(
                "label '{SCENARIOS_LABEL_KEY}' is derived and cannot be edited directly"
            )));
        }
        Ok(())
    }

    fn with_runtime<F>(&self, tenant: &TenantId, id: &RuntimeId, f: F) -> Result<(), BackendError>
    where
        F: FnOnce(&mut Runtime),
    {
        let mut runtimes = self
            .tenants
            .get_mut(tenant)
            .ok_or_else(|| BackendError::RuntimeNotFound(id.clone()))?;
        let rt = runtimes
            .get_mut(id)
            .ok_or_else(|| BackendError::RuntimeNotFound(id.clone()))?;
        f(rt);
        Ok(())
    }
}

#[async_trait]
impl ResourceDirectory for InMemoryRuntimes {
    async fn list_resources(&self, tenant: &TenantId) -> Result<Vec<Runtime>, BackendError> {
        Ok(self
            .tenants
            .get(tenant)
            .map(|runtimes| runtimes.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn get_resource(
        &self,
        tenant: &TenantId,
        id: &RuntimeId,
    ) -> Result<Option<Runtime>, BackendError> {
        Ok(self.get(tenant, id))
    }

    async fn set_derived_scenarios(
        &self,
        tenant: &TenantId,
        id: &RuntimeId,
        scenarios: BTreeSet<ScenarioName>,
    ) -> Result<(), BackendError> {
        self.with_runtime(tenant, id, |rt| rt.labels.set_scenarios(&scenarios))
    }
}
