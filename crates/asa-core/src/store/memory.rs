use std::collections::HashSet;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::trace;

use asa_model::{AutomaticScenarioAssignment, LabelSelector, ScenarioName, TenantId};

use crate::{error::StoreError, store::RuleStore};

/// In-process [`RuleStore`] keeping each tenant's rules in insertion order.
///
/// Each call holds the tenant's map shard for its whole duration, so every operation is atomic.
#[derive(Debug, Default)]
pub struct InMemoryRuleStore {
    tenants: DashMap<TenantId, Vec<AutomaticScenarioAssignment>>,
}

impl InMemoryRuleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Position of the single rule for `scenario`, or a conflict if there are several.
fn position(
    rules: &[AutomaticScenarioAssignment],
    scenario: &ScenarioName,
) -> Result<Option<usize>, StoreError> {
    let mut found = rules
        .iter()
        .enumerate()
        .filter(|(_, r)| &r.scenario_name == scenario)
        .map(|(i, _)| i);

    let first = found.next();
    if found.next().is_some() {
        return Err(StoreError::Conflict(format!(
            "more than one rule for scenario '{scenario}'"
        )));
    }
    Ok(first)
}

#[async_trait]
impl RuleStore for InMemoryRuleStore {
    async fn insert(&self, rule: AutomaticScenarioAssignment) -> Result<(), StoreError> {
        let mut rules = self.tenants.entry(rule.tenant.clone()).or_default();
        if position(&rules, &rule.scenario_name)?.is_some() {
            return Err(StoreError::AlreadyExists(rule.scenario_name));
        }
        trace!(tenant = %rule.tenant, scenario = %rule.scenario_name, "rule inserted");
        rules.push(rule);
        Ok(())
    }

    async fn upsert(
        &self,
        rule: AutomaticScenarioAssignment,
    ) -> Result<Option<AutomaticScenarioAssignment>, StoreError> {
        let mut rules = self.tenants.entry(rule.tenant.clone()).or_default();
        match position(&rules, &rule.scenario_name)? {
            Some(i) => {
                trace!(tenant = %rule.tenant, scenario = %rule.scenario_name, "rule replaced");
                Ok(Some(std::mem::replace(&mut rules[i], rule)))
            }
            None => {
                trace!(tenant = %rule.tenant, scenario = %rule.scenario_name, "rule inserted");
                rules.push(rule);
                Ok(None)
            }
        }
    }

    async fn get_for_scenario(
        &self,
        tenant: &TenantId,
        scenario: &ScenarioName,
    ) -> Result<Option<AutomaticScenarioAssignment>, StoreError> {
        let Some(rules) = self.tenants.get(tenant) else {
            return Ok(None);
        };
        Ok(position(&rules, scenario)?.map(|i| rules[i].clone()))
    }

    async fn delete_for_scenario(
        &self,
        tenant: &TenantId,
        scenario: &ScenarioName,
    ) -> Result<Option<AutomaticScenarioAssignment>, StoreError> {
        let Some(mut rules) = self.tenants.get_mut(tenant) else {
            return Ok(None);
        };
        Ok(position(&rules, scenario)?.map(|i| rules.remove(i)))
    }

    async fn delete_for_selector(
        &self,
        tenant: &TenantId,
        selector: &LabelSelector,
    ) -> Result<Vec<AutomaticScenarioAssignment>, StoreError> {
        let Some(mut rules) = self.tenants.get_mut(tenant) else {
            return Ok(Vec::new());
        };
        let (deleted, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut *rules)
            .into_iter()
            .partition(|r| &r.selector == selector);
        *rules = kept;
        Ok(deleted)
    }

    async fn list(&self, tenant: &TenantId) -> Result<Vec<AutomaticScenarioAssignment>, StoreError> {
        Ok(self
            .tenants
            .get(tenant)
            .map(|rules| rules.value().clone())
            .unwrap_or_default())
    }

    async fn list_for_selector(
        &self,
        tenant: &TenantId,
        selector: &LabelSelector,
    ) -> Result<Vec<AutomaticScenarioAssignment>, StoreError> {
        Ok(self
            .tenants
            .get(tenant)
            .map(|rules| {
                rules
                    .iter()
                    .filter(|r| &r.selector == selector)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn replace_all(
        &self,
        tenant: &TenantId,
        rules: Vec<AutomaticScenarioAssignment>,
    ) -> Result<(), StoreError> {
        let mut seen = HashSet::new();
        for r in &rules {
            if &r.tenant != tenant {
                return Err(StoreError::Conflict(format!(
                    "rule for scenario '{}' belongs to tenant '{}', not '{tenant}'",
                    r.scenario_name, r.tenant
                )));
            }
            if !seen.insert(&r.scenario_name) {
                return Err(StoreError::Conflict(format!(
                    "more than one rule for scenario '{}'",
                    r.scenario_name
                )));
            }
        }
        self.tenants.insert(tenant.clone(), rules);
        Ok(())
    }
}
