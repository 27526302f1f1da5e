//! Assignment manager: entry point for rule mutations and queries.
//! - Validates input against the tenant's scenario enumeration.
//! - Persists rule changes through a [`RuleStore`].
//! - Reconciles affected runtimes inside the tenant's exclusive section.
//! - Restores the previous rule set when reconciliation fails.
mod locks;

use std::{sync::Arc, time::Instant};

use tracing::{debug, error, info, instrument, warn};

use asa_model::{
    AssignmentInput, AutomaticScenarioAssignment, LabelSelector, Page, PageRequest, RuntimeId,
    ScenarioName, TenantId,
};

use crate::{
    config::EngineConfig,
    directory::{ResourceDirectory, ScenarioEnumeration},
    error::CoreError,
    metrics::{MetricsHandle, MutationOutcome, ReconcileTrigger, noop_metrics},
    reconciler::{ReconcileError, ReconcileReport, Reconciler},
    store::RuleStore,
};
use locks::TenantLocks;

const OP_CREATE: &str = "create";
const OP_DELETE_FOR_SCENARIO: &str = "delete_for_scenario";
const OP_DELETE_FOR_SELECTOR: &str = "delete_for_selector";

/// Which runtimes a reconciliation pass covers.
#[derive(Clone, Copy)]
enum Scope<'a> {
    All,
    Matching(&'a [LabelSelector]),
    One(&'a RuntimeId),
}

/// Tenant-scoped automatic scenario assignment service.
///
/// Every rule mutation and the reconciliation it triggers run as one unit under a per-tenant mutex,
/// so no runtime ever observes a scenario set derived from a half-applied rule change.
/// Read-only queries do not take the mutex.
pub struct AssignmentManager {
    store: Arc<dyn RuleStore>,
    scenarios: Arc<dyn ScenarioEnumeration>,
    reconciler: Reconciler,
    locks: TenantLocks,
    metrics: MetricsHandle,
    config: EngineConfig,
}

impl AssignmentManager {
    /// Create a manager with default config and no-op metrics.
    pub fn new(
        store: Arc<dyn RuleStore>,
        scenarios: Arc<dyn ScenarioEnumeration>,
        directory: Arc<dyn ResourceDirectory>,
    ) -> Self {
        let reconciler = Reconciler::new(directory, scenarios.default_scenario_name());
        Self {
            store,
            scenarios,
            reconciler,
            locks: TenantLocks::default(),
            metrics: noop_metrics(),
            config: EngineConfig::default(),
        }
    }

    /// Replace the metrics backend.
    pub fn with_metrics(mut self, metrics: MetricsHandle) -> Self {
        self.metrics = metrics;
        self
    }

    /// Replace the engine config.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Create or replace the rule for `input.scenario_name`.
    ///
    /// Fails with [`CoreError::InvalidScenario`] if the scenario is not defined for the tenant.
    /// Reconciles runtimes matching the new selector and, when a rule with a different selector was replaced, the old one.
    #[instrument(level = "debug", skip_all, fields(tenant = %tenant, scenario = %input.scenario_name, selector = %input.selector))]
    pub async fn create_assignment(
        &self,
        tenant: &TenantId,
        input: AssignmentInput,
    ) -> Result<AutomaticScenarioAssignment, CoreError> {
        let res = self.try_create(tenant, input).await;
        self.record(OP_CREATE, &res);
        res
    }

    /// Delete the rule for `scenario` and recompute every runtime of the tenant.
    ///
    /// Returns the deleted rule, or [`CoreError::NotFound`] without reconciling anything.
    #[instrument(level = "debug", skip_all, fields(tenant = %tenant, scenario = %scenario))]
    pub async fn delete_assignment_for_scenario(
        &self,
        tenant: &TenantId,
        scenario: &ScenarioName,
    ) -> Result<AutomaticScenarioAssignment, CoreError> {
        let res = self.try_delete_for_scenario(tenant, scenario).await;
        self.record(OP_DELETE_FOR_SCENARIO, &res);
        res
    }

    /// Delete every rule bound to `selector` as one batch and recompute every runtime of the tenant.
    ///
    /// Returns the deleted rules (possibly none).
    #[instrument(level = "debug", skip_all, fields(tenant = %tenant, selector = %selector))]
    pub async fn delete_assignments_for_selector(
        &self,
        tenant: &TenantId,
        selector: &LabelSelector,
    ) -> Result<Vec<AutomaticScenarioAssignment>, CoreError> {
        let res = self.try_delete_for_selector(tenant, selector).await;
        self.record(OP_DELETE_FOR_SELECTOR, &res);
        res
    }

    /// All rules of the tenant in insertion order.
    pub async fn list_assignments(
        &self,
        tenant: &TenantId,
    ) -> Result<Vec<AutomaticScenarioAssignment>, CoreError> {
        Ok(self.store.list(tenant).await?)
    }

    /// One page of the tenant's rules in insertion order.
    pub async fn list_assignments_page(
        &self,
        tenant: &TenantId,
        req: &PageRequest,
    ) -> Result<Page<AutomaticScenarioAssignment>, CoreError> {
        let offset = req.offset()?;
        let size = self.config.page_size(req.size);
        let all = self.store.list(tenant).await?;
        Ok(Page::slice(all, offset, size))
    }

    /// The rule bound to `scenario`.
    ///
    /// Fails with [`CoreError::NotFound`] when the tenant has no rule for it.
    pub async fn get_assignment_for_scenario(
        &self,
        tenant: &TenantId,
        scenario: &ScenarioName,
    ) -> Result<AutomaticScenarioAssignment, CoreError> {
        self.store
            .get_for_scenario(tenant, scenario)
            .await?
            .ok_or_else(|| CoreError::NotFound {
                tenant: tenant.clone(),
                scenario: scenario.clone(),
            })
    }

    /// Rules whose selector equals `selector` exactly, in insertion order.
    ///
    /// A selector no rule uses yields an empty list, not an error.
    pub async fn list_assignments_for_selector(
        &self,
        tenant: &TenantId,
        selector: &LabelSelector,
    ) -> Result<Vec<AutomaticScenarioAssignment>, CoreError> {
        Ok(self.store.list_for_selector(tenant, selector).await?)
    }

    /// Recompute one runtime after its plain labels changed.
    ///
    /// Runs inside the tenant's exclusive section against the current rule set.
    #[instrument(level = "debug", skip_all, fields(tenant = %tenant, runtime = %runtime))]
    pub async fn on_runtime_labels_changed(
        &self,
        tenant: &TenantId,
        runtime: &RuntimeId,
    ) -> Result<ReconcileReport, CoreError> {
        let _guard = self.locks.lock(tenant).await;
        let rules = self.store.list(tenant).await?;
        Ok(self
            .run_pass(tenant, &rules, Scope::One(runtime), ReconcileTrigger::LabelsChanged)
            .await?)
    }

    /// Recompute every runtime of the tenant without changing any rule.
    ///
    /// Used to converge after a [`CoreError::Reconciliation`] whose compensating pass also failed.
    #[instrument(level = "debug", skip_all, fields(tenant = %tenant))]
    pub async fn reconcile_tenant(&self, tenant: &TenantId) -> Result<ReconcileReport, CoreError> {
        let _guard = self.locks.lock(tenant).await;
        let rules = self.store.list(tenant).await?;
        let report = self
            .run_pass(tenant, &rules, Scope::All, ReconcileTrigger::Manual)
            .await?;
        info!(examined = report.examined, updated = report.updated, "tenant reconciled");
        Ok(report)
    }

    async fn try_create(
        &self,
        tenant: &TenantId,
        input: AssignmentInput,
    ) -> Result<AutomaticScenarioAssignment, CoreError> {
        input.selector.validate()?;

        let defined = self
            .scenarios
            .is_valid_scenario(tenant, &input.scenario_name)
            .await
            .map_err(CoreError::Enumeration)?;
        if !defined {
            return Err(CoreError::InvalidScenario {
                tenant: tenant.clone(),
                scenario: input.scenario_name,
            });
        }

        let rule = AutomaticScenarioAssignment::from_input(tenant.clone(), input);

        let _guard = self.locks.lock(tenant).await;
        let snapshot = self.store.list(tenant).await?;
        let previous = self.store.upsert(rule.clone()).await?;

        let mut selectors = vec![rule.selector.clone()];
        if let Some(prev) = previous.filter(|p| p.selector != rule.selector) {
            debug!(previous = %prev.selector, "selector replaced, reconciling old matches too");
            selectors.push(prev.selector);
        }

        let report = self
            .commit(
                tenant,
                snapshot,
                Scope::Matching(&selectors),
                ReconcileTrigger::RuleCreated,
            )
            .await?;
        info!(updated = report.updated, "assignment created");
        Ok(rule)
    }

    async fn try_delete_for_scenario(
        &self,
        tenant: &TenantId,
        scenario: &ScenarioName,
    ) -> Result<AutomaticScenarioAssignment, CoreError> {
        let _guard = self.locks.lock(tenant).await;
        let snapshot = self.store.list(tenant).await?;

        let Some(removed) = self.store.delete_for_scenario(tenant, scenario).await? else {
            return Err(CoreError::NotFound {
                tenant: tenant.clone(),
                scenario: scenario.clone(),
            });
        };

        let report = self
            .commit(tenant, snapshot, Scope::All, ReconcileTrigger::RuleDeleted)
            .await?;
        info!(updated = report.updated, "assignment deleted");
        Ok(removed)
    }

    async fn try_delete_for_selector(
        &self,
        tenant: &TenantId,
        selector: &LabelSelector,
    ) -> Result<Vec<AutomaticScenarioAssignment>, CoreError> {
        let _guard = self.locks.lock(tenant).await;
        let snapshot = self.store.list(tenant).await?;
        let removed = self.store.delete_for_selector(tenant, selector).await?;

        let report = self
            .commit(
                tenant,
                snapshot,
                Scope::All,
                ReconcileTrigger::SelectorDeleted,
            )
            .await?;
        info!(
            deleted = removed.len(),
            updated = report.updated,
            "assignments deleted for selector"
        );
        Ok(removed)
    }

    /// Reconcile after a persisted rule change; restore `snapshot` if that fails.
    ///
    /// Must be called with the tenant's section held.
    async fn commit(
        &self,
        tenant: &TenantId,
        snapshot: Vec<AutomaticScenarioAssignment>,
        scope: Scope<'_>,
        trigger: ReconcileTrigger,
    ) -> Result<ReconcileReport, CoreError> {
        let outcome = self.reconcile_current(tenant, scope, trigger).await;
        if let Err(e) = &outcome {
            warn!(error = %e, "reconciliation failed after persist, restoring previous rules");
            self.rollback(tenant, snapshot).await;
        }
        outcome
    }

    async fn reconcile_current(
        &self,
        tenant: &TenantId,
        scope: Scope<'_>,
        trigger: ReconcileTrigger,
    ) -> Result<ReconcileReport, CoreError> {
        let rules = self.store.list(tenant).await?;
        Ok(self.run_pass(tenant, &rules, scope, trigger).await?)
    }

    async fn rollback(&self, tenant: &TenantId, snapshot: Vec<AutomaticScenarioAssignment>) {
        if let Err(e) = self.store.replace_all(tenant, snapshot).await {
            error!(error = %e, "restoring rule snapshot failed");
            return;
        }

        match self
            .reconcile_current(tenant, Scope::All, ReconcileTrigger::Rollback)
            .await
        {
            Ok(report) => debug!(updated = report.updated, "compensating pass finished"),
            Err(e) => warn!(
                error = %e,
                "compensating pass failed, derived labels stay stale until the next successful pass"
            ),
        }
    }

    async fn run_pass(
        &self,
        tenant: &TenantId,
        rules: &[AutomaticScenarioAssignment],
        scope: Scope<'_>,
        trigger: ReconcileTrigger,
    ) -> Result<ReconcileReport, ReconcileError> {
        let started = Instant::now();
        let res = match scope {
            Scope::All => self.reconciler.reconcile_all(tenant, rules).await,
            Scope::Matching(selectors) => {
                self.reconciler
                    .reconcile_matching(tenant, rules, selectors)
                    .await
            }
            Scope::One(id) => self.reconciler.reconcile_one(tenant, id, rules).await,
        };

        match &res {
            Ok(report) => self.metrics.record_reconcile(
                trigger,
                report.examined,
                report.updated,
                started.elapsed(),
            ),
            Err(_) => self.metrics.record_reconcile_error(trigger),
        }
        res
    }

    fn record<T>(&self, op: &str, res: &Result<T, CoreError>) {
        let outcome = match res {
            Ok(_) => MutationOutcome::Applied,
            Err(
                CoreError::InvalidScenario { .. } | CoreError::Invalid(_) | CoreError::NotFound { .. },
            ) => MutationOutcome::Rejected,
            Err(_) => MutationOutcome::Failed,
        };
        self.metrics.record_mutation(op, outcome);
    }
}
