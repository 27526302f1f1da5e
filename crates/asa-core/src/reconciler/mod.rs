//! Derived `scenarios` label reconciliation.
//!
//! The desired scenario set of a runtime is always recomputed from scratch:
//! `DEFAULT ∪ { rule.scenario_name | rule.selector matches the runtime's non-derived labels }`.
//! A pass therefore yields the same result no matter how many rule changes happened before it
//! or in which order, and re-running it without rule changes writes nothing.
use std::{collections::BTreeSet, sync::Arc};

use thiserror::Error;
use tracing::{debug, instrument, trace};

use asa_model::{
    AutomaticScenarioAssignment, LabelSelector, Labels, Runtime, RuntimeId, ScenarioName, TenantId,
};

use crate::{directory::ResourceDirectory, error::BackendError, matcher::matches};

/// Failure inside a reconciliation pass.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("listing runtimes failed: {0}")]
    List(#[source] BackendError),

    #[error("reading runtime '{runtime}' failed: {source}")]
    Lookup {
        runtime: RuntimeId,
        #[source]
        source: BackendError,
    },

    #[error("updating runtime '{runtime}' failed: {source}")]
    Update {
        runtime: RuntimeId,
        #[source]
        source: BackendError,
    },
}

/// Summary of one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Runtimes whose desired set was recomputed.
    pub examined: usize,
    /// Runtimes whose derived label was written.
    pub updated: usize,
}

/// Desired derived scenario set for a runtime with the given labels.
///
/// The derived `scenarios` entry of `labels` is ignored.
pub fn desired_scenarios(
    labels: &Labels,
    rules: &[AutomaticScenarioAssignment],
    default: &ScenarioName,
) -> BTreeSet<ScenarioName> {
    let plain = labels.without_derived();

    let mut out = BTreeSet::from([default.clone()]);
    out.extend(
        rules
            .iter()
            .filter(|r| matches(&plain, &r.selector))
            .map(|r| r.scenario_name.clone()),
    );
    out
}

/// Writes derived scenario sets through a [`ResourceDirectory`].
///
/// The reconciler holds no locks of its own; callers serialize passes per tenant.
#[derive(Clone)]
pub struct Reconciler {
    directory: Arc<dyn ResourceDirectory>,
    default: ScenarioName,
}

impl Reconciler {
    /// Reconciler writing through `directory`.
    ///
    /// `default` is kept on every runtime regardless of rules.
    pub fn new(directory: Arc<dyn ResourceDirectory>, default: ScenarioName) -> Self {
        Self { directory, default }
    }

    /// Recompute every runtime of the tenant.
    #[instrument(level = "debug", skip_all, fields(tenant = %tenant, rules = rules.len()))]
    pub async fn reconcile_all(
        &self,
        tenant: &TenantId,
        rules: &[AutomaticScenarioAssignment],
    ) -> Result<ReconcileReport, ReconcileError> {
        let runtimes = self
            .directory
            .list_resources(tenant)
            .await
            .map_err(ReconcileError::List)?;
        self.apply(tenant, runtimes, rules).await
    }

    /// Recompute only runtimes matched by at least one of `selectors`.
    ///
    /// Sufficient after a rule creation: runtimes matched by none of the selectors touched by the change keep their set.
    #[instrument(level = "debug", skip_all, fields(tenant = %tenant, rules = rules.len()))]
    pub async fn reconcile_matching(
        &self,
        tenant: &TenantId,
        rules: &[AutomaticScenarioAssignment],
        selectors: &[LabelSelector],
    ) -> Result<ReconcileReport, ReconcileError> {
        let runtimes: Vec<Runtime> = self
            .directory
            .list_resources(tenant)
            .await
            .map_err(ReconcileError::List)?
            .into_iter()
            .filter(|rt| {
                let plain = rt.labels.without_derived();
                selectors.iter().any(|s| matches(&plain, s))
            })
            .collect();
        trace!(matched = runtimes.len(), "selected runtimes for reconciliation");
        self.apply(tenant, runtimes, rules).await
    }

    /// Recompute a single runtime. A runtime that no longer exists is skipped.
    #[instrument(level = "debug", skip_all, fields(tenant = %tenant, runtime = %id))]
    pub async fn reconcile_one(
        &self,
        tenant: &TenantId,
        id: &RuntimeId,
        rules: &[AutomaticScenarioAssignment],
    ) -> Result<ReconcileReport, ReconcileError> {
        let runtime = self
            .directory
            .get_resource(tenant, id)
            .await
            .map_err(|source| ReconcileError::Lookup {
                runtime: id.clone(),
                source,
            })?;

        match runtime {
            Some(rt) => self.apply(tenant, vec![rt], rules).await,
            None => {
                debug!("runtime is gone, nothing to reconcile");
                Ok(ReconcileReport::default())
            }
        }
    }

    async fn apply(
        &self,
        tenant: &TenantId,
        runtimes: Vec<Runtime>,
        rules: &[AutomaticScenarioAssignment],
    ) -> Result<ReconcileReport, ReconcileError> {
        let mut report = ReconcileReport::default();

        for rt in runtimes {
            report.examined += 1;

            let want = desired_scenarios(&rt.labels, rules, &self.default);
            if rt.labels.scenarios() == want {
                trace!(runtime = %rt.id, "scenarios already up to date");
                continue;
            }

            debug!(runtime = %rt.id, scenarios = ?want, "updating derived scenarios");
            match self
                .directory
                .set_derived_scenarios(tenant, &rt.id, want)
                .await
            {
                Ok(()) => report.updated += 1,
                Err(BackendError::RuntimeNotFound(_)) => {
                    debug!(runtime = %rt.id, "runtime removed during reconciliation, skipping");
                }
                Err(source) => {
                    return Err(ReconcileError::Update {
                        runtime: rt.id,
                        source,
                    });
                }
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::directory::InMemoryRuntimes;

    /// Directory whose runtimes are removed right after they are listed.
    #[derive(Default)]
    struct Vanishing {
        inner: InMemoryRuntimes,
    }

    #[async_trait]
    impl ResourceDirectory for Vanishing {
        async fn list_resources(&self, tenant: &TenantId) -> Result<Vec<Runtime>, BackendError> {
            let listed = self.inner.list_resources(tenant).await?;
            for rt in &listed {
                self.inner.unregister(tenant, &rt.id);
            }
            Ok(listed)
        }

        async fn get_resource(
            &self,
            tenant: &TenantId,
            id: &RuntimeId,
        ) -> Result<Option<Runtime>, BackendError> {
            self.inner.get_resource(tenant, id).await
        }

        async fn set_derived_scenarios(
            &self,
            tenant: &TenantId,
            id: &RuntimeId,
            scenarios: BTreeSet<ScenarioName>,
        ) -> Result<(), BackendError> {
            self.inner.set_derived_scenarios(tenant, id, scenarios).await
        }
    }

    fn rule(scenario: &str, key: &str, value: &str) -> AutomaticScenarioAssignment {
        AutomaticScenarioAssignment {
            tenant: TenantId::from("t1"),
            scenario_name: ScenarioName::from(scenario),
            selector: LabelSelector::new(key, value),
        }
    }

    fn set(names: &[&str]) -> BTreeSet<ScenarioName> {
        names.iter().map(|n| ScenarioName::from(*n)).collect()
    }

    fn default() -> ScenarioName {
        ScenarioName::default_scenario()
    }

    #[test]
    fn no_rules_yields_default_only() {
        let mut labels = Labels::new();
        labels.insert("KEY", "VALUE");
        assert_eq!(desired_scenarios(&labels, &[], &default()), set(&["DEFAULT"]));
    }

    #[test]
    fn shared_selector_applies_every_bound_scenario() {
        let rules = [
            rule("A", "keyA", "valueA"),
            rule("B", "keyA", "valueA"),
            rule("C", "keyB", "valueB"),
        ];
        let mut labels = Labels::new();
        labels.insert("keyA", "valueA");

        assert_eq!(
            desired_scenarios(&labels, &rules, &default()),
            set(&["DEFAULT", "A", "B"])
        );
    }

    #[test]
    fn derived_label_is_ignored_when_matching() {
        let rules = [rule("A", "keyA", "valueA")];
        let mut labels = Labels::new();
        labels.set_scenarios(&set(&["DEFAULT", "A", "STALE"]));

        assert_eq!(desired_scenarios(&labels, &rules, &default()), set(&["DEFAULT"]));
    }

    #[tokio::test]
    async fn second_pass_without_changes_writes_nothing() {
        let t1 = TenantId::from("t1");
        let runtimes = Arc::new(InMemoryRuntimes::new());
        let id = runtimes.register(&t1, Runtime::new("rt").with_label("keyA", "valueA"));
        runtimes.register(&t1, Runtime::new("other"));

        let reconciler = Reconciler::new(runtimes.clone(), default());
        let rules = [rule("A", "keyA", "valueA")];

        let first = reconciler.reconcile_all(&t1, &rules).await.unwrap();
        assert_eq!(first, ReconcileReport { examined: 2, updated: 1 });
        assert_eq!(runtimes.get(&t1, &id).unwrap().scenarios(), set(&["DEFAULT", "A"]));

        let second = reconciler.reconcile_all(&t1, &rules).await.unwrap();
        assert_eq!(second, ReconcileReport { examined: 2, updated: 0 });
        assert_eq!(runtimes.get(&t1, &id).unwrap().scenarios(), set(&["DEFAULT", "A"]));
    }

    #[tokio::test]
    async fn reconcile_matching_skips_unmatched_runtimes() {
        let t1 = TenantId::from("t1");
        let runtimes = Arc::new(InMemoryRuntimes::new());
        runtimes.register(&t1, Runtime::new("rt").with_label("KEY", "VALUE"));
        runtimes.register(&t1, Runtime::new("other"));

        let reconciler = Reconciler::new(runtimes.clone(), default());
        let rules = [rule("PRODUCTION", "KEY", "VALUE")];
        let report = reconciler
            .reconcile_matching(&t1, &rules, &[LabelSelector::new("KEY", "VALUE")])
            .await
            .unwrap();

        assert_eq!(report, ReconcileReport { examined: 1, updated: 1 });
    }

    #[tokio::test]
    async fn reconcile_one_tolerates_missing_runtime() {
        let runtimes = Arc::new(InMemoryRuntimes::new());
        let reconciler = Reconciler::new(runtimes, default());

        let report = reconciler
            .reconcile_one(&TenantId::from("t1"), &RuntimeId::from("gone"), &[])
            .await
            .unwrap();
        assert_eq!(report, ReconcileReport::default());
    }

    #[tokio::test]
    async fn runtimes_removed_mid_pass_are_skipped() {
        let t1 = TenantId::from("t1");
        let directory = Arc::new(Vanishing::default());
        directory
            .inner
            .register(&t1, Runtime::new("rt0").with_label("KEY", "VALUE"));
        directory
            .inner
            .register(&t1, Runtime::new("rt1").with_label("KEY", "VALUE"));

        let reconciler = Reconciler::new(directory.clone(), default());
        let report = reconciler
            .reconcile_all(&t1, &[rule("PRODUCTION", "KEY", "VALUE")])
            .await
            .unwrap();

        assert_eq!(report, ReconcileReport { examined: 2, updated: 0 });
        assert!(directory.inner.list_resources(&t1).await.unwrap().is_empty());
    }
}
