use std::{sync::Arc, time::Duration};

use prometheus::{CounterVec, HistogramOpts, HistogramVec, Opts, Registry, proto::MetricFamily};

use asa_core::{MetricsBackend, MutationOutcome, ReconcileTrigger};

const NAMESPACE: &str = "asa";

/// Prometheus metrics for the assignment engine.
///
/// ## Metrics
/// - `asa_mutations_total{op, outcome}`
/// - `asa_reconcile_passes_total{trigger}`
/// - `asa_runtimes_examined_total{trigger}`
/// - `asa_runtimes_updated_total{trigger}`
/// - `asa_reconcile_duration_seconds{trigger}`
/// - `asa_reconcile_errors_total{trigger}`
///
/// Every label takes values from a closed set (operation names, [`MutationOutcome`], [`ReconcileTrigger`]).
/// Tenant ids are never used as labels.
#[derive(Clone)]
pub struct PrometheusMetrics {
    mutations: CounterVec,
    passes: CounterVec,
    examined: CounterVec,
    updated: CounterVec,
    duration: HistogramVec,
    errors: CounterVec,
    registry: Arc<Registry>,
}

impl PrometheusMetrics {
    /// Register every `asa_*` metric in `registry`.
    ///
    /// Fails if the registry already holds metrics with the same names.
    pub fn new_with_registry(registry: Arc<Registry>) -> Result<Self, prometheus::Error> {
        let mutations = counter(
            &registry,
            "mutations_total",
            "Rule mutations by operation and outcome",
            &["op", "outcome"],
        )?;
        let passes = counter(
            &registry,
            "reconcile_passes_total",
            "Completed reconciliation passes",
            &["trigger"],
        )?;
        let examined = counter(
            &registry,
            "runtimes_examined_total",
            "Runtimes whose scenario set was recomputed",
            &["trigger"],
        )?;
        let updated = counter(
            &registry,
            "runtimes_updated_total",
            "Runtimes whose derived scenarios label was rewritten",
            &["trigger"],
        )?;
        let errors = counter(
            &registry,
            "reconcile_errors_total",
            "Reconciliation passes that failed part-way",
            &["trigger"],
        )?;

        let duration = HistogramVec::new(
            HistogramOpts::new(
                "reconcile_duration_seconds",
                "Wall time of a reconciliation pass",
            )
            .namespace(NAMESPACE)
            .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
            &["trigger"],
        )?;
        registry.register(Box::new(duration.clone()))?;

        Ok(Self {
            mutations,
            passes,
            examined,
            updated,
            duration,
            errors,
            registry,
        })
    }

    /// Backend with its own fresh registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        Self::new_with_registry(Arc::new(Registry::new()))
    }

    /// Snapshot for a `/metrics` endpoint.
    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    /// Underlying registry, for registering metrics next to the `asa_*` ones.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }
}

fn counter(
    registry: &Registry,
    name: &str,
    help: &str,
    labels: &[&str],
) -> Result<CounterVec, prometheus::Error> {
    let vec = CounterVec::new(Opts::new(name, help).namespace(NAMESPACE), labels)?;
    registry.register(Box::new(vec.clone()))?;
    Ok(vec)
}

impl MetricsBackend for PrometheusMetrics {
    fn record_mutation(&self, op: &str, outcome: MutationOutcome) {
        self.mutations
            .with_label_values(&[op, outcome.as_label()])
            .inc();
    }

    fn record_reconcile(
        &self,
        trigger: ReconcileTrigger,
        examined: usize,
        updated: usize,
        elapsed: Duration,
    ) {
        let t = [trigger.as_label()];
        self.passes.with_label_values(&t).inc();
        self.examined.with_label_values(&t).inc_by(examined as f64);
        self.updated.with_label_values(&t).inc_by(updated as f64);
        self.duration
            .with_label_values(&t)
            .observe(elapsed.as_secs_f64());
    }

    fn record_reconcile_error(&self, trigger: ReconcileTrigger) {
        self.errors.with_label_values(&[trigger.as_label()]).inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn family<'a>(families: &'a [MetricFamily], name: &str) -> &'a MetricFamily {
        families
            .iter()
            .find(|f| f.name() == name)
            .unwrap_or_else(|| panic!("metric {name} not found"))
    }

    #[test]
    fn mutations_are_split_by_op_and_outcome() {
        let metrics = PrometheusMetrics::new().unwrap();

        metrics.record_mutation("create", MutationOutcome::Applied);
        metrics.record_mutation("create", MutationOutcome::Applied);
        metrics.record_mutation("create", MutationOutcome::Rejected);
        metrics.record_mutation("delete_for_scenario", MutationOutcome::Failed);

        let families = metrics.gather();
        let mutations = family(&families, "asa_mutations_total");
        assert_eq!(mutations.get_metric().len(), 3);

        let applied = metrics
            .mutations
            .with_label_values(&["create", "applied"])
            .get();
        assert_eq!(applied, 2.0);
    }

    #[test]
    fn reconcile_pass_feeds_counters_and_histogram() {
        let metrics = PrometheusMetrics::new().unwrap();

        metrics.record_reconcile(ReconcileTrigger::RuleCreated, 3, 2, Duration::from_millis(12));
        metrics.record_reconcile(ReconcileTrigger::RuleCreated, 3, 0, Duration::from_millis(4));

        let t = ["rule_created"];
        assert_eq!(metrics.passes.with_label_values(&t).get(), 2.0);
        assert_eq!(metrics.examined.with_label_values(&t).get(), 6.0);
        assert_eq!(metrics.updated.with_label_values(&t).get(), 2.0);
        assert_eq!(metrics.duration.with_label_values(&t).get_sample_count(), 2);

        let families = metrics.gather();
        family(&families, "asa_reconcile_duration_seconds");
    }

    #[test]
    fn sub_millisecond_pass_is_not_rounded_to_zero() {
        let metrics = PrometheusMetrics::new().unwrap();

        metrics.record_reconcile(ReconcileTrigger::LabelsChanged, 1, 1, Duration::from_micros(300));

        let h = metrics.duration.with_label_values(&["labels_changed"]);
        assert_eq!(h.get_sample_count(), 1);
        assert!((h.get_sample_sum() - 0.0003).abs() < 1e-9);
    }

    #[test]
    fn errors_are_split_by_trigger() {
        let metrics = PrometheusMetrics::new().unwrap();

        metrics.record_reconcile_error(ReconcileTrigger::RuleDeleted);
        metrics.record_reconcile_error(ReconcileTrigger::Rollback);

        let families = metrics.gather();
        let errors = family(&families, "asa_reconcile_errors_total");
        assert_eq!(errors.get_metric().len(), 2);
    }

    #[test]
    fn custom_metrics_share_the_registry() {
        let metrics = PrometheusMetrics::new().unwrap();
        let extra = prometheus::IntCounter::new("asa_demo_runs_total", "Demo runs").unwrap();
        metrics.registry().register(Box::new(extra.clone())).unwrap();
        extra.inc();

        let families = metrics.gather();
        let runs = family(&families, "asa_demo_runs_total");
        assert_eq!(runs.get_metric().len(), 1);
    }

    #[test]
    fn shared_registry_rejects_second_backend() {
        let registry = Arc::new(Registry::new());
        let _first = PrometheusMetrics::new_with_registry(registry.clone()).unwrap();

        assert!(PrometheusMetrics::new_with_registry(registry).is_err());
    }

    #[tokio::test]
    async fn manager_reports_through_backend() {
        use asa_core::{AssignmentManager, InMemoryRuleStore, InMemoryRuntimes, InMemoryScenarios};
        use asa_model::{AssignmentInput, LabelSelector, Runtime, TenantId};

        let tenant = TenantId::from("t1");
        let scenarios = Arc::new(InMemoryScenarios::new());
        scenarios.define(&tenant, ["PRODUCTION"]);
        let runtimes = Arc::new(InMemoryRuntimes::new());
        runtimes.register(&tenant, Runtime::new("rt").with_label("KEY", "VALUE"));

        let metrics = PrometheusMetrics::new().unwrap();
        let manager = AssignmentManager::new(
            Arc::new(InMemoryRuleStore::new()),
            scenarios,
            runtimes,
        )
        .with_metrics(Arc::new(metrics.clone()));

        manager
            .create_assignment(
                &tenant,
                AssignmentInput::new("PRODUCTION", LabelSelector::new("KEY", "VALUE")),
            )
            .await
            .unwrap();

        assert_eq!(
            metrics
                .updated
                .with_label_values(&["rule_created"])
                .get(),
            1.0
        );
        assert_eq!(
            metrics
                .mutations
                .with_label_values(&["create", "applied"])
                .get(),
            1.0
        );
    }
}
