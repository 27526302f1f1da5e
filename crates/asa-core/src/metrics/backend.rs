use std::{sync::Arc, time::Duration};

/// Result of a rule mutation for metrics classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// Rule change persisted and reconciled.
    Applied,
    /// Rejected by validation before anything was persisted.
    Rejected,
    /// Persist or reconcile phase failed.
    Failed,
}

impl MutationOutcome {
    /// Return label value for metrics.
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            MutationOutcome::Applied => "applied",
            MutationOutcome::Rejected => "rejected",
            MutationOutcome::Failed => "failed",
        }
    }
}

/// What caused a reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileTrigger {
    RuleCreated,
    RuleDeleted,
    SelectorDeleted,
    LabelsChanged,
    Manual,
    Rollback,
}

impl ReconcileTrigger {
    /// Return label value for metrics.
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            ReconcileTrigger::RuleCreated => "rule_created",
            ReconcileTrigger::RuleDeleted => "rule_deleted",
            ReconcileTrigger::SelectorDeleted => "selector_deleted",
            ReconcileTrigger::LabelsChanged => "labels_changed",
            ReconcileTrigger::Manual => "manual",
            ReconcileTrigger::Rollback => "rollback",
        }
    }
}

/// Backend metrics collection interface.
pub trait MetricsBackend: Send + Sync + 'static {
    /// Record the outcome of a rule mutation.
    ///
    /// # Arguments
    /// - `op`: operation name (`create`, `delete_for_scenario`, `delete_for_selector`)
    /// - `outcome`: how the mutation ended
    fn record_mutation(&self, op: &str, outcome: MutationOutcome);
    /// Record a completed reconciliation pass.
    ///
    /// # Arguments
    /// - `trigger`: what started the pass
    /// - `examined`: runtimes whose scenario set was recomputed
    /// - `updated`: runtimes whose derived label actually changed
    /// - `elapsed`: wall time of the pass
    fn record_reconcile(
        &self,
        trigger: ReconcileTrigger,
        examined: usize,
        updated: usize,
        elapsed: Duration,
    );
    /// Record a reconciliation pass that failed part-way.
    fn record_reconcile_error(&self, trigger: ReconcileTrigger);
}

/// Shared handle to metrics backend.
pub type MetricsHandle = Arc<dyn MetricsBackend>;
