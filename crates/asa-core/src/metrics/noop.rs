use std::time::Duration;

use crate::metrics::backend::{MetricsBackend, MutationOutcome, ReconcileTrigger};

/// No-op metrics backend that compiles to nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpMetrics;

impl MetricsBackend for NoOpMetrics {
    #[inline(always)]
    fn record_mutation(&self, _: &str, _: MutationOutcome) {}

    #[inline(always)]
    fn record_reconcile(&self, _: ReconcileTrigger, _: usize, _: usize, _: Duration) {}

    #[inline(always)]
    fn record_reconcile_error(&self, _: ReconcileTrigger) {}
}
