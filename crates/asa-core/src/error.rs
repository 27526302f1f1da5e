use thiserror::Error;

use asa_model::{ModelError, RuntimeId, ScenarioName, TenantId};

use crate::reconciler::ReconcileError;

/// Errors raised by a [`crate::RuleStore`] implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("assignment for scenario '{0}' already exists")]
    AlreadyExists(ScenarioName),

    #[error("store holds conflicting rules: {0}")]
    Conflict(String),

    #[error("rule store unavailable: {0}")]
    Unavailable(String),
}

/// Errors raised by external collaborators (scenario enumeration, runtime directory).
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("runtime not found: {0}")]
    RuntimeNotFound(RuntimeId),

    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// Errors returned by [`crate::AssignmentManager`] operations.
///
/// Validation errors are raised before anything is persisted.
/// Persist and reconcile failures carry the phase that failed; both are safe to retry.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("scenario '{scenario}' is not defined for tenant '{tenant}'")]
    InvalidScenario {
        tenant: TenantId,
        scenario: ScenarioName,
    },

    #[error("invalid input: {0}")]
    Invalid(#[from] ModelError),

    #[error("no assignment for scenario '{scenario}' in tenant '{tenant}'")]
    NotFound {
        tenant: TenantId,
        scenario: ScenarioName,
    },

    #[error("conflicting state: {0}")]
    ConflictingState(String),

    #[error("persist phase failed: {0}")]
    Persistence(StoreError),

    #[error("reconcile phase failed: {0}")]
    Reconciliation(#[from] ReconcileError),

    #[error("scenario enumeration failed: {0}")]
    Enumeration(BackendError),
}

impl CoreError {
    /// Returns `true` if repeating the whole operation is expected to help.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CoreError::Persistence(_) | CoreError::Reconciliation(_) | CoreError::Enumeration(_)
        )
    }
}

impl From<StoreError> for CoreError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(msg) => CoreError::ConflictingState(msg),
            other => CoreError::Persistence(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_conflict_maps_to_conflicting_state() {
        let err = CoreError::from(StoreError::Conflict("two rules for A".into()));
        assert!(matches!(err, CoreError::ConflictingState(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn store_outage_is_retryable_persistence_failure() {
        let err = CoreError::from(StoreError::Unavailable("down".into()));
        assert!(matches!(err, CoreError::Persistence(_)));
        assert!(err.is_retryable());
        assert!(err.to_string().starts_with("persist phase failed"));
    }

    #[test]
    fn reconcile_failure_names_phase_and_runtime() {
        let err = CoreError::from(ReconcileError::Update {
            runtime: RuntimeId::from("rt-1"),
            source: BackendError::Unavailable("timeout".into()),
        });
        assert!(err.is_retryable());
        let msg = err.to_string();
        assert!(msg.contains("reconcile phase failed"), "{msg}");
        assert!(msg.contains("rt-1"), "{msg}");
    }

    #[test]
    fn validation_errors_are_not_retryable() {
        let err = CoreError::InvalidScenario {
            tenant: TenantId::from("t"),
            scenario: ScenarioName::from("NOPE"),
        };
        assert!(!err.is_retryable());
    }
}
