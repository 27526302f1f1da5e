//! Well-known label keys and scenario names shared by every layer.

/// Label key holding the derived scenario set of a runtime.
///
/// The value under this key is owned by the reconciler: it is never matched
/// by a selector and never written by anything else.
pub const SCENARIOS_LABEL_KEY: &str = "scenarios";

/// Scenario present in every tenant's enumeration and on every runtime.
pub const DEFAULT_SCENARIO: &str = "DEFAULT";
