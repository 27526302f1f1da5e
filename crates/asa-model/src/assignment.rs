use serde::{Deserialize, Serialize};

use crate::{LabelSelector, ScenarioName, TenantId};

/// Binding of one scenario name to one label selector within a tenant.
///
/// At most one assignment exists per `(tenant, scenario_name)`;
/// several scenario names may share the same selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomaticScenarioAssignment {
    /// Owning tenant.
    pub tenant: TenantId,
    /// Scenario added to every runtime matched by `selector`.
    pub scenario_name: ScenarioName,
    /// Exact-match selector over runtime labels.
    pub selector: LabelSelector,
}

impl AutomaticScenarioAssignment {
    /// Bind an input to a tenant.
    pub fn from_input(tenant: TenantId, input: AssignmentInput) -> Self {
        Self {
            tenant,
            scenario_name: input.scenario_name,
            selector: input.selector,
        }
    }
}

/// Tenant-less assignment payload as received from a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentInput {
    pub scenario_name: ScenarioName,
    pub selector: LabelSelector,
}

impl AssignmentInput {
    pub fn new(scenario_name: impl Into<ScenarioName>, selector: LabelSelector) -> Self {
        Self {
            scenario_name: scenario_name.into(),
            selector,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_input_keeps_fields() {
        let input = AssignmentInput::new("PRODUCTION", LabelSelector::new("KEY", "VALUE"));
        let asa = AutomaticScenarioAssignment::from_input(TenantId::from("t1"), input.clone());

        assert_eq!(asa.tenant.as_str(), "t1");
        assert_eq!(asa.scenario_name, input.scenario_name);
        assert_eq!(asa.selector, input.selector);
    }

    #[test]
    fn serde_uses_camel_case() {
        let input = AssignmentInput::new("ASA1", LabelSelector::new("keyA", "valueA"));
        let json = serde_json::to_string(&input).unwrap();
        assert!(json.contains("\"scenarioName\":\"ASA1\""));
        assert!(json.contains("\"selector\":{\"key\":\"keyA\",\"value\":\"valueA\"}"));
    }
}
