mod ids;
pub use ids::{RuntimeId, ScenarioName, TenantId};

mod labels;
pub use labels::{LabelValue, Labels};

mod selector;
pub use selector::LabelSelector;

mod constants;
pub use constants::{DEFAULT_SCENARIO, SCENARIOS_LABEL_KEY};
