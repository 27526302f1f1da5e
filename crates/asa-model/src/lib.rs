mod domain;
pub use domain::{DEFAULT_SCENARIO, SCENARIOS_LABEL_KEY};
pub use domain::{LabelSelector, LabelValue, Labels, RuntimeId, ScenarioName, TenantId};

mod error;
pub use error::{ModelError, ModelResult};

mod assignment;
pub use assignment::{AssignmentInput, AutomaticScenarioAssignment};

mod runtime;
pub use runtime::Runtime;

mod page;
pub use page::{Page, PageInfo, PageRequest};
