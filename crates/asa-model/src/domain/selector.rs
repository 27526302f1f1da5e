use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{ModelError, ModelResult, SCENARIOS_LABEL_KEY};

/// Exact-match `(key, value)` predicate over a runtime's labels.
///
/// Selectors are neither ranges nor patterns: both the key and the value are compared by string equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelSelector {
    /// Label key to look up.
    key: String,
    /// Value the label must hold (or contain, for set-valued labels).
    value: String,
}

impl LabelSelector {
    /// Create a new selector.
    pub fn new<K, V>(key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Get the key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Get the value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Reject selectors that can never be evaluated meaningfully.
    ///
    /// Only empty parts are rejected; a whitespace value is compared as-is.
    ///
    /// The derived [`SCENARIOS_LABEL_KEY`] is reserved: a rule keyed on it would make the derived set depend on itself.
    pub fn validate(&self) -> ModelResult<()> {
        if self.key.is_empty() {
            return Err(ModelError::InvalidSelector("key cannot be empty".into()));
        }
        if self.value.is_empty() {
            return Err(ModelError::InvalidSelector("value cannot be empty".into()));
        }
        if self.key == SCENARIOS_LABEL_KEY {
            return Err(ModelError::InvalidSelector(format!(
                "key '{SCENARIOS_LABEL_KEY}' is reserved for derived scenarios"
            )));
        }
        Ok(())
    }
}

impl fmt::Display for LabelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

impl From<(&str, &str)> for LabelSelector {
    fn from((key, value): (&str, &str)) -> Self {
        Self::new(key, value)
    }
}

impl From<(String, String)> for LabelSelector {
    fn from((key, value): (String, String)) -> Self {
        Self { key, value }
    }
}
