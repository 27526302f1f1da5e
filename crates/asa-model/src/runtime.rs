use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{Labels, RuntimeId, ScenarioName};

/// Snapshot of a managed runtime as seen by the reconciler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Runtime {
    pub id: RuntimeId,
    pub name: String,
    /// All labels, including the derived `scenarios` entry when present.
    #[serde(default, skip_serializing_if = "Labels::is_empty")]
    pub labels: Labels,
}

impl Runtime {
    /// Create a runtime with a random id and no labels.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: RuntimeId::random(),
            name: name.into(),
            labels: Labels::new(),
        }
    }

    /// Builder-style label setter.
    pub fn with_label<K, V>(mut self, key: K, val: V) -> Self
    where
        K: Into<String>,
        V: Into<crate::LabelValue>,
    {
        self.labels.insert(key, val);
        self
    }

    /// Current derived scenario set.
    pub fn scenarios(&self) -> BTreeSet<ScenarioName> {
        self.labels.scenarios()
    }
}
