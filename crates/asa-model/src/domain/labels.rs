use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{SCENARIOS_LABEL_KEY, ScenarioName};

/// Value stored under a runtime label key.
///
/// A label either holds a single string or a set of strings
/// (the derived `scenarios` label is always a set).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LabelValue {
    /// Plain string value.
    Scalar(String),
    /// Unordered collection of strings, kept sorted for stable output.
    Set(BTreeSet<String>),
}

impl LabelValue {
    /// Exact-equality membership test used by selector matching.
    ///
    /// - `Scalar(s)`: `s == value`
    /// - `Set(items)`: `items` contains `value`
    pub fn contains(&self, value: &str) -> bool {
        match self {
            LabelValue::Scalar(s) => s == value,
            LabelValue::Set(items) => items.contains(value),
        }
    }
}

impl From<&str> for LabelValue {
    fn from(value: &str) -> Self {
        LabelValue::Scalar(value.to_string())
    }
}

impl From<String> for LabelValue {
    fn from(value: String) -> Self {
        LabelValue::Scalar(value)
    }
}

impl From<BTreeSet<String>> for LabelValue {
    fn from(value: BTreeSet<String>) -> Self {
        LabelValue::Set(value)
    }
}

impl<const N: usize> From<[&str; N]> for LabelValue {
    fn from(values: [&str; N]) -> Self {
        LabelValue::Set(values.iter().map(|s| s.to_string()).collect())
    }
}

/// Label map of a runtime, ordered by key.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Labels(pub BTreeMap<String, LabelValue>);

impl Labels {
    /// Create an empty set of labels.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Returns `true` if no labels are present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Insert or overwrite a label.
    ///
    /// Returns `self` for chaining.
    pub fn insert<K, V>(&mut self, key: K, val: V) -> &mut Self
    where
        K: Into<String>,
        V: Into<LabelValue>,
    {
        self.0.insert(key.into(), val.into());
        self
    }

    /// Remove a label, returning its previous value.
    pub fn remove(&mut self, key: &str) -> Option<LabelValue> {
        self.0.remove(key)
    }

    /// Get the value for a key, if present.
    pub fn get(&self, key: &str) -> Option<&LabelValue> {
        self.0.get(key)
    }

    /// Copy of the labels without the derived [`SCENARIOS_LABEL_KEY`] entry.
    ///
    /// Selectors are only ever evaluated against this view.
    pub fn without_derived(&self) -> Labels {
        Labels(
            self.0
                .iter()
                .filter(|(k, _)| k.as_str() != SCENARIOS_LABEL_KEY)
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }

    /// Current derived scenario set. Empty if the label is absent.
    ///
    /// A scalar value is read as a one-element set.
    pub fn scenarios(&self) -> BTreeSet<ScenarioName> {
        match self.0.get(SCENARIOS_LABEL_KEY) {
            Some(LabelValue::Set(items)) => items
                .iter()
                .map(|s| ScenarioName::from(s.as_str()))
                .collect(),
            Some(LabelValue::Scalar(s)) => BTreeSet::from([ScenarioName::from(s.as_str())]),
            None => BTreeSet::new(),
        }
    }

    /// Replace the derived scenario set.
    pub fn set_scenarios(&mut self, scenarios: &BTreeSet<ScenarioName>) {
        let set = scenarios.iter().map(|s| s.to_string()).collect();
        self.0.insert(SCENARIOS_LABEL_KEY.to_string(), LabelValue::Set(set));
    }
}
