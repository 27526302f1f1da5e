use std::{borrow::Borrow, fmt};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create an identifier from any string-like value.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Borrow the identifier as `&str`.
            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id! {
    /// Isolation boundary for rules and runtimes.
    ///
    /// No operation keyed by one tenant may observe or mutate another tenant's data.
    TenantId
}

string_id! {
    /// Identifier of a managed runtime.
    RuntimeId
}

string_id! {
    /// Name of a scenario drawn from a tenant's scenario enumeration.
    ScenarioName
}

impl RuntimeId {
    /// Generate a fresh random identifier (UUID v4).
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl ScenarioName {
    /// The reserved scenario carried by every runtime.
    pub fn default_scenario() -> Self {
        Self(crate::DEFAULT_SCENARIO.to_string())
    }

    /// Returns `true` for the reserved [`crate::DEFAULT_SCENARIO`].
    pub fn is_default(&self) -> bool {
        self.0 == crate::DEFAULT_SCENARIO
    }
}
