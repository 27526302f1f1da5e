use serde::{Deserialize, Serialize};

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Page size used when a list request does not ask for one.
    pub default_page_size: usize,
    /// Upper bound applied to any requested page size.
    pub max_page_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_page_size: 100,
            max_page_size: 500,
        }
    }
}

impl EngineConfig {
    /// Effective page size for a request, clamped to `1..=max_page_size`.
    pub fn page_size(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.default_page_size, 100);
        assert_eq!(cfg.max_page_size, 500);
    }

    #[test]
    fn page_size_is_clamped() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.page_size(None), 100);
        assert_eq!(cfg.page_size(Some(0)), 1);
        assert_eq!(cfg.page_size(Some(20)), 20);
        assert_eq!(cfg.page_size(Some(10_000)), 500);
    }

    #[test]
    fn serde_uses_defaults_for_missing_fields() {
        let cfg: EngineConfig = serde_json::from_str(r#"{"maxPageSize": 50}"#).unwrap();
        assert_eq!(cfg.max_page_size, 50);
        assert_eq!(cfg.default_page_size, 100);
        assert_eq!(cfg.page_size(None), 50);
    }
}
