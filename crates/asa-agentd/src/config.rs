use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use asa_core::EngineConfig;
use asa_observe::LoggerConfig;

/// Env var naming the JSON config file.
pub const CONFIG_ENV: &str = "ASA_CONFIG";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub logger: LoggerConfig,
    pub engine: EngineConfig,
}

impl AgentConfig {
    /// Load from the file named by [`CONFIG_ENV`], or defaults when it is unset.
    pub fn load() -> anyhow::Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asa_observe::{LoggerFormat, LoggerTimeZone};

    #[test]
    fn empty_json_is_default() {
        let cfg = AgentConfig::from_json("{}").unwrap();
        assert_eq!(cfg.logger.format, LoggerFormat::Text);
        assert_eq!(cfg.engine, EngineConfig::default());
    }

    #[test]
    fn nested_sections_are_partial() {
        let cfg = AgentConfig::from_json(
            r#"{"logger": {"format": "json", "tz": "local"}, "engine": {"maxPageSize": 50}}"#,
        )
        .unwrap();

        assert_eq!(cfg.logger.format, LoggerFormat::Json);
        assert_eq!(cfg.logger.tz, LoggerTimeZone::Local);
        assert_eq!(cfg.engine.max_page_size, 50);
        assert_eq!(
            cfg.engine.default_page_size,
            EngineConfig::default().default_page_size
        );
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = AgentConfig::from_file(Path::new("/nonexistent/asa.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/asa.json"));
    }

    #[test]
    fn bad_level_is_rejected() {
        assert!(AgentConfig::from_json(r#"{"logger": {"level": "asa_core=lots"}}"#).is_err());
    }
}
