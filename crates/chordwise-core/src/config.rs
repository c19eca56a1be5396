use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Default time allowed between two steps of a sequence.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_prevent_default")]
    pub prevent_default: bool,
    #[serde(default)]
    pub stop_propagation: bool,
    #[serde(default)]
    pub stop_immediate_propagation: bool,
}

fn default_timeout_ms() -> u64 {
    150
}

fn default_prevent_default() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            prevent_default: default_prevent_default(),
            stop_propagation: false,
            stop_immediate_propagation: false,
        }
    }
}

impl EngineConfig {
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let config = serde_json::from_str(content).context("invalid engine config")?;
        Ok(config)
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<EngineConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read engine config {}", path.display()))?;
    let config = EngineConfig::from_json_str(&content)
        .with_context(|| format!("failed to parse engine config {}", path.display()))?;
    debug!("Loaded engine config from {}: {:?}", path.display(), config);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.timeout_ms, 150);
        assert!(config.prevent_default);
        assert!(!config.stop_propagation);
        assert!(!config.stop_immediate_propagation);
        assert_eq!(config.timeout(), Duration::from_millis(150));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EngineConfig::from_json_str(r#"{ "timeout_ms": 300, "stop_propagation": true }"#)
            .expect("Failed to parse");
        assert_eq!(
            config,
            EngineConfig {
                timeout_ms: 300,
                prevent_default: true,
                stop_propagation: true,
                stop_immediate_propagation: false,
            }
        );
    }

    #[test]
    fn test_empty_json_is_default() {
        let config = EngineConfig::from_json_str("{}").expect("Failed to parse");
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_invalid_json_is_rejected() {
        assert!(EngineConfig::from_json_str(r#"{ "timeout_ms": "soon" }"#).is_err());
    }

    #[test]
    fn test_load_config_from_file() {
        let mut path = std::env::temp_dir();
        path.push(format!("chordwise-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "prevent_default": false }"#).expect("write config");

        let config = load_config(&path).expect("load config");
        let _ = std::fs::remove_file(&path);

        assert!(!config.prevent_default);
        assert_eq!(config.timeout_ms, 150);
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config("/nonexistent/chordwise.json").unwrap_err();
        assert!(err.to_string().contains("failed to read engine config"));
    }
}
