use std::collections::HashMap;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::Value;

/// Default for [`EngineConfig::warn_on_final_methods`]
const DEFAULT_WARN_ON_FINAL_METHODS: bool = true;

/// Settings for the mock engine
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EngineConfig {
    /// Default return values per declared type name, replacing the built-in sentinels
    #[serde(default)]
    pub default_values: HashMap<String, serde_json::Value>,

    /// Default return values bound to a method name. These win over `default_values`.
    #[serde(default)]
    pub bound_default_values: HashMap<String, serde_json::Value>,

    /// Emit a warning when a final or private method is configured on a mock
    /// Defaults given by [`DEFAULT_WARN_ON_FINAL_METHODS`]
    #[serde(default = "default_warn_on_final_methods")]
    pub warn_on_final_methods: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_values: HashMap::new(),
            bound_default_values: HashMap::new(),
            warn_on_final_methods: DEFAULT_WARN_ON_FINAL_METHODS,
        }
    }
}

impl EngineConfig {
    /// Load configuration from multiple sources in order of priority:
    /// 1. Configuration file (unitmock.toml, unitmock.yaml, unitmock.json)
    /// 2. Environment variables (prefixed with UNITMOCK__)
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("unitmock").required(false))
            .add_source(Environment::with_prefix("UNITMOCK").separator("__"))
            .build()?;

        let engine_config: Self = config.try_deserialize()?;
        engine_config.validate()?;
        Ok(engine_config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(Environment::with_prefix("UNITMOCK").separator("__"))
            .build()?;

        let engine_config: Self = config.try_deserialize()?;
        engine_config.validate()?;
        Ok(engine_config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for type_name in self.default_values.keys() {
            if type_name.trim().is_empty() {
                return Err(ConfigError::Message(
                    "Default value type name cannot be empty".to_string(),
                ));
            }
            if matches!(type_name.to_ascii_lowercase().as_str(), "void" | "never") {
                return Err(ConfigError::Message(format!(
                    "Type {} never produces a value and cannot have a default",
                    type_name
                )));
            }
        }
        if self.bound_default_values.keys().any(|m| m.trim().is_empty()) {
            return Err(ConfigError::Message(
                "Bound default method name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn default_value_overrides(&self) -> impl Iterator<Item = (&str, Value)> {
        self.default_values
            .iter()
            .map(|(name, value)| (name.as_str(), Value::from(value.clone())))
    }

    pub fn bound_default_overrides(&self) -> impl Iterator<Item = (&str, Value)> {
        self.bound_default_values
            .iter()
            .map(|(name, value)| (name.as_str(), Value::from(value.clone())))
    }
}

fn default_warn_on_final_methods() -> bool {
    DEFAULT_WARN_ON_FINAL_METHODS
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_from_file() {
        let dir = std::env::temp_dir().join(format!("unitmock-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("engine.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
warn_on_final_methods = false

[default_values]
int = 7
string = "fixture"

[bound_default_values]
status = "bound"
"#
        )
        .unwrap();

        let config = EngineConfig::load_from_file(path.to_str().unwrap()).unwrap();
        assert!(!config.warn_on_final_methods);

        let overrides: HashMap<_, _> = config.default_value_overrides().collect();
        assert_eq!(overrides.get("int"), Some(&Value::Int(7)));
        assert_eq!(overrides.get("string"), Some(&Value::from("fixture")));

        let bound: HashMap<_, _> = config.bound_default_overrides().collect();
        assert_eq!(bound.get("status"), Some(&Value::from("bound")));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert!(config.warn_on_final_methods);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_void_default() {
        let mut config = EngineConfig::default();
        config
            .default_values
            .insert("void".to_string(), serde_json::json!(1));
        assert!(config.validate().is_err());
    }
}
