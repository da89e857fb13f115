//! Configuration structures for deserialisation.
//!
//! These structures map directly to the JSON configuration file format.

use serde::Deserialize;

use crate::error::ConfigError;

/// Root configuration structure.
///
/// This is the top-level structure that matches the JSON config file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Optional JSON schema reference (ignored during parsing).
    #[serde(rename = "$schema", default)]
    _schema: Option<String>,

    /// Optional comment field (ignored during parsing).
    #[serde(rename = "_comment", default)]
    _comment: Option<String>,

    /// Output layout settings.
    #[serde(default)]
    pub output: OutputConfig,

    /// Library update behaviour.
    #[serde(default)]
    pub library: LibraryConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("output.footprint_lib", &self.output.footprint_lib),
            ("output.symbol_lib", &self.output.symbol_lib),
            ("output.model_dir", &self.output.model_dir),
        ] {
            if value.is_empty() || value.contains(['/', '\\']) {
                return Err(ConfigError::invalid(
                    name,
                    format!("must be a plain directory name, got '{value}'"),
                ));
            }
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::invalid(
                "logging.level",
                format!(
                    "'{}' is not one of: trace, debug, info, warn, error",
                    self.logging.level
                ),
            ));
        }
        Ok(())
    }
}

/// Output directory layout.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Root output directory.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Footprint library directory name, created under the output root.
    #[serde(default = "default_footprint_lib")]
    pub footprint_lib: String,

    /// Symbol library file stem; the container is `<stem>.kicad_sym`.
    #[serde(default = "default_symbol_lib")]
    pub symbol_lib: String,

    /// 3-D model directory name, created under the footprint library.
    #[serde(default = "default_model_dir")]
    pub model_dir: String,

    /// KiCad path variable the footprint references models through.
    ///
    /// A value like `KICAD_3DMODEL_DIR` produces model paths of the form
    /// `$(KICAD_3DMODEL_DIR)/packages3d/NAME.wrl`; empty means relative
    /// paths.
    #[serde(default)]
    pub model_base_variable: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            footprint_lib: default_footprint_lib(),
            symbol_lib: default_symbol_lib(),
            model_dir: default_model_dir(),
            model_base_variable: String::new(),
        }
    }
}

fn default_output_dir() -> String {
    "JLC2KiCad_lib".to_string()
}

fn default_footprint_lib() -> String {
    "footprint".to_string()
}

fn default_symbol_lib() -> String {
    "default_lib".to_string()
}

fn default_model_dir() -> String {
    "packages3d".to_string()
}

/// Library update behaviour.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LibraryConfig {
    /// Keep existing symbol records instead of replacing them.
    #[serde(default)]
    pub skip_existing: bool,

    /// Keep converting remaining components after one fails.
    #[serde(default = "default_true")]
    pub keep_going: bool,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            skip_existing: false,
            keep_going: default_true(),
        }
    }
}

const fn default_true() -> bool {
    true
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let json = r"{}";
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.output.output_dir, "JLC2KiCad_lib");
        assert_eq!(config.output.model_dir, "packages3d");
    }

    #[test]
    fn parse_full_config() {
        let json = r#"{
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "_comment": "Test config",
            "output": {
                "output_dir": "out",
                "footprint_lib": "parts.pretty",
                "symbol_lib": "parts",
                "model_dir": "models",
                "model_base_variable": "KICAD_3DMODEL_DIR"
            },
            "library": {
                "skip_existing": true,
                "keep_going": false
            },
            "logging": {
                "level": "debug"
            }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.output.footprint_lib, "parts.pretty");
        assert_eq!(config.output.model_base_variable, "KICAD_3DMODEL_DIR");
        assert!(config.library.skip_existing);
        assert!(!config.library.keep_going);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn library_config_defaults() {
        let config = LibraryConfig::default();
        assert!(!config.skip_existing);
        assert!(config.keep_going);
    }

    #[test]
    fn logging_config_defaults() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "warn");
    }

    #[test]
    fn reject_invalid_log_level() {
        let json = r#"{ "logging": { "level": "loud" } }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(&err, ConfigError::Invalid { setting, .. } if setting == "logging.level"));
    }

    #[test]
    fn reject_nested_lib_name() {
        let json = r#"{ "output": { "footprint_lib": "a/b" } }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn reject_unknown_fields() {
        let json = r#"{ "unknown_field": "value" }"#;
        let result: Result<Config, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
