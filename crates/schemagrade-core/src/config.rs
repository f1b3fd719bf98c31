//! Configuration schema (schemagrade.toml)

use serde::de::value::{Error as ValueError, StrDeserializer};
use serde::de::IntoDeserializer;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::diagnostic::{DiagnosticCode, Severity};

/// Name similarity threshold used by every correspondence predicate
pub const DEFAULT_NAME_THRESHOLD: f64 = 0.85;

/// Matching settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Minimum similarity for two names to be considered the same
    #[serde(default = "default_name_threshold")]
    pub name_threshold: f64,
}

fn default_name_threshold() -> f64 {
    DEFAULT_NAME_THRESHOLD
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            name_threshold: DEFAULT_NAME_THRESHOLD,
        }
    }
}

/// Severity threshold overrides for specific diagnostic codes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeverityThreshold {
    /// Map of diagnostic code to severity override
    #[serde(default)]
    pub overrides: HashMap<String, Severity>,
}

impl SeverityThreshold {
    /// Get severity for a diagnostic code, or default
    pub fn get_severity(&self, code: DiagnosticCode, default: Severity) -> Severity {
        self.overrides
            .get(code.as_str())
            .copied()
            .unwrap_or(default)
    }

    /// Override keys that do not name a diagnostic code, sorted
    pub fn unknown_codes(&self) -> Vec<&str> {
        let mut unknown: Vec<&str> = self
            .overrides
            .keys()
            .map(String::as_str)
            .filter(|key| {
                let deserializer: StrDeserializer<'_, ValueError> = (*key).into_deserializer();
                DiagnosticCode::deserialize(deserializer).is_err()
            })
            .collect();
        unknown.sort_unstable();
        unknown
    }

    /// Set severity override for a code
    pub fn set_override(&mut self, code: DiagnosticCode, severity: Severity) {
        self.overrides.insert(code.as_str().to_string(), severity);
    }
}

/// Batch grading settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// File extension of submission documents (without the dot)
    #[serde(default = "default_extension")]
    pub extension: String,

    /// File names to skip (glob patterns)
    #[serde(default)]
    pub skip: Vec<String>,
}

fn default_extension() -> String {
    "json".to_string()
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            extension: default_extension(),
            skip: Vec::new(),
        }
    }
}

impl BatchConfig {
    /// Check if a submission file name matches any skip pattern
    pub fn is_skipped(&self, file_name: &str) -> bool {
        self.skip.iter().any(|pattern| {
            if pattern.contains('*') {
                glob_match(pattern, file_name)
            } else {
                pattern == file_name
            }
        })
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Name matching
    #[serde(default)]
    pub matching: MatchingConfig,

    /// Severity thresholds
    #[serde(default)]
    pub severity: SeverityThreshold,

    /// Batch grading
    #[serde(default)]
    pub batch: BatchConfig,
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Self::from_toml(&contents)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let threshold = self.matching.name_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::InvalidValue(format!(
                "matching.name_threshold must be within [0, 1], got {}",
                threshold
            )));
        }

        let unknown = self.severity.unknown_codes();
        if !unknown.is_empty() {
            return Err(ConfigError::InvalidValue(format!(
                "severity.overrides has unknown diagnostic codes: {}",
                unknown.join(", ")
            )));
        }

        Ok(())
    }
}

/// Simple glob matching (supports a single *)
fn glob_match(pattern: &str, text: &str) -> bool {
    if pattern == "*" || pattern == "**" {
        return true;
    }

    if let Some(star_pos) = pattern.find('*') {
        let prefix = &pattern[..star_pos];
        let suffix = &pattern[star_pos + 1..];

        text.len() >= prefix.len() + suffix.len()
            && text.starts_with(prefix)
            && text.ends_with(suffix)
    } else {
        pattern == text
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.matching.name_threshold, 0.85);
        assert_eq!(config.batch.extension, "json");
    }

    #[test]
    fn severity_override() {
        let mut threshold = SeverityThreshold::default();
        threshold.set_override(DiagnosticCode::AttributeMandatoryMismatch, Severity::Warn);

        assert_eq!(
            threshold.get_severity(DiagnosticCode::AttributeMandatoryMismatch, Severity::Error),
            Severity::Warn
        );
        assert_eq!(
            threshold.get_severity(DiagnosticCode::EntityNotFound, Severity::Error),
            Severity::Error
        );
    }

    #[test]
    fn parses_toml_sections() {
        let config = Config::from_toml(
            r#"
            [matching]
            name_threshold = 0.9

            [severity.overrides]
            ENTITY_CHILD_MISMATCH = "warn"

            [batch]
            extension = "cdm.json"
            skip = ["solution*"]
            "#,
        )
        .unwrap();

        assert_eq!(config.matching.name_threshold, 0.9);
        assert_eq!(
            config.severity.get_severity(DiagnosticCode::EntityChildMismatch, Severity::Error),
            Severity::Warn
        );
        assert_eq!(config.batch.extension, "cdm.json");
        assert!(config.batch.is_skipped("solution.cdm.json"));
        assert!(!config.batch.is_skipped("student1.cdm.json"));
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        let result = Config::from_toml("[matching]\nname_threshold = 1.5\n");
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn rejects_misspelled_override_code() {
        let result = Config::from_toml(
            r#"
            [severity.overrides]
            ENTITY_CHILD_MISMATCH = "warn"
            ENTITY_NOT_FOUDN = "info"
            "#,
        );

        match result {
            Err(ConfigError::InvalidValue(message)) => {
                assert!(message.contains("ENTITY_NOT_FOUDN"));
                assert!(!message.contains("ENTITY_CHILD_MISMATCH"));
            }
            other => panic!("expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn unknown_codes_ignores_valid_overrides() {
        let mut threshold = SeverityThreshold::default();
        threshold.set_override(DiagnosticCode::AssociationLinkCardinalityMismatch, Severity::Info);
        threshold.overrides.insert("relationship_not_found".to_string(), Severity::Warn);

        assert_eq!(threshold.unknown_codes(), vec!["relationship_not_found"]);
    }

    #[test]
    fn config_toml_roundtrip() {
        let config = Config::default();
        let toml = toml::to_string(&config).unwrap();
        let parsed = Config::from_toml(&toml).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn glob_matching() {
        assert!(glob_match("*", "anything"));
        assert!(glob_match("draft_*", "draft_1.json"));
        assert!(glob_match("*.bak", "model.bak"));
        assert!(!glob_match("draft_*", "final.json"));
        assert!(!glob_match("ab*ba", "aba"));
    }
}
