//! Configuration for the knowledge layer

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Where the knowledge source lives and how often it is re-read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// Plain-text résumé
    #[serde(default = "default_resume_path")]
    pub resume_path: PathBuf,

    /// Availability JSON record
    #[serde(default = "default_availability_path")]
    pub availability_path: PathBuf,

    /// Seconds between change checks in the reload worker
    #[serde(default = "default_reload_interval_secs")]
    pub reload_interval_secs: u64,

    /// Timezone reported when the availability record has none
    #[serde(default = "default_timezone")]
    pub default_timezone: String,

    /// Files larger than this are treated as unavailable
    #[serde(default = "default_max_source_bytes")]
    pub max_source_bytes: u64,
}

fn default_resume_path() -> PathBuf {
    PathBuf::from("data/resume.txt")
}

fn default_availability_path() -> PathBuf {
    PathBuf::from("data/availability.json")
}

fn default_reload_interval_secs() -> u64 {
    30
}

fn default_timezone() -> String {
    "US/Pacific".to_string()
}

fn default_max_source_bytes() -> u64 {
    1024 * 1024
}

impl KnowledgeConfig {
    /// Get the reload interval as a Duration
    pub fn reload_interval(&self) -> Duration {
        Duration::from_secs(self.reload_interval_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.reload_interval_secs == 0 {
            return Err("reload_interval_secs must be greater than 0".to_string());
        }
        if self.max_source_bytes == 0 {
            return Err("max_source_bytes must be greater than 0".to_string());
        }
        if self.resume_path.as_os_str().is_empty() {
            return Err("resume_path must not be empty".to_string());
        }
        if self.default_timezone.trim().is_empty() {
            return Err("default_timezone must not be empty".to_string());
        }
        Ok(())
    }

    /// Strict preset: frequent change checks, small source limit
    pub fn strict() -> Self {
        Self {
            reload_interval_secs: 5,
            max_source_bytes: 256 * 1024,
            ..Self::default()
        }
    }

    /// Permissive preset: infrequent change checks, large source limit
    pub fn permissive() -> Self {
        Self {
            reload_interval_secs: 300,
            max_source_bytes: 8 * 1024 * 1024,
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            resume_path: default_resume_path(),
            availability_path: default_availability_path(),
            reload_interval_secs: default_reload_interval_secs(),
            default_timezone: default_timezone(),
            max_source_bytes: default_max_source_bytes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        assert!(KnowledgeConfig::default().validate().is_ok());
        assert!(KnowledgeConfig::strict().validate().is_ok());
        assert!(KnowledgeConfig::permissive().validate().is_ok());
    }

    #[test]
    fn test_invalid_reload_interval() {
        let config = KnowledgeConfig {
            reload_interval_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = KnowledgeConfig::from_toml("resume_path = \"cv.txt\"").unwrap();
        assert_eq!(config.resume_path, PathBuf::from("cv.txt"));
        assert_eq!(config.availability_path, default_availability_path());
        assert_eq!(config.default_timezone, "US/Pacific");
    }

    #[test]
    fn test_toml_round_trip() {
        let config = KnowledgeConfig::strict();
        let parsed = KnowledgeConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(config, parsed);
    }
}
