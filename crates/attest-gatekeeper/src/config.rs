//! Governance configuration

use crate::signals::ThreatCategory;
use attest_domain::{FactKind, PeriodDate};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Configuration for the policy engine and verifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GovernanceConfig {
    /// Kinds whose unverified claims are redacted
    #[serde(default = "default_high_stakes")]
    pub high_stakes: Vec<FactKind>,

    /// Allowed gap between a claimed and an actual tenure, in years
    #[serde(default = "default_tenure_tolerance")]
    pub tenure_tolerance_years: f64,

    /// Replacement text for redacted claims
    #[serde(default = "default_placeholder")]
    pub placeholder: String,

    /// Replacement text for redacted PII
    #[serde(default = "default_pii_placeholder")]
    pub pii_placeholder: String,

    /// Final text of a blocked response
    #[serde(default = "default_refusal")]
    pub refusal_message: String,

    /// Final text when a threat terminates the session
    #[serde(default = "default_security_alert")]
    pub security_alert_message: String,

    /// Final text when a response trips a hallucination trap
    #[serde(default = "default_hallucination_message")]
    pub hallucination_message: String,

    /// Threat categories that end the session outright
    #[serde(default = "default_terminate_on")]
    pub terminate_on: Vec<ThreatCategory>,

    /// Redact PII found in responses
    #[serde(default = "default_true")]
    pub redact_pii: bool,

    /// Strikes after which the session is terminated
    #[serde(default = "default_max_strikes")]
    pub max_strikes: u32,

    /// Strikes added by a hallucination trap
    #[serde(default = "default_trap_strikes")]
    pub trap_strikes: u32,

    /// Reference date for ongoing tenure; today when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of: Option<NaiveDate>,
}

fn default_high_stakes() -> Vec<FactKind> {
    vec![FactKind::Employer, FactKind::DateRange]
}

fn default_tenure_tolerance() -> f64 {
    1.0
}

fn default_placeholder() -> String {
    "[unverified claim removed]".to_string()
}

fn default_pii_placeholder() -> String {
    "[REDACTED]".to_string()
}

fn default_refusal() -> String {
    "That request is outside what I can help with. Please ask about professional experience, projects, or skills.".to_string()
}

fn default_security_alert() -> String {
    "[SECURITY ALERT] Malicious intent detected. This session has been flagged and closed.".to_string()
}

fn default_hallucination_message() -> String {
    "SECURITY ALERT: Deviation from verified resume facts detected. The response was withheld.".to_string()
}

fn default_terminate_on() -> Vec<ThreatCategory> {
    vec![ThreatCategory::Jailbreak, ThreatCategory::CredentialProbe]
}

fn default_true() -> bool {
    true
}

fn default_max_strikes() -> u32 {
    3
}

fn default_trap_strikes() -> u32 {
    2
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            high_stakes: default_high_stakes(),
            tenure_tolerance_years: default_tenure_tolerance(),
            placeholder: default_placeholder(),
            pii_placeholder: default_pii_placeholder(),
            refusal_message: default_refusal(),
            security_alert_message: default_security_alert(),
            hallucination_message: default_hallucination_message(),
            terminate_on: default_terminate_on(),
            redact_pii: true,
            max_strikes: default_max_strikes(),
            trap_strikes: default_trap_strikes(),
            as_of: None,
        }
    }
}

impl GovernanceConfig {
    /// Strict preset: every kind but SKILL is high-stakes, any threat terminates
    pub fn strict() -> Self {
        Self {
            high_stakes: vec![
                FactKind::Employer,
                FactKind::Role,
                FactKind::DateRange,
                FactKind::Project,
                FactKind::RepoLink,
                FactKind::Availability,
            ],
            tenure_tolerance_years: 0.5,
            terminate_on: vec![
                ThreatCategory::Jailbreak,
                ThreatCategory::CredentialProbe,
                ThreatCategory::CodeExecution,
            ],
            max_strikes: 2,
            ..Self::default()
        }
    }

    /// Permissive preset: only employers are high-stakes, only jailbreaks terminate
    pub fn permissive() -> Self {
        Self {
            high_stakes: vec![FactKind::Employer],
            tenure_tolerance_years: 2.0,
            terminate_on: vec![ThreatCategory::Jailbreak],
            max_strikes: 5,
            ..Self::default()
        }
    }

    /// Look up a preset by name
    pub fn preset(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "default" => Some(Self::default()),
            "strict" => Some(Self::strict()),
            "permissive" => Some(Self::permissive()),
            _ => None,
        }
    }

    /// Whether unverified claims of `kind` are redacted
    pub fn is_high_stakes(&self, kind: FactKind) -> bool {
        self.high_stakes.contains(&kind)
    }

    /// The date ongoing tenure is measured to
    pub fn reference_date(&self) -> PeriodDate {
        PeriodDate::from_naive(self.as_of.unwrap_or_else(|| Utc::now().date_naive()))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.tenure_tolerance_years.is_finite() || self.tenure_tolerance_years < 0.0 {
            return Err("tenure_tolerance_years must be a non-negative number".to_string());
        }
        if self.placeholder.trim().is_empty() {
            return Err("placeholder must not be empty".to_string());
        }
        if self.refusal_message.trim().is_empty() {
            return Err("refusal_message must not be empty".to_string());
        }
        if self.max_strikes == 0 {
            return Err("max_strikes must be greater than 0".to_string());
        }
        if self.trap_strikes == 0 {
            return Err("trap_strikes must be greater than 0".to_string());
        }
        Ok(())
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        for name in ["default", "strict", "permissive"] {
            let config = GovernanceConfig::preset(name).unwrap();
            assert!(config.validate().is_ok(), "{} preset should validate", name);
        }
        assert!(GovernanceConfig::preset("reckless").is_none());
    }

    #[test]
    fn test_default_high_stakes() {
        let config = GovernanceConfig::default();
        assert!(config.is_high_stakes(FactKind::Employer));
        assert!(config.is_high_stakes(FactKind::DateRange));
        assert!(!config.is_high_stakes(FactKind::Skill));
    }

    #[test]
    fn test_strict_terminates_on_everything() {
        let config = GovernanceConfig::strict();
        assert!(config.terminate_on.contains(&ThreatCategory::CodeExecution));
        assert!(!config.is_high_stakes(FactKind::Skill));
    }

    #[test]
    fn test_invalid_tolerance() {
        let config = GovernanceConfig {
            tenure_tolerance_years: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reference_date() {
        let config = GovernanceConfig {
            as_of: NaiveDate::from_ymd_opt(2025, 6, 15),
            ..Default::default()
        };
        assert_eq!(config.reference_date(), PeriodDate::month(2025, 6));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = GovernanceConfig {
            as_of: NaiveDate::from_ymd_opt(2025, 1, 1),
            ..GovernanceConfig::strict()
        };
        let parsed = GovernanceConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_toml() {
        let config = GovernanceConfig::from_toml(
            "high_stakes = [\"EMPLOYER\", \"ROLE\"]\nterminate_on = [\"code_execution\"]\n",
        )
        .unwrap();
        assert!(config.is_high_stakes(FactKind::Role));
        assert_eq!(config.terminate_on, vec![ThreatCategory::CodeExecution]);
        assert_eq!(config.max_strikes, 3);
    }
}
