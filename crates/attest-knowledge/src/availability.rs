//! Availability record and report
//!
//! The record is a small JSON object. A missing file, malformed JSON or a
//! missing `status` all produce an availability of `"unknown"`, never an
//! error the caller has to handle.

use crate::error::Result;
use attest_domain::{Fact, FactKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// Status reported when nothing is known
pub const UNKNOWN: &str = "unknown";

/// Parsed availability record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Availability {
    /// e.g. `"available"`, `"booked"`
    #[serde(default = "unknown_status")]
    pub status: String,

    /// Earliest start date, free text
    #[serde(default, alias = "start_date", skip_serializing_if = "Option::is_none")]
    pub available_from: Option<String>,

    /// Working timezone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,

    /// Engagement types in order of preference
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preferred_engagement: Vec<String>,

    /// Rates keyed by engagement type
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub rate_card: BTreeMap<String, Value>,
}

fn unknown_status() -> String {
    UNKNOWN.to_string()
}

/// Availability as reported to a visitor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityReport {
    /// Whether an availability record was found
    pub configured: bool,
    /// Current status
    pub status: String,
    /// Earliest start date or `"unknown"`
    pub available_from: String,
    /// Working timezone, falling back to the configured default
    pub timezone: String,
    /// Engagement types in order of preference
    pub preferred_engagement: Vec<String>,
    /// Rates keyed by engagement type
    pub rate_card: BTreeMap<String, Value>,
}

impl Availability {
    /// The "nothing known" record
    pub fn unknown() -> Self {
        Self {
            status: unknown_status(),
            available_from: None,
            timezone: None,
            preferred_engagement: Vec::new(),
            rate_card: BTreeMap::new(),
        }
    }

    /// Parse a JSON record strictly
    pub fn from_json(json: &str) -> Result<Self> {
        let mut availability: Availability = serde_json::from_str(json)?;
        if availability.status.trim().is_empty() {
            availability.status = unknown_status();
        }
        Ok(availability)
    }

    /// Parse a JSON record, falling back to unknown on any problem
    pub fn from_json_or_unknown(json: &str) -> Self {
        Self::from_json(json).unwrap_or_else(|e| {
            tracing::warn!("Malformed availability record, reporting unknown: {}", e);
            Self::unknown()
        })
    }

    /// Whether a real status is known
    pub fn is_known(&self) -> bool {
        !self.status.trim().eq_ignore_ascii_case(UNKNOWN)
    }

    /// Rate card rendered as `key: value` pairs, sorted by key
    pub fn rate_summary(&self) -> Option<String> {
        if self.rate_card.is_empty() {
            return None;
        }
        let parts: Vec<String> = self
            .rate_card
            .iter()
            .map(|(k, v)| match v {
                Value::String(s) => format!("{}: {}", k, s),
                other => format!("{}: {}", k, other),
            })
            .collect();
        Some(parts.join(", "))
    }

    /// AVAILABILITY facts for the known fields
    ///
    /// An unknown record yields no facts, so no availability claim can verify.
    pub fn facts(&self) -> Vec<Fact> {
        if !self.is_known() {
            return Vec::new();
        }
        let mut facts = vec![Fact::new(FactKind::Availability, "status", self.status.trim())];
        if let Some(from) = &self.available_from {
            facts.push(Fact::new(FactKind::Availability, "start_date", from.trim()));
        }
        if let Some(rate) = self.rate_summary() {
            facts.push(Fact::new(FactKind::Availability, "rate", rate));
        }
        if let Some(tz) = &self.timezone {
            facts.push(Fact::new(FactKind::Availability, "timezone", tz.trim()));
        }
        facts
    }

    /// Build the visitor-facing report
    pub fn report(&self, default_timezone: &str) -> AvailabilityReport {
        AvailabilityReport {
            configured: self.is_known(),
            status: self.status.clone(),
            available_from: self
                .available_from
                .clone()
                .unwrap_or_else(|| UNKNOWN.to_string()),
            timezone: self
                .timezone
                .clone()
                .unwrap_or_else(|| default_timezone.to_string()),
            preferred_engagement: self.preferred_engagement.clone(),
            rate_card: self.rate_card.clone(),
        }
    }
}

impl Default for Availability {
    fn default() -> Self {
        Self::unknown()
    }
}

/// Load the availability record from disk
///
/// Never fails: a missing or unreadable file reports `"unknown"`.
pub fn load_availability(path: &Path) -> Availability {
    match std::fs::read_to_string(path) {
        Ok(json) => Availability::from_json_or_unknown(&json),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!("No availability record at {}, reporting unknown", path.display());
            Availability::unknown()
        }
        Err(e) => {
            tracing::warn!("Failed to read availability record {}: {}", path.display(), e);
            Availability::unknown()
        }
    }
}
