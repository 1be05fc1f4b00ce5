//! Auxiliary signals: threats, PII, hallucination traps, contact intent

use crate::error::Result;
use attest_domain::TextSpan;
use regex::{Regex, RegexSet};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Token a model emits to open the contact form
pub const CONTACT_TOKEN: &str = "[TRIGGER_CONTACT_FORM]";

const JAILBREAK_PATTERNS: &[&str] = &[
    r"ignore\s+(your|all|previous|prior|\w+\s+\w+)\s+(instructions|rules|guidelines|prompt)",
    r"pretend\s+(you\s+are|to\s+be|you're)",
    r"roleplay\s+as",
    r"forget\s+(your|all|previous|\w+\s+\w+)\s+(rules|instructions|prompt)",
    r"you\s+are\s+now\s+a",
    r"act\s+as\s+(if|though)\s+you",
    r"disregard\s+(your|all|previous|\w+\s+\w+)",
    r"bypass\s+(your|the|all)\s+(restrictions|rules|safety)",
    r"\bdan\s+mode",
    r"developer\s+mode",
];

const CREDENTIAL_PROBE_PATTERNS: &[&str] = &[
    r"(reveal|show|give|tell)\s+(me\s+)?(your\s+)?(password|api[_\s]?key|secret|token|credentials|bank\s+account|credit\s+card|social\s+security)",
    r"what\s+is\s+(your|the)\s+(api[_\s]?key|password|secret|bank\s+account)",
    r"system\s+prompt",
    r"initial\s+instructions",
    r"bank\s+account",
];

const CODE_EXECUTION_PATTERNS: &[&str] = &[
    r"(execute|run|eval)\s+(this|the)?\s*(code|script|command)",
    r"eval\s*\(",
    r"exec\s*\(",
    r"import\s+os",
    r"subprocess\.",
];

const HALLUCINATION_TRAPS: &[&str] = &[
    r"built\s+the\s+pyramids",
    r"invented\s+the\s+internet",
    r"won\s+(the|a)\s+nobel\s+prize",
    r"walked\s+on\s+the\s+moon",
    r"discovered\s+electricity",
];

const CONTACT_INTENT: &str = r"(?i)\b(hire|hiring|get\s+in\s+touch|reach\s+out|contact\s+(him|her|them|you|me)|send\s+(a\s+)?(private\s+)?message|discuss\s+(a\s+)?(business|project|opportunity|role|contract)|schedule\s+(a\s+)?(call|meeting|interview))\b";

/// Category of a malicious query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreatCategory {
    /// Attempts to override the agent's instructions
    Jailbreak,
    /// Attempts to extract secrets or the system prompt
    CredentialProbe,
    /// Attempts to get code executed
    CodeExecution,
}

impl ThreatCategory {
    /// Upper-case label for audit details
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatCategory::Jailbreak => "JAILBREAK",
            ThreatCategory::CredentialProbe => "CREDENTIAL PROBE",
            ThreatCategory::CodeExecution => "CODE EXECUTION",
        }
    }
}

impl fmt::Display for ThreatCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A threat found in the user's query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Threat {
    /// Category of the matched pattern
    pub category: ThreatCategory,
    /// The query text that matched
    pub matched: String,
}

/// Kind of personally identifiable information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PiiKind {
    /// US social security number
    Ssn,
    /// 16-digit card number
    CardNumber,
    /// E-mail address
    Email,
}

/// One PII occurrence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PiiMatch {
    /// What was found
    pub kind: PiiKind,
    /// Where it was found
    pub span: TextSpan,
}

/// Everything the detector found for one request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signals {
    /// First threat found in the query
    pub threat: Option<Threat>,
    /// Hallucination trap phrase found in the response
    pub trap: Option<String>,
    /// PII in the query
    pub query_pii: Vec<PiiMatch>,
    /// PII in the response
    pub response_pii: Vec<PiiMatch>,
    /// The visitor asked to get in touch, or the model opened the form
    pub contact_requested: bool,
}

/// Pattern-based detector for the auxiliary signals
#[derive(Debug, Clone)]
pub struct SignalDetector {
    threats: Vec<(ThreatCategory, Regex)>,
    traps: RegexSet,
    trap_finders: Vec<Regex>,
    pii: Vec<(PiiKind, Regex)>,
    contact: Regex,
}

impl SignalDetector {
    /// Compile the built-in pattern tables
    pub fn new() -> Result<Self> {
        let mut threats = Vec::new();
        for (category, table) in [
            (ThreatCategory::Jailbreak, JAILBREAK_PATTERNS),
            (ThreatCategory::CredentialProbe, CREDENTIAL_PROBE_PATTERNS),
            (ThreatCategory::CodeExecution, CODE_EXECUTION_PATTERNS),
        ] {
            for pattern in table {
                threats.push((category, Regex::new(&format!("(?i){}", pattern))?));
            }
        }

        let trap_patterns: Vec<String> = HALLUCINATION_TRAPS
            .iter()
            .map(|p| format!("(?i){}", p))
            .collect();
        let trap_finders = trap_patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            threats,
            traps: RegexSet::new(&trap_patterns)?,
            trap_finders,
            pii: vec![
                (PiiKind::Ssn, Regex::new(r"\b\d{3}-\d{2}-\d{4}\b")?),
                (PiiKind::CardNumber, Regex::new(r"\b\d{16}\b")?),
                (
                    PiiKind::Email,
                    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b")?,
                ),
            ],
            contact: Regex::new(CONTACT_INTENT)?,
        })
    }

    /// Run every detector
    ///
    /// Response spans refer to the response with the contact token removed.
    pub fn detect(&self, query: &str, response: &str) -> Signals {
        let stripped = strip_contact_token(response);
        Signals {
            threat: self.query_threat(query),
            trap: self.hallucination_trap(&stripped),
            query_pii: self.pii(query),
            response_pii: self.pii(&stripped),
            contact_requested: self.contact_intent(query) || response.contains(CONTACT_TOKEN),
        }
    }

    /// First threat pattern matching the query, in table order
    pub fn query_threat(&self, query: &str) -> Option<Threat> {
        self.threats.iter().find_map(|(category, regex)| {
            regex.find(query).map(|m| {
                tracing::debug!("Threat pattern hit ({}): '{}'", category, m.as_str());
                Threat {
                    category: *category,
                    matched: m.as_str().to_string(),
                }
            })
        })
    }

    /// Trap phrase in the response, if any
    pub fn hallucination_trap(&self, response: &str) -> Option<String> {
        let index = self.traps.matches(response).into_iter().next()?;
        self.trap_finders
            .get(index)
            .and_then(|re| re.find(response))
            .map(|m| m.as_str().to_string())
    }

    /// PII occurrences, ordered by position
    pub fn pii(&self, text: &str) -> Vec<PiiMatch> {
        let mut found: Vec<PiiMatch> = self
            .pii
            .iter()
            .flat_map(|(kind, regex)| {
                regex.find_iter(text).map(move |m| PiiMatch {
                    kind: *kind,
                    span: TextSpan {
                        start: m.start(),
                        end: m.end(),
                        text: m.as_str().to_string(),
                    },
                })
            })
            .collect();
        found.sort_by_key(|p| p.span.start);
        found
    }

    /// Whether the query asks to get in touch
    pub fn contact_intent(&self, query: &str) -> bool {
        self.contact.is_match(query)
    }
}

/// Remove the contact-form token from model output
pub fn strip_contact_token(response: &str) -> String {
    if !response.contains(CONTACT_TOKEN) {
        return response.to_string();
    }
    response.replace(CONTACT_TOKEN, "").trim().to_string()
}
