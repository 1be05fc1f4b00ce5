//! Policy decisions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Overall action taken on a candidate response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PolicyAction {
    /// Forwarded unmodified
    Pass,
    /// Forwarded with spans redacted
    Filter,
    /// Suppressed and replaced with a refusal
    Block,
}

impl fmt::Display for PolicyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PolicyAction::Pass => "PASS",
            PolicyAction::Filter => "FILTER",
            PolicyAction::Block => "BLOCK",
        };
        f.write_str(s)
    }
}

/// Final output of one response evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDecision {
    /// Overall action
    pub action: PolicyAction,

    /// Text to forward: original, redacted, or the refusal message
    pub final_text: String,

    /// Whether the response was suppressed
    pub blocked: bool,

    /// Claims that verified against the fact set
    pub facts_verified_count: usize,

    /// Claims removed from the response
    pub claims_filtered_count: usize,

    /// The visitor asked to get in touch
    pub contact_requested: bool,

    /// The session should be closed
    pub session_terminated: bool,
}

impl PolicyDecision {
    /// A blocking decision carrying `refusal` as the final text
    pub fn block(refusal: impl Into<String>, session_terminated: bool) -> Self {
        Self {
            action: PolicyAction::Block,
            final_text: refusal.into(),
            blocked: true,
            facts_verified_count: 0,
            claims_filtered_count: 0,
            contact_requested: false,
            session_terminated,
        }
    }

    /// Carry the visitor's contact intent onto this decision
    pub fn with_contact(mut self, requested: bool) -> Self {
        self.contact_requested = requested;
        self
    }
}
