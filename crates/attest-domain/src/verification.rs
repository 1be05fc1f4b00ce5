//! Verification outcomes

use crate::claim::Claim;
use crate::fact::Fact;
use serde::Serialize;
use std::fmt;

/// How a claim fared against the fact set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationOutcome {
    /// A compatible fact exists
    Verified,

    /// No fact of the same kind and subject exists
    Unverified,

    /// A fact of the same kind and subject exists but disagrees
    Contradicted,
}

impl fmt::Display for VerificationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VerificationOutcome::Verified => "VERIFIED",
            VerificationOutcome::Unverified => "UNVERIFIED",
            VerificationOutcome::Contradicted => "CONTRADICTED",
        };
        f.write_str(s)
    }
}

/// One claim paired with its outcome
///
/// `matched_fact` borrows from the fact set the claim was checked against.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationResult<'f> {
    /// The claim that was checked
    pub claim: Claim,

    /// Outcome of the check
    pub outcome: VerificationOutcome,

    /// The fact consulted, if any
    pub matched_fact: Option<&'f Fact>,
}

impl<'f> VerificationResult<'f> {
    /// A verified result backed by `fact`
    pub fn verified(claim: Claim, fact: &'f Fact) -> Self {
        Self {
            claim,
            outcome: VerificationOutcome::Verified,
            matched_fact: Some(fact),
        }
    }

    /// A result with no supporting fact
    pub fn unverified(claim: Claim) -> Self {
        Self {
            claim,
            outcome: VerificationOutcome::Unverified,
            matched_fact: None,
        }
    }

    /// A result contradicted by `fact`
    pub fn contradicted(claim: Claim, fact: &'f Fact) -> Self {
        Self {
            claim,
            outcome: VerificationOutcome::Contradicted,
            matched_fact: Some(fact),
        }
    }

    /// Whether the claim verified
    pub fn is_verified(&self) -> bool {
        self.outcome == VerificationOutcome::Verified
    }
}
