//! Attest Gatekeeper
//!
//! The governance layer that sits between a language model and a visitor.
//! Candidate text is scanned for factual claims, each claim is checked
//! against the knowledge fact set, and a policy engine decides whether the
//! text is forwarded, redacted or blocked.
//!
//! The Gatekeeper provides:
//! - Claim scanning over a declarative rule table
//! - Verification of claims (VERIFIED / UNVERIFIED / CONTRADICTED)
//! - Threat, PII, hallucination-trap and contact-intent signals
//! - An ordered audit trail for every decision
//! - Per-session strike tracking
//!
//! # Examples
//!
//! ```
//! use attest_domain::{Fact, FactKind, FactSet, PolicyAction};
//! use attest_gatekeeper::{GovernanceConfig, Governor};
//!
//! let facts = FactSet::new(vec![Fact::new(FactKind::Employer, "Acme Corp", "Acme Corp")]);
//! let governor = Governor::new(GovernanceConfig::default()).unwrap();
//!
//! let evaluation = governor.evaluate("Where did Jane work?", "Jane worked at Hooli.", &facts);
//! assert_eq!(evaluation.decision.action, PolicyAction::Filter);
//! assert_eq!(evaluation.decision.final_text, "Jane [unverified claim removed].");
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod governor;
mod policy;
mod scanner;
mod session;
mod signals;
mod verifier;

pub use config::GovernanceConfig;
pub use error::{GovernanceError, Result};
pub use governor::{Evaluation, Governor};
pub use policy::{PolicyEngine, Stage};
pub use scanner::{builtin_rules, ClaimScanner, ScanRule, Template};
pub use session::Session;
pub use signals::{
    strip_contact_token, PiiKind, PiiMatch, SignalDetector, Signals, Threat, ThreatCategory,
    CONTACT_TOKEN,
};
pub use verifier::{verify_employment, EmploymentVerification, Verifier};
