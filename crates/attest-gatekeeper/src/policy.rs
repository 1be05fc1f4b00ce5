//! Policy Engine - turns verification results and signals into a decision
//!
//! Rules run in a fixed order and each evaluated rule appends exactly one
//! audit entry, so the audit thread is an ordered trace of the decision.

use crate::config::GovernanceConfig;
use crate::signals::Signals;
use attest_domain::{
    AuditStatus, AuditThread, FactKind, PolicyAction, PolicyDecision, TextSpan,
    VerificationOutcome, VerificationResult,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pipeline stage of one request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Stage {
    /// Extracting claims from the response
    Scanning,
    /// Checking claims against the fact set
    Verifying,
    /// Applying policy rules
    Deciding,
    /// Decision emitted
    Done,
}

impl Stage {
    /// The stage that follows this one
    pub fn next(self) -> Self {
        match self {
            Stage::Scanning => Stage::Verifying,
            Stage::Verifying => Stage::Deciding,
            Stage::Deciding | Stage::Done => Stage::Done,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Scanning => "SCANNING",
            Stage::Verifying => "VERIFYING",
            Stage::Deciding => "DECIDING",
            Stage::Done => "DONE",
        };
        f.write_str(s)
    }
}

/// A span to replace in the response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Redaction {
    start: usize,
    end: usize,
    pii: bool,
}

/// Applies governance rules to verification results
#[derive(Debug, Clone)]
pub struct PolicyEngine {
    config: GovernanceConfig,
}

impl PolicyEngine {
    /// Create an engine
    pub fn new(config: GovernanceConfig) -> Self {
        Self { config }
    }

    /// The engine's configuration
    pub fn config(&self) -> &GovernanceConfig {
        &self.config
    }

    /// Decide what to forward
    ///
    /// `response` is the text the results' spans refer to. `fact_count` is
    /// the size of the fact set; zero switches on degrade mode, where every
    /// unverified EMPLOYER or DATE_RANGE claim is redacted.
    pub fn decide(
        &self,
        response: &str,
        results: &[VerificationResult<'_>],
        signals: &Signals,
        fact_count: usize,
        audit: &mut AuditThread,
    ) -> PolicyDecision {
        // 1. Query threats
        if let Some(threat) = &signals.threat {
            let terminate = self.config.terminate_on.contains(&threat.category);
            audit.record(
                "THREAT SCAN",
                AuditStatus::Block,
                format!(
                    "{} pattern detected: '{}'{}",
                    threat.category,
                    threat.matched,
                    if terminate { "; session terminated" } else { "" }
                ),
            );
            tracing::warn!("Blocked {} query", threat.category);
            let message = if terminate {
                &self.config.security_alert_message
            } else {
                &self.config.refusal_message
            };
            return PolicyDecision::block(message.clone(), terminate)
                .with_contact(signals.contact_requested);
        }
        audit.record("THREAT SCAN", AuditStatus::Pass, "No threat patterns in query");

        // 2. Hallucination traps
        if let Some(trap) = &signals.trap {
            audit.record(
                "HALLUCINATION TRAP",
                AuditStatus::Block,
                format!("Response claims '{}'", trap),
            );
            tracing::warn!("Blocked response containing trap phrase '{}'", trap);
            return PolicyDecision::block(self.config.hallucination_message.clone(), false)
                .with_contact(signals.contact_requested);
        }
        audit.record("HALLUCINATION TRAP", AuditStatus::Pass, "No trap phrases in response");

        // 3. Knowledge source
        let degraded = fact_count == 0;
        if degraded {
            audit.record(
                "KNOWLEDGE SOURCE",
                AuditStatus::Warn,
                "Fact set is empty; EMPLOYER and DATE_RANGE claims will be redacted",
            );
            tracing::warn!("Evaluating against an empty fact set");
        } else {
            audit.record(
                "KNOWLEDGE SOURCE",
                AuditStatus::Pass,
                format!("{} facts loaded", fact_count),
            );
        }

        // 4. Claims, in claim order
        let mut redactions = Vec::new();
        let mut verified = 0;
        let mut filtered = 0;
        let mut kept_unverified = 0;

        for result in results {
            let claim = &result.claim;
            let label = format!("{} '{}': {}", claim.kind, claim.subject, claim.asserted_value);
            match result.outcome {
                VerificationOutcome::Verified => {
                    verified += 1;
                    audit.record("CLAIM VERIFIED", AuditStatus::Pass, label);
                }
                VerificationOutcome::Contradicted => {
                    filtered += 1;
                    redactions.push(claim_redaction(&claim.span));
                    let known = result
                        .matched_fact
                        .map(|f| f.value.as_str())
                        .unwrap_or("unknown");
                    audit.record(
                        "CLAIM CONTRADICTED",
                        AuditStatus::Warn,
                        format!("{} (known: {}); redacted", label, known),
                    );
                }
                VerificationOutcome::Unverified => {
                    if self.redacts_unverified(claim.kind, degraded) {
                        filtered += 1;
                        redactions.push(claim_redaction(&claim.span));
                        audit.record(
                            "CLAIM UNVERIFIED",
                            AuditStatus::Warn,
                            format!("{}; no supporting fact, redacted", label),
                        );
                    } else {
                        kept_unverified += 1;
                        audit.record(
                            "CLAIM UNVERIFIED",
                            AuditStatus::Warn,
                            format!("{}; no supporting fact, kept", label),
                        );
                    }
                }
            }
        }

        // 5. PII
        let pii_total = signals.query_pii.len() + signals.response_pii.len();
        if pii_total == 0 {
            audit.record("PII SCAN", AuditStatus::Pass, "No PII detected");
        } else {
            if self.config.redact_pii {
                redactions.extend(signals.response_pii.iter().map(|p| Redaction {
                    start: p.span.start,
                    end: p.span.end,
                    pii: true,
                }));
            }
            audit.record(
                "PII SCAN",
                AuditStatus::Warn,
                format!(
                    "{} in query, {} in response{}",
                    signals.query_pii.len(),
                    signals.response_pii.len(),
                    if self.config.redact_pii && !signals.response_pii.is_empty() {
                        "; response PII redacted"
                    } else {
                        ""
                    }
                ),
            );
        }

        // 6. Contact intent
        audit.record(
            "CONTACT INTENT",
            AuditStatus::Pass,
            if signals.contact_requested {
                "Contact intent detected"
            } else {
                "No contact intent"
            },
        );

        // 7. Summary
        if filtered == 0 {
            let details = if kept_unverified == 0 {
                "ALL CLAIMS VERIFIED".to_string()
            } else {
                format!("No claims filtered; {} low-stakes claims unverified", kept_unverified)
            };
            audit.record("GOVERNANCE LAYER", AuditStatus::Pass, details);
        } else {
            audit.record(
                "GOVERNANCE LAYER",
                AuditStatus::Warn,
                format!("{} claims filtered", filtered),
            );
        }

        let redacted = !redactions.is_empty();
        let final_text = self.redact(response, redactions);
        tracing::debug!(
            "Decision: {} verified, {} filtered, {} PII",
            verified,
            filtered,
            pii_total
        );

        PolicyDecision {
            action: if redacted { PolicyAction::Filter } else { PolicyAction::Pass },
            final_text,
            blocked: false,
            facts_verified_count: verified,
            claims_filtered_count: filtered,
            contact_requested: signals.contact_requested,
            session_terminated: false,
        }
    }

    fn redacts_unverified(&self, kind: FactKind, degraded: bool) -> bool {
        self.config.is_high_stakes(kind)
            || (degraded && matches!(kind, FactKind::Employer | FactKind::DateRange))
    }

    /// Replace spans, merging any that overlap
    ///
    /// A merged region takes the claim placeholder unless every span in it
    /// is PII.
    fn redact(&self, text: &str, mut redactions: Vec<Redaction>) -> String {
        redactions.retain(|r| r.start < r.end && text.get(r.start..r.end).is_some());
        redactions.sort_by_key(|r| (r.start, r.end));

        let mut merged: Vec<Redaction> = Vec::with_capacity(redactions.len());
        for r in redactions {
            match merged.last_mut() {
                Some(last) if r.start < last.end => {
                    last.end = last.end.max(r.end);
                    last.pii &= r.pii;
                }
                _ => merged.push(r),
            }
        }

        let mut out = text.to_string();
        for r in merged.iter().rev() {
            let placeholder = if r.pii {
                &self.config.pii_placeholder
            } else {
                &self.config.placeholder
            };
            out.replace_range(r.start..r.end, placeholder);
        }
        out
    }
}

fn claim_redaction(span: &TextSpan) -> Redaction {
    Redaction {
        start: span.start,
        end: span.end,
        pii: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::{PiiKind, PiiMatch, Threat, ThreatCategory};
    use attest_domain::{AssertedValue, Claim, Fact};

    fn engine() -> PolicyEngine {
        PolicyEngine::new(GovernanceConfig::default())
    }

    fn claim_at(text: &str, needle: &str, kind: FactKind) -> Claim {
        let start = text.find(needle).unwrap();
        Claim::new(
            kind,
            needle,
            AssertedValue::Text(needle.to_string()),
            TextSpan::from_source(text, start, start + needle.len()).unwrap(),
        )
    }

    #[test]
    fn test_pass_without_claims() {
        let mut audit = AuditThread::new();
        let decision = engine().decide("Hello there.", &[], &Signals::default(), 5, &mut audit);

        assert_eq!(decision.action, PolicyAction::Pass);
        assert_eq!(decision.final_text, "Hello there.");
        assert_eq!(decision.facts_verified_count, 0);
        assert_eq!(
            audit.actions(),
            vec!["THREAT SCAN", "HALLUCINATION TRAP", "KNOWLEDGE SOURCE", "PII SCAN", "CONTACT INTENT", "GOVERNANCE LAYER"]
        );
        assert_eq!(audit.last().unwrap().details, "ALL CLAIMS VERIFIED");
    }

    #[test]
    fn test_threat_blocks_and_stops() {
        let mut audit = AuditThread::new();
        let signals = Signals {
            threat: Some(Threat {
                category: ThreatCategory::Jailbreak,
                matched: "ignore all previous instructions".into(),
            }),
            ..Default::default()
        };
        let decision = engine().decide("anything", &[], &signals, 5, &mut audit);

        assert!(decision.blocked);
        assert!(decision.session_terminated);
        assert_eq!(decision.final_text, GovernanceConfig::default().security_alert_message);
        assert_eq!(audit.len(), 1);
        assert_eq!(audit.entries()[0].status, AuditStatus::Block);
    }

    #[test]
    fn test_non_terminating_threat_uses_refusal() {
        let mut audit = AuditThread::new();
        let signals = Signals {
            threat: Some(Threat {
                category: ThreatCategory::CodeExecution,
                matched: "eval(".into(),
            }),
            ..Default::default()
        };
        let decision = engine().decide("anything", &[], &signals, 5, &mut audit);

        assert!(decision.blocked);
        assert!(!decision.session_terminated);
        assert_eq!(decision.final_text, GovernanceConfig::default().refusal_message);
    }

    #[test]
    fn test_trap_blocks() {
        let mut audit = AuditThread::new();
        let signals = Signals {
            trap: Some("built the pyramids".into()),
            ..Default::default()
        };
        let decision = engine().decide("She built the pyramids.", &[], &signals, 5, &mut audit);

        assert_eq!(decision.action, PolicyAction::Block);
        assert_eq!(audit.actions(), vec!["THREAT SCAN", "HALLUCINATION TRAP"]);
    }

    #[test]
    fn test_per_claim_handling() {
        let text = "Worked at Hooli. Knows Haskell. Was at Acme.";
        let fact = Fact::new(FactKind::Employer, "Acme", "Acme");
        let results = vec![
            VerificationResult::unverified(claim_at(text, "Hooli", FactKind::Employer)),
            VerificationResult::unverified(claim_at(text, "Haskell", FactKind::Skill)),
            VerificationResult::verified(claim_at(text, "Acme", FactKind::Employer), &fact),
        ];
        let mut audit = AuditThread::new();
        let decision = engine().decide(text, &results, &Signals::default(), 3, &mut audit);

        assert_eq!(decision.action, PolicyAction::Filter);
        assert_eq!(decision.final_text, "Worked at [unverified claim removed]. Knows Haskell. Was at Acme.");
        assert_eq!(decision.claims_filtered_count, 1);
        assert_eq!(decision.facts_verified_count, 1);
        assert_eq!(
            &audit.actions()[3..6],
            &["CLAIM UNVERIFIED", "CLAIM UNVERIFIED", "CLAIM VERIFIED"]
        );
        assert_eq!(audit.last().unwrap().status, AuditStatus::Warn);
    }

    #[test]
    fn test_degrade_mode_redacts_employers() {
        let config = GovernanceConfig {
            high_stakes: vec![],
            ..Default::default()
        };
        let text = "Worked at Acme.";
        let results = vec![VerificationResult::unverified(claim_at(text, "Acme", FactKind::Employer))];
        let mut audit = AuditThread::new();
        let decision = PolicyEngine::new(config).decide(text, &results, &Signals::default(), 0, &mut audit);

        assert_eq!(decision.claims_filtered_count, 1);
        assert_eq!(audit.entries()[2].status, AuditStatus::Warn);
    }

    #[test]
    fn test_overlapping_spans_merge() {
        let text = "Contact jane@example.com at Hooli today";
        let email_start = text.find("jane").unwrap();
        let signals = Signals {
            response_pii: vec![PiiMatch {
                kind: PiiKind::Email,
                span: TextSpan::from_source(text, email_start, email_start + 16).unwrap(),
            }],
            ..Default::default()
        };
        let wide = Claim::new(
            FactKind::Employer,
            "Hooli",
            AssertedValue::Text("Hooli".into()),
            TextSpan::from_source(text, email_start + 5, text.find(" today").unwrap()).unwrap(),
        );
        let results = vec![VerificationResult::unverified(wide)];
        let mut audit = AuditThread::new();
        let decision = engine().decide(text, &results, &signals, 3, &mut audit);

        assert_eq!(decision.final_text, "Contact [unverified claim removed] today");
    }

    #[test]
    fn test_pii_only_redaction() {
        let text = "SSN 123-45-6789 on file";
        let signals = Signals {
            response_pii: vec![PiiMatch {
                kind: PiiKind::Ssn,
                span: TextSpan::from_source(text, 4, 15).unwrap(),
            }],
            ..Default::default()
        };
        let mut audit = AuditThread::new();
        let decision = engine().decide(text, &[], &signals, 3, &mut audit);

        assert_eq!(decision.action, PolicyAction::Filter);
        assert_eq!(decision.final_text, "SSN [REDACTED] on file");
        assert_eq!(decision.claims_filtered_count, 0);
    }

    #[test]
    fn test_contact_flag_does_not_block() {
        let signals = Signals {
            contact_requested: true,
            ..Default::default()
        };
        let mut audit = AuditThread::new();
        let decision = engine().decide("Sure.", &[], &signals, 3, &mut audit);

        assert!(decision.contact_requested);
        assert!(!decision.blocked);
        assert_eq!(audit.entries()[4].details, "Contact intent detected");
    }

    #[test]
    fn test_blocked_decision_keeps_contact_flag() {
        let signals = Signals {
            threat: Some(Threat {
                category: ThreatCategory::CodeExecution,
                matched: "eval(".into(),
            }),
            contact_requested: true,
            ..Default::default()
        };
        let mut audit = AuditThread::new();
        let decision = engine().decide("anything", &[], &signals, 3, &mut audit);
        assert!(decision.blocked);
        assert!(decision.contact_requested);

        let signals = Signals {
            trap: Some("built the pyramids".into()),
            contact_requested: true,
            ..Default::default()
        };
        let mut audit = AuditThread::new();
        let decision = engine().decide("She built the pyramids.", &[], &signals, 3, &mut audit);
        assert!(decision.blocked);
        assert!(decision.contact_requested);
    }

    #[test]
    fn test_stage_order() {
        assert_eq!(Stage::Scanning.next(), Stage::Verifying);
        assert_eq!(Stage::Verifying.next(), Stage::Deciding);
        assert_eq!(Stage::Deciding.next(), Stage::Done);
        assert_eq!(Stage::Done.next(), Stage::Done);
    }
}
