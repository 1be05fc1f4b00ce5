//! Per-visitor strike tracking
//!
//! Lives in memory only; a new process starts every visitor clean.

use crate::config::GovernanceConfig;
use attest_domain::{AuditStatus, AuditThread, PolicyAction, PolicyDecision};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Violation state carried across one visitor's requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    id: Uuid,
    strikes: u32,
    terminated: bool,
}

impl Session {
    /// A clean session
    pub fn new() -> Self {
        Self {
            id: Uuid::now_v7(),
            strikes: 0,
            terminated: false,
        }
    }

    /// Session identifier
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Current strike count
    pub fn strikes(&self) -> u32 {
        self.strikes
    }

    /// Whether the session has been closed
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Fold one decision into the session
    ///
    /// A block adds a strike (`trap_strikes` for a hallucination trap), a
    /// clean pass removes one. Reaching `max_strikes`, or a decision that
    /// already terminates, closes the session and marks the decision.
    pub fn record(
        &mut self,
        decision: &mut PolicyDecision,
        tripped_trap: bool,
        config: &GovernanceConfig,
        audit: &mut AuditThread,
    ) {
        if decision.blocked {
            let added = if tripped_trap { config.trap_strikes } else { 1 };
            self.strikes = self.strikes.saturating_add(added);

            if decision.session_terminated || self.strikes >= config.max_strikes {
                self.terminated = true;
                decision.session_terminated = true;
                audit.record(
                    "SESSION",
                    AuditStatus::Block,
                    format!("Strikes: {}/{}; session terminated", self.strikes, config.max_strikes),
                );
                tracing::warn!("Session {} terminated after {} strikes", self.id, self.strikes);
            } else {
                audit.record(
                    "SESSION",
                    AuditStatus::Warn,
                    format!("Strikes: {}/{}", self.strikes, config.max_strikes),
                );
            }
        } else if decision.action == PolicyAction::Pass && self.strikes > 0 {
            let before = self.strikes;
            self.strikes -= 1;
            audit.record(
                "GOVERNANCE DECAY",
                AuditStatus::Pass,
                format!("Strikes: {} -> {}", before, self.strikes),
            );
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
