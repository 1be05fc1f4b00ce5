//! Audit trail records
//!
//! An [`AuditThread`] is the ordered trace of every check performed while
//! evaluating one user query. Entries can only be appended; nothing is ever
//! retracted, even when a session is terminated mid-evaluation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Status shown next to each audit entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditStatus {
    /// Check passed
    Pass,
    /// Check found something worth flagging; response modified or noted
    Warn,
    /// Response suppressed
    Block,
    /// Check started but not concluded
    ///
    /// The evaluation pipeline runs synchronously and records each check
    /// once it has finished, so its threads never hold this status. It is
    /// kept in the wire shape for transports that stream a check before its
    /// outcome is known.
    Pending,
}

impl AuditStatus {
    /// Upper-case wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditStatus::Pass => "PASS",
            AuditStatus::Warn => "WARN",
            AuditStatus::Block => "BLOCK",
            AuditStatus::Pending => "PENDING",
        }
    }
}

impl fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One externally visible record of a check performed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// When the check completed (RFC 3339 on the wire)
    pub timestamp: DateTime<Utc>,

    /// Human-readable name of the check
    pub action: String,

    /// Outcome of the check
    pub status: AuditStatus,

    /// Free-text details
    pub details: String,
}

impl AuditEntry {
    /// Create an entry stamped with the current time
    pub fn new(action: impl Into<String>, status: AuditStatus, details: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            action: action.into(),
            status,
            details: details.into(),
        }
    }
}

/// Append-only, ordered audit entries for one user query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditThread {
    id: Uuid,
    entries: Vec<AuditEntry>,
}

impl AuditThread {
    /// Start a new thread with a time-sortable id
    pub fn new() -> Self {
        Self {
            id: Uuid::now_v7(),
            entries: Vec::new(),
        }
    }

    /// Thread id (UUIDv7)
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Append an entry and return a reference to it
    pub fn record(
        &mut self,
        action: impl Into<String>,
        status: AuditStatus,
        details: impl Into<String>,
    ) -> &AuditEntry {
        self.push(AuditEntry::new(action, status, details))
    }

    /// Append a pre-built entry
    pub fn push(&mut self, entry: AuditEntry) -> &AuditEntry {
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    /// Entries in the order they were recorded
    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recent entry
    pub fn last(&self) -> Option<&AuditEntry> {
        self.entries.last()
    }

    /// Whether any entry has the given status
    pub fn contains_status(&self, status: AuditStatus) -> bool {
        self.entries.iter().any(|e| e.status == status)
    }

    /// Action names in order, handy for assertions and summaries
    pub fn actions(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.action.as_str()).collect()
    }
}

impl Default for AuditThread {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a AuditThread {
    type Item = &'a AuditEntry;
    type IntoIter = std::slice::Iter<'a, AuditEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
