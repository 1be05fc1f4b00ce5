//! Attest Knowledge
//!
//! Turns a plain-text résumé and a JSON availability record into the typed
//! fact set the governance layer verifies claims against.
//!
//! # Architecture
//!
//! ```text
//! resume.txt ─┐
//!             ├→ KnowledgeSource → Extractor → Snapshot { Profile, FactSet } → KnowledgeBase
//! avail.json ─┘                                                               ↑
//!                                                              ReloadWorker ──┘ (swap on change)
//! ```
//!
//! # Failure model
//!
//! Nothing in the résumé can make extraction fail. A missing heading yields
//! no facts for that section, an unparseable date drops the DATE_RANGE fact
//! for that role, and a missing or malformed availability record reports
//! `"unknown"`. Each of these is logged through `tracing`.

#![warn(missing_docs)]

mod availability;
mod base;
mod config;
mod error;
mod extractor;
mod profile;
mod sections;
mod worker;

pub use availability::{load_availability, Availability, AvailabilityReport, UNKNOWN};
pub use base::{KnowledgeBase, KnowledgeSource, Snapshot, SourceContents};
pub use config::KnowledgeConfig;
pub use error::{KnowledgeError, Result};
pub use extractor::{facts_from, Extractor};
pub use profile::{audit_project, Profile, ProjectAudit, ProjectEntry, RoleEntry};
pub use sections::SectionKind;
pub use worker::{ReloadStats, ReloadWorker};

/// Extract the fact set for one résumé and availability record
///
/// Convenience wrapper over [`Extractor::extract`].
pub fn extract(source_text: &str, availability: &Availability) -> Result<attest_domain::FactSet> {
    Ok(Extractor::new()?.extract(source_text, availability))
}

/// Parse a résumé into a [`Profile`]
pub fn extract_profile(source_text: &str) -> Result<Profile> {
    Ok(Extractor::new()?.extract_profile(source_text))
}
